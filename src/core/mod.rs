// SPDX-License-Identifier: GPL-3.0-only

pub mod api;
pub mod settings;
pub mod sprites;
