// SPDX-License-Identifier: GPL-3.0-only

mod generation;
mod listing_item;
mod pokemon_details;

pub use generation::Generation;
pub use listing_item::ListingItem;
pub use pokemon_details::{PokemonDetails, PokemonResource};
