// SPDX-License-Identifier: GPL-3.0-only

mod app;
mod config;
mod core;
mod entities;
mod flags;
mod i18n;
mod utils;

fn main() -> cosmic::iced::Result {
    // Logging first so everything below can report problems
    let settings = crate::core::settings::init();

    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();

    // Enable localizations to be applied.
    i18n::init(&requested_languages);

    // Starts the application's event loop with the stored configuration as flags.
    cosmic::app::run::<app::AppModel>(settings, flags::flags())
}
