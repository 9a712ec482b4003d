// SPDX-License-Identifier: GPL-3.0-only

use cosmic::{
    cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry},
    theme,
};
use serde::{Deserialize, Serialize};

use crate::app::APP_ID;

/// Amount of cards per grid row the user can pick from
pub const POKEMON_PER_ROW_CHOICES: [usize; 4] = [2, 3, 4, 5];

#[derive(Debug, Clone, CosmicConfigEntry, Eq, PartialEq)]
#[version = 1]
pub struct Config {
    pub app_theme: AppTheme,
    pub pokemon_per_row: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_theme: Default::default(),
            pokemon_per_row: 3,
        }
    }
}

impl Config {
    pub fn config_handler() -> Option<cosmic_config::Config> {
        cosmic_config::Config::new(APP_ID, Self::VERSION)
            .inspect_err(|err| tracing::warn!(?err, "could not open the configuration"))
            .ok()
    }

    /// Loads the stored configuration, falling back to the defaults for anything unreadable
    pub fn load(handler: Option<&cosmic_config::Config>) -> Self {
        let Some(handler) = handler else {
            return Self::default();
        };

        match Self::get_entry(handler) {
            Ok(config) => config,
            Err((errors, config)) => {
                tracing::warn!(?errors, "errors while loading the configuration");
                config
            }
        }
    }

    /// Cards per grid row, never below the smallest choice
    pub fn cards_per_row(&self) -> usize {
        self.pokemon_per_row.max(POKEMON_PER_ROW_CHOICES[0])
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum AppTheme {
    Dark,
    Light,
    #[default]
    System,
}

impl AppTheme {
    /// Themes in the order shown in the settings dropdown
    pub const ALL: [AppTheme; 3] = [AppTheme::Dark, AppTheme::Light, AppTheme::System];

    pub fn theme(&self) -> theme::Theme {
        match self {
            Self::Dark => theme::Theme::dark(),
            Self::Light => theme::Theme::light(),
            Self::System => theme::system_preference(),
        }
    }
}
