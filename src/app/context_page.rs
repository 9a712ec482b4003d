// SPDX-License-Identifier: GPL-3.0-only

use cosmic::app::context_drawer;

use crate::{
    app::{AppModel, Message, pokedex::Event},
    fl,
    utils::capitalize_string,
};

/// The context page to display in the context drawer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    /// About [`ContextPage`] of the application
    About,
    /// Settings [`ContextPage`] of the application
    Settings,
    /// Details of the selected Pokémon
    PokemonDetails,
}

impl ContextPage {
    /// Display the [`ContextPage`]
    pub fn display<'a>(
        &self,
        app_model: &'a AppModel,
    ) -> Option<context_drawer::ContextDrawer<'a, Message>> {
        Some(match &self {
            ContextPage::About => context_drawer::about(
                &app_model.about,
                |s| Message::LaunchUrl(s.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            )
            .title(fl!("about")),
            ContextPage::Settings => context_drawer::context_drawer(
                app_model.settings(),
                Message::ToggleContextPage(ContextPage::Settings),
            )
            .title(fl!("settings")),
            ContextPage::PokemonDetails => {
                let item = app_model.pokedex.details().selected()?;

                context_drawer::context_drawer(
                    app_model.pokemon_details(),
                    Message::Pokedex(Event::CloseDetails),
                )
                .title(capitalize_string(&item.name))
            }
        })
    }
}
