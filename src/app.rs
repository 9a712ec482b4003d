// SPDX-License-Identifier: GPL-3.0-only

use std::collections::HashMap;
use std::sync::Arc;

use cosmic::app::context_drawer;
use cosmic::cosmic_config;
use cosmic::iced::alignment::{Horizontal, Vertical};
use cosmic::iced::{ContentFit, Length, Subscription};
use cosmic::prelude::*;
use cosmic::widget::{self, about::About, image, menu};
use futures::StreamExt;
use cosmic::{cosmic_theme, theme};

use crate::app::app_menu::MenuAction;
use crate::app::context_page::ContextPage;
use crate::app::pokedex::{Effect, Event, Pokedex};
use crate::config::{AppTheme, Config, POKEMON_PER_ROW_CHOICES};
use crate::core::api::PokeApi;
use crate::core::sprites::RemoteSprites;
use crate::entities::{Generation, ListingItem, PokemonDetails};
use crate::fl;
use crate::flags::Flags;
use crate::utils::capitalize_string;

mod app_menu;
mod context_page;
pub mod pokedex;

pub const APP_ID: &str = "dev.gendex.GenDex";
const REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");
const POKEAPI: &str = "https://pokeapi.co";

const CARD_ARTWORK_SIZE: f32 = 120.0;
const DETAILS_ARTWORK_SIZE: f32 = 240.0;
const TYPE_ICON_WIDTH: f32 = 32.0;

pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    context_page: ContextPage,
    /// Contains items assigned to the About [`ContextPage`]
    about: About,
    /// Key bindings for the application's menu bar.
    key_binds: HashMap<menu::KeyBind, MenuAction>,
    /// Handler used to persist configuration changes
    config_handler: Option<cosmic_config::Config>,
    /// Configuration data that persists between application runs.
    config: Config,
    /// Labels of the theme dropdown, in [`AppTheme::ALL`] order
    app_themes: Vec<String>,
    /// Labels of the cards per row dropdown, in [`POKEMON_PER_ROW_CHOICES`] order
    pokemon_per_row_options: Vec<String>,
    /// `None` when the HTTP clients could not be built, requests are then dropped
    api: Option<PokeApi>,
    /// Listing and details state
    pokedex: Pokedex,
}

#[derive(Debug, Clone)]
pub enum Message {
    LaunchUrl(String),
    ToggleContextPage(ContextPage),
    MenuAction(MenuAction),
    UpdateConfig(Config),
    UpdateTheme(usize),
    UpdatePokemonPerRow(usize),
    Pokedex(Event),
}

impl cosmic::Application for AppModel {
    type Executor = cosmic::executor::Default;

    type Flags = Flags;

    type Message = Message;

    const APP_ID: &'static str = APP_ID;

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    fn init(core: cosmic::Core, flags: Self::Flags) -> (Self, Task<cosmic::Action<Self::Message>>) {
        let about = About::default()
            .name(fl!("app-title"))
            .icon(widget::icon::from_name(APP_ID).handle())
            .version(env!("CARGO_PKG_VERSION"))
            .license(env!("CARGO_PKG_LICENSE"))
            .links([(fl!("repository"), REPOSITORY), (fl!("pokeapi"), POKEAPI)]);

        let api = PokeApi::new(Arc::new(RemoteSprites))
            .inspect_err(|err| tracing::error!(%err, "PokéApi is unavailable"))
            .ok();

        let (pokedex, effect) = Pokedex::start();

        let mut app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            key_binds: HashMap::new(),
            config_handler: flags.config_handler,
            config: flags.config,
            app_themes: vec![fl!("dark"), fl!("light"), fl!("match-desktop")],
            pokemon_per_row_options: POKEMON_PER_ROW_CHOICES
                .iter()
                .map(ToString::to_string)
                .collect(),
            api,
            pokedex,
        };

        let tasks = vec![
            app.update_title(),
            cosmic::command::set_theme(app.config.app_theme.theme()),
            app.perform(effect),
        ];

        (app, Task::batch(tasks))
    }

    /// Elements to pack at the start of the header bar.
    fn header_start(&self) -> Vec<Element<'_, Self::Message>> {
        let menu_bar = menu::bar(vec![menu::Tree::with_children(
            menu::root(fl!("view")).apply(Element::from),
            menu::items(
                &self.key_binds,
                vec![
                    menu::Item::Button(fl!("about"), None, MenuAction::About),
                    menu::Item::Button(fl!("settings"), None, MenuAction::Settings),
                ],
            ),
        )]);

        vec![menu_bar.into()]
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        self.context_page.display(self)
    }

    fn view(&self) -> Element<'_, Self::Message> {
        let spacing = theme::active().cosmic().spacing;

        widget::column()
            .push(self.generation_selector(&spacing))
            .push(self.pokemon_grid(&spacing))
            .spacing(spacing.space_s)
            .padding(spacing.space_s)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Reloads the configuration when it is changed outside of the application
    fn subscription(&self) -> Subscription<Self::Message> {
        self.core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| {
                if !update.errors.is_empty() {
                    tracing::warn!(errors = ?update.errors, "errors while reloading the configuration");
                }
                Message::UpdateConfig(update.config)
            })
    }

    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        match message {
            Message::LaunchUrl(url) => {
                if let Err(err) = open::that_detached(&url) {
                    tracing::error!(%url, %err, "failed to open url");
                }
            }
            Message::ToggleContextPage(context_page) => self.toggle_context_page(context_page),
            Message::MenuAction(action) => match action {
                MenuAction::About => self.toggle_context_page(ContextPage::About),
                MenuAction::Settings => self.toggle_context_page(ContextPage::Settings),
            },
            Message::UpdateConfig(config) => {
                self.config = config;
                return cosmic::command::set_theme(self.config.app_theme.theme());
            }
            Message::UpdateTheme(index) => {
                let Some(app_theme) = AppTheme::ALL.get(index).copied() else {
                    return Task::none();
                };

                match &self.config_handler {
                    Some(handler) => {
                        if let Err(err) = self.config.set_app_theme(handler, app_theme) {
                            tracing::error!(?err, "failed to save the theme");
                        }
                    }
                    None => self.config.app_theme = app_theme,
                }

                return cosmic::command::set_theme(app_theme.theme());
            }
            Message::UpdatePokemonPerRow(index) => {
                let Some(per_row) = POKEMON_PER_ROW_CHOICES.get(index).copied() else {
                    return Task::none();
                };

                match &self.config_handler {
                    Some(handler) => {
                        if let Err(err) = self.config.set_pokemon_per_row(handler, per_row) {
                            tracing::error!(?err, "failed to save the cards per row");
                        }
                    }
                    None => self.config.pokemon_per_row = per_row,
                }
            }
            Message::Pokedex(event) => return self.dispatch(event),
        }

        Task::none()
    }
}

impl AppModel {
    /// Feeds an event to the Pokédex and starts the request it asks for
    fn dispatch(&mut self, event: Event) -> Task<cosmic::Action<Message>> {
        let opens_details = matches!(event, Event::OpenDetails(_));
        let closes_details = matches!(event, Event::CloseDetails);
        let selects_generation = matches!(event, Event::SelectGeneration(_));

        let (pokedex, effect) = std::mem::take(&mut self.pokedex).apply(event);
        self.pokedex = pokedex;

        if opens_details {
            self.context_page = ContextPage::PokemonDetails;
            self.core.window.show_context = true;
        } else if closes_details && self.context_page == ContextPage::PokemonDetails {
            self.core.window.show_context = false;
        }

        if selects_generation {
            Task::batch(vec![self.update_title(), self.perform(effect)])
        } else {
            self.perform(effect)
        }
    }

    /// Turns an [`Effect`] into the task that performs it.
    /// Every completion comes back as an [`Event`] tagged with the ticket it was issued with.
    fn perform(&self, effect: Effect) -> Task<cosmic::Action<Message>> {
        if effect == Effect::None {
            return Task::none();
        }

        let Some(api) = self.api.clone() else {
            tracing::error!(?effect, "PokéApi client unavailable, dropping request");
            return Task::none();
        };

        match effect {
            Effect::None => Task::none(),
            Effect::FetchListing { ticket, generation } => Task::perform(
                async move { api.fetch_generation(generation).await },
                move |result| {
                    let event = match result {
                        Ok(items) => Event::ListingLoaded { ticket, items },
                        Err(err) => {
                            tracing::error!(
                                %err,
                                offset = generation.offset,
                                limit = generation.limit,
                                "failed to fetch the Pokémon listing"
                            );
                            Event::ListingFailed { ticket }
                        }
                    };
                    cosmic::Action::App(Message::Pokedex(event))
                },
            ),
            Effect::FetchArtwork { ticket, items } => {
                Task::run(api.artwork(items), move |(id, bytes)| {
                    cosmic::Action::App(Message::Pokedex(Event::ArtworkLoaded {
                        ticket,
                        id,
                        image: image::Handle::from_bytes(bytes),
                    }))
                })
            }
            Effect::FetchDetails {
                ticket,
                resource_url,
                artwork_id,
            } => {
                let artwork = match artwork_id {
                    Some(id) => {
                        let api = api.clone();
                        let download = futures::stream::once(async move {
                            api.fetch_artwork(id)
                                .await
                                .inspect_err(|err| {
                                    tracing::warn!(id, %err, "failed to download artwork")
                                })
                                .ok()
                        })
                        .filter_map(futures::future::ready);

                        Task::run(download, move |bytes| {
                            cosmic::Action::App(Message::Pokedex(Event::DetailsArtworkLoaded {
                                ticket,
                                image: image::Handle::from_bytes(bytes),
                            }))
                        })
                    }
                    None => Task::none(),
                };

                let details = Task::perform(
                    async move {
                        let result = api.fetch_details(&resource_url).await;
                        (resource_url, result)
                    },
                    move |(resource_url, result)| {
                        let event = match result {
                            Ok(details) => Event::DetailsLoaded { ticket, details },
                            Err(err) => {
                                tracing::error!(%err, %resource_url, "failed to fetch Pokémon details");
                                Event::DetailsFailed { ticket }
                            }
                        };
                        cosmic::Action::App(Message::Pokedex(event))
                    },
                );

                Task::batch(vec![details, artwork])
            }
            Effect::FetchTypeIcons { ticket, types } => {
                Task::run(api.type_icons(types), move |(type_name, bytes)| {
                    cosmic::Action::App(Message::Pokedex(Event::TypeIconLoaded {
                        ticket,
                        type_name,
                        image: image::Handle::from_bytes(bytes),
                    }))
                })
            }
        }
    }

    fn toggle_context_page(&mut self, context_page: ContextPage) {
        // leaving the details page closes it
        if self.context_page == ContextPage::PokemonDetails
            && context_page != ContextPage::PokemonDetails
        {
            let (pokedex, _) = std::mem::take(&mut self.pokedex).apply(Event::CloseDetails);
            self.pokedex = pokedex;
        }

        if self.context_page == context_page {
            // Close the context drawer if the toggled context page is the same.
            self.core.window.show_context = !self.core.window.show_context;
        } else {
            // Open the context drawer to display the requested context page.
            self.context_page = context_page;
            self.core.window.show_context = true;
        }
    }

    /// Updates the header and window titles.
    pub fn update_title(&mut self) -> Task<cosmic::Action<Message>> {
        let generation = self.pokedex.generation().display_name();

        let mut window_title = fl!("app-title");
        window_title.push_str(" - ");
        window_title.push_str(&generation);

        self.set_header_title(generation);

        if let Some(id) = self.core.main_window_id() {
            self.set_window_title(window_title, id)
        } else {
            Task::none()
        }
    }

    /// Settings page of the context drawer
    pub fn settings(&self) -> Element<'_, Message> {
        let app_theme_selected = AppTheme::ALL
            .iter()
            .position(|app_theme| *app_theme == self.config.app_theme);
        let per_row_selected = POKEMON_PER_ROW_CHOICES
            .iter()
            .position(|per_row| *per_row == self.config.cards_per_row());

        widget::settings::view_column(vec![
            widget::settings::section()
                .title(fl!("appearance"))
                .add(
                    widget::settings::item::builder(fl!("theme")).control(widget::dropdown(
                        &self.app_themes,
                        app_theme_selected,
                        Message::UpdateTheme,
                    )),
                )
                .add(
                    widget::settings::item::builder(fl!("pokemon-per-row")).control(
                        widget::dropdown(
                            &self.pokemon_per_row_options,
                            per_row_selected,
                            Message::UpdatePokemonPerRow,
                        ),
                    ),
                )
                .into(),
        ])
        .into()
    }

    /// One button per generation, the active one highlighted
    fn generation_selector(&self, spacing: &cosmic_theme::Spacing) -> Element<'_, Message> {
        let active = self.pokedex.generation_index();
        let mut selector = widget::row().spacing(spacing.space_xxs);

        for (index, generation) in Generation::ALL.iter().enumerate() {
            let button = if index == active {
                widget::button::suggested(generation.display_name())
            } else {
                widget::button::standard(generation.display_name())
            };

            selector =
                selector.push(button.on_press(Message::Pokedex(Event::SelectGeneration(index))));
        }

        widget::container(selector)
            .width(Length::Fill)
            .align_x(Horizontal::Center)
            .into()
    }

    fn pokemon_grid(&self, spacing: &cosmic_theme::Spacing) -> Element<'_, Message> {
        let listing = self.pokedex.listing();

        if listing.is_empty() {
            let status = if self.pokedex.is_loading_listing() {
                fl!("loading")
            } else {
                fl!("empty-listing")
            };

            return widget::text::title3(status)
                .apply(widget::container)
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(Horizontal::Center)
                .align_y(Vertical::Center)
                .into();
        }

        let per_row = self.config.cards_per_row();
        let mut grid = widget::column().spacing(spacing.space_s).width(Length::Fill);

        for chunk in listing.chunks(per_row) {
            let mut row = widget::row().spacing(spacing.space_s).width(Length::Fill);

            for item in chunk {
                row = row.push(self.pokemon_card(item, spacing));
            }

            // keep cards of the last row the same width as the others
            for _ in chunk.len()..per_row {
                row = row.push(widget::container(widget::text::body("")).width(Length::Fill));
            }

            grid = grid.push(row);
        }

        widget::scrollable(grid).height(Length::Fill).into()
    }

    fn pokemon_card<'a>(
        &'a self,
        item: &'a ListingItem,
        spacing: &cosmic_theme::Spacing,
    ) -> Element<'a, Message> {
        let id = item
            .id()
            .map_or_else(|| String::from("?"), |id| id.to_string());

        let content = widget::column()
            .push(artwork(
                item.id().and_then(|id| self.pokedex.artwork(id)),
                CARD_ARTWORK_SIZE,
            ))
            .push(widget::text::heading(fl!(
                "pokemon-name",
                name = capitalize_string(&item.name)
            )))
            .push(widget::text::caption(fl!("pokemon-id", id = id)))
            .align_x(Horizontal::Center)
            .spacing(spacing.space_xxs)
            .width(Length::Fill);

        widget::button::custom(content)
            .on_press(Message::Pokedex(Event::OpenDetails(item.clone())))
            .class(theme::Button::Image)
            .padding(spacing.space_xs)
            .width(Length::Fill)
            .into()
    }

    /// Contents of the details [`ContextPage`]
    pub fn pokemon_details(&self) -> Element<'_, Message> {
        let spacing = theme::active().cosmic().spacing;

        let mut content = widget::column()
            .push(artwork(self.pokedex.details_artwork(), DETAILS_ARTWORK_SIZE))
            .align_x(Horizontal::Center)
            .spacing(spacing.space_s)
            .width(Length::Fill);

        content = match self.pokedex.details().details() {
            Some(details) => content
                .push(self.primary_type_row(details, &spacing))
                .push(self.types_section(details))
                .push(self.moves_section(details)),
            None => content.push(widget::text::body(fl!("loading-details"))),
        };

        content
            .push(
                widget::button::standard(fl!("close"))
                    .on_press(Message::Pokedex(Event::CloseDetails)),
            )
            .into()
    }

    /// Icon of the type in the first slot next to its name
    fn primary_type_row<'a>(
        &'a self,
        details: &'a PokemonDetails,
        spacing: &cosmic_theme::Spacing,
    ) -> Element<'a, Message> {
        let Some(primary_type) = details.primary_type() else {
            return widget::text::body(fl!("no-types")).into();
        };

        widget::row()
            .push(self.type_icon(primary_type))
            .push(widget::text::title4(capitalize_string(primary_type)))
            .align_y(Vertical::Center)
            .spacing(spacing.space_xxs)
            .into()
    }

    fn types_section<'a>(&'a self, details: &'a PokemonDetails) -> Element<'a, Message> {
        let mut section = widget::settings::section().title(fl!("types"));

        for type_name in &details.types {
            section = section.add(widget::settings::item(
                capitalize_string(type_name),
                self.type_icon(type_name),
            ));
        }

        section.into()
    }

    fn moves_section<'a>(&'a self, details: &'a PokemonDetails) -> Element<'a, Message> {
        let mut section = widget::settings::section().title(fl!("moves"));

        for move_name in &details.moves {
            section = section.add(widget::text::body(capitalize_string(move_name)));
        }

        section.into()
    }

    /// Downloaded type icon, or the type name until it arrives
    fn type_icon(&self, type_name: &str) -> Element<'_, Message> {
        match self.pokedex.type_icon(type_name) {
            Some(handle) => widget::image(handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fixed(TYPE_ICON_WIDTH))
                .into(),
            None => widget::text::caption(type_name.to_uppercase()).into(),
        }
    }
}

/// Official artwork of a Pokémon, or a placeholder while it downloads
fn artwork<'a>(handle: Option<&image::Handle>, size: f32) -> Element<'a, Message> {
    match handle {
        Some(handle) => widget::image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fixed(size))
            .height(Length::Fixed(size))
            .into(),
        None => widget::text::caption(fl!("loading-image"))
            .apply(widget::container)
            .width(Length::Fixed(size))
            .height(Length::Fixed(size))
            .align_x(Horizontal::Center)
            .align_y(Vertical::Center)
            .into(),
    }
}
