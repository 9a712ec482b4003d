// SPDX-License-Identifier: GPL-3.0-only

use std::collections::HashMap;

use cosmic::widget::image;

use crate::entities::{Generation, ListingItem, PokemonDetails};

/// Identifies one request so late responses of older requests can be told apart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    fn next(self) -> Self {
        Ticket(self.0.wrapping_add(1))
    }
}

/// Everything that can happen to the Pokédex, from the user or from a finished request
#[derive(Debug, Clone)]
pub enum Event {
    /// User picked the generation at the given index of [`Generation::ALL`]
    SelectGeneration(usize),
    ListingLoaded {
        ticket: Ticket,
        items: Vec<ListingItem>,
    },
    ListingFailed {
        ticket: Ticket,
    },
    ArtworkLoaded {
        ticket: Ticket,
        id: i64,
        image: image::Handle,
    },
    /// User clicked a Pokémon card
    OpenDetails(ListingItem),
    /// Artwork of the Pokémon whose details page is open
    DetailsArtworkLoaded {
        ticket: Ticket,
        image: image::Handle,
    },
    DetailsLoaded {
        ticket: Ticket,
        details: PokemonDetails,
    },
    DetailsFailed {
        ticket: Ticket,
    },
    TypeIconLoaded {
        ticket: Ticket,
        type_name: String,
        image: image::Handle,
    },
    /// User closed the details page
    CloseDetails,
}

/// Request the Pokédex wants performed after handling an [`Event`]
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    FetchListing {
        ticket: Ticket,
        generation: Generation,
    },
    FetchArtwork {
        ticket: Ticket,
        items: Vec<ListingItem>,
    },
    FetchDetails {
        ticket: Ticket,
        resource_url: String,
        /// Set when the card artwork is not already downloaded
        artwork_id: Option<i64>,
    },
    FetchTypeIcons {
        ticket: Ticket,
        types: Vec<String>,
    },
}

/// State of the details page
#[derive(Debug, Clone, Default)]
pub enum DetailsState {
    #[default]
    Closed,
    Loading(ListingItem),
    Loaded {
        item: ListingItem,
        details: PokemonDetails,
    },
    /// The request failed, shown exactly like [`DetailsState::Loading`]
    Failed(ListingItem),
}

impl DetailsState {
    /// Pokémon whose details page is open
    pub fn selected(&self) -> Option<&ListingItem> {
        match self {
            DetailsState::Closed => None,
            DetailsState::Loading(item) | DetailsState::Failed(item) => Some(item),
            DetailsState::Loaded { item, .. } => Some(item),
        }
    }

    pub fn details(&self) -> Option<&PokemonDetails> {
        match self {
            DetailsState::Loaded { details, .. } => Some(details),
            _ => None,
        }
    }
}

/// The whole view state of the Pokédex.
///
/// Every change goes through [`Pokedex::apply`], which consumes the current state
/// and returns the next one together with the request to perform. Responses carry
/// the [`Ticket`] of the request that produced them and are dropped when a newer
/// request of the same kind was issued in the meantime.
#[derive(Debug, Clone, Default)]
pub struct Pokedex {
    generation: usize,
    requested_generation: Option<usize>,
    listing: Vec<ListingItem>,
    listing_ticket: Ticket,
    loading_listing: bool,
    artwork: HashMap<i64, image::Handle>,
    /// Only bumped when a new listing replaces the cards on screen
    artwork_ticket: Ticket,
    details: DetailsState,
    details_ticket: Ticket,
    details_artwork: Option<image::Handle>,
    type_icons: HashMap<String, image::Handle>,
}

impl Pokedex {
    /// Initial state, already requesting the first generation
    pub fn start() -> (Self, Effect) {
        Self::default().apply(Event::SelectGeneration(0))
    }

    pub fn apply(mut self, event: Event) -> (Self, Effect) {
        let effect = match event {
            Event::SelectGeneration(index) => self.select_generation(index),
            Event::ListingLoaded { ticket, items } => {
                if self.is_stale_listing(ticket) {
                    return (self, Effect::None);
                }

                self.listing = items;
                self.artwork.clear();
                self.artwork_ticket = self.artwork_ticket.next();
                self.loading_listing = false;

                Effect::FetchArtwork {
                    ticket: self.artwork_ticket,
                    items: self.listing.clone(),
                }
            }
            Event::ListingFailed { ticket } => {
                if !self.is_stale_listing(ticket) {
                    // previous listing stays on screen
                    self.loading_listing = false;
                }
                Effect::None
            }
            Event::ArtworkLoaded { ticket, id, image } => {
                if ticket == self.artwork_ticket {
                    self.artwork.insert(id, image);
                } else {
                    tracing::debug!(?ticket, id, "discarding artwork of a replaced listing");
                }
                Effect::None
            }
            Event::OpenDetails(item) => {
                self.details_ticket = self.details_ticket.next();
                self.type_icons.clear();

                // the card artwork may be gone once another listing replaces it
                self.details_artwork = item.id().and_then(|id| self.artwork.get(&id).cloned());
                let artwork_id = item.id().filter(|_| self.details_artwork.is_none());

                let resource_url = item.resource_url.clone();
                self.details = DetailsState::Loading(item);

                Effect::FetchDetails {
                    ticket: self.details_ticket,
                    resource_url,
                    artwork_id,
                }
            }
            Event::DetailsArtworkLoaded { ticket, image } => {
                if !self.is_stale_details(ticket) {
                    self.details_artwork = Some(image);
                }
                Effect::None
            }
            Event::DetailsLoaded { ticket, details } => {
                if self.is_stale_details(ticket) {
                    return (self, Effect::None);
                }

                match std::mem::take(&mut self.details) {
                    DetailsState::Loading(item) => {
                        let types = details.types.clone();
                        self.details = DetailsState::Loaded { item, details };
                        Effect::FetchTypeIcons { ticket, types }
                    }
                    other => {
                        self.details = other;
                        Effect::None
                    }
                }
            }
            Event::DetailsFailed { ticket } => {
                if self.is_stale_details(ticket) {
                    return (self, Effect::None);
                }

                if let DetailsState::Loading(item) = std::mem::take(&mut self.details) {
                    self.details = DetailsState::Failed(item);
                }
                Effect::None
            }
            Event::TypeIconLoaded {
                ticket,
                type_name,
                image,
            } => {
                if !self.is_stale_details(ticket) {
                    self.type_icons.insert(type_name, image);
                }
                Effect::None
            }
            Event::CloseDetails => {
                self.details = DetailsState::Closed;
                self.details_artwork = None;
                self.type_icons.clear();
                // in-flight responses must not reopen the page
                self.details_ticket = self.details_ticket.next();
                Effect::None
            }
        };

        (self, effect)
    }

    fn select_generation(&mut self, index: usize) -> Effect {
        let Some(generation) = Generation::get(index) else {
            tracing::warn!(index, "ignoring unknown generation");
            return Effect::None;
        };

        if self.requested_generation == Some(index) {
            return Effect::None;
        }

        self.generation = index;
        self.requested_generation = Some(index);
        self.listing_ticket = self.listing_ticket.next();
        self.loading_listing = true;

        Effect::FetchListing {
            ticket: self.listing_ticket,
            generation,
        }
    }

    fn is_stale_listing(&self, ticket: Ticket) -> bool {
        let stale = ticket != self.listing_ticket;
        if stale {
            tracing::debug!(?ticket, current = ?self.listing_ticket, "discarding stale listing response");
        }
        stale
    }

    fn is_stale_details(&self, ticket: Ticket) -> bool {
        let stale = ticket != self.details_ticket;
        if stale {
            tracing::debug!(?ticket, current = ?self.details_ticket, "discarding stale details response");
        }
        stale
    }

    /// Index of the active generation in [`Generation::ALL`]
    pub fn generation_index(&self) -> usize {
        self.generation
    }

    pub fn generation(&self) -> Generation {
        Generation::ALL[self.generation]
    }

    /// Pokémon of the active generation, in PokéApi order
    pub fn listing(&self) -> &[ListingItem] {
        &self.listing
    }

    pub fn is_loading_listing(&self) -> bool {
        self.loading_listing
    }

    pub fn artwork(&self, id: i64) -> Option<&image::Handle> {
        self.artwork.get(&id)
    }

    pub fn details(&self) -> &DetailsState {
        &self.details
    }

    /// Artwork shown in the details page
    pub fn details_artwork(&self) -> Option<&image::Handle> {
        self.details_artwork.as_ref()
    }

    pub fn type_icon(&self, type_name: &str) -> Option<&image::Handle> {
        self.type_icons.get(type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pokemon(id: i64, name: &str) -> ListingItem {
        ListingItem::new(name, format!("https://pokeapi.co/api/v2/pokemon/{id}/"))
    }

    fn details(types: &[&str], moves: usize) -> PokemonDetails {
        PokemonDetails::new(
            types.iter().map(|name| name.to_string()),
            (0..moves).map(|i| format!("move-{i}")),
        )
    }

    fn listing_ticket(effect: &Effect) -> Ticket {
        match effect {
            Effect::FetchListing { ticket, .. } => *ticket,
            other => panic!("expected a listing request, got {other:?}"),
        }
    }

    fn artwork_ticket(effect: &Effect) -> Ticket {
        match effect {
            Effect::FetchArtwork { ticket, .. } => *ticket,
            other => panic!("expected an artwork request, got {other:?}"),
        }
    }

    fn details_ticket(effect: &Effect) -> Ticket {
        match effect {
            Effect::FetchDetails { ticket, .. } => *ticket,
            other => panic!("expected a details request, got {other:?}"),
        }
    }

    fn empty_image() -> image::Handle {
        image::Handle::from_bytes(Vec::<u8>::new())
    }

    /// Starts the Pokédex and completes the first listing request
    fn loaded(items: Vec<ListingItem>) -> Pokedex {
        let (pokedex, effect) = Pokedex::start();
        let ticket = listing_ticket(&effect);
        let (pokedex, _) = pokedex.apply(Event::ListingLoaded { ticket, items });
        pokedex
    }

    #[test]
    fn ticket_wraps_around() {
        assert_eq!(Ticket(u64::MAX).next(), Ticket(0));
        assert_ne!(Ticket::default().next(), Ticket::default());
    }

    #[test]
    fn starts_with_the_first_generation() {
        let (pokedex, effect) = Pokedex::start();

        match effect {
            Effect::FetchListing { generation, .. } => {
                assert_eq!((generation.offset, generation.limit), (0, 151))
            }
            other => panic!("unexpected effect {other:?}"),
        }
        assert!(pokedex.is_loading_listing());
        assert!(pokedex.listing().is_empty());
    }

    #[test]
    fn every_generation_issues_one_request() {
        let (mut pokedex, _) = Pokedex::start();

        // start at the last one so every index is a change
        for index in [4, 0, 1, 2, 3] {
            let (next, effect) = pokedex.apply(Event::SelectGeneration(index));
            let expected = Generation::ALL[index];

            match effect {
                Effect::FetchListing { generation, .. } => {
                    assert_eq!(generation, expected);
                }
                other => panic!("unexpected effect {other:?}"),
            }
            assert_eq!(next.generation_index(), index);
            assert_eq!(next.generation(), expected);

            let (next, effect) = next.apply(Event::SelectGeneration(index));
            assert_eq!(effect, Effect::None);
            pokedex = next;
        }
    }

    #[test]
    fn unknown_generation_is_ignored() {
        let (pokedex, _) = Pokedex::start();
        let (pokedex, effect) = pokedex.apply(Event::SelectGeneration(9));

        assert_eq!(effect, Effect::None);
        assert_eq!(pokedex.generation_index(), 0);
    }

    #[test]
    fn second_generation_shows_every_card_in_order() {
        let (pokedex, _) = Pokedex::start();
        let (pokedex, effect) = pokedex.apply(Event::SelectGeneration(1));

        let ticket = match effect {
            Effect::FetchListing { ticket, generation } => {
                assert_eq!((generation.offset, generation.limit), (151, 100));
                ticket
            }
            other => panic!("unexpected effect {other:?}"),
        };

        let items: Vec<ListingItem> = (152..252)
            .map(|id| pokemon(id, &format!("pokemon-{id}")))
            .collect();
        let (pokedex, effect) = pokedex.apply(Event::ListingLoaded {
            ticket,
            items: items.clone(),
        });

        assert_eq!(pokedex.listing().len(), 100);
        assert_eq!(pokedex.listing(), items.as_slice());
        assert_eq!(pokedex.listing()[0].id(), Some(152));
        assert!(!pokedex.is_loading_listing());
        match effect {
            Effect::FetchArtwork { items: requested, .. } => assert_eq!(requested, items),
            other => panic!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn stale_listing_is_discarded() {
        let (pokedex, first) = Pokedex::start();
        let (pokedex, second) = pokedex.apply(Event::SelectGeneration(2));

        let (pokedex, _) = pokedex.apply(Event::ListingLoaded {
            ticket: listing_ticket(&second),
            items: vec![pokemon(252, "treecko")],
        });
        let (pokedex, effect) = pokedex.apply(Event::ListingLoaded {
            ticket: listing_ticket(&first),
            items: vec![pokemon(1, "bulbasaur")],
        });

        assert_eq!(effect, Effect::None);
        assert_eq!(pokedex.listing(), &[pokemon(252, "treecko")]);
    }

    #[test]
    fn failed_listing_keeps_previous_cards() {
        let pokedex = loaded(vec![pokemon(1, "bulbasaur"), pokemon(4, "charmander")]);

        let (pokedex, effect) = pokedex.apply(Event::SelectGeneration(3));
        let ticket = listing_ticket(&effect);
        let (pokedex, effect) = pokedex.apply(Event::ListingFailed { ticket });

        assert_eq!(effect, Effect::None);
        assert!(!pokedex.is_loading_listing());
        assert_eq!(pokedex.listing().len(), 2);
    }

    #[test]
    fn artwork_of_an_old_listing_is_dropped() {
        let (pokedex, first) = Pokedex::start();
        let (pokedex, effect) = pokedex.apply(Event::ListingLoaded {
            ticket: listing_ticket(&first),
            items: vec![pokemon(1, "bulbasaur"), pokemon(4, "charmander")],
        });
        let old_ticket = artwork_ticket(&effect);
        let (pokedex, _) = pokedex.apply(Event::ArtworkLoaded {
            ticket: old_ticket,
            id: 1,
            image: empty_image(),
        });
        assert!(pokedex.artwork(1).is_some());

        let (pokedex, second) = pokedex.apply(Event::SelectGeneration(1));
        let (pokedex, effect) = pokedex.apply(Event::ListingLoaded {
            ticket: listing_ticket(&second),
            items: vec![pokemon(152, "chikorita")],
        });
        assert!(pokedex.artwork(1).is_none());
        assert_ne!(artwork_ticket(&effect), old_ticket);

        let (pokedex, _) = pokedex.apply(Event::ArtworkLoaded {
            ticket: old_ticket,
            id: 4,
            image: empty_image(),
        });
        assert!(pokedex.artwork(4).is_none());
    }

    #[test]
    fn failed_listing_keeps_receiving_artwork_of_the_shown_cards() {
        let (pokedex, first) = Pokedex::start();
        let (pokedex, effect) = pokedex.apply(Event::ListingLoaded {
            ticket: listing_ticket(&first),
            items: vec![pokemon(1, "bulbasaur"), pokemon(4, "charmander")],
        });
        let ticket = artwork_ticket(&effect);

        let (pokedex, second) = pokedex.apply(Event::SelectGeneration(2));
        let (pokedex, _) = pokedex.apply(Event::ArtworkLoaded {
            ticket,
            id: 1,
            image: empty_image(),
        });
        let (pokedex, _) = pokedex.apply(Event::ListingFailed {
            ticket: listing_ticket(&second),
        });
        let (pokedex, _) = pokedex.apply(Event::ArtworkLoaded {
            ticket,
            id: 4,
            image: empty_image(),
        });

        assert_eq!(pokedex.listing().len(), 2);
        assert!(pokedex.artwork(1).is_some());
        assert!(pokedex.artwork(4).is_some());
    }

    #[test]
    fn opening_a_card_requests_its_url() {
        let pikachu = pokemon(25, "pikachu");
        let pokedex = loaded(vec![pikachu.clone()]);

        let (pokedex, effect) = pokedex.apply(Event::OpenDetails(pikachu.clone()));

        match &effect {
            Effect::FetchDetails {
                resource_url,
                artwork_id,
                ..
            } => {
                assert_eq!(resource_url, "https://pokeapi.co/api/v2/pokemon/25/");
                assert_eq!(*artwork_id, Some(25));
            }
            other => panic!("unexpected effect {other:?}"),
        }
        assert_eq!(pokedex.details().selected(), Some(&pikachu));
        assert!(pokedex.details().details().is_none());

        let ticket = details_ticket(&effect);
        let (pokedex, effect) = pokedex.apply(Event::DetailsLoaded {
            ticket,
            details: details(&["electric"], 80),
        });

        let shown = pokedex.details().details().unwrap();
        assert_eq!(shown.types, vec![String::from("electric")]);
        assert!(shown.moves.len() <= 5);
        assert_eq!(
            effect,
            Effect::FetchTypeIcons {
                ticket,
                types: vec![String::from("electric")],
            }
        );
    }

    #[test]
    fn failed_details_keep_the_placeholder() {
        let pikachu = pokemon(25, "pikachu");
        let pokedex = loaded(vec![pikachu.clone()]);

        let (pokedex, effect) = pokedex.apply(Event::OpenDetails(pikachu.clone()));
        let ticket = details_ticket(&effect);
        let (pokedex, effect) = pokedex.apply(Event::DetailsFailed { ticket });

        assert_eq!(effect, Effect::None);
        assert!(matches!(pokedex.details(), DetailsState::Failed(_)));
        assert_eq!(pokedex.details().selected(), Some(&pikachu));
        assert!(pokedex.details().details().is_none());
    }

    #[test]
    fn closing_clears_selection_and_details() {
        let pikachu = pokemon(25, "pikachu");
        let pokedex = loaded(vec![pikachu.clone()]);

        let (pokedex, effect) = pokedex.apply(Event::OpenDetails(pikachu.clone()));
        let ticket = details_ticket(&effect);
        let (pokedex, _) = pokedex.apply(Event::DetailsLoaded {
            ticket,
            details: details(&["electric"], 3),
        });
        let (pokedex, _) = pokedex.apply(Event::TypeIconLoaded {
            ticket,
            type_name: String::from("electric"),
            image: empty_image(),
        });
        assert!(pokedex.type_icon("electric").is_some());

        let (pokedex, effect) = pokedex.apply(Event::CloseDetails);
        assert_eq!(effect, Effect::None);
        assert!(matches!(pokedex.details(), DetailsState::Closed));
        assert!(pokedex.details().selected().is_none());
        assert!(pokedex.type_icon("electric").is_none());

        // reopening shows the placeholder, not the previous record
        let (pokedex, _) = pokedex.apply(Event::OpenDetails(pikachu));
        assert!(matches!(pokedex.details(), DetailsState::Loading(_)));
        assert!(pokedex.details().details().is_none());
    }

    #[test]
    fn late_details_after_close_are_dropped() {
        let pikachu = pokemon(25, "pikachu");
        let pokedex = loaded(vec![pikachu.clone()]);

        let (pokedex, effect) = pokedex.apply(Event::OpenDetails(pikachu));
        let ticket = details_ticket(&effect);
        let (pokedex, _) = pokedex.apply(Event::CloseDetails);
        let (pokedex, effect) = pokedex.apply(Event::DetailsLoaded {
            ticket,
            details: details(&["electric"], 3),
        });

        assert_eq!(effect, Effect::None);
        assert!(matches!(pokedex.details(), DetailsState::Closed));
    }

    #[test]
    fn details_of_a_previous_card_are_dropped() {
        let bulbasaur = pokemon(1, "bulbasaur");
        let pikachu = pokemon(25, "pikachu");
        let pokedex = loaded(vec![bulbasaur.clone(), pikachu.clone()]);

        let (pokedex, first) = pokedex.apply(Event::OpenDetails(bulbasaur));
        let (pokedex, second) = pokedex.apply(Event::OpenDetails(pikachu.clone()));

        let (pokedex, effect) = pokedex.apply(Event::DetailsLoaded {
            ticket: details_ticket(&first),
            details: details(&["grass", "poison"], 5),
        });
        assert_eq!(effect, Effect::None);
        assert!(matches!(pokedex.details(), DetailsState::Loading(_)));

        let (pokedex, _) = pokedex.apply(Event::DetailsLoaded {
            ticket: details_ticket(&second),
            details: details(&["electric"], 5),
        });
        assert_eq!(pokedex.details().selected(), Some(&pikachu));
        assert_eq!(
            pokedex.details().details().map(|d| d.types.clone()),
            Some(vec![String::from("electric")])
        );
    }

    #[test]
    fn changing_generation_keeps_the_open_details() {
        let pikachu = pokemon(25, "pikachu");
        let pokedex = loaded(vec![pikachu.clone()]);

        let (pokedex, _) = pokedex.apply(Event::OpenDetails(pikachu.clone()));
        let (pokedex, _) = pokedex.apply(Event::SelectGeneration(1));

        assert_eq!(pokedex.details().selected(), Some(&pikachu));
    }

    #[test]
    fn details_artwork_survives_a_new_listing() {
        let pikachu = pokemon(25, "pikachu");
        let (pokedex, first) = Pokedex::start();
        let (pokedex, effect) = pokedex.apply(Event::ListingLoaded {
            ticket: listing_ticket(&first),
            items: vec![pikachu.clone()],
        });
        let (pokedex, _) = pokedex.apply(Event::ArtworkLoaded {
            ticket: artwork_ticket(&effect),
            id: 25,
            image: empty_image(),
        });

        let (pokedex, effect) = pokedex.apply(Event::OpenDetails(pikachu.clone()));
        match effect {
            Effect::FetchDetails { artwork_id, .. } => assert_eq!(artwork_id, None),
            other => panic!("unexpected effect {other:?}"),
        }
        assert!(pokedex.details_artwork().is_some());

        let (pokedex, second) = pokedex.apply(Event::SelectGeneration(1));
        let (pokedex, _) = pokedex.apply(Event::ListingLoaded {
            ticket: listing_ticket(&second),
            items: vec![pokemon(152, "chikorita")],
        });

        assert_eq!(pokedex.details().selected(), Some(&pikachu));
        assert!(pokedex.artwork(25).is_none());
        assert!(pokedex.details_artwork().is_some());
    }

    #[test]
    fn details_request_their_own_artwork_when_the_card_has_none() {
        let pikachu = pokemon(25, "pikachu");
        let pokedex = loaded(vec![pikachu.clone()]);

        // card artwork failed, then the listing moves on
        let (pokedex, second) = pokedex.apply(Event::SelectGeneration(1));
        let (pokedex, effect) = pokedex.apply(Event::OpenDetails(pikachu));
        let ticket = details_ticket(&effect);
        assert!(matches!(
            effect,
            Effect::FetchDetails {
                artwork_id: Some(25),
                ..
            }
        ));

        let (pokedex, _) = pokedex.apply(Event::ListingLoaded {
            ticket: listing_ticket(&second),
            items: vec![pokemon(152, "chikorita")],
        });
        let (pokedex, _) = pokedex.apply(Event::DetailsArtworkLoaded {
            ticket,
            image: empty_image(),
        });
        assert!(pokedex.details_artwork().is_some());

        let (pokedex, _) = pokedex.apply(Event::CloseDetails);
        assert!(pokedex.details_artwork().is_none());

        // a late artwork of the closed page is dropped
        let (pokedex, _) = pokedex.apply(Event::DetailsArtworkLoaded {
            ticket,
            image: empty_image(),
        });
        assert!(pokedex.details_artwork().is_none());
    }
}
