// SPDX-License-Identifier: GPL-3.0-only

use serde::Deserialize;

/// Only the first moves of a Pokémon are shown in the details page
pub const MAX_MOVES: usize = 5;

/// Extended Pokémon data fetched when a card is selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokemonDetails {
    /// Type names in slot order
    pub types: Vec<String>,
    /// First [`MAX_MOVES`] move names, in PokéApi order
    pub moves: Vec<String>,
}

impl PokemonDetails {
    pub fn new(
        types: impl IntoIterator<Item = String>,
        moves: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            types: types.into_iter().collect(),
            moves: moves.into_iter().take(MAX_MOVES).collect(),
        }
    }

    /// Type in the first slot, the one the type icon is derived from
    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }
}

/// Subset of the PokéApi `pokemon` resource we decode
#[derive(Debug, Deserialize)]
pub struct PokemonResource {
    pub types: Vec<TypeSlot>,
    pub moves: Vec<MoveSlot>,
}

#[derive(Debug, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub type_: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct MoveSlot {
    #[serde(rename = "move")]
    pub move_: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

impl PokemonResource {
    pub fn into_details(self) -> PokemonDetails {
        PokemonDetails::new(
            self.types.into_iter().map(|slot| slot.type_.name),
            self.moves.into_iter().map(|slot| slot.move_.name),
        )
    }
}
