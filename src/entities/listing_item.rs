// SPDX-License-Identifier: GPL-3.0-only

use std::fmt::Debug;

/// Position of the numeric id when splitting a PokéApi resource url on `/`
/// (`https:` `""` `pokeapi.co` `api` `v2` `pokemon` `25` `""`)
const ID_SEGMENT: usize = 6;

/// Lightweight reference to a Pokémon as returned by the listing endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub name: String,
    pub resource_url: String,
    id: Option<i64>,
}

impl Debug for ListingItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingItem")
            .field("name", &self.name)
            .field("id", &self.id)
            .finish()
    }
}

impl ListingItem {
    pub fn new(name: impl Into<String>, resource_url: impl Into<String>) -> Self {
        let resource_url = resource_url.into();
        let id = parse_resource_id(&resource_url);

        Self {
            name: name.into(),
            resource_url,
            id,
        }
    }

    /// Numeric id taken from the resource url, if it has one
    pub fn id(&self) -> Option<i64> {
        self.id
    }
}

/// Extracts the numeric Pokémon id from a PokéApi resource url
pub fn parse_resource_id(url: &str) -> Option<i64> {
    url.split('/').nth(ID_SEGMENT)?.parse().ok()
}
