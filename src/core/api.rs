// SPDX-License-Identifier: GPL-3.0-only

use std::{sync::Arc, time::Duration};

use anywho::{Error, anywho};
use futures::{Stream, StreamExt};
use rustemon::client::{
    CacheMode, CacheOptions, MokaManager, RustemonClient, RustemonClientBuilder,
};

use crate::{
    core::sprites::SpriteSource,
    entities::{Generation, ListingItem, PokemonDetails, PokemonResource},
};

/// Max amount of images downloaded at the same time
const IMAGE_DOWNLOADS: usize = 12;

/// Read-only access to PokéApi and the image hosts
#[derive(Clone)]
pub struct PokeApi {
    client: Arc<RustemonClient>,
    http: reqwest::Client,
    sprites: Arc<dyn SpriteSource>,
}

impl std::fmt::Debug for PokeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokeApi").finish_non_exhaustive()
    }
}

impl PokeApi {
    pub fn new(sprites: Arc<dyn SpriteSource>) -> Result<Self, Error> {
        // Every page is requested again, responses are never stored
        let client = RustemonClientBuilder::default()
            .with_manager(MokaManager::default())
            .with_mode(CacheMode::NoStore)
            .with_options(CacheOptions {
                shared: true,
                cache_heuristic: 0.1,
                immutable_min_time_to_live: Duration::from_secs(3600),
                ignore_cargo_cult: true,
            })
            .try_build()
            .map_err(|err| anywho!("Could not build the PokéApi client: {err:?}"))?;

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(IMAGE_DOWNLOADS)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            http,
            sprites,
        })
    }

    /// Fetches the names and resource urls of every Pokémon in the generation, in PokéApi order
    pub async fn fetch_generation(&self, generation: Generation) -> Result<Vec<ListingItem>, Error> {
        let page = rustemon::pokemon::pokemon::get_page_with_param(
            generation.offset,
            generation.limit,
            &self.client,
        )
        .await?;

        tracing::debug!(
            offset = generation.offset,
            limit = generation.limit,
            received = page.results.len(),
            "fetched Pokémon listing"
        );

        Ok(page
            .results
            .into_iter()
            .map(|entry| ListingItem::new(entry.name, entry.url))
            .collect())
    }

    /// Fetches the types and first moves of the Pokémon behind `resource_url`
    pub async fn fetch_details(&self, resource_url: &str) -> Result<PokemonDetails, Error> {
        let response = self.http.get(resource_url).send().await?;

        if !response.status().is_success() {
            return Err(anywho!(
                "Failed to fetch Pokémon details. Status: {}",
                response.status()
            ));
        }

        let resource: PokemonResource = response.json().await?;

        Ok(resource.into_details())
    }

    /// Downloads an image and returns its raw bytes
    pub async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, Error> {
        let response = self.http.get(image_url).send().await?;

        if response.status().is_success() {
            Ok(response.bytes().await?.to_vec())
        } else {
            Err(anywho!(
                "Failed to download image. Status: {}",
                response.status()
            ))
        }
    }

    pub async fn fetch_artwork(&self, id: i64) -> Result<Vec<u8>, Error> {
        self.fetch_image(&self.sprites.artwork_url(id)).await
    }

    /// Downloads the artwork of every listed Pokémon, yielding `(id, bytes)` as each one finishes.
    /// Items without an id and failed downloads are skipped.
    pub fn artwork(self, items: Vec<ListingItem>) -> impl Stream<Item = (i64, Vec<u8>)> + Send {
        futures::stream::iter(items.into_iter().filter_map(|item| item.id()))
            .map(move |id| {
                let api = self.clone();
                async move { (id, api.fetch_artwork(id).await) }
            })
            .buffer_unordered(IMAGE_DOWNLOADS)
            .filter_map(|(id, result)| async move {
                match result {
                    Ok(bytes) => Some((id, bytes)),
                    Err(err) => {
                        tracing::warn!(id, %err, "failed to download artwork");
                        None
                    }
                }
            })
    }

    /// Downloads the icon of every given type, yielding `(type name, bytes)`.
    /// Failed downloads are logged and skipped.
    pub fn type_icons(self, types: Vec<String>) -> impl Stream<Item = (String, Vec<u8>)> + Send {
        futures::stream::iter(types)
            .map(move |type_name| {
                let api = self.clone();
                async move {
                    let url = api.sprites.type_icon_url(&type_name);
                    let result = api.fetch_image(&url).await;
                    (type_name, result)
                }
            })
            .buffer_unordered(IMAGE_DOWNLOADS)
            .filter_map(|(type_name, result)| async move {
                match result {
                    Ok(bytes) => Some((type_name, bytes)),
                    Err(err) => {
                        tracing::warn!(type_name = %type_name, %err, "failed to download type icon");
                        None
                    }
                }
            })
    }
}
