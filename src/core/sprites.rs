// SPDX-License-Identifier: GPL-3.0-only

/// Resolves where the images shown next to PokéApi data live.
///
/// Artwork is addressed by the numeric Pokémon id and type icons by type name,
/// so the image hosts can be swapped without touching the rest of the app.
pub trait SpriteSource: Send + Sync {
    /// Url of the official artwork of the Pokémon with the given id
    fn artwork_url(&self, id: i64) -> String;

    /// Url of the icon for the given type name (`"electric"`, `"grass"`...)
    fn type_icon_url(&self, type_name: &str) -> String;
}

/// Official artwork from the PokéApi sprites repository and type icons from Serebii
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteSprites;

const ARTWORK_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";
const TYPE_ICON_BASE_URL: &str = "https://www.serebii.net/pokedex-bw/type";

impl SpriteSource for RemoteSprites {
    fn artwork_url(&self, id: i64) -> String {
        format!("{ARTWORK_BASE_URL}/{id}.png")
    }

    fn type_icon_url(&self, type_name: &str) -> String {
        format!("{TYPE_ICON_BASE_URL}/{type_name}.gif")
    }
}
