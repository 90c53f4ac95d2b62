//! Basemaps the user can choose from in the gallery.

use galileo::layer::raster_tile_layer::RasterTileLayerBuilder;
use galileo::layer::RasterTileLayer;
use galileo::tile_schema::TileIndex;
use galileo::Map;
use serde::{Deserialize, Serialize};

use crate::error::PointMapError;

/// Raster basemaps. The map holds one layer per variant, in [`Basemap::ALL`] order, at the bottom
/// of its layer stack. Only the selected one is visible.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Basemap {
    /// Standard OpenStreetMap rendering.
    #[default]
    OpenStreetMap,
    /// Topographic map with contour lines.
    OpenTopoMap,
    /// Light grey canvas.
    CartoLight,
    /// Dark grey canvas.
    CartoDark,
}

impl Basemap {
    /// Every basemap, in layer order.
    pub const ALL: [Basemap; 4] = [
        Basemap::OpenStreetMap,
        Basemap::OpenTopoMap,
        Basemap::CartoLight,
        Basemap::CartoDark,
    ];

    /// Title shown in the gallery.
    pub fn title(&self) -> &'static str {
        match self {
            Basemap::OpenStreetMap => "OpenStreetMap",
            Basemap::OpenTopoMap => "Topographic",
            Basemap::CartoLight => "Light gray canvas",
            Basemap::CartoDark => "Dark gray canvas",
        }
    }

    /// Index of the basemap layer in the map's layer collection.
    pub fn layer_index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|basemap| basemap == self)
            .unwrap_or_default()
    }

    /// URL of a tile.
    pub fn tile_url(&self, z: u32, x: i32, y: i32) -> String {
        match self {
            Basemap::OpenStreetMap => format!("https://tile.openstreetmap.org/{z}/{x}/{y}.png"),
            Basemap::OpenTopoMap => format!("https://a.tile.opentopomap.org/{z}/{x}/{y}.png"),
            Basemap::CartoLight => {
                format!("https://a.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png")
            }
            Basemap::CartoDark => {
                format!("https://a.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}.png")
            }
        }
    }
}

/// Creates the raster tile layer of a basemap.
pub fn basemap_layer(
    basemap: Basemap,
    cache_dir: Option<&str>,
) -> Result<RasterTileLayer, PointMapError> {
    let builder = RasterTileLayerBuilder::new_rest(move |index: &TileIndex| {
        basemap.tile_url(index.z, index.x, index.y)
    });

    let builder = match cache_dir {
        Some(dir) => builder.with_file_cache_checked(dir),
        None => builder,
    };

    Ok(builder.build()?)
}

/// Makes `basemap` the only visible basemap layer of the map.
pub fn show_basemap(map: &mut Map, basemap: Basemap) {
    let layers = map.layers_mut();
    if layers.len() < Basemap::ALL.len() {
        log::warn!("Map has no basemap layers, cannot show {}", basemap.title());
        return;
    }

    for candidate in Basemap::ALL {
        if candidate == basemap {
            layers.show(candidate.layer_index());
        } else {
            layers.hide(candidate.layer_index());
        }
    }

    map.redraw();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_order_matches_catalogue() {
        for (index, basemap) in Basemap::ALL.iter().enumerate() {
            assert_eq!(basemap.layer_index(), index);
        }
    }

    #[test]
    fn tile_urls() {
        assert_eq!(
            Basemap::OpenStreetMap.tile_url(3, 4, 5),
            "https://tile.openstreetmap.org/3/4/5.png"
        );
        assert_eq!(
            Basemap::CartoDark.tile_url(1, 0, 1),
            "https://a.basemaps.cartocdn.com/dark_all/1/0/1.png"
        );
    }

    #[test]
    fn config_names() {
        let basemap: Basemap = serde_json::from_str("\"carto-light\"").expect("known basemap");
        assert_eq!(basemap, Basemap::CartoLight);
    }
}
