//! Map configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::basemap::Basemap;
use crate::data::LonLat;
use crate::error::PointMapError;

/// Environment variable holding the path of a JSON configuration file.
pub const CONFIG_ENV: &str = "POINTMAP_CONFIG";

/// Id of the element the map is bound to when none is configured.
pub const DEFAULT_CONTAINER: &str = "viewDiv";

/// Configuration of the map component.
///
/// Every field has a default, so a configuration file only needs the values it changes:
///
/// ```
/// use pointmap::MapConfig;
///
/// let config = MapConfig::from_json(r#"{ "title": "Depots", "locate_scale": 2000 }"#).unwrap();
/// assert_eq!(config.title, "Depots");
/// assert_eq!(config.container, "viewDiv");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Text of the title bar.
    pub title: String,
    /// Id of the element hosting the map. On the web this is the id of the canvas.
    pub container: String,
    /// `[lat, lon]` of the map before it is fitted to the points.
    pub initial_center: [f64; 2],
    /// Z-level of the map before it is fitted to the points.
    pub initial_z_level: u32,
    /// Basemap visible on start.
    pub basemap: Basemap,
    /// Directory for the tile cache. Ignored on the web.
    pub tile_cache: Option<String>,
    /// Duration of the "go to" animations, in milliseconds.
    pub animation_ms: u64,
    /// Free space around the points when fitting the view, in pixels.
    pub fit_padding: f64,
    /// Smallest resolution the view is fitted to, in meters per pixel.
    pub min_fit_resolution: f64,
    /// `[lat, lon]` used by the locate widget. The widget is disabled without it.
    pub locate_position: Option<[f64; 2]>,
    /// Scale the locate widget zooms to.
    pub locate_scale: f64,
    /// Scale the search widget zooms to.
    pub search_scale: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            title: "Points of interest".to_string(),
            container: DEFAULT_CONTAINER.to_string(),
            initial_center: [0.0, 0.0],
            initial_z_level: 2,
            basemap: Basemap::default(),
            tile_cache: Some(".tile_cache".to_string()),
            animation_ms: 1000,
            fit_padding: 40.0,
            min_fit_resolution: 1.0,
            locate_position: None,
            locate_scale: 1500.0,
            search_scale: 2500.0,
        }
    }
}

impl MapConfig {
    /// Parses a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, PointMapError> {
        serde_json::from_str(json).map_err(|err| PointMapError::Config(err.to_string()))
    }

    /// Reads the file named by [`CONFIG_ENV`]. Without the variable the defaults are used.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, PointMapError> {
        let Ok(path) = std::env::var(CONFIG_ENV) else {
            return Ok(Self::default());
        };

        log::info!("Reading configuration from {path}");
        let json = std::fs::read_to_string(&path)
            .map_err(|err| PointMapError::Config(format!("cannot read {path}: {err}")))?;
        Self::from_json(&json)
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the container id.
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
        self
    }

    /// Sets the basemap visible on start.
    pub fn with_basemap(mut self, basemap: Basemap) -> Self {
        self.basemap = basemap;
        self
    }

    /// Sets the tile cache directory.
    pub fn with_tile_cache(mut self, tile_cache: Option<String>) -> Self {
        self.tile_cache = tile_cache;
        self
    }

    /// Sets the animation duration.
    pub fn with_animation(mut self, duration: Duration) -> Self {
        self.animation_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the location used by the locate widget.
    pub fn with_locate_position(mut self, lat: f64, lon: f64) -> Self {
        self.locate_position = Some([lat, lon]);
        self
    }

    /// Duration of the "go to" animations.
    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    /// Location used by the locate widget, if configured and valid.
    pub fn locate(&self) -> Option<LonLat> {
        let [lat, lon] = self.locate_position?;
        LonLat::new(lon, lat).ok()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = MapConfig::from_json(r#"{ "basemap": "open-topo-map", "animation_ms": 0 }"#)
            .expect("valid config");
        assert_eq!(config.basemap, Basemap::OpenTopoMap);
        assert_eq!(config.animation(), Duration::ZERO);
        assert_eq!(config.locate_scale, 1500.0);
        assert_eq!(config.container, DEFAULT_CONTAINER);
    }

    #[test]
    fn animation_duration_saturates() {
        let config = MapConfig::default().with_animation(Duration::MAX);
        assert_eq!(config.animation_ms, u64::MAX);

        let config = MapConfig::default().with_animation(Duration::from_millis(250));
        assert_eq!(config.animation(), Duration::from_millis(250));
    }

    #[test]
    fn invalid_file() {
        assert_matches!(
            MapConfig::from_json(r#"{ "fit_padding": "wide" }"#),
            Err(PointMapError::Config(_))
        );
    }

    #[test]
    fn locate_position() {
        assert!(MapConfig::default().locate().is_none());

        let config = MapConfig::default().with_locate_position(30.0, 31.0);
        let position = config.locate().expect("configured");
        assert_eq!(position.lat(), 30.0);
        assert_eq!(position.lon(), 31.0);
    }
}
