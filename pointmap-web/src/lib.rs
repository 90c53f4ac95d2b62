//! Browser entry point of the point map.
//!
//! The page must contain a `<canvas id="viewDiv">`, or a canvas with the id given in the
//! configuration passed to [`start_with_config`].

use pointmap::{MapComponent, MapConfig};
use wasm_bindgen::prelude::*;

/// Starts the map with the default configuration.
#[wasm_bindgen]
pub fn main() {
    start(MapConfig::default());
}

/// Starts the map with a JSON configuration.
#[wasm_bindgen]
pub fn start_with_config(config_json: &str) -> Result<(), JsValue> {
    let config =
        MapConfig::from_json(config_json).map_err(|err| JsValue::from_str(&err.to_string()))?;
    start(config);
    Ok(())
}

fn start(config: MapConfig) {
    console_error_panic_hook::set_once();

    // No file system in the browser.
    let component = MapComponent::new(config.with_tile_cache(None));

    #[cfg(target_arch = "wasm32")]
    pointmap::start_web(component);

    #[cfg(not(target_arch = "wasm32"))]
    {
        drop(component);
        log::warn!("The web entry point only runs in a browser");
    }
}
