//! Native point map application.
//!
//! The configuration is read from the JSON file named by the `POINTMAP_CONFIG` environment
//! variable, if set.

use pointmap::{MapComponent, MapConfig, PointMapError};

fn main() -> Result<(), PointMapError> {
    let config = MapConfig::from_env()?;
    pointmap::run(MapComponent::new(config))
}
