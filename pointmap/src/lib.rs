//! Pointmap shows a set of point records on an interactive map.
//!
//! The map is a [`galileo`] map rendered with `egui`. Over it sit ten widgets: home, compass,
//! locate, search, scale bar, fullscreen, basemap gallery, coordinate conversion, measurement and
//! sketch. Seven of them are placed by default. The measurement and sketch tools and the basemap
//! gallery are opened with two floating buttons.
//!
//! The [`MapComponent`] drives the whole thing. Mounting it builds the map, the graphics layer with a
//! marker per valid point, the view and the widgets. Once the view is laid out the map moves to
//! the bounding box of the points. Unmounting destroys every widget and the view exactly once.
//!
//! ```no_run
//! use pointmap::{MapComponent, MapConfig};
//!
//! let component = MapComponent::new(MapConfig::default().with_title("Cairo"))
//!     .with_on_map_click(|button, event| {
//!         log::info!("{button:?} click at {:?}", event.screen_pointer_position)
//!     });
//!
//! pointmap::run(component).unwrap();
//! ```

pub mod basemap;
pub mod bounds;
pub mod component;
pub mod config;
pub mod data;
pub mod error;
pub mod factory;
pub mod interaction;
pub mod layer;
pub mod view;
pub mod widget;

#[cfg(feature = "init")]
mod init;

pub use basemap::Basemap;
pub use bounds::{compute_bounds, BoundingBox};
pub use component::{InitStage, LifecycleState, MapComponent};
pub use config::MapConfig;
pub use data::{load_points, LonLat, PointId, PointRecord};
pub use error::PointMapError;
#[cfg(feature = "init")]
pub use init::PointMapApp;
#[cfg(all(feature = "init", not(target_arch = "wasm32")))]
pub use init::run;
#[cfg(all(feature = "init", target_arch = "wasm32"))]
pub use init::start_web;
pub use interaction::Liveness;
pub use layer::GraphicsLayer;
pub use view::View;
pub use widget::{MapWidget, UiPosition, WidgetKind, WidgetSet};
