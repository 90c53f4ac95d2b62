//! Graphics layer holding the point markers and the user's sketches.

use std::sync::Arc;

use galileo::layer::feature_layer::symbol::Symbol;
use galileo::layer::feature_layer::{Feature, FeatureLayer};
use galileo::layer::FeatureId;
use galileo::render::point_paint::PointPaint;
use galileo::render::render_bundle::RenderBundle;
use galileo::Color;
use galileo_types::cartesian::{Point2, Point3};
use galileo_types::geo::Crs;
use galileo_types::geometry::Geom;
use galileo_types::geometry_type::CartesianSpace2d;
use parking_lot::RwLock;

use crate::bounds::project;
use crate::data::{LonLat, PointId, PointRecord};
use crate::error::PointMapError;

/// Marker diameter in pixels.
pub const MARKER_SIZE: f32 = 15.0;
/// Width of the marker outline in pixels.
pub const MARKER_OUTLINE_WIDTH: f32 = 2.0;
/// Fill of the data markers.
pub const MARKER_COLOR: Color = Color::RED;
/// Outline of every marker.
pub const MARKER_OUTLINE_COLOR: Color = Color::WHITE;

const SKETCH_COLOR: Color = Color::BLUE;
const SELECTED_SKETCH_COLOR: Color = Color::PURPLE;

/// Pixel radius around the pointer in which a click hits a marker.
pub const HIT_TOLERANCE_PX: f64 = 10.0;

/// Shared handle to the graphics layer. The map renders it, event handlers and widgets edit it.
pub type GraphicsLayer = Arc<RwLock<FeatureLayer<Point2, Marker, MarkerSymbol, CartesianSpace2d>>>;

/// What a marker was created from.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerSource {
    /// A record of the point data file.
    Point {
        /// Id of the record.
        id: PointId,
        /// Name of the record.
        name: String,
    },
    /// A graphic drawn with the sketch widget.
    Sketch {
        /// Sequence number of the sketch.
        number: usize,
        /// Sketch currently being edited.
        selected: bool,
    },
}

/// A marker on the graphics layer, positioned in Web Mercator meters.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Projected position.
    pub point: Point2,
    /// Where the marker comes from.
    pub source: MarkerSource,
}

impl Marker {
    /// Marker for a data point at its validated position.
    pub fn for_point(record: &PointRecord, position: &LonLat) -> Result<Self, PointMapError> {
        Ok(Self {
            point: project(position)?,
            source: MarkerSource::Point {
                id: record.id.clone(),
                name: record.name.clone(),
            },
        })
    }

    /// Marker for a sketched graphic.
    pub fn sketch(point: Point2, number: usize) -> Self {
        Self {
            point,
            source: MarkerSource::Sketch {
                number,
                selected: false,
            },
        }
    }

    /// Content of the popup shown when the marker is clicked.
    pub fn popup(&self) -> Popup {
        match &self.source {
            MarkerSource::Point { id, name } => Popup {
                title: name.clone(),
                body: format!("ID: {id}"),
            },
            MarkerSource::Sketch { number, .. } => Popup {
                title: format!("Sketch {number}"),
                body: "Graphic created with the sketch tool".to_string(),
            },
        }
    }

    /// Returns true for graphics drawn with the sketch widget.
    pub fn is_sketch(&self) -> bool {
        matches!(self.source, MarkerSource::Sketch { .. })
    }
}

/// Text shown for a clicked marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    /// Popup title.
    pub title: String,
    /// Popup content.
    pub body: String,
}

impl Feature for Marker {
    type Geom = Point2;

    fn geometry(&self) -> &Self::Geom {
        &self.point
    }
}

/// Red circle with a white outline for data points, blue for sketches.
pub struct MarkerSymbol {}

impl MarkerSymbol {
    /// Fill color of the marker.
    pub fn fill(&self, marker: &Marker) -> Color {
        match marker.source {
            MarkerSource::Point { .. } => MARKER_COLOR,
            MarkerSource::Sketch { selected: false, .. } => SKETCH_COLOR,
            MarkerSource::Sketch { selected: true, .. } => SELECTED_SKETCH_COLOR,
        }
    }

    fn paint(&self, marker: &Marker) -> PointPaint<'static> {
        PointPaint::circle(self.fill(marker), MARKER_SIZE)
            .with_outline(MARKER_OUTLINE_COLOR, MARKER_OUTLINE_WIDTH)
    }
}

impl Symbol<Marker> for MarkerSymbol {
    fn render(
        &self,
        feature: &Marker,
        geometry: &Geom<Point3>,
        min_resolution: f64,
        bundle: &mut RenderBundle,
    ) {
        if let Geom::Point(point) = geometry {
            bundle.add_point(point, &self.paint(feature), min_resolution);
        }
    }
}

/// One marker per record. Takes positions already checked by
/// [`valid_positions`](crate::data::valid_positions).
pub fn markers_for(located: &[(&PointRecord, LonLat)]) -> Vec<Marker> {
    located
        .iter()
        .filter_map(|(record, position)| match Marker::for_point(record, position) {
            Ok(marker) => Some(marker),
            Err(err) => {
                log::warn!("No marker for point '{}': {err}", record.name);
                None
            }
        })
        .collect()
}

/// Builds the graphics layer with a marker for each located record.
pub fn markers_layer(located: &[(&PointRecord, LonLat)]) -> GraphicsLayer {
    let markers = markers_for(located);

    log::debug!(
        "Created {} markers out of {} located points",
        markers.len(),
        located.len()
    );

    Arc::new(RwLock::new(FeatureLayer::new(
        markers,
        MarkerSymbol {},
        Crs::EPSG3857,
    )))
}

/// Popup of the topmost marker under `position`, if any.
pub fn popup_at(layer: &GraphicsLayer, position: &Point2, resolution: f64) -> Option<Popup> {
    let layer = layer.read();
    let popup = layer
        .get_features_at(position, resolution * HIT_TOLERANCE_PX)
        .last()
        .map(|(_, marker)| marker.popup());
    popup
}

/// Adds a sketch graphic and returns its id.
pub fn add_sketch(layer: &GraphicsLayer, point: Point2, number: usize) -> FeatureId {
    let mut layer = layer.write();
    let id = layer.features_mut().add(Marker::sketch(point, number));
    layer.update_feature(id);
    id
}

/// Marks the sketch with the given number as selected and every other sketch as not selected.
pub fn select_sketch(layer: &GraphicsLayer, selected_number: Option<usize>) {
    let mut layer = layer.write();
    for (_, marker) in layer.features_mut().iter_mut() {
        if let MarkerSource::Sketch { number, selected } = &mut marker.source {
            *selected = Some(*number) == selected_number;
        }
    }
    layer.update_all_features();
}

/// Id and number of the sketch graphic under `position`, if any.
pub fn sketch_at(
    layer: &GraphicsLayer,
    position: &Point2,
    resolution: f64,
) -> Option<(FeatureId, usize)> {
    let layer = layer.read();
    let found = layer
        .get_features_at(position, resolution * HIT_TOLERANCE_PX)
        .filter_map(|(id, marker)| match marker.source {
            MarkerSource::Sketch { number, .. } => Some((id, number)),
            MarkerSource::Point { .. } => None,
        })
        .last();
    found
}

/// Removes the given sketch graphics.
pub fn remove_sketches(layer: &GraphicsLayer, ids: &[FeatureId]) {
    let mut layer = layer.write();
    for id in ids {
        layer.features_mut().remove(*id);
        layer.update_feature(*id);
    }
}
