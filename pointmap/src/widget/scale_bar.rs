use galileo_types::geo::GeoPoint;

use crate::bounds::ground_resolution;
use crate::widget::{MapWidget, WidgetContext, WidgetKind};

const MAX_BAR_WIDTH: f64 = 100.0;
const METERS_PER_FOOT: f64 = 0.3048;
const FEET_PER_MILE: f64 = 5280.0;

/// Units of the scale bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleUnit {
    /// Meters and kilometers.
    Metric,
    /// Feet and miles.
    Imperial,
}

/// A scale bar of a round length.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBarLength {
    /// Width of the bar in pixels.
    pub pixels: f64,
    /// Text under the bar.
    pub label: String,
}

/// Largest number of the form 1, 2 or 5 × 10ⁿ not greater than `value`.
fn round_down(value: f64) -> f64 {
    let magnitude = 10f64.powf(value.log10().floor());
    let leading = value / magnitude;
    let step = if leading >= 5.0 {
        5.0
    } else if leading >= 2.0 {
        2.0
    } else {
        1.0
    };

    step * magnitude
}

/// Metric scale bar not wider than `max_pixels` for a ground resolution in meters per pixel.
pub fn metric_scale_bar(meters_per_pixel: f64, max_pixels: f64) -> Option<ScaleBarLength> {
    if !(meters_per_pixel.is_finite() && meters_per_pixel > 0.0 && max_pixels > 0.0) {
        return None;
    }

    let meters = round_down(meters_per_pixel * max_pixels);
    let label = if meters >= 1000.0 {
        format!("{} km", meters / 1000.0)
    } else {
        format!("{meters} m")
    };

    Some(ScaleBarLength {
        pixels: meters / meters_per_pixel,
        label,
    })
}

fn imperial_scale_bar(meters_per_pixel: f64, max_pixels: f64) -> Option<ScaleBarLength> {
    if !(meters_per_pixel.is_finite() && meters_per_pixel > 0.0 && max_pixels > 0.0) {
        return None;
    }

    let feet_per_pixel = meters_per_pixel / METERS_PER_FOOT;
    let max_feet = feet_per_pixel * max_pixels;
    if max_feet >= FEET_PER_MILE {
        let miles = round_down(max_feet / FEET_PER_MILE);
        Some(ScaleBarLength {
            pixels: miles * FEET_PER_MILE / feet_per_pixel,
            label: format!("{miles} mi"),
        })
    } else {
        let feet = round_down(max_feet);
        Some(ScaleBarLength {
            pixels: feet / feet_per_pixel,
            label: format!("{feet} ft"),
        })
    }
}

/// Shows the scale at the center of the map.
#[derive(Debug)]
pub struct ScaleBarWidget {
    unit: ScaleUnit,
}

impl ScaleBarWidget {
    /// Creates a scale bar with the given units.
    pub fn new(unit: ScaleUnit) -> Self {
        Self { unit }
    }

    /// Units of the bar.
    pub fn unit(&self) -> ScaleUnit {
        self.unit
    }
}

impl MapWidget for ScaleBarWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::ScaleBar
    }

    fn show(&mut self, ui: &mut egui::Ui, cx: &mut WidgetContext<'_>) {
        let view = cx.map.view();
        let lat = view.position().map(|p| p.lat()).unwrap_or_default();
        let meters_per_pixel = ground_resolution(view.resolution(), lat);

        let bar = match self.unit {
            ScaleUnit::Metric => metric_scale_bar(meters_per_pixel, MAX_BAR_WIDTH),
            ScaleUnit::Imperial => imperial_scale_bar(meters_per_pixel, MAX_BAR_WIDTH),
        };
        let Some(bar) = bar else {
            return;
        };

        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(bar.pixels as f32, 6.0),
            egui::Sense::hover(),
        );
        let stroke = egui::Stroke::new(2.0, ui.visuals().text_color());
        let painter = ui.painter();
        painter.line_segment([rect.left_bottom(), rect.right_bottom()], stroke);
        painter.line_segment([rect.left_top(), rect.left_bottom()], stroke);
        painter.line_segment([rect.right_top(), rect.right_bottom()], stroke);
        ui.label(bar.label);
    }
}
