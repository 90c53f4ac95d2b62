use galileo_types::cartesian::CartesianPoint2d;

use crate::bounds::project;
use crate::data::LonLat;
use crate::widget::{MapWidget, WidgetContext, WidgetKind};

/// Notation of the coordinates shown by the widget.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateFormat {
    /// `30.04590°N 31.22430°E`
    #[default]
    DecimalDegrees,
    /// `30°02'45.24"N 31°13'27.48"E`
    DegreesMinutesSeconds,
    /// Web Mercator meters.
    WebMercator,
}

impl CoordinateFormat {
    const ALL: [CoordinateFormat; 3] = [
        CoordinateFormat::DecimalDegrees,
        CoordinateFormat::DegreesMinutesSeconds,
        CoordinateFormat::WebMercator,
    ];

    fn title(&self) -> &'static str {
        match self {
            CoordinateFormat::DecimalDegrees => "DD",
            CoordinateFormat::DegreesMinutesSeconds => "DMS",
            CoordinateFormat::WebMercator => "XY",
        }
    }

    /// Formats a position in this notation.
    pub fn format(&self, position: &LonLat) -> String {
        match self {
            CoordinateFormat::DecimalDegrees => format!(
                "{:.5}°{} {:.5}°{}",
                position.lat().abs(),
                hemisphere(position.lat(), 'N', 'S'),
                position.lon().abs(),
                hemisphere(position.lon(), 'E', 'W'),
            ),
            CoordinateFormat::DegreesMinutesSeconds => format!(
                "{}{} {}{}",
                format_dms(position.lat()),
                hemisphere(position.lat(), 'N', 'S'),
                format_dms(position.lon()),
                hemisphere(position.lon(), 'E', 'W'),
            ),
            CoordinateFormat::WebMercator => match project(position) {
                Ok(point) => format!("X {:.1} m  Y {:.1} m", point.x(), point.y()),
                Err(_) => "outside of the projection".to_string(),
            },
        }
    }
}

fn hemisphere(value: f64, positive: char, negative: char) -> char {
    if value < 0.0 {
        negative
    } else {
        positive
    }
}

/// Absolute value of an angle as degrees, minutes and seconds with two decimals.
pub fn format_dms(angle: f64) -> String {
    let total_hundredths = (angle.abs() * 360_000.0).round() as u64;
    let degrees = total_hundredths / 360_000;
    let minutes = total_hundredths % 360_000 / 6_000;
    let hundredths = total_hundredths % 6_000;
    format!(
        "{degrees}°{minutes:02}'{:02}.{:02}\"",
        hundredths / 100,
        hundredths % 100
    )
}

/// Shows the position under the pointer.
#[derive(Debug, Default)]
pub struct CoordinateConversionWidget {
    format: CoordinateFormat,
}

impl MapWidget for CoordinateConversionWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::CoordinateConversion
    }

    fn show(&mut self, ui: &mut egui::Ui, cx: &mut WidgetContext<'_>) {
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_salt("coordinate_format")
                .selected_text(self.format.title())
                .width(50.0)
                .show_ui(ui, |ui| {
                    for format in CoordinateFormat::ALL {
                        ui.selectable_value(&mut self.format, format, format.title());
                    }
                });

            match &cx.pointer {
                Some(position) => ui.monospace(self.format.format(position)),
                None => ui.weak("Move the pointer over the map"),
            };
        });
    }
}
