use crate::bounds::unproject;
use crate::data::LonLat;
use crate::error::PointMapError;
use crate::widget::{MapWidget, WidgetContext, WidgetKind};

const EARTH_MEAN_RADIUS: f64 = 6_371_008.8;

/// Great circle distance between two positions in meters.
pub fn haversine_distance(a: &LonLat, b: &LonLat) -> f64 {
    let (lat_a, lat_b) = (a.lat().to_radians(), b.lat().to_radians());
    let d_lat = lat_b - lat_a;
    let d_lon = (b.lon() - a.lon()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_MEAN_RADIUS * h.sqrt().min(1.0).asin()
}

/// Distance in meters, or kilometers from one kilometer on.
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{meters:.1} m")
    }
}

/// Measures the length of a path clicked on the map.
#[derive(Debug, Default)]
pub struct MeasurementWidget {
    active: bool,
    vertices: Vec<LonLat>,
}

impl MeasurementWidget {
    /// Vertices of the measured path.
    pub fn vertices(&self) -> &[LonLat] {
        &self.vertices
    }

    /// Length of the measured path in meters.
    pub fn length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|pair| haversine_distance(&pair[0], &pair[1]))
            .sum()
    }

    fn start(&mut self) {
        self.active = true;
        self.vertices.clear();
    }
}

impl MapWidget for MeasurementWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Measurement
    }

    fn show(&mut self, ui: &mut egui::Ui, cx: &mut WidgetContext<'_>) {
        if self.active {
            self.vertices
                .extend(cx.clicks.iter().filter_map(|click| unproject(click).ok()));
        }

        ui.strong("Distance");
        if self.active {
            if self.vertices.len() < 2 {
                ui.weak("Click on the map to add points");
            } else {
                ui.label(format!("Segments: {}", self.vertices.len() - 1));
                ui.label(format_distance(self.length()));
            }
        } else {
            ui.weak("Start a measurement to add points");
        }

        ui.horizontal(|ui| {
            if ui.button("New measurement").clicked() {
                log::debug!("Starting a new measurement");
                self.start();
            }

            if self.active && ui.button("Done").clicked() {
                self.active = false;
            }
        });
    }

    fn destroy(&mut self) -> Result<(), PointMapError> {
        self.active = false;
        self.vertices.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn lon_lat(lon: f64, lat: f64) -> LonLat {
        LonLat::new(lon, lat).expect("finite")
    }

    #[test]
    fn one_degree_on_equator() {
        assert_relative_eq!(
            haversine_distance(&lon_lat(0.0, 0.0), &lon_lat(1.0, 0.0)),
            111_195.08,
            epsilon = 0.01
        );
    }

    #[test]
    fn zero_distance() {
        let point = lon_lat(31.2, 30.0);
        assert_eq!(haversine_distance(&point, &point), 0.0);
    }

    #[test]
    fn path_length() {
        let mut widget = MeasurementWidget::default();
        widget.start();
        widget.vertices = vec![lon_lat(0.0, 0.0), lon_lat(1.0, 0.0), lon_lat(2.0, 0.0)];
        assert_relative_eq!(widget.length(), 2.0 * 111_195.08, epsilon = 0.02);
    }

    #[test]
    fn distance_text() {
        assert_eq!(format_distance(12.345), "12.3 m");
        assert_eq!(format_distance(2500.0), "2.50 km");
    }
}
