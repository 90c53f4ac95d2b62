use crate::bounds::scale_to_resolution;
use crate::data::LonLat;
use crate::widget::{MapWidget, WidgetContext, WidgetKind};

/// Returns the map to the extent of the points.
#[derive(Debug, Default)]
pub struct HomeWidget {}

impl MapWidget for HomeWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Home
    }

    fn show(&mut self, ui: &mut egui::Ui, cx: &mut WidgetContext<'_>) {
        let enabled = cx.home.is_some();
        let response = ui
            .add_enabled(enabled, egui::Button::new("🏠"))
            .on_hover_text("Default map view");

        if response.clicked() {
            if let Some(home) = cx.home.cloned() {
                let home = home.with_size(cx.map.view().size());
                cx.go_to(home);
            }
        }
    }
}

/// Shows the rotation of the map and resets it to north.
#[derive(Debug, Default)]
pub struct CompassWidget {}

impl MapWidget for CompassWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Compass
    }

    fn show(&mut self, ui: &mut egui::Ui, cx: &mut WidgetContext<'_>) {
        let view = cx.map.view().clone();
        let heading = view.rotation_z().to_degrees().rem_euclid(360.0);
        let response = ui
            .button(format!("⬆ {heading:.0}°"))
            .on_hover_text("Reset to north");

        if response.clicked() {
            cx.go_to(view.with_rotation(0.0, 0.0));
        }
    }
}

/// Zooms to the device location.
#[derive(Debug)]
pub struct LocateWidget {
    position: Option<LonLat>,
    scale: f64,
}

impl LocateWidget {
    /// Creates the widget. Without a position the button is disabled.
    pub fn new(position: Option<LonLat>, scale: f64) -> Self {
        Self { position, scale }
    }

    /// Resolution the widget zooms to.
    pub fn target_resolution(&self) -> Option<f64> {
        self.position
            .map(|position| scale_to_resolution(self.scale, position.lat()))
    }
}

impl MapWidget for LocateWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Locate
    }

    fn show(&mut self, ui: &mut egui::Ui, cx: &mut WidgetContext<'_>) {
        let hover = if self.position.is_some() {
            "Find my location"
        } else {
            "Location is not available"
        };

        let response = ui
            .add_enabled(self.position.is_some(), egui::Button::new("◎"))
            .on_hover_text(hover);

        if response.clicked() {
            if let (Some(position), Some(resolution)) = (self.position, self.target_resolution()) {
                log::debug!(
                    "Locating at {}, {} (1:{})",
                    position.lat(),
                    position.lon(),
                    self.scale
                );
                cx.go_to_position(&position, resolution);
            }
        }
    }
}
