use crate::widget::{MapWidget, WidgetContext, WidgetKind};

/// Switches the window in and out of fullscreen mode.
#[derive(Debug, Default)]
pub struct FullscreenWidget {}

impl MapWidget for FullscreenWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Fullscreen
    }

    fn show(&mut self, ui: &mut egui::Ui, _cx: &mut WidgetContext<'_>) {
        let fullscreen = ui.input(|i| i.viewport().fullscreen.unwrap_or(false));
        let (label, hover) = if fullscreen {
            ("🗗", "Exit fullscreen")
        } else {
            ("⛶", "Enter fullscreen")
        };

        if ui.button(label).on_hover_text(hover).clicked() {
            log::debug!("Switching fullscreen to {}", !fullscreen);
            ui.ctx()
                .send_viewport_cmd(egui::ViewportCommand::Fullscreen(!fullscreen));
        }
    }
}
