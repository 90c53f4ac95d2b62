use galileo_egui::EguiMap;

use super::{LifecycleState, MapComponent};
use crate::widget::{UiPosition, WidgetContext};

const WIDGET_MARGIN: f32 = 10.0;
const TOGGLE_MARGIN: f32 = 16.0;

impl MapComponent {
    /// Draws the component and advances its initialization.
    pub fn show(&mut self, ctx: &egui::Context) {
        self.poll();

        egui::TopBottomPanel::top("pointmap_title").show(ctx, |ui| {
            ui.heading(&self.config.title);
        });

        egui::CentralPanel::default().show(ctx, |ui| match &self.state {
            LifecycleState::Failed(message) => {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(
                        ui.visuals().error_fg_color,
                        format!("Failed to load the map: {message}"),
                    );
                });
            }
            _ => {
                if let Some(state) = self.view.as_mut().and_then(|view| view.egui_state_mut()) {
                    EguiMap::new(state).show_ui(ui);
                }
            }
        });

        match self.state {
            LifecycleState::Initializing(_) => {
                self.show_loading(ctx);
                ctx.request_repaint();
            }
            LifecycleState::Ready => {
                self.show_widgets(ctx);
                self.show_popup(ctx);
                self.show_toggles(ctx);
            }
            _ => {}
        }
    }

    fn show_loading(&self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("pointmap_loading"))
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading map…");
                    });
                });
            });
    }

    fn show_widgets(&mut self, ctx: &egui::Context) {
        let (pointer, clicks) = {
            let mut interaction = self.interaction.lock();
            (interaction.pointer(), interaction.take_clicks())
        };

        let Some(view) = self.view.as_mut() else {
            return;
        };

        for position in UiPosition::ALL {
            let placed: Vec<_> = view.ui().at(position).collect();
            if placed.is_empty() {
                continue;
            }

            let Some(map) = view.map_mut() else {
                return;
            };
            let mut cx = WidgetContext {
                map,
                points: &self.points,
                home: self.home.as_ref(),
                pointer,
                clicks: &clicks,
                config: &self.config,
            };

            egui::Area::new(egui::Id::new(("pointmap_widgets", position)))
                .anchor(position.align(), position.offset(WIDGET_MARGIN))
                .show(ctx, |ui| {
                    for kind in placed {
                        let Some(widget) = self.widgets.get_mut(kind) else {
                            continue;
                        };

                        egui::Frame::popup(ui.style()).show(ui, |ui| {
                            widget.show(ui, &mut cx);
                        });
                    }
                });
        }
    }

    fn show_popup(&mut self, ctx: &egui::Context) {
        let mut interaction = self.interaction.lock();
        let Some(popup) = interaction.popup().cloned() else {
            return;
        };

        let mut open = true;
        egui::Window::new(&popup.title)
            .id(egui::Id::new("pointmap_popup"))
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(&popup.body);
            });

        if !open {
            interaction.close_popup();
        }
    }

    fn show_toggles(&mut self, ctx: &egui::Context) {
        let mut toggle_tools = false;
        let mut toggle_basemap = false;

        egui::Area::new(egui::Id::new("pointmap_toggles"))
            .anchor(
                egui::Align2::RIGHT_CENTER,
                egui::vec2(-TOGGLE_MARGIN, 0.0),
            )
            .show(ctx, |ui| {
                let tools_hover = if self.tools_open {
                    "Hide measurement and sketch tools"
                } else {
                    "Show measurement and sketch tools"
                };
                toggle_tools = ui
                    .add(egui::Button::new("🛠").selected(self.tools_open))
                    .on_hover_text(tools_hover)
                    .clicked();

                let basemap_hover = if self.basemap_open {
                    "Hide basemap gallery"
                } else {
                    "Show basemap gallery"
                };
                toggle_basemap = ui
                    .add(egui::Button::new("🗺").selected(self.basemap_open))
                    .on_hover_text(basemap_hover)
                    .clicked();
            });

        if toggle_tools {
            self.toggle_tools();
        }

        if toggle_basemap {
            self.toggle_basemap();
        }
    }
}
