use galileo::layer::FeatureId;
use galileo_types::cartesian::Point2;

use crate::error::PointMapError;
use crate::layer::{add_sketch, remove_sketches, select_sketch, sketch_at, GraphicsLayer};
use crate::widget::{MapWidget, WidgetContext, WidgetKind};

/// What happens to a graphic right after it is created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CreationMode {
    /// The new graphic is selected for editing.
    #[default]
    Update,
    /// The point tool stays active for the next graphic.
    Continuous,
}

/// Active tool of the sketch widget.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SketchTool {
    /// Map clicks are ignored.
    #[default]
    None,
    /// Map clicks add point graphics.
    Point,
    /// Map clicks select graphics.
    Select,
}

/// Draws point graphics on the graphics layer.
pub struct SketchWidget {
    layer: GraphicsLayer,
    mode: CreationMode,
    tool: SketchTool,
    sketches: Vec<(FeatureId, usize)>,
    selected: Option<(FeatureId, usize)>,
    next_number: usize,
}

impl SketchWidget {
    /// Creates the widget drawing on `layer`.
    pub fn new(layer: GraphicsLayer, mode: CreationMode) -> Self {
        Self {
            layer,
            mode,
            tool: SketchTool::None,
            sketches: vec![],
            selected: None,
            next_number: 1,
        }
    }

    /// Creation mode of the widget.
    pub fn mode(&self) -> CreationMode {
        self.mode
    }

    /// Active tool.
    pub fn tool(&self) -> SketchTool {
        self.tool
    }

    /// Changes the active tool.
    pub fn set_tool(&mut self, tool: SketchTool) {
        self.tool = tool;
    }

    /// Number of the selected graphic.
    pub fn selected(&self) -> Option<usize> {
        self.selected.map(|(_, number)| number)
    }

    /// Number of graphics drawn.
    pub fn len(&self) -> usize {
        self.sketches.len()
    }

    /// Returns true if nothing is drawn.
    pub fn is_empty(&self) -> bool {
        self.sketches.is_empty()
    }

    /// Applies a map click at a projected position, according to the active tool.
    pub fn click(&mut self, position: &Point2, resolution: f64) {
        match self.tool {
            SketchTool::None => {}
            SketchTool::Point => {
                let number = self.next_number;
                self.next_number += 1;
                let id = add_sketch(&self.layer, *position, number);
                self.sketches.push((id, number));
                log::debug!("Added sketch {number}");

                if self.mode == CreationMode::Update {
                    self.select(Some((id, number)));
                    self.tool = SketchTool::Select;
                }
            }
            SketchTool::Select => {
                let hit = sketch_at(&self.layer, position, resolution);
                self.select(hit);
            }
        }
    }

    /// Removes the selected graphic.
    pub fn delete_selected(&mut self) {
        if let Some((id, number)) = self.selected.take() {
            remove_sketches(&self.layer, &[id]);
            self.sketches.retain(|(sketch, _)| *sketch != id);
            log::debug!("Deleted sketch {number}");
        }
    }

    /// Removes every graphic drawn by the widget.
    pub fn clear(&mut self) {
        let ids: Vec<_> = self.sketches.drain(..).map(|(id, _)| id).collect();
        remove_sketches(&self.layer, &ids);
        self.selected = None;
    }

    fn select(&mut self, sketch: Option<(FeatureId, usize)>) {
        self.selected = sketch;
        select_sketch(&self.layer, self.selected());
    }
}

impl MapWidget for SketchWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Sketch
    }

    fn show(&mut self, ui: &mut egui::Ui, cx: &mut WidgetContext<'_>) {
        let resolution = cx.map.view().resolution();
        let mut changed = !cx.clicks.is_empty() && self.tool != SketchTool::None;
        for click in cx.clicks {
            self.click(click, resolution);
        }

        ui.strong("Sketch");
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.tool, SketchTool::Point, "● Point")
                .on_hover_text("Click on the map to add a point");
            ui.selectable_value(&mut self.tool, SketchTool::Select, "⬚ Select")
                .on_hover_text("Click on a graphic to select it");

            if ui
                .add_enabled(self.selected.is_some(), egui::Button::new("🗑"))
                .on_hover_text("Delete selected")
                .clicked()
            {
                self.delete_selected();
                changed = true;
            }

            if ui
                .add_enabled(!self.sketches.is_empty(), egui::Button::new("Clear"))
                .clicked()
            {
                self.clear();
                changed = true;
            }
        });

        match self.selected() {
            Some(number) => ui.label(format!("Sketch {number} selected")),
            None => ui.weak(format!("{} graphics", self.sketches.len())),
        };

        if changed {
            cx.map.redraw();
        }
    }

    fn destroy(&mut self) -> Result<(), PointMapError> {
        self.tool = SketchTool::None;
        self.select(None);
        Ok(())
    }
}
