use crate::bounds::scale_to_resolution;
use crate::data::{LonLat, PointRecord};
use crate::widget::{MapWidget, WidgetContext, WidgetKind};

const MAX_SUGGESTIONS: usize = 6;

/// Points whose name contains `query`, ignoring case. Blank queries match nothing.
pub fn search_points<'a>(
    points: &'a [PointRecord],
    query: &str,
    limit: usize,
) -> Vec<(&'a PointRecord, LonLat)> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return vec![];
    }

    points
        .iter()
        .filter(|point| point.name.to_lowercase().contains(&query))
        .filter_map(|point| point.position().ok().map(|position| (point, position)))
        .take(limit)
        .collect()
}

/// Finds points by name and goes to the chosen one.
#[derive(Debug)]
pub struct SearchWidget {
    query: String,
    scale: f64,
}

impl SearchWidget {
    /// Creates the widget zooming to results at `1:scale`.
    pub fn new(scale: f64) -> Self {
        Self {
            query: String::new(),
            scale,
        }
    }
}

impl MapWidget for SearchWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Search
    }

    fn show(&mut self, ui: &mut egui::Ui, cx: &mut WidgetContext<'_>) {
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.query)
                .hint_text("Find a place")
                .desired_width(180.0),
        );

        let results = search_points(cx.points, &self.query, MAX_SUGGESTIONS);
        if self.query.trim().is_empty() {
            return;
        }

        if results.is_empty() {
            ui.weak("No results");
            return;
        }

        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let mut chosen = submitted.then(|| results[0].clone());

        for (point, position) in &results {
            if ui.selectable_label(false, &point.name).clicked() {
                chosen = Some((*point, *position));
            }
        }

        if let Some((point, position)) = chosen {
            log::debug!("Search result chosen: {}", point.name);
            self.query = point.name.clone();
            let resolution = scale_to_resolution(self.scale, position.lat());
            cx.go_to_position(&position, resolution);
        }
    }
}
