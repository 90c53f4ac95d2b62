use crate::basemap::{show_basemap, Basemap};
use crate::widget::{MapWidget, WidgetContext, WidgetKind};

/// Lists the basemaps and shows the one the user picks.
#[derive(Debug)]
pub struct BasemapGalleryWidget {
    active: Basemap,
}

impl BasemapGalleryWidget {
    /// Creates the gallery with `active` as the currently shown basemap.
    pub fn new(active: Basemap) -> Self {
        Self { active }
    }

    /// Basemap currently shown.
    pub fn active(&self) -> Basemap {
        self.active
    }
}

impl MapWidget for BasemapGalleryWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::BasemapGallery
    }

    fn show(&mut self, ui: &mut egui::Ui, cx: &mut WidgetContext<'_>) {
        ui.strong("Basemap");
        for basemap in Basemap::ALL {
            if ui
                .selectable_label(self.active == basemap, basemap.title())
                .clicked()
                && self.active != basemap
            {
                log::info!("Switching basemap to {}", basemap.title());
                self.active = basemap;
                show_basemap(cx.map, basemap);
            }
        }
    }
}
