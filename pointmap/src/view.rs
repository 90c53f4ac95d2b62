//! The map view: binds a map to its container and owns the widgets' UI surface.

use egui_wgpu::RenderState;
use galileo::control::UserEventHandler;
use galileo::Map;
use galileo_egui::EguiMapState;
use galileo_types::cartesian::Size;

use crate::error::PointMapError;
use crate::widget::UiSurface;

/// Before its first layout the renderer reserves a 1×1 target. A view smaller than this has not
/// been laid out yet.
const MIN_LAID_OUT_SIZE: f64 = 2.0;

enum Surface {
    /// The map exists but nothing renders it yet.
    Detached(Map),
    /// The map is rendered into an egui texture.
    Attached(Box<EguiMapState>),
    Destroyed,
}

/// A map bound to a container, with the widgets placed over it.
pub struct View {
    container: String,
    surface: Surface,
    ui: UiSurface,
}

impl View {
    pub(crate) fn new(map: Map, container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            surface: Surface::Detached(map),
            ui: UiSurface::default(),
        }
    }

    /// Id of the container the view is bound to.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// The map of the view, unless the view is destroyed.
    pub fn map(&self) -> Option<&Map> {
        match &self.surface {
            Surface::Detached(map) => Some(map),
            Surface::Attached(state) => Some(state.map()),
            Surface::Destroyed => None,
        }
    }

    /// Mutable access to the map of the view, unless the view is destroyed.
    pub fn map_mut(&mut self) -> Option<&mut Map> {
        match &mut self.surface {
            Surface::Detached(map) => Some(map),
            Surface::Attached(state) => Some(state.map_mut()),
            Surface::Destroyed => None,
        }
    }

    pub(crate) fn egui_state_mut(&mut self) -> Option<&mut EguiMapState> {
        match &mut self.surface {
            Surface::Attached(state) => Some(state.as_mut()),
            _ => None,
        }
    }

    /// Sets the size of the map in pixels. The renderer does it on every frame once attached.
    pub fn set_size(&mut self, width: f64, height: f64) {
        if let Some(map) = self.map_mut() {
            map.set_size(Size::new(width, height));
        }
    }

    /// Binds a renderer to the view. Event handlers are called for every user event on the map.
    ///
    /// Attaching an attached view does nothing.
    pub fn attach(
        &mut self,
        ctx: egui::Context,
        render_state: RenderState,
        handlers: impl IntoIterator<Item = Box<dyn UserEventHandler>>,
    ) -> Result<(), PointMapError> {
        self.surface = match std::mem::replace(&mut self.surface, Surface::Destroyed) {
            Surface::Detached(map) => {
                log::debug!("Attaching renderer to view '{}'", self.container);
                Surface::Attached(Box::new(EguiMapState::new(
                    map,
                    ctx,
                    render_state,
                    handlers,
                )))
            }
            attached @ Surface::Attached(_) => attached,
            Surface::Destroyed => {
                return Err(PointMapError::MapConstruction(format!(
                    "view '{}' is destroyed",
                    self.container
                )))
            }
        };

        Ok(())
    }

    /// Returns true if a renderer is attached.
    pub fn is_attached(&self) -> bool {
        matches!(self.surface, Surface::Attached(_))
    }

    /// Returns true once the map has been laid out and can be navigated.
    pub fn is_ready(&self) -> bool {
        self.map().is_some_and(|map| {
            let size = map.view().size();
            size.width() >= MIN_LAID_OUT_SIZE && size.height() >= MIN_LAID_OUT_SIZE
        })
    }

    /// Returns false after the view is destroyed.
    pub fn is_alive(&self) -> bool {
        !matches!(self.surface, Surface::Destroyed)
    }

    /// Widgets placed on the view.
    pub fn ui(&self) -> &UiSurface {
        &self.ui
    }

    /// Mutable access to the widgets placed on the view.
    pub fn ui_mut(&mut self) -> &mut UiSurface {
        &mut self.ui
    }

    /// Releases the map and the renderer and removes every widget from the surface.
    ///
    /// Fails if the view was already destroyed.
    pub fn destroy(&mut self) -> Result<(), PointMapError> {
        if !self.is_alive() {
            return Err(PointMapError::Teardown(format!(
                "view '{}' is already destroyed",
                self.container
            )));
        }

        self.surface = Surface::Destroyed;
        self.ui.clear();
        log::debug!("View '{}' destroyed", self.container);

        Ok(())
    }
}

/// Returns true if the document has an element with the given id.
#[cfg(target_arch = "wasm32")]
pub(crate) fn container_exists(id: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(id))
        .is_some()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use galileo::MapBuilder;

    use super::*;
    use crate::widget::{UiPosition, WidgetKind};

    fn view() -> View {
        View::new(MapBuilder::default().build(), "viewDiv")
    }

    #[test]
    fn ready_after_layout() {
        let mut view = view();
        assert!(!view.is_ready());

        view.set_size(1.0, 1.0);
        assert!(!view.is_ready());

        view.set_size(800.0, 600.0);
        assert!(view.is_ready());
    }

    #[test]
    fn destroy_once() {
        let mut view = view();
        view.ui_mut().add(WidgetKind::Home, UiPosition::TopLeft);

        view.destroy().expect("first destroy");
        assert!(!view.is_alive());
        assert!(view.map().is_none());
        assert!(view.ui().is_empty());
        assert!(!view.is_ready());

        assert_matches!(view.destroy(), Err(PointMapError::Teardown(_)));
    }
}
