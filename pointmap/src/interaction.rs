//! User event handling on the map: click callback, popups, pointer tracking and map clicks for
//! the widgets.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use galileo::control::{EventPropagation, MouseButton, MouseEvent, UserEvent, UserEventHandler};
use galileo::{Map, MapView};
use galileo_types::cartesian::Point2;
use parking_lot::Mutex;

use crate::bounds::unproject;
use crate::data::LonLat;
use crate::layer::{popup_at, GraphicsLayer, Popup};

/// Called for every click on the map with the button and the event as the map engine reports
/// them.
pub type MapClickCallback = Arc<dyn Fn(MouseButton, &MouseEvent) + Send + Sync>;

/// Called with the new view every time the position, resolution or size of the map changes.
pub type ExtentChangeCallback = Arc<dyn Fn(&MapView) + Send + Sync>;

/// Flag shared by everything started during one mount of a component. Cleared on unmount, after
/// which pending work must be discarded.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    /// Creates a live flag.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Returns true until [`Liveness::kill`] is called on any clone of the flag.
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clears the flag.
    pub fn kill(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// What the event handlers collected since the last frame.
#[derive(Debug, Default)]
pub struct InteractionState {
    pointer: Option<LonLat>,
    clicks: Vec<Point2>,
    popup: Option<Popup>,
}

impl InteractionState {
    /// Geographic position under the pointer.
    pub fn pointer(&self) -> Option<LonLat> {
        self.pointer
    }

    /// Projected positions of the clicks since the last call.
    pub fn take_clicks(&mut self) -> Vec<Point2> {
        std::mem::take(&mut self.clicks)
    }

    /// Popup of the last clicked marker.
    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    /// Closes the popup.
    pub fn close_popup(&mut self) {
        self.popup = None;
    }
}

/// Interaction state shared between the event handler and the component.
pub type SharedInteraction = Arc<Mutex<InteractionState>>;

/// Creates the handler of the map's user events.
///
/// Every click goes to `on_click`. Only left clicks open popups and reach the widgets. Events are
/// passed on to the map controller, so panning and zooming keep working.
pub fn map_event_handler(
    liveness: Liveness,
    state: SharedInteraction,
    layer: Option<GraphicsLayer>,
    on_click: Option<MapClickCallback>,
) -> impl UserEventHandler {
    move |event: &UserEvent, map: &mut Map| {
        if !liveness.is_alive() {
            return EventPropagation::Propagate;
        }

        match event {
            UserEvent::Click(button, mouse) => {
                if let Some(on_click) = &on_click {
                    on_click(*button, mouse);
                }

                if *button != MouseButton::Left {
                    return EventPropagation::Propagate;
                }

                let view = map.view();
                let Some(position) = view.screen_to_map(mouse.screen_pointer_position) else {
                    return EventPropagation::Propagate;
                };

                let popup = layer
                    .as_ref()
                    .and_then(|layer| popup_at(layer, &position, view.resolution()));

                let mut state = state.lock();
                state.clicks.push(position);
                if let Some(popup) = popup {
                    log::debug!("Opening popup of '{}'", popup.title);
                    state.popup = Some(popup);
                }
            }
            UserEvent::PointerMoved(mouse) => {
                let pointer = map
                    .view()
                    .screen_to_map(mouse.screen_pointer_position)
                    .and_then(|position| unproject(&position).ok());
                state.lock().pointer = pointer;
            }
            _ => {}
        }

        EventPropagation::Propagate
    }
}
