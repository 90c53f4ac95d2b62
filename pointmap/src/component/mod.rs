//! The map component: mounts the map with its widgets, fits it to the points and tears everything
//! down on unmount.
//!
//! Initialization is driven by [`MapComponent::poll`], called once per frame:
//!
//! ```text
//! Idle --mount--> Initializing(Constructing) --> Initializing(AwaitingView)
//!      --view laid out--> Initializing(Animating) --animation done--> Ready
//! ```
//!
//! Any error on the way moves the component to `Failed`. Unmounting, from any state, destroys every
//! widget and the view exactly once and returns the component to `Idle`.

use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use egui_wgpu::RenderState;
use galileo::control::{MouseButton, MouseEvent, UserEventHandler};
use galileo::MapView;
use galileo_types::geo::GeoPoint;
use web_time::Instant;

use crate::bounds::{fit_bounds, BoundingBox};
use crate::config::MapConfig;
use crate::data::{load_points, valid_positions, PointRecord, BUNDLED_POINTS};
use crate::error::PointMapError;
use crate::factory::{
    add_graphics_layer, attach_default_widgets, create_map, create_view, create_widgets,
    destroy_all, WidgetFactory,
};
use crate::interaction::{
    map_event_handler, ExtentChangeCallback, Liveness, MapClickCallback, SharedInteraction,
};
use crate::layer::{markers_layer, GraphicsLayer};
use crate::view::View;
use crate::widget::{go_to, WidgetKind, WidgetSet};

mod ui;

const TOOL_WIDGETS: [WidgetKind; 2] = [WidgetKind::Measurement, WidgetKind::Sketch];
const BASEMAP_WIDGETS: [WidgetKind; 1] = [WidgetKind::BasemapGallery];

/// Step of the initialization sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    /// Building the map, the view and the widgets.
    Constructing,
    /// Waiting for the view to be laid out.
    AwaitingView,
    /// Moving the view to the extent of the points.
    Animating,
}

/// Lifecycle state of a [`MapComponent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    /// Not mounted.
    Idle,
    /// Mounted, initialization in progress.
    Initializing(InitStage),
    /// The map shows the points.
    Ready,
    /// Initialization failed with the given message.
    Failed(String),
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Idle => write!(f, "idle"),
            LifecycleState::Initializing(stage) => write!(f, "initializing ({stage:?})"),
            LifecycleState::Ready => write!(f, "ready"),
            LifecycleState::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

type ExtentKey = [f64; 5];

fn extent_key(view: &MapView) -> ExtentKey {
    let (lat, lon) = view
        .position()
        .map(|position| (position.lat(), position.lon()))
        .unwrap_or_default();
    let size = view.size();
    [lat, lon, view.resolution(), size.width(), size.height()]
}

/// Map of the point records with its widgets.
pub struct MapComponent {
    config: MapConfig,
    points_json: Cow<'static, str>,
    widget_factory: WidgetFactory,
    on_map_click: Option<MapClickCallback>,
    on_extent_change: Option<ExtentChangeCallback>,

    state: LifecycleState,
    mounted: bool,
    liveness: Liveness,
    tools_open: bool,
    basemap_open: bool,

    points: Vec<PointRecord>,
    bounds: Option<BoundingBox>,
    layer: Option<GraphicsLayer>,
    view: Option<View>,
    widgets: WidgetSet,
    home: Option<MapView>,
    interaction: SharedInteraction,
    animation_end: Option<Instant>,
    last_extent: Option<ExtentKey>,
}

impl MapComponent {
    /// Creates an unmounted component showing the bundled points.
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            points_json: Cow::Borrowed(BUNDLED_POINTS),
            widget_factory: Box::new(create_widgets),
            on_map_click: None,
            on_extent_change: None,
            state: LifecycleState::Idle,
            mounted: false,
            liveness: Liveness::new(),
            tools_open: false,
            basemap_open: false,
            points: vec![],
            bounds: None,
            layer: None,
            view: None,
            widgets: WidgetSet::new(),
            home: None,
            interaction: SharedInteraction::default(),
            animation_end: None,
            last_extent: None,
        }
    }

    /// Shows the points of a JSON array instead of the bundled ones. Read on every mount.
    pub fn with_points_json(mut self, json: impl Into<String>) -> Self {
        self.points_json = Cow::Owned(json.into());
        self
    }

    /// Sets the callback called for every click on the map, with any mouse button.
    ///
    /// Callbacks are handed to the map when the renderer is attached and stay the same until the
    /// next mount.
    pub fn with_on_map_click(
        mut self,
        callback: impl Fn(MouseButton, &MouseEvent) + Send + Sync + 'static,
    ) -> Self {
        self.on_map_click = Some(Arc::new(callback));
        self
    }

    /// Sets the callback called every time the position, resolution or size of the map changes.
    pub fn with_on_extent_change(
        mut self,
        callback: impl Fn(&MapView) + Send + Sync + 'static,
    ) -> Self {
        self.on_extent_change = Some(Arc::new(callback));
        self
    }

    /// Replaces the constructor of the widget set.
    pub fn with_widget_factory(
        mut self,
        factory: impl Fn(
                &View,
                Option<&GraphicsLayer>,
                &MapConfig,
            ) -> Result<WidgetSet, PointMapError>
            + 'static,
    ) -> Self {
        self.widget_factory = Box::new(factory);
        self
    }

    /// Configuration of the component.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Lifecycle state.
    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    /// The view, while mounted.
    pub fn view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    /// Mutable access to the view, while mounted.
    pub fn view_mut(&mut self) -> Option<&mut View> {
        self.view.as_mut()
    }

    /// Bounding box of the valid points, once computed.
    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.bounds.as_ref()
    }

    /// Returns true while the measurement and sketch tools are open.
    pub fn tools_open(&self) -> bool {
        self.tools_open
    }

    /// Returns true while the basemap gallery is open.
    pub fn basemap_open(&self) -> bool {
        self.basemap_open
    }

    /// Starts initialization. Does nothing if the component is already mounted.
    pub fn mount(&mut self) {
        if self.mounted {
            log::debug!("Map component is already mounted");
            return;
        }

        self.mounted = true;
        self.liveness = Liveness::new();
        self.state = LifecycleState::Initializing(InitStage::Constructing);
        log::debug!("Mounting map component");

        match self.construct() {
            Ok(()) => self.state = LifecycleState::Initializing(InitStage::AwaitingView),
            Err(err) => self.fail(err),
        }
    }

    fn construct(&mut self) -> Result<(), PointMapError> {
        let points = load_points(&self.points_json)?;
        let located: Vec<_> = valid_positions(&points).collect();
        let bounds = BoundingBox::from_positions(located.iter().map(|(_, position)| *position));

        let mut map = create_map(&self.config)?;
        let layer = markers_layer(&located);
        add_graphics_layer(&mut map, &layer);

        let view = self
            .view
            .insert(create_view(map, Some(&self.config.container))?);
        let widgets = (self.widget_factory)(view, Some(&layer), &self.config)?;
        attach_default_widgets(view, &widgets);
        self.widgets = widgets;
        self.layer = Some(layer);
        self.sync_toggles();

        self.bounds = Some(bounds.ok_or(PointMapError::NoUsablePoints)?);
        self.points = points;

        Ok(())
    }

    /// Binds the renderer to the view and hands the event handlers to the map.
    pub fn attach_renderer(&mut self, ctx: egui::Context, render_state: RenderState) {
        if !self.liveness.is_alive() || matches!(self.state, LifecycleState::Failed(_)) {
            return;
        }

        let Some(view) = self.view.as_mut() else {
            return;
        };

        let handler = map_event_handler(
            self.liveness.clone(),
            self.interaction.clone(),
            self.layer.clone(),
            self.on_map_click.clone(),
        );
        let handlers = [Box::new(handler) as Box<dyn UserEventHandler>];

        if let Err(err) = view.attach(ctx, render_state, handlers) {
            self.fail(err);
        }
    }

    /// Advances initialization and reports extent changes. Called once per frame.
    pub fn poll(&mut self) {
        if !self.mounted || !self.liveness.is_alive() {
            return;
        }

        self.notify_extent_change();

        match self.state {
            LifecycleState::Initializing(InitStage::AwaitingView) => {
                if let Err(err) = self.go_home() {
                    self.fail(err);
                }
            }
            LifecycleState::Initializing(InitStage::Animating) => {
                let done = match self.animation_end {
                    Some(end) => Instant::now() >= end,
                    None => true,
                };
                if done {
                    self.animation_end = None;
                    self.state = LifecycleState::Ready;
                    log::info!("Map is ready");
                }
            }
            _ => {}
        }
    }

    fn go_home(&mut self) -> Result<(), PointMapError> {
        let Some(view) = self.view.as_mut().filter(|view| view.is_ready()) else {
            return Ok(());
        };
        let Some(bounds) = &self.bounds else {
            return Err(PointMapError::NoUsablePoints);
        };
        let Some(map) = view.map_mut() else {
            return Ok(());
        };

        let size = map.view().size();
        let fit = fit_bounds(
            bounds,
            size.width(),
            size.height(),
            self.config.fit_padding,
            self.config.min_fit_resolution,
        )
        .ok_or_else(|| PointMapError::MapConstruction("view has no size".to_string()))?;

        let home = MapView::new(&fit.center, fit.resolution)
            .with_size(size);
        log::debug!(
            "Fitting the map to {:?} at resolution {}",
            bounds.to_array(),
            fit.resolution
        );

        let duration = self.config.animation();
        go_to(map, home.clone(), duration);
        self.home = Some(home);

        if duration.is_zero() {
            self.state = LifecycleState::Ready;
            log::info!("Map is ready");
        } else {
            self.animation_end = Some(Instant::now() + duration);
            self.state = LifecycleState::Initializing(InitStage::Animating);
        }

        Ok(())
    }

    fn notify_extent_change(&mut self) {
        let Some(callback) = &self.on_extent_change else {
            return;
        };
        let Some(map) = self.view.as_ref().and_then(View::map) else {
            return;
        };

        let key = extent_key(map.view());
        if self.last_extent != Some(key) {
            self.last_extent = Some(key);
            log::trace!("View extent changed: {key:?}");
            callback(map.view());
        }
    }

    fn fail(&mut self, err: PointMapError) {
        if !self.liveness.is_alive() {
            return;
        }

        log::error!("Map initialization failed: {err}");
        self.state = LifecycleState::Failed(err.to_string());
    }

    /// Opens or closes the measurement and sketch tools.
    pub fn toggle_tools(&mut self) {
        self.tools_open = !self.tools_open;
        self.sync_group(&TOOL_WIDGETS, self.tools_open);
    }

    /// Opens or closes the basemap gallery.
    pub fn toggle_basemap(&mut self) {
        self.basemap_open = !self.basemap_open;
        self.sync_group(&BASEMAP_WIDGETS, self.basemap_open);
    }

    fn sync_toggles(&mut self) {
        self.sync_group(&TOOL_WIDGETS, self.tools_open);
        self.sync_group(&BASEMAP_WIDGETS, self.basemap_open);
    }

    fn sync_group(&mut self, kinds: &[WidgetKind], open: bool) {
        let Some(view) = self.view.as_mut().filter(|view| view.is_alive()) else {
            return;
        };

        for kind in kinds.iter().filter(|kind| self.widgets.contains(**kind)) {
            if open {
                view.ui_mut().add(*kind, kind.position());
            } else {
                view.ui_mut().remove(*kind);
            }
        }
    }

    /// Destroys every widget and the view, whatever the state, and returns to `Idle`.
    ///
    /// Calling it on an unmounted component does nothing.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }

        log::debug!("Unmounting map component in state {}", self.state);
        self.liveness.kill();

        let failures = destroy_all(&mut self.widgets, self.view.as_mut());
        if !failures.is_empty() {
            log::warn!("{} teardown steps failed", failures.len());
        }

        self.view = None;
        self.layer = None;
        self.points.clear();
        self.bounds = None;
        self.home = None;
        self.interaction = SharedInteraction::default();
        self.animation_end = None;
        self.last_extent = None;
        self.mounted = false;
        self.state = LifecycleState::Idle;
    }
}

impl Drop for MapComponent {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;
    use crate::widget::tests::counting_set;

    const POINTS: &str = r#"[
        { "id": 1, "name": "A", "coordinates": [30, 30] },
        { "id": 2, "name": "B", "coordinates": [32, 28] },
        { "id": 3, "name": "C", "coordinates": ["x", 28] },
        { "id": 4.5, "name": "D", "coordinates": [0, 0] }
    ]"#;

    fn config() -> MapConfig {
        MapConfig::default()
            .with_tile_cache(None)
            .with_animation(Duration::ZERO)
    }

    fn counted(
        component: MapComponent,
    ) -> (MapComponent, Vec<(WidgetKind, Arc<AtomicUsize>)>, Arc<AtomicUsize>) {
        let (set, counters) = counting_set(&WidgetKind::ALL, &[WidgetKind::Search]);
        let set = Cell::new(set);
        let calls = Arc::new(AtomicUsize::new(0));
        let factory_calls = calls.clone();
        let component = component.with_widget_factory(move |_, _, _| {
            factory_calls.fetch_add(1, Ordering::SeqCst);
            Ok(set.take())
        });

        (component, counters, calls)
    }

    fn destroyed(counters: &[(WidgetKind, Arc<AtomicUsize>)]) -> Vec<usize> {
        counters
            .iter()
            .map(|(_, counter)| counter.load(Ordering::SeqCst))
            .collect()
    }

    fn ready_component() -> MapComponent {
        let mut component = MapComponent::new(config()).with_points_json(POINTS);
        component.mount();
        component
            .view_mut()
            .expect("constructed")
            .set_size(800.0, 600.0);
        component.poll();
        component
    }

    #[test]
    fn reaches_ready_and_skips_invalid_points() {
        let component = ready_component();
        assert_eq!(component.state(), &LifecycleState::Ready);
        assert_eq!(
            component.bounds().expect("computed").to_array(),
            [[30.0, 28.0], [32.0, 30.0]]
        );

        let layer = component.layer.as_ref().expect("constructed").read();
        let names: Vec<_> = layer
            .features()
            .iter()
            .map(|(_, marker)| marker.popup().title)
            .collect();
        assert_eq!(names, ["A", "B"]);
        drop(layer);

        let view = component.view().expect("mounted");
        assert_eq!(view.ui().len(), 7);
        assert_eq!(view.container(), "viewDiv");
    }

    #[test]
    fn waits_for_layout() {
        let mut component = MapComponent::new(config()).with_points_json(POINTS);
        component.mount();
        component.poll();
        assert_eq!(
            component.state(),
            &LifecycleState::Initializing(InitStage::AwaitingView)
        );
    }

    #[test]
    fn animates_before_ready() {
        let mut component = MapComponent::new(config().with_animation(Duration::from_secs(3600)))
            .with_points_json(POINTS);
        component.mount();
        component
            .view_mut()
            .expect("constructed")
            .set_size(800.0, 600.0);
        component.poll();
        component.poll();
        assert_eq!(
            component.state(),
            &LifecycleState::Initializing(InitStage::Animating)
        );
    }

    #[test]
    fn empty_data_fails() {
        let mut component = MapComponent::new(config()).with_points_json("[]");
        component.mount();
        assert_matches!(
            component.state(),
            LifecycleState::Failed(message) if message.contains("no usable points")
        );
    }

    #[test]
    fn malformed_data_fails() {
        let mut component = MapComponent::new(config()).with_points_json("{ not json");
        component.mount();
        assert_matches!(component.state(), LifecycleState::Failed(_));
        assert!(component.view().is_none());
    }

    #[test]
    fn missing_container_fails() {
        let mut component =
            MapComponent::new(config().with_container("")).with_points_json(POINTS);
        component.mount();
        assert_matches!(
            component.state(),
            LifecycleState::Failed(message) if message.contains("container")
        );
    }

    #[test]
    fn mount_twice_constructs_once() {
        let (mut component, _, calls) =
            counted(MapComponent::new(config()).with_points_json(POINTS));
        component.mount();
        component.mount();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unmount_idle_destroys_nothing() {
        let (mut component, counters, _) =
            counted(MapComponent::new(config()).with_points_json(POINTS));
        component.unmount();
        assert_eq!(destroyed(&counters), vec![0; WidgetKind::ALL.len()]);
    }

    #[test]
    fn unmount_while_initializing() {
        let (mut component, counters, _) =
            counted(MapComponent::new(config()).with_points_json(POINTS));
        component.mount();
        assert_matches!(component.state(), LifecycleState::Initializing(_));

        component.unmount();
        component.unmount();
        assert_eq!(destroyed(&counters), vec![1; WidgetKind::ALL.len()]);
        assert_eq!(component.state(), &LifecycleState::Idle);
        assert!(component.view().is_none());
    }

    #[test]
    fn unmount_when_ready() {
        let (mut component, counters, _) =
            counted(MapComponent::new(config()).with_points_json(POINTS));
        component.mount();
        component
            .view_mut()
            .expect("constructed")
            .set_size(800.0, 600.0);
        component.poll();
        assert_eq!(component.state(), &LifecycleState::Ready);

        component.unmount();
        assert_eq!(destroyed(&counters), vec![1; WidgetKind::ALL.len()]);
    }

    #[test]
    fn unmount_after_failure() {
        let (mut component, counters, _) =
            counted(MapComponent::new(config()).with_points_json("[]"));
        component.mount();
        assert_matches!(component.state(), LifecycleState::Failed(_));

        component.unmount();
        assert_eq!(destroyed(&counters), vec![1; WidgetKind::ALL.len()]);
    }

    #[test]
    fn drop_unmounts() {
        let (mut component, counters, _) =
            counted(MapComponent::new(config()).with_points_json(POINTS));
        component.mount();
        drop(component);
        assert_eq!(destroyed(&counters), vec![1; WidgetKind::ALL.len()]);
    }

    #[test]
    fn poll_after_unmount_does_nothing() {
        let mut component = MapComponent::new(config()).with_points_json(POINTS);
        component.mount();
        component.unmount();
        component.poll();
        assert_eq!(component.state(), &LifecycleState::Idle);
    }

    #[test]
    fn toggle_tools_adds_and_removes_pair() {
        let mut component = ready_component();
        let before = component.view().expect("mounted").ui().clone();

        component.toggle_tools();
        assert!(component.tools_open());
        let ui = component.view().expect("mounted").ui();
        assert_eq!(ui.len(), before.len() + 2);
        assert!(ui.contains(WidgetKind::Measurement));
        assert!(ui.contains(WidgetKind::Sketch));

        component.toggle_tools();
        assert!(!component.tools_open());
        assert_eq!(component.view().expect("mounted").ui(), &before);
    }

    #[test]
    fn toggle_basemap_adds_gallery() {
        let mut component = ready_component();

        component.toggle_basemap();
        let ui = component.view().expect("mounted").ui();
        assert_eq!(ui.len(), 8);
        assert!(ui.contains(WidgetKind::BasemapGallery));

        component.toggle_basemap();
        assert!(!component
            .view()
            .expect("mounted")
            .ui()
            .contains(WidgetKind::BasemapGallery));
    }

    #[test]
    fn toggles_before_mount_apply_after_construction() {
        let mut component = MapComponent::new(config()).with_points_json(POINTS);
        component.toggle_basemap();
        assert!(component.basemap_open());
        assert!(component.view().is_none());

        component.mount();
        let ui = component.view().expect("mounted").ui();
        assert!(ui.contains(WidgetKind::BasemapGallery));
        assert!(!ui.contains(WidgetKind::Measurement));
    }

    #[test]
    fn extent_changes_are_reported() {
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = changes.clone();
        let mut component = MapComponent::new(config())
            .with_points_json(POINTS)
            .with_on_extent_change(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        component.mount();
        component.poll();
        assert_eq!(changes.load(Ordering::SeqCst), 1);

        component.poll();
        assert_eq!(changes.load(Ordering::SeqCst), 1);

        component
            .view_mut()
            .expect("constructed")
            .set_size(800.0, 600.0);
        component.poll();
        component.poll();
        assert!(changes.load(Ordering::SeqCst) >= 2);
    }
}
