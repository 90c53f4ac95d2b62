//! UI widgets shown over the map.
//!
//! A widget is created once per mount by the [`factory`](crate::factory), lives in the
//! [`WidgetSet`] of the component and is drawn only while its kind is on the view's [`UiSurface`].

use std::fmt::{Display, Formatter};
use std::time::Duration;

use galileo::{Map, MapView};
use galileo_types::cartesian::Point2;

use crate::config::MapConfig;
use crate::data::{LonLat, PointRecord};
use crate::error::PointMapError;

mod basemap_gallery;
mod coordinates;
mod fullscreen;
mod measurement;
mod navigation;
mod scale_bar;
mod search;
mod sketch;

pub use basemap_gallery::BasemapGalleryWidget;
pub use coordinates::{format_dms, CoordinateConversionWidget, CoordinateFormat};
pub use fullscreen::FullscreenWidget;
pub use measurement::{format_distance, haversine_distance, MeasurementWidget};
pub use navigation::{CompassWidget, HomeWidget, LocateWidget};
pub use scale_bar::{metric_scale_bar, ScaleBarLength, ScaleBarWidget, ScaleUnit};
pub use search::{search_points, SearchWidget};
pub use sketch::{CreationMode, SketchTool, SketchWidget};

/// The fixed set of widgets the map can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetKind {
    /// Returns to the initial extent.
    Home,
    /// Shows rotation and resets it to north.
    Compass,
    /// Goes to the device location.
    Locate,
    /// Finds points by name.
    Search,
    /// Shows the map scale.
    ScaleBar,
    /// Switches fullscreen mode.
    Fullscreen,
    /// Chooses the basemap.
    BasemapGallery,
    /// Shows pointer coordinates in different notations.
    CoordinateConversion,
    /// Measures distances.
    Measurement,
    /// Draws graphics on the graphics layer.
    Sketch,
}

impl WidgetKind {
    /// Every widget kind.
    pub const ALL: [WidgetKind; 10] = [
        WidgetKind::Home,
        WidgetKind::Compass,
        WidgetKind::Locate,
        WidgetKind::Search,
        WidgetKind::ScaleBar,
        WidgetKind::Fullscreen,
        WidgetKind::BasemapGallery,
        WidgetKind::CoordinateConversion,
        WidgetKind::Measurement,
        WidgetKind::Sketch,
    ];

    fn index(&self) -> usize {
        *self as usize
    }

    /// Position of the widget on the UI surface.
    pub fn position(&self) -> UiPosition {
        match self {
            WidgetKind::Home | WidgetKind::Compass | WidgetKind::Locate => UiPosition::TopLeft,
            WidgetKind::Search
            | WidgetKind::Fullscreen
            | WidgetKind::Measurement
            | WidgetKind::Sketch => UiPosition::TopRight,
            WidgetKind::ScaleBar => UiPosition::BottomRight,
            WidgetKind::CoordinateConversion | WidgetKind::BasemapGallery => {
                UiPosition::BottomLeft
            }
        }
    }

    /// Whether the widget is placed on the UI surface as soon as the view is created. The others
    /// are added on demand by the toggle buttons.
    pub fn is_placed_by_default(&self) -> bool {
        !matches!(
            self,
            WidgetKind::BasemapGallery | WidgetKind::Measurement | WidgetKind::Sketch
        )
    }
}

impl Display for WidgetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WidgetKind::Home => "home",
            WidgetKind::Compass => "compass",
            WidgetKind::Locate => "locate",
            WidgetKind::Search => "search",
            WidgetKind::ScaleBar => "scale bar",
            WidgetKind::Fullscreen => "fullscreen",
            WidgetKind::BasemapGallery => "basemap gallery",
            WidgetKind::CoordinateConversion => "coordinate conversion",
            WidgetKind::Measurement => "measurement",
            WidgetKind::Sketch => "sketch",
        };

        f.write_str(name)
    }
}

/// Corner of the view a widget is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiPosition {
    /// Top left corner.
    TopLeft,
    /// Top right corner.
    TopRight,
    /// Bottom left corner.
    BottomLeft,
    /// Bottom right corner.
    BottomRight,
}

impl UiPosition {
    /// Every position.
    pub const ALL: [UiPosition; 4] = [
        UiPosition::TopLeft,
        UiPosition::TopRight,
        UiPosition::BottomLeft,
        UiPosition::BottomRight,
    ];

    /// Anchor of the corner.
    pub fn align(&self) -> egui::Align2 {
        match self {
            UiPosition::TopLeft => egui::Align2::LEFT_TOP,
            UiPosition::TopRight => egui::Align2::RIGHT_TOP,
            UiPosition::BottomLeft => egui::Align2::LEFT_BOTTOM,
            UiPosition::BottomRight => egui::Align2::RIGHT_BOTTOM,
        }
    }

    /// Offset from the corner, in points.
    pub fn offset(&self, margin: f32) -> egui::Vec2 {
        match self {
            UiPosition::TopLeft => egui::vec2(margin, margin),
            UiPosition::TopRight => egui::vec2(-margin, margin),
            UiPosition::BottomLeft => egui::vec2(margin, -margin),
            UiPosition::BottomRight => egui::vec2(-margin, -margin),
        }
    }
}

/// State of the map a widget can read and change while it is drawn.
pub struct WidgetContext<'a> {
    /// The map of the view.
    pub map: &'a mut Map,
    /// Point records of the component.
    pub points: &'a [PointRecord],
    /// View fitted to the points, once it has been computed.
    pub home: Option<&'a MapView>,
    /// Geographic position under the pointer.
    pub pointer: Option<LonLat>,
    /// Projected positions of the map clicks since the previous frame.
    pub clicks: &'a [Point2],
    /// Configuration of the component.
    pub config: &'a MapConfig,
}

impl WidgetContext<'_> {
    /// Moves the map to the given view, animated if the configuration asks for it.
    pub fn go_to(&mut self, view: MapView) {
        go_to(self.map, view, self.config.animation());
    }

    /// Centers the map on `position` at the given resolution.
    pub fn go_to_position(&mut self, position: &LonLat, resolution: f64) {
        let view = MapView::new(position, resolution)
            .with_size(self.map.view().size());
        self.go_to(view);
    }
}

/// Moves `map` to `view`. A zero duration changes the view at once.
pub fn go_to(map: &mut Map, view: MapView, duration: Duration) {
    if duration.is_zero() {
        map.set_view(view);
    } else {
        map.animate_to(view, duration);
        map.redraw();
    }
}

/// A widget drawn over the map.
pub trait MapWidget {
    /// Kind of the widget.
    fn kind(&self) -> WidgetKind;

    /// Draws the widget and applies the user's actions to the map.
    fn show(&mut self, ui: &mut egui::Ui, cx: &mut WidgetContext<'_>);

    /// Releases the resources of the widget. Called exactly once, when the component unmounts.
    fn destroy(&mut self) -> Result<(), PointMapError> {
        Ok(())
    }
}

/// The widgets of a component, at most one of each kind.
#[derive(Default)]
pub struct WidgetSet {
    slots: [Option<Box<dyn MapWidget>>; WidgetKind::ALL.len()],
}

impl WidgetSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a widget into the slot of its kind, returning the widget it replaces.
    pub fn insert(&mut self, widget: Box<dyn MapWidget>) -> Option<Box<dyn MapWidget>> {
        let index = widget.kind().index();
        self.slots[index].replace(widget)
    }

    /// Returns true if the widget of the given kind exists.
    pub fn contains(&self, kind: WidgetKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Widget of the given kind.
    pub fn get_mut(&mut self, kind: WidgetKind) -> Option<&mut (dyn MapWidget + 'static)> {
        self.slots[kind.index()].as_deref_mut()
    }

    /// Removes the widget of the given kind from the set.
    pub fn take(&mut self, kind: WidgetKind) -> Option<Box<dyn MapWidget>> {
        self.slots[kind.index()].take()
    }

    /// Kinds of the widgets in the set.
    pub fn kinds(&self) -> impl Iterator<Item = WidgetKind> + '_ {
        WidgetKind::ALL
            .into_iter()
            .filter(|kind| self.contains(*kind))
    }

    /// Number of widgets in the set.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns true if the set has no widgets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Widgets placed on a view, in placement order. A kind is placed at most once.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UiSurface {
    entries: Vec<(WidgetKind, UiPosition)>,
}

impl UiSurface {
    /// Places a widget. Returns false if it was already placed.
    pub fn add(&mut self, kind: WidgetKind, position: UiPosition) -> bool {
        if self.contains(kind) {
            return false;
        }

        self.entries.push((kind, position));
        true
    }

    /// Removes a widget. Returns false if it was not placed.
    pub fn remove(&mut self, kind: WidgetKind) -> bool {
        let len = self.entries.len();
        self.entries.retain(|(placed, _)| *placed != kind);
        self.entries.len() != len
    }

    /// Returns true if the widget is placed.
    pub fn contains(&self, kind: WidgetKind) -> bool {
        self.entries.iter().any(|(placed, _)| *placed == kind)
    }

    /// Position of a placed widget.
    pub fn position_of(&self, kind: WidgetKind) -> Option<UiPosition> {
        self.entries
            .iter()
            .find(|(placed, _)| *placed == kind)
            .map(|(_, position)| *position)
    }

    /// Widgets placed at the given position, in placement order.
    pub fn at(&self, position: UiPosition) -> impl Iterator<Item = WidgetKind> + '_ {
        self.entries
            .iter()
            .filter(move |(_, placed)| *placed == position)
            .map(|(kind, _)| *kind)
    }

    /// Every placed widget.
    pub fn kinds(&self) -> impl Iterator<Item = WidgetKind> + '_ {
        self.entries.iter().map(|(kind, _)| *kind)
    }

    /// Number of placed widgets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is placed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every widget.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Widget that counts teardown calls and can be told to fail them.
    pub(crate) struct CountingWidget {
        pub kind: WidgetKind,
        pub destroyed: Arc<AtomicUsize>,
        pub fail: bool,
    }

    impl MapWidget for CountingWidget {
        fn kind(&self) -> WidgetKind {
            self.kind
        }

        fn show(&mut self, _ui: &mut egui::Ui, _cx: &mut WidgetContext<'_>) {}

        fn destroy(&mut self) -> Result<(), PointMapError> {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(PointMapError::Teardown(format!("{} is broken", self.kind)))
            } else {
                Ok(())
            }
        }
    }

    pub(crate) fn counting_set(
        kinds: &[WidgetKind],
        fail: &[WidgetKind],
    ) -> (WidgetSet, Vec<(WidgetKind, Arc<AtomicUsize>)>) {
        let mut set = WidgetSet::new();
        let mut counters = vec![];
        for kind in kinds {
            let destroyed = Arc::new(AtomicUsize::new(0));
            counters.push((*kind, destroyed.clone()));
            set.insert(Box::new(CountingWidget {
                kind: *kind,
                destroyed,
                fail: fail.contains(kind),
            }));
        }

        (set, counters)
    }

    #[test]
    fn default_placement() {
        let defaults: Vec<_> = WidgetKind::ALL
            .into_iter()
            .filter(WidgetKind::is_placed_by_default)
            .collect();
        assert_eq!(defaults.len(), 7);
        assert_eq!(WidgetKind::Home.position(), UiPosition::TopLeft);
        assert_eq!(WidgetKind::Fullscreen.position(), UiPosition::TopRight);
        assert_eq!(WidgetKind::ScaleBar.position(), UiPosition::BottomRight);
        assert_eq!(
            WidgetKind::CoordinateConversion.position(),
            UiPosition::BottomLeft
        );
    }

    #[test]
    fn surface_places_each_kind_once() {
        let mut surface = UiSurface::default();
        assert!(surface.add(WidgetKind::Home, UiPosition::TopLeft));
        assert!(!surface.add(WidgetKind::Home, UiPosition::BottomRight));
        assert!(surface.add(WidgetKind::Compass, UiPosition::TopLeft));
        assert_eq!(surface.len(), 2);
        assert_eq!(surface.position_of(WidgetKind::Home), Some(UiPosition::TopLeft));
        assert_eq!(
            surface.at(UiPosition::TopLeft).collect::<Vec<_>>(),
            vec![WidgetKind::Home, WidgetKind::Compass]
        );

        assert!(surface.remove(WidgetKind::Home));
        assert!(!surface.remove(WidgetKind::Home));
        assert_eq!(surface.kinds().collect::<Vec<_>>(), vec![WidgetKind::Compass]);
    }

    #[test]
    fn set_slots() {
        let (mut set, _) = counting_set(&[WidgetKind::Search, WidgetKind::Sketch], &[]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(WidgetKind::Sketch));
        assert!(!set.contains(WidgetKind::Home));
        assert_eq!(
            set.kinds().collect::<Vec<_>>(),
            vec![WidgetKind::Search, WidgetKind::Sketch]
        );

        assert!(set.take(WidgetKind::Search).is_some());
        assert!(set.take(WidgetKind::Search).is_none());
        assert_eq!(set.len(), 1);
    }
}
