//! Constructors of the map, its view, the graphics layer and every widget.

use galileo::{Map, MapBuilder};

use crate::basemap::{basemap_layer, show_basemap, Basemap};
use crate::config::{MapConfig, DEFAULT_CONTAINER};
use crate::data::{valid_positions, PointRecord};
use crate::error::PointMapError;
use crate::layer::{markers_layer, GraphicsLayer};
use crate::view::View;
use crate::widget::{
    BasemapGalleryWidget, CompassWidget, CoordinateConversionWidget, CreationMode,
    FullscreenWidget, HomeWidget, LocateWidget, MeasurementWidget, ScaleBarWidget, ScaleUnit,
    SearchWidget, SketchWidget, WidgetKind, WidgetSet,
};

/// Builds the widgets of a component. [`create_widgets`] unless replaced.
pub type WidgetFactory =
    Box<dyn Fn(&View, Option<&GraphicsLayer>, &MapConfig) -> Result<WidgetSet, PointMapError>>;

/// Creates a map with every basemap layer, showing the configured one.
pub fn create_map(config: &MapConfig) -> Result<Map, PointMapError> {
    let [lat, lon] = config.initial_center;
    let mut builder = MapBuilder::default()
        .with_latlon(lat, lon)
        .with_z_level(config.initial_z_level);

    for basemap in Basemap::ALL {
        builder = builder.with_layer(basemap_layer(basemap, config.tile_cache.as_deref())?);
    }

    let mut map = builder.build();
    show_basemap(&mut map, config.basemap);

    Ok(map)
}

/// Creates the graphics layer with one marker per valid point.
pub fn create_graphics_layer(points: &[PointRecord]) -> GraphicsLayer {
    let located: Vec<_> = valid_positions(points).collect();
    markers_layer(&located)
}

/// Puts the graphics layer on top of the map layers.
pub fn add_graphics_layer(map: &mut Map, layer: &GraphicsLayer) {
    map.layers_mut().push(layer.clone());
}

/// Binds the map to a container. Without an id the map is bound to `viewDiv`.
pub fn create_view(map: Map, container: Option<&str>) -> Result<View, PointMapError> {
    let container = container.unwrap_or(DEFAULT_CONTAINER).trim();
    if container.is_empty() {
        return Err(PointMapError::MissingContainer(container.to_string()));
    }

    #[cfg(target_arch = "wasm32")]
    if !crate::view::container_exists(container) {
        return Err(PointMapError::MissingContainer(container.to_string()));
    }

    Ok(View::new(map, container))
}

fn ensure_alive(view: &View, widget: WidgetKind) -> Result<(), PointMapError> {
    if view.is_alive() {
        Ok(())
    } else {
        Err(PointMapError::WidgetConstruction {
            widget,
            reason: format!("view '{}' is destroyed", view.container()),
        })
    }
}

/// Creates the home button.
pub fn create_home_widget(view: &View) -> Result<HomeWidget, PointMapError> {
    ensure_alive(view, WidgetKind::Home)?;
    Ok(HomeWidget::default())
}

/// Creates the compass.
pub fn create_compass_widget(view: &View) -> Result<CompassWidget, PointMapError> {
    ensure_alive(view, WidgetKind::Compass)?;
    Ok(CompassWidget::default())
}

/// Creates the locate button zooming to the configured scale.
pub fn create_locate_widget(
    view: &View,
    config: &MapConfig,
) -> Result<LocateWidget, PointMapError> {
    ensure_alive(view, WidgetKind::Locate)?;
    Ok(LocateWidget::new(config.locate(), config.locate_scale))
}

/// Creates the search box.
pub fn create_search_widget(
    view: &View,
    config: &MapConfig,
) -> Result<SearchWidget, PointMapError> {
    ensure_alive(view, WidgetKind::Search)?;
    Ok(SearchWidget::new(config.search_scale))
}

/// Creates a metric scale bar.
pub fn create_scale_bar_widget(view: &View) -> Result<ScaleBarWidget, PointMapError> {
    ensure_alive(view, WidgetKind::ScaleBar)?;
    Ok(ScaleBarWidget::new(ScaleUnit::Metric))
}

/// Creates the fullscreen button.
pub fn create_fullscreen_widget(view: &View) -> Result<FullscreenWidget, PointMapError> {
    ensure_alive(view, WidgetKind::Fullscreen)?;
    Ok(FullscreenWidget::default())
}

/// Creates the basemap gallery with the configured basemap selected.
pub fn create_basemap_gallery_widget(
    view: &View,
    config: &MapConfig,
) -> Result<BasemapGalleryWidget, PointMapError> {
    ensure_alive(view, WidgetKind::BasemapGallery)?;
    Ok(BasemapGalleryWidget::new(config.basemap))
}

/// Creates the coordinate display.
pub fn create_coordinate_conversion_widget(
    view: &View,
) -> Result<CoordinateConversionWidget, PointMapError> {
    ensure_alive(view, WidgetKind::CoordinateConversion)?;
    Ok(CoordinateConversionWidget::default())
}

/// Creates the distance measurement tool.
pub fn create_measurement_widget(view: &View) -> Result<MeasurementWidget, PointMapError> {
    ensure_alive(view, WidgetKind::Measurement)?;
    Ok(MeasurementWidget::default())
}

/// Creates the sketch tool drawing on `layer`. New graphics are selected for editing.
pub fn create_sketch_widget(
    view: &View,
    layer: &GraphicsLayer,
) -> Result<SketchWidget, PointMapError> {
    ensure_alive(view, WidgetKind::Sketch)?;
    Ok(SketchWidget::new(layer.clone(), CreationMode::Update))
}

/// Creates every widget. Without a graphics layer there is no sketch widget.
pub fn create_widgets(
    view: &View,
    layer: Option<&GraphicsLayer>,
    config: &MapConfig,
) -> Result<WidgetSet, PointMapError> {
    let mut widgets = WidgetSet::new();
    widgets.insert(Box::new(create_home_widget(view)?));
    widgets.insert(Box::new(create_compass_widget(view)?));
    widgets.insert(Box::new(create_locate_widget(view, config)?));
    widgets.insert(Box::new(create_search_widget(view, config)?));
    widgets.insert(Box::new(create_scale_bar_widget(view)?));
    widgets.insert(Box::new(create_fullscreen_widget(view)?));
    widgets.insert(Box::new(create_basemap_gallery_widget(view, config)?));
    widgets.insert(Box::new(create_coordinate_conversion_widget(view)?));
    widgets.insert(Box::new(create_measurement_widget(view)?));

    match layer {
        Some(layer) => {
            widgets.insert(Box::new(create_sketch_widget(view, layer)?));
        }
        None => log::debug!("No graphics layer, sketch widget is not created"),
    }

    Ok(widgets)
}

/// Places the default widgets on the view.
pub fn attach_default_widgets(view: &mut View, widgets: &WidgetSet) {
    for kind in widgets.kinds().filter(WidgetKind::is_placed_by_default) {
        view.ui_mut().add(kind, kind.position());
    }
}

/// Destroys every widget, then the view.
///
/// Destroyed widgets are removed from the set, so nothing is destroyed twice. A failure is logged
/// and returned, and does not stop the rest of the teardown.
pub fn destroy_all(widgets: &mut WidgetSet, view: Option<&mut View>) -> Vec<PointMapError> {
    let mut failures = vec![];
    for kind in WidgetKind::ALL {
        let Some(mut widget) = widgets.take(kind) else {
            continue;
        };

        if let Err(err) = widget.destroy() {
            log::warn!("Failed to destroy the {kind} widget: {err}");
            failures.push(err);
        }
    }

    if let Some(view) = view.filter(|view| view.is_alive()) {
        if let Err(err) = view.destroy() {
            log::warn!("Failed to destroy the view: {err}");
            failures.push(err);
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use assert_matches::assert_matches;

    use super::*;
    use crate::widget::tests::counting_set;

    fn view() -> View {
        create_view(MapBuilder::default().build(), None).expect("default container")
    }

    #[test]
    fn default_container() {
        assert_eq!(view().container(), "viewDiv");
        assert!(matches!(
            create_view(MapBuilder::default().build(), Some(" ")),
            Err(PointMapError::MissingContainer(_))
        ));
    }

    #[test]
    fn widgets_with_and_without_layer() {
        let view = view();
        let config = MapConfig::default();

        let widgets = create_widgets(&view, None, &config).expect("live view");
        assert_eq!(widgets.len(), 9);
        assert!(!widgets.contains(WidgetKind::Sketch));

        let layer = create_graphics_layer(&[]);
        let widgets = create_widgets(&view, Some(&layer), &config).expect("live view");
        assert_eq!(widgets.len(), WidgetKind::ALL.len());
    }

    #[test]
    fn destroyed_view_fails_widget_construction() {
        let mut view = view();
        view.destroy().expect("live view");

        assert_matches!(
            create_search_widget(&view, &MapConfig::default()),
            Err(PointMapError::WidgetConstruction {
                widget: WidgetKind::Search,
                ..
            })
        );
    }

    #[test]
    fn seven_widgets_placed_by_default() {
        let mut view = view();
        let layer = create_graphics_layer(&[]);
        let widgets = create_widgets(&view, Some(&layer), &MapConfig::default()).expect("live");
        attach_default_widgets(&mut view, &widgets);

        assert_eq!(view.ui().len(), 7);
        for kind in [
            WidgetKind::BasemapGallery,
            WidgetKind::Measurement,
            WidgetKind::Sketch,
        ] {
            assert!(!view.ui().contains(kind));
        }
    }

    #[test]
    fn teardown_continues_past_failures() {
        let (mut widgets, counters) = counting_set(
            &WidgetKind::ALL,
            &[WidgetKind::Compass, WidgetKind::Sketch],
        );
        let mut view = view();

        let failures = destroy_all(&mut widgets, Some(&mut view));
        assert_eq!(failures.len(), 2);
        assert!(widgets.is_empty());
        assert!(!view.is_alive());

        let failures = destroy_all(&mut widgets, Some(&mut view));
        assert!(failures.is_empty());

        for (kind, counter) in counters {
            assert_eq!(counter.load(Ordering::SeqCst), 1, "{kind}");
        }
    }
}
