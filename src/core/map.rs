//! Headless map engine
//!
//! An in-memory [`MapBackend`] that keeps a viewport, a layer stack and an
//! event queue the way a browser map would, without drawing or fetching
//! anything. Hosts simulate layout and input through `set_container_size`,
//! `click_at` and friends, and read back what happened through the layer
//! accessors and [`MapStats`].

use crate::{
    core::{
        config::{CircleOptions, MarkerIcon, TileLayerOptions},
        constants::DEFAULT_MAX_ZOOM,
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    input::{EventManager, MapEvent},
    layers::{
        base::{LayerId, LayerTrait, LayerType},
        circle::Circle,
        manager::LayerManager,
        marker::Marker,
        tile::TileLayer,
    },
    traits::MapBackend,
    ui::controls::ScaleControl,
    MapError, Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Initial size of the map container in CSS pixels
    pub container_size: Point,
    /// Ratio of physical to CSS pixels, above 1 on high density screens
    pub device_pixel_ratio: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Padding in pixels kept free on each side by `fit_bounds`
    pub fit_padding: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            container_size: Point::new(800.0, 600.0),
            device_pixel_ratio: 1.0,
            min_zoom: 0.0,
            max_zoom: DEFAULT_MAX_ZOOM as f64,
            fit_padding: 0.0,
        }
    }
}

/// Counters of the view operations a map has performed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MapStats {
    pub size_invalidations: u64,
    pub bounds_fits: u64,
    pub pans: u64,
    pub view_sets: u64,
}

#[derive(Debug)]
pub struct Map {
    viewport: Viewport,
    options: MapOptions,
    /// Size reported by host layout, applied on `invalidate_size`
    container_size: Point,
    layer_manager: LayerManager,
    event_manager: EventManager,
    scale_control: Option<ScaleControl>,
    has_view: bool,
    /// `when_ready` calls still waiting for the first view
    pending_ready: usize,
    tap_hold: bool,
    next_layer_id: u64,
    stats: MapStats,
}

impl Map {
    pub fn new(options: MapOptions) -> Self {
        let mut viewport = Viewport::new(LatLng::default(), options.min_zoom, options.container_size);
        viewport.set_zoom_limits(options.min_zoom, options.max_zoom);

        Self {
            viewport,
            container_size: options.container_size,
            options,
            layer_manager: LayerManager::new(),
            event_manager: EventManager::new(),
            scale_control: None,
            has_view: false,
            pending_ready: 0,
            tap_hold: true,
            next_layer_id: 0,
            stats: MapStats::default(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn stats(&self) -> MapStats {
        self.stats
    }

    pub fn has_view(&self) -> bool {
        self.has_view
    }

    pub fn tap_hold_enabled(&self) -> bool {
        self.tap_hold
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layer_manager
    }

    /// Register an event listener on the engine's own event stream
    pub fn on<F>(&mut self, event_type: &'static str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.event_manager.on(event_type, callback);
    }

    /// Simulates the host resizing the map container
    pub fn set_container_size(&mut self, size: Point) {
        self.container_size = size;
    }

    /// Simulates a click at a container pixel, returning its coordinate
    pub fn click_at(&mut self, pixel: Point) -> LatLng {
        let lat_lng = self.viewport.pixel_to_lat_lng(&pixel);
        self.click_lat_lng(lat_lng);
        lat_lng
    }

    /// Simulates a click at a geographic position
    pub fn click_lat_lng(&mut self, lat_lng: LatLng) {
        self.event_manager.emit(MapEvent::Click { lat_lng });
    }

    /// Simulates a double click: two clicks, a `dblclick`, then a zoom in around the pixel
    pub fn double_click_at(&mut self, pixel: Point) -> LatLng {
        let lat_lng = self.viewport.pixel_to_lat_lng(&pixel);
        self.event_manager.emit(MapEvent::Click { lat_lng });
        self.event_manager.emit(MapEvent::Click { lat_lng });
        self.event_manager.emit(MapEvent::DoubleClick { lat_lng });

        if self.has_view {
            let zoom = self.viewport.zoom + 1.0;
            self.zoom_around(zoom, pixel);
        }
        lat_lng
    }

    /// Simulates every pending tile request finishing
    pub fn complete_tile_loading(&mut self) {
        let mut finished = Vec::new();
        self.layer_manager.for_each_layer_mut(|layer| {
            if let Some(tiles) = layer.as_any_mut().downcast_mut::<TileLayer>() {
                if tiles.complete_loading() {
                    finished.push(tiles.id().to_string());
                }
            }
        });

        for layer_id in finished {
            self.event_manager.emit(MapEvent::TileLoad { layer_id });
        }
    }

    pub fn markers(&self) -> Vec<&Marker> {
        self.layers_as(LayerType::Marker)
    }

    pub fn circles(&self) -> Vec<&Circle> {
        self.layers_as(LayerType::Circle)
    }

    pub fn tile_layers(&self) -> Vec<&TileLayer> {
        self.layers_as(LayerType::Tile)
    }

    /// Id of the layer whose popup is currently open
    pub fn open_popup_layer(&self) -> Option<LayerId> {
        self.layer_manager
            .layers()
            .into_iter()
            .find(|layer| layer.popup().is_some_and(|popup| popup.is_open()))
            .map(|layer| layer.id().to_string())
    }

    pub fn scale_control(&self) -> Option<&ScaleControl> {
        self.scale_control.as_ref()
    }

    pub fn scale_label(&self) -> Option<String> {
        self.scale_control.as_ref().and_then(ScaleControl::label)
    }

    fn layers_as<T: 'static>(&self, layer_type: LayerType) -> Vec<&T> {
        self.layer_manager
            .layers_of_type(layer_type)
            .into_iter()
            .filter_map(|layer| layer.as_any().downcast_ref::<T>())
            .collect()
    }

    fn next_id(&mut self, layer_type: LayerType) -> LayerId {
        self.next_layer_id += 1;
        format!("{}_{}", layer_type, self.next_layer_id)
    }

    fn insert_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<LayerId> {
        let layer_id = layer.id().to_string();
        log::trace!("add {} layer {}", layer.layer_type(), layer_id);
        self.layer_manager.add_layer(layer)?;
        self.event_manager.emit(MapEvent::LayerAdd {
            layer_id: layer_id.clone(),
        });
        Ok(layer_id)
    }

    fn zoom_around(&mut self, zoom: f64, focus: Point) {
        let zoom = zoom.clamp(self.viewport.min_zoom, self.viewport.max_zoom);
        let scale = 2_f64.powf(zoom - self.viewport.zoom);
        let view_half = self.viewport.size * 0.5;
        let offset = (focus - view_half) * (1.0 - 1.0 / scale);
        let center = self.viewport.pixel_to_lat_lng(&(view_half + offset));

        self.apply_view(center, zoom);
    }

    /// Moves the viewport and runs everything that follows a view change
    fn apply_view(&mut self, center: LatLng, zoom: f64) {
        let old_center = self.viewport.center;
        let old_zoom = self.viewport.zoom;

        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);

        let first_view = !self.has_view;
        self.has_view = true;

        if first_view || self.viewport.center != old_center || self.viewport.zoom != old_zoom {
            self.event_manager.emit(MapEvent::ViewChanged {
                center: self.viewport.center,
                zoom: self.viewport.zoom,
            });
        }

        if first_view {
            self.flush_ready();
        }
        self.refresh_view_dependents();
    }

    fn flush_ready(&mut self) {
        for _ in 0..std::mem::take(&mut self.pending_ready) {
            self.event_manager.emit(MapEvent::Ready);
        }
    }

    fn refresh_view_dependents(&mut self) {
        if !self.has_view {
            return;
        }

        let viewport = self.viewport.clone();
        let mut started = Vec::new();
        self.layer_manager.for_each_layer_mut(|layer| {
            if let Some(tiles) = layer.as_any_mut().downcast_mut::<TileLayer>() {
                if tiles.update(&viewport) {
                    started.push(tiles.id().to_string());
                }
            }
        });
        for layer_id in started {
            self.event_manager.emit(MapEvent::TileLoading { layer_id });
        }

        if let Some(scale) = &mut self.scale_control {
            scale.update(&viewport);
        }
    }

    fn check_center(center: &LatLng) -> Result<()> {
        if center.lat.is_finite() && center.lng.is_finite() {
            Ok(())
        } else {
            Err(MapError::InvalidCoordinates(format!(
                "{}, {}",
                center.lat, center.lng
            )))
        }
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new(MapOptions::default())
    }
}

impl MapBackend for Map {
    fn when_ready(&mut self) {
        self.pending_ready += 1;
        if self.has_view {
            self.flush_ready();
        }
    }

    fn disable_tap_hold(&mut self) {
        self.tap_hold = false;
    }

    fn add_tile_layer(&mut self, options: &TileLayerOptions) -> Result<LayerId> {
        let layer_id = self.next_id(LayerType::Tile);
        let layer = TileLayer::new(layer_id, options.clone(), self.options.device_pixel_ratio);
        let layer_id = self.insert_layer(Box::new(layer))?;
        self.refresh_view_dependents();
        Ok(layer_id)
    }

    fn add_scale_control(&mut self) -> Result<()> {
        let mut scale = ScaleControl::new();
        if self.has_view {
            scale.update(&self.viewport);
        }
        self.scale_control = Some(scale);
        Ok(())
    }

    fn zoom(&self) -> Option<f64> {
        self.has_view.then_some(self.viewport.zoom)
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        Self::check_center(&center)?;
        log::trace!("set view {:?} @ {}", center, zoom);
        self.stats.view_sets += 1;
        self.apply_view(center, zoom);
        Ok(())
    }

    fn pan_to(&mut self, center: LatLng) -> Result<()> {
        Self::check_center(&center)?;
        log::trace!("pan to {:?}", center);
        self.stats.pans += 1;
        let zoom = self.viewport.zoom;
        self.apply_view(center, zoom);
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: &LatLngBounds) -> Result<()> {
        Self::check_center(&bounds.south_west)?;
        Self::check_center(&bounds.north_east)?;

        let zoom = self.viewport.bounds_zoom(bounds, self.options.fit_padding);
        log::trace!("fit bounds {:?} -> zoom {}", bounds, zoom);
        self.stats.bounds_fits += 1;
        self.apply_view(bounds.center(), zoom);
        Ok(())
    }

    fn invalidate_size(&mut self) -> Result<()> {
        self.stats.size_invalidations += 1;
        if self.viewport.size != self.container_size {
            log::trace!("container resized to {:?}", self.container_size);
            self.viewport.set_size(self.container_size);
            self.refresh_view_dependents();
        }
        Ok(())
    }

    fn add_marker(&mut self, position: LatLng, icon: Option<&MarkerIcon>) -> Result<LayerId> {
        Self::check_center(&position)?;
        let layer_id = self.next_id(LayerType::Marker);
        let mut marker = Marker::new(layer_id, position);
        if let Some(icon) = icon {
            marker = marker.with_icon(icon.clone());
        }
        self.insert_layer(Box::new(marker))
    }

    fn add_circle(
        &mut self,
        center: LatLng,
        radius: f64,
        options: &CircleOptions,
    ) -> Result<LayerId> {
        Self::check_center(&center)?;
        let layer_id = self.next_id(LayerType::Circle);
        self.insert_layer(Box::new(Circle::new(layer_id, center, radius, *options)))
    }

    fn remove_layer(&mut self, layer_id: &str) -> Result<()> {
        self.layer_manager.remove_layer(layer_id)?;
        log::trace!("removed layer {}", layer_id);
        self.event_manager.emit(MapEvent::LayerRemove {
            layer_id: layer_id.to_string(),
        });
        Ok(())
    }

    fn bind_popup(&mut self, layer_id: &str, html: &str) -> Result<()> {
        let bound = self
            .layer_manager
            .with_layer_mut(layer_id, |layer| {
                layer
                    .as_any_mut()
                    .downcast_mut::<Marker>()
                    .map(|marker| marker.bind_popup(html))
                    .is_some()
            })
            .ok_or_else(|| MapError::LayerNotFound(layer_id.to_string()))?;

        if bound {
            Ok(())
        } else {
            Err(MapError::Backend(format!(
                "layer {} cannot hold a popup",
                layer_id
            )))
        }
    }

    fn open_popup(&mut self, layer_id: &str) -> Result<()> {
        let has_popup = self
            .layer_manager
            .get_layer(layer_id)
            .ok_or_else(|| MapError::LayerNotFound(layer_id.to_string()))?
            .popup()
            .is_some();

        if !has_popup {
            log::trace!("layer {} has no popup to open", layer_id);
            return Ok(());
        }

        // auto-close: only one popup is open at a time
        self.layer_manager.for_each_layer_mut(|layer| {
            let is_target = layer.id() == layer_id;
            if let Some(popup) = layer.popup_mut() {
                if is_target {
                    popup.open();
                } else {
                    popup.close();
                }
            }
        });

        self.event_manager.emit(MapEvent::PopupOpen {
            layer_id: layer_id.to_string(),
        });
        Ok(())
    }

    fn layer_position(&self, layer_id: &str) -> Option<LatLng> {
        self.layer_manager.get_layer(layer_id)?.position()
    }

    fn layer_bounds(&self, layer_id: &str) -> Option<LatLngBounds> {
        self.layer_manager.get_layer(layer_id)?.bounds()
    }

    fn process_events(&mut self) -> Vec<MapEvent> {
        self.event_manager.process_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn zurich() -> LatLng {
        LatLng::new(47.38991, 8.51604)
    }

    fn names(events: &[MapEvent]) -> Vec<&'static str> {
        events.iter().map(MapEvent::name).collect()
    }

    #[test]
    fn test_ready_waits_for_first_view() {
        let mut map = Map::default();
        map.when_ready();
        assert!(map.process_events().is_empty());
        assert_eq!(map.zoom(), None);

        map.set_view(zurich(), 16.0).unwrap();
        let events = map.process_events();
        assert_eq!(names(&events), vec!["viewchanged", "ready"]);
        assert_eq!(map.zoom(), Some(16.0));

        // already ready: immediate
        map.when_ready();
        assert_eq!(names(&map.process_events()), vec!["ready"]);
    }

    #[test]
    fn test_tile_loading_cycle() {
        let mut map = Map::default();
        let tiles = map.add_tile_layer(&TileLayerOptions::default()).unwrap();
        assert_eq!(names(&map.process_events()), vec!["layeradd"]);

        map.set_view(zurich(), 16.0).unwrap();
        let events = map.process_events();
        assert!(events.contains(&MapEvent::TileLoading {
            layer_id: tiles.clone()
        }));
        assert!(map.tile_layers()[0].is_loading());

        map.complete_tile_loading();
        assert_eq!(
            map.process_events(),
            vec![MapEvent::TileLoad { layer_id: tiles }]
        );
    }

    #[test]
    fn test_invalidate_size_applies_container_size() {
        let mut map = Map::default();
        map.set_view(zurich(), 12.0).unwrap();

        map.set_container_size(Point::new(400.0, 300.0));
        assert_eq!(map.viewport().size, Point::new(800.0, 600.0));

        map.invalidate_size().unwrap();
        assert_eq!(map.viewport().size, Point::new(400.0, 300.0));
        assert_eq!(map.stats().size_invalidations, 1);
    }

    #[test]
    fn test_fit_bounds_of_circle() {
        let mut map = Map::default();
        map.set_view(zurich(), 3.0).unwrap();
        let circle = map
            .add_circle(zurich(), 500.0, &CircleOptions::default())
            .unwrap();

        let bounds = map.layer_bounds(&circle).unwrap();
        map.fit_bounds(&bounds).unwrap();

        let visible = map.viewport().bounds();
        assert!(visible.contains(&bounds.south_west));
        assert!(visible.contains(&bounds.north_east));
        assert_eq!(map.stats().bounds_fits, 1);
        assert!(map.viewport().zoom >= 14.0);
    }

    #[test]
    fn test_popup_auto_close() {
        let mut map = Map::default();
        let a = map.add_marker(LatLng::new(1.0, 1.0), None).unwrap();
        let b = map.add_marker(LatLng::new(2.0, 2.0), None).unwrap();
        map.bind_popup(&a, "A").unwrap();
        map.bind_popup(&b, "B").unwrap();

        map.open_popup(&a).unwrap();
        assert_eq!(map.open_popup_layer(), Some(a.clone()));

        map.open_popup(&b).unwrap();
        assert_eq!(map.open_popup_layer(), Some(b));
        assert_eq!(map.markers().iter().filter(|m| m.is_popup_open()).count(), 1);
    }

    #[test]
    fn test_popup_errors() {
        let mut map = Map::default();
        let circle = map
            .add_circle(LatLng::new(1.0, 1.0), 10.0, &CircleOptions::default())
            .unwrap();

        assert!(matches!(
            map.bind_popup("marker_99", "x"),
            Err(MapError::LayerNotFound(_))
        ));
        assert!(matches!(
            map.bind_popup(&circle, "x"),
            Err(MapError::Backend(_))
        ));
        // no popup bound: nothing to open
        let marker = map.add_marker(LatLng::new(1.0, 1.0), None).unwrap();
        assert!(map.open_popup(&marker).is_ok());
        assert_eq!(map.open_popup_layer(), None);
    }

    #[test]
    fn test_remove_layer() {
        let mut map = Map::default();
        let marker = map.add_marker(zurich(), Some(&MarkerIcon::default())).unwrap();
        assert_eq!(map.markers().len(), 1);
        assert!(map.markers()[0].icon().is_some());

        map.remove_layer(&marker).unwrap();
        assert!(map.markers().is_empty());
        assert!(map.remove_layer(&marker).is_err());
        assert_eq!(map.layer_position(&marker), None);
    }

    #[test]
    fn test_double_click_sequence_and_zoom() {
        let mut map = Map::default();
        map.set_view(zurich(), 10.0).unwrap();
        map.process_events();

        let center_pixel = Point::new(400.0, 300.0);
        map.double_click_at(center_pixel);

        let events = map.process_events();
        assert_eq!(
            &names(&events)[..3],
            &["click", "click", "dblclick"]
        );
        assert_eq!(map.zoom(), Some(11.0));
        assert!((map.viewport().center.lat - zurich().lat).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let mut map = Map::default();
        assert!(matches!(
            map.set_view(LatLng::new(f64::NAN, 8.0), 10.0),
            Err(MapError::InvalidCoordinates(_))
        ));
        assert!(!map.has_view());
    }

    #[test]
    fn test_listeners_and_scale() {
        let mut map = Map::default();
        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = clicks.clone();
        map.on("click", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        map.add_scale_control().unwrap();
        assert_eq!(map.scale_label(), None);

        map.set_view(zurich(), 16.0).unwrap();
        assert!(map.scale_label().unwrap().starts_with("100 m"));

        map.click_at(Point::new(10.0, 10.0));
        map.process_events();
        assert_eq!(clicks.load(Ordering::SeqCst), 1);

        map.disable_tap_hold();
        assert!(!map.tap_hold_enabled());
    }
}
