//! The reactive map element
//!
//! [`MapElement`] owns the observable attributes and keeps one backend map in
//! sync with them. The host sets attributes, mounts a backend once and then
//! calls [`MapElement::poll`] from its event loop; everything else (delayed
//! clicks, resize debouncing, update cycles, notifications) happens inside
//! `poll`.

pub mod click;
pub mod notify;
pub mod resize;

use crate::{
    core::{
        config::ElementConfig,
        geo::{LatLng, LatLngBounds},
        schema::{self, AttributeValue},
        state::{MapViewState, MarkerInformation, Property, PropertyChanges},
    },
    input::events::MapEvent,
    layers::base::LayerId,
    runtime::{Clock, SystemClock, TimerQueue},
    traits::MapBackend,
    ui::popup::Popup,
    MapError, Result,
};
use click::{ClickState, ClickTransition};
use futures::channel::oneshot;
use notify::{ElementEvent, Notification, NotificationBus, TilesLoaded};
use resize::{ResizeListener, WindowEvents, WindowSignal};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::time::Duration;

/// Shared handle to the live backend map
pub struct MapHandle<B>(Rc<RefCell<B>>);

impl<B> MapHandle<B> {
    pub fn new(backend: B) -> Self {
        Self(Rc::new(RefCell::new(backend)))
    }

    pub fn borrow(&self) -> Ref<'_, B> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, B> {
        self.0.borrow_mut()
    }

    /// Whether both handles refer to the same map
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<B> Clone for MapHandle<B> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<B: std::fmt::Debug> std::fmt::Debug for MapHandle<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MapHandle").field(&self.0).finish()
    }
}

/// Deferred work of the element
#[derive(Debug, Clone, Copy, PartialEq)]
enum ElementTimer {
    DelayedClick(LatLng),
    Resize,
    InitialResize,
}

/// First backend failure of a batch of independent steps
#[derive(Default)]
struct StepFailures {
    first: Option<MapError>,
}

impl StepFailures {
    fn record(&mut self, step: &str, result: Result<()>) {
        if let Err(err) = result {
            log::warn!("{} failed: {}", step, err);
            self.first.get_or_insert(err);
        }
    }

    fn finish(self) -> Result<()> {
        self.first.map_or(Ok(()), Err)
    }
}

pub struct MapElement<B: MapBackend, C: Clock = SystemClock> {
    config: ElementConfig,
    state: MapViewState,
    /// State as of the last update cycle, `None` before the first one
    committed: Option<MapViewState>,
    update_requested: bool,
    map: Option<MapHandle<B>>,
    tile_layer: Option<LayerId>,
    center_marker: Option<LayerId>,
    radius_layer: Option<LayerId>,
    marker_layers: Vec<LayerId>,
    click: ClickState,
    timers: TimerQueue<ElementTimer>,
    clock: C,
    window: WindowEvents,
    resize: Option<ResizeListener>,
    tiles_waiting: Vec<oneshot::Sender<()>>,
    notifications: NotificationBus<B>,
}

impl<B: MapBackend> MapElement<B, SystemClock> {
    pub fn new(window: WindowEvents) -> Self {
        Self::with_clock(window, SystemClock)
    }
}

impl<B: MapBackend, C: Clock> MapElement<B, C> {
    pub fn with_clock(window: WindowEvents, clock: C) -> Self {
        Self::with_config(ElementConfig::default(), window, clock)
    }

    pub fn with_config(config: ElementConfig, window: WindowEvents, clock: C) -> Self {
        Self {
            config,
            state: MapViewState::default(),
            committed: None,
            update_requested: true,
            map: None,
            tile_layer: None,
            center_marker: None,
            radius_layer: None,
            marker_layers: Vec::new(),
            click: ClickState::Idle,
            timers: TimerQueue::new(),
            clock,
            window,
            resize: None,
            tiles_waiting: Vec::new(),
            notifications: NotificationBus::new(),
        }
    }

    /// HTML attribute names the element reacts to
    pub fn observed_attributes() -> Vec<&'static str> {
        schema::observed_attributes()
    }

    // ---------------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------------

    pub fn state(&self) -> &MapViewState {
        &self.state
    }

    pub fn config(&self) -> &ElementConfig {
        &self.config
    }

    /// Sets one property from a typed value
    pub fn set_property(&mut self, property: Property, value: AttributeValue) -> Result<()> {
        if self.state.set(property, value)? {
            log::debug!("{} changed", property);
            self.update_requested = true;
        }
        Ok(())
    }

    /// Sets one property from HTML attribute text; `None` removes the attribute
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        let spec = schema::lookup(name)
            .ok_or_else(|| MapError::UnknownAttribute(name.to_string()))?;
        let value = spec.parse(value)?;
        self.set_property(spec.property, value)
    }

    // Typed setters cannot mismatch; a rejected value is only logged
    fn set_typed(&mut self, property: Property, value: AttributeValue) {
        if let Err(err) = self.set_property(property, value) {
            log::debug!("ignored {}: {}", property, err);
        }
    }

    pub fn set_latitude(&mut self, latitude: f64) {
        self.set_typed(Property::Latitude, AttributeValue::Number(latitude));
    }

    pub fn set_longitude(&mut self, longitude: f64) {
        self.set_typed(Property::Longitude, AttributeValue::Number(longitude));
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.set_latitude(center.lat);
        self.set_longitude(center.lng);
    }

    /// Radius circle in meters; 0 hides it, negative values are rejected
    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        self.set_property(Property::Radius, AttributeValue::Number(radius))
    }

    pub fn set_markers(&mut self, markers: Vec<MarkerInformation>) {
        self.set_typed(Property::Markers, AttributeValue::Markers(markers));
    }

    pub fn set_selected_marker(&mut self, marker: Option<MarkerInformation>) {
        self.set_typed(Property::SelectedMarker, AttributeValue::Marker(marker));
    }

    pub fn set_update_center_on_click(&mut self, enabled: bool) {
        self.set_typed(Property::UpdateCenterOnClick, AttributeValue::Boolean(enabled));
    }

    /// Only read when the tile layer is created on mount
    pub fn set_detect_retina(&mut self, enabled: bool) {
        self.set_typed(Property::DetectRetina, AttributeValue::Boolean(enabled));
    }

    pub fn set_default_zoom(&mut self, zoom: i32) {
        self.set_typed(Property::DefaultZoom, AttributeValue::Integer(zoom as i64));
    }

    /// Only read when the tile layer is created on mount
    pub fn set_max_zoom(&mut self, zoom: i32) {
        self.set_typed(Property::MaxZoom, AttributeValue::Integer(zoom as i64));
    }

    // ---------------------------------------------------------------------
    // Surface
    // ---------------------------------------------------------------------

    /// The live map, once mounted
    pub fn map(&self) -> Option<&MapHandle<B>> {
        self.map.as_ref()
    }

    /// Registers a notification listener; returns `false` for unknown names
    pub fn on<F>(&mut self, name: &str, callback: F) -> bool
    where
        F: FnMut(&Notification<B>) + 'static,
    {
        self.notifications.on(name, callback)
    }

    /// Notifications dispatched since the previous call
    pub fn take_notifications(&mut self) -> Vec<Notification<B>> {
        self.notifications.take()
    }

    /// Shadow template
    pub fn render(&self) -> String {
        self.config.style.template()
    }

    /// Shadow stylesheet
    pub fn styles(&self) -> String {
        self.config.style.stylesheet()
    }

    pub fn is_connected(&self) -> bool {
        self.resize.is_some()
    }

    pub fn is_mounted(&self) -> bool {
        self.map.is_some()
    }

    pub fn is_click_pending(&self) -> bool {
        self.click.is_pending()
    }

    pub fn is_resize_pending(&self) -> bool {
        self.resize.as_ref().is_some_and(|r| r.pending.is_some())
    }

    pub fn is_update_requested(&self) -> bool {
        self.update_requested
    }

    /// Earliest instant at which `poll` has timer work to do
    pub fn next_deadline(&self) -> Option<instant::Instant> {
        self.timers.next_deadline()
    }

    pub fn center_marker(&self) -> Option<&str> {
        self.center_marker.as_deref()
    }

    pub fn radius_layer(&self) -> Option<&str> {
        self.radius_layer.as_deref()
    }

    pub fn marker_layers(&self) -> &[LayerId] {
        &self.marker_layers
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Attaches the window resize listener
    pub fn connect(&mut self) {
        if self.resize.is_some() {
            return;
        }
        let listener = ResizeListener::subscribe(&self.window);
        log::debug!("connected, resize listener {:?}", listener.id());
        self.resize = Some(listener);
    }

    /// Detaches the resize listener and drops pending deferred work
    pub fn disconnect(&mut self) {
        let Some(listener) = self.resize.take() else {
            return;
        };

        self.window.unsubscribe(listener.id());
        if let Some(timer) = listener.pending {
            self.timers.cancel(timer);
        }
        if let Some(timer) = self.click.cancel() {
            self.timers.cancel(timer);
        }
        log::debug!("disconnected, resize listener {:?}", listener.id());
    }

    /// Creates the map on first attachment
    pub fn mount(&mut self, backend: B) -> Result<MapHandle<B>> {
        if self.map.is_some() {
            return Err(MapError::AlreadyMounted);
        }

        let handle = MapHandle::new(backend);
        self.map = Some(handle.clone());

        {
            let mut map = handle.borrow_mut();
            map.when_ready();
            map.disable_tap_hold();

            let tile_options = self
                .config
                .tile_layer
                .with_attributes(self.state.detect_retina, self.state.max_zoom);
            self.tile_layer = Some(map.add_tile_layer(&tile_options)?);
            map.add_scale_control()?;
        }

        self.center_map()?;
        self.update_center_marker()?;
        self.update_radius_layer()?;
        self.fit_bounds()?;

        // let the host lay out once, then resize
        self.timers
            .schedule(self.clock.now(), Duration::ZERO, ElementTimer::InitialResize);

        self.committed = None;
        self.update_requested = true;
        log::debug!("mounted");
        Ok(handle)
    }

    /// Runs one update cycle against the last committed state
    pub fn update(&mut self) -> Result<()> {
        let changes = match &self.committed {
            Some(previous) => PropertyChanges::between(previous, &self.state),
            None => PropertyChanges::all(),
        };
        self.committed = Some(self.state.clone());
        self.update_requested = false;

        self.updated(&changes)
    }

    /// Applies a change set to the map.
    ///
    /// Steps are independent: a failing backend call is logged, the remaining
    /// steps still run, and the first failure is returned.
    pub fn updated(&mut self, changes: &PropertyChanges) -> Result<()> {
        use Property::*;

        let mut failures = StepFailures::default();
        failures.record("map size", self.update_map_size());

        if changes.has_any(&[Latitude, Longitude]) {
            failures.record("center marker", self.update_center_marker());
        }
        if changes.has_any(&[Latitude, Longitude, Radius]) {
            failures.record("radius", self.update_radius_layer());
        }
        if changes.has(Markers) {
            failures.record("markers", self.update_markers());
        }
        if changes.has(SelectedMarker) {
            failures.record("selection", self.mark_selected_marker());
        }
        if changes.has_any(&[Latitude, Longitude, Radius, Markers]) {
            failures.record("fit bounds", self.fit_bounds());
        }
        failures.finish()
    }

    /// Drives timers, backend events, window signals and pending updates.
    ///
    /// Every phase runs even if an earlier one hit a backend error; the first
    /// error is returned.
    pub fn poll(&mut self) -> Result<()> {
        let mut failures = StepFailures::default();
        failures.record("timers", self.fire_due_timers());
        failures.record("map events", self.dispatch_map_events());
        self.drain_window_signals();
        failures.record("timers", self.fire_due_timers());

        if self.update_requested {
            failures.record("update", self.update());
        }
        failures.finish()
    }

    // ---------------------------------------------------------------------
    // Event handling
    // ---------------------------------------------------------------------

    // Due timers are already out of the queue, so each one runs regardless of the others
    fn fire_due_timers(&mut self) -> Result<()> {
        let mut failures = StepFailures::default();
        for (id, timer) in self.timers.take_due(self.clock.now()) {
            match timer {
                ElementTimer::DelayedClick(_) => {
                    if let Some(lat_lng) = self.click.fire(id) {
                        failures.record("delayed click", self.on_map_click(lat_lng));
                    }
                }
                ElementTimer::Resize => {
                    let current = self.resize.as_mut().filter(|r| r.pending == Some(id));
                    if let Some(listener) = current {
                        listener.pending = None;
                        failures.record("resize", self.handle_resize());
                    }
                }
                ElementTimer::InitialResize => {
                    self.window.dispatch(WindowSignal::Resize);
                }
            }
        }
        failures.finish()
    }

    fn dispatch_map_events(&mut self) -> Result<()> {
        let Some(handle) = self.map.clone() else {
            return Ok(());
        };
        let events = handle.borrow_mut().process_events();

        for event in events {
            match event {
                MapEvent::Ready => {
                    self.notifications
                        .dispatch(ElementEvent::MapReady(handle.clone()));
                }
                MapEvent::Click { lat_lng } => self.on_raw_click(lat_lng),
                MapEvent::DoubleClick { .. } => {
                    if let Some(timer) = self.click.cancel() {
                        log::debug!("double click, dropping pending click");
                        self.timers.cancel(timer);
                    }
                }
                MapEvent::TileLoading { layer_id } if self.is_tile_layer(&layer_id) => {
                    let (tx, loaded) = TilesLoaded::channel();
                    self.tiles_waiting.push(tx);
                    self.notifications
                        .dispatch(ElementEvent::TilesLoading(loaded));
                }
                MapEvent::TileLoad { layer_id } if self.is_tile_layer(&layer_id) => {
                    for tx in self.tiles_waiting.drain(..) {
                        // the receiver may be gone, nobody awaits it then
                        let _ = tx.send(());
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn is_tile_layer(&self, layer_id: &str) -> bool {
        self.tile_layer.as_deref() == Some(layer_id)
    }

    fn on_raw_click(&mut self, lat_lng: LatLng) {
        match self.click.click(lat_lng) {
            ClickTransition::Schedule(lat_lng) => {
                let timer = self.timers.schedule(
                    self.clock.now(),
                    self.config.click_delay(),
                    ElementTimer::DelayedClick(lat_lng),
                );
                self.click.arm(timer, lat_lng);
            }
            ClickTransition::Cancel(timer) => {
                log::debug!("second click, dropping pending click");
                self.timers.cancel(timer);
            }
        }
    }

    fn on_map_click(&mut self, lat_lng: LatLng) -> Result<()> {
        if !self.state.update_center_on_click {
            return Ok(());
        }

        self.set_latitude(lat_lng.lat);
        self.set_longitude(lat_lng.lng);
        let placed = self.update_center_marker();

        let center = self.state.center();
        self.notifications
            .dispatch(ElementEvent::CenterUpdated(center));
        placed
    }

    fn drain_window_signals(&mut self) {
        let now = self.clock.now();
        let debounce = self.config.resize_debounce();
        let Some(listener) = self.resize.as_mut() else {
            return;
        };

        for _ in 0..listener.drain() {
            if let Some(timer) = listener.pending.take() {
                self.timers.cancel(timer);
            }
            listener.pending = Some(self.timers.schedule(now, debounce, ElementTimer::Resize));
        }
    }

    fn handle_resize(&mut self) -> Result<()> {
        if !self.has_valid_map_data() {
            return Ok(());
        }
        self.update_map_size()?;
        self.fit_bounds()
    }

    // ---------------------------------------------------------------------
    // Map synchronisation
    // ---------------------------------------------------------------------

    fn coordinate_usable(&self, value: f64) -> bool {
        !value.is_nan() && (self.config.allow_zero_coordinates || value != 0.0)
    }

    /// A map exists and the center coordinate is usable
    fn has_valid_map_data(&self) -> bool {
        self.map.is_some()
            && self.coordinate_usable(self.state.latitude)
            && self.coordinate_usable(self.state.longitude)
    }

    /// The map, if the center coordinate is usable
    fn valid_map(&self) -> Option<MapHandle<B>> {
        if self.has_valid_map_data() {
            self.map.clone()
        } else {
            log::debug!(
                "skipping map sync: mounted={} center={:?}",
                self.map.is_some(),
                self.state.center()
            );
            None
        }
    }

    fn center_map(&mut self) -> Result<()> {
        let Some(handle) = self.valid_map() else {
            return Ok(());
        };
        let mut map = handle.borrow_mut();
        let zoom = map
            .zoom()
            .filter(|zoom| *zoom != 0.0)
            .unwrap_or(self.state.default_zoom as f64);
        map.set_view(self.state.center(), zoom)
    }

    fn update_map_size(&mut self) -> Result<()> {
        match &self.map {
            Some(handle) => handle.borrow_mut().invalidate_size(),
            None => Ok(()),
        }
    }

    fn update_center_marker(&mut self) -> Result<()> {
        let Some(handle) = self.valid_map() else {
            return Ok(());
        };
        let mut map = handle.borrow_mut();

        if let Some(previous) = self.center_marker.take() {
            map.remove_layer(&previous)?;
        }

        let center = self.state.center();
        self.center_marker = Some(map.add_marker(center, Some(&self.config.center_icon))?);
        map.pan_to(center)
    }

    fn update_radius_layer(&mut self) -> Result<()> {
        let Some(handle) = self.valid_map() else {
            return Ok(());
        };
        let mut map = handle.borrow_mut();

        if let Some(previous) = self.radius_layer.take() {
            map.remove_layer(&previous)?;
        }
        if self.state.radius > 0.0 {
            self.radius_layer = Some(map.add_circle(
                self.state.center(),
                self.state.radius,
                &self.config.radius_style,
            )?);
        }
        Ok(())
    }

    fn update_markers(&mut self) -> Result<()> {
        let Some(handle) = self.valid_map() else {
            return Ok(());
        };
        let mut map = handle.borrow_mut();

        for previous in self.marker_layers.drain(..) {
            map.remove_layer(&previous)?;
        }

        for marker in &self.state.markers {
            let layer_id = map.add_marker(marker.position(), None)?;
            self.marker_layers.push(layer_id.clone());
            if let Some(popup) = Popup::for_marker(marker) {
                map.bind_popup(&layer_id, popup.content())?;
            }
        }
        log::debug!("placed {} markers", self.marker_layers.len());
        Ok(())
    }

    fn mark_selected_marker(&mut self) -> Result<()> {
        let Some(selected) = &self.state.selected_marker else {
            return Ok(());
        };
        let Some(handle) = &self.map else {
            return Ok(());
        };
        let mut map = handle.borrow_mut();

        let position = selected.position();
        let found = self
            .marker_layers
            .iter()
            .find(|id| map.layer_position(id) == Some(position));

        match found {
            Some(layer_id) => {
                map.open_popup(layer_id)?;
                map.pan_to(position)
            }
            None => {
                log::debug!("no marker at selected position {:?}", position);
                Ok(())
            }
        }
    }

    fn fit_bounds(&mut self) -> Result<()> {
        let Some(handle) = self.valid_map() else {
            return Ok(());
        };
        let mut map = handle.borrow_mut();

        let bounds = match &self.radius_layer {
            Some(radius) => map.layer_bounds(radius),
            None => LatLngBounds::from_points(
                self.marker_layers
                    .iter()
                    .filter_map(|id| map.layer_position(id)),
            ),
        };

        match bounds {
            Some(bounds) => map.fit_bounds(&bounds),
            None => Ok(()),
        }
    }
}

impl<B: MapBackend, C: Clock> Drop for MapElement<B, C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
