//! Trait abstractions at the map-library seam
//!
//! The element drives any map implementation through [`MapBackend`]. The
//! headless [`crate::core::map::Map`] implements it in memory, the Leaflet
//! binding implements it over the browser's `L` global.

use crate::core::config::{CircleOptions, MarkerIcon, TileLayerOptions};
use crate::core::geo::{LatLng, LatLngBounds};
use crate::input::events::MapEvent;
use crate::layers::base::LayerId;
use crate::Result;

/// Imperative operations the element needs from a map library
///
/// Overlay-creating calls return the backend's id for the new layer. Events
/// the backend observes (clicks, readiness, tile progress) are queued and
/// handed over by [`MapBackend::process_events`].
pub trait MapBackend {
    /// Requests a [`MapEvent::Ready`] once the map has a view; immediately if it already has one
    fn when_ready(&mut self);

    /// Turns off long-press emulation on touch devices
    fn disable_tap_hold(&mut self) {}

    fn add_tile_layer(&mut self, options: &TileLayerOptions) -> Result<LayerId>;

    fn add_scale_control(&mut self) -> Result<()>;

    /// Current zoom, `None` while no view has been set
    fn zoom(&self) -> Option<f64>;

    fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()>;

    fn pan_to(&mut self, center: LatLng) -> Result<()>;

    fn fit_bounds(&mut self, bounds: &LatLngBounds) -> Result<()>;

    /// Re-reads the container size after layout changes
    fn invalidate_size(&mut self) -> Result<()>;

    /// Adds a marker, with the backend's default icon when `icon` is `None`
    fn add_marker(&mut self, position: LatLng, icon: Option<&MarkerIcon>) -> Result<LayerId>;

    /// Adds a circle with a radius in meters
    fn add_circle(
        &mut self,
        center: LatLng,
        radius: f64,
        options: &CircleOptions,
    ) -> Result<LayerId>;

    fn remove_layer(&mut self, layer_id: &str) -> Result<()>;

    fn bind_popup(&mut self, layer_id: &str, html: &str) -> Result<()>;

    fn open_popup(&mut self, layer_id: &str) -> Result<()>;

    /// Position of a point layer such as a marker
    fn layer_position(&self, layer_id: &str) -> Option<LatLng>;

    fn layer_bounds(&self, layer_id: &str) -> Option<LatLngBounds>;

    /// Drains the events observed since the previous call
    fn process_events(&mut self) -> Vec<MapEvent>;
}
