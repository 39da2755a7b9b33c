//! # map-element
//!
//! A reactive map element. It owns a handful of observable attributes
//! (center coordinate, radius, markers, selection and a few flags) and keeps
//! one underlying map in sync with them through a pluggable [`MapBackend`].
//!
//! The crate ships a headless in-memory backend ([`Map`]) so the element can
//! be driven and tested without a browser, and a Leaflet.js backend for the
//! web behind the `wasm` feature.

pub mod core;
pub mod element;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod traits;
pub mod ui;

#[cfg(feature = "wasm")]
pub mod web;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::ElementConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{Map, MapOptions, MapStats},
    schema::{AttributeKind, AttributeSpec, AttributeValue},
    state::{MapViewState, MarkerInformation, Property, PropertyChanges},
    viewport::Viewport,
};

pub use element::{
    notify::{ElementEvent, Notification, TilesLoaded},
    resize::{WindowEvents, WindowSignal},
    MapElement, MapHandle,
};

pub use input::events::MapEvent;

pub use layers::{circle::Circle, marker::Marker, tile::TileLayer};

pub use runtime::{Clock, ManualClock, SystemClock, TimerQueue};

pub use traits::MapBackend;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Attribute `{name}` expects a {expected} value")]
    AttributeType {
        name: &'static str,
        expected: &'static str,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Element is already mounted")]
    AlreadyMounted,

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Error type alias for convenience
pub type Error = MapError;
