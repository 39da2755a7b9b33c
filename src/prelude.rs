//! Prelude module for common map-element types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use map_element::prelude::*;`

pub use crate::core::{
    config::{CircleOptions, ElementConfig, MarkerIcon, TileLayerOptions},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{Map, MapOptions, MapStats},
    schema::{AttributeKind, AttributeSpec, AttributeValue, ATTRIBUTES},
    state::{MapViewState, MarkerInformation, Property, PropertyChanges},
    viewport::Viewport,
};

pub use crate::element::{
    notify::{ElementEvent, Notification, TilesLoaded},
    resize::{ListenerId, WindowEvents, WindowSignal},
    MapElement, MapHandle,
};

pub use crate::layers::{
    base::{LayerId, LayerTrait, LayerType},
    circle::Circle,
    manager::LayerManager,
    marker::Marker,
    tile::TileLayer,
};

pub use crate::input::{events::MapEvent, handler::EventManager};

pub use crate::runtime::{Clock, ManualClock, SystemClock, TimerId, TimerQueue};

pub use crate::traits::MapBackend;

pub use crate::ui::{controls::ScaleControl, popup::Popup, style::ElementStyle};

pub use crate::{Error as MapError, Result};

pub use instant::Instant;
pub use std::{collections::VecDeque, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
