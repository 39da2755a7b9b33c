use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Map event types that can be emitted by a map backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MapEvent {
    /// The map has its first view
    Ready,
    /// Mouse/touch click on the map
    Click { lat_lng: LatLng },
    /// Double click on the map
    #[serde(rename = "dblclick")]
    DoubleClick { lat_lng: LatLng },
    /// A tile layer started loading tiles
    TileLoading { layer_id: String },
    /// A tile layer finished loading all visible tiles
    TileLoad { layer_id: String },
    /// Map view has changed (center or zoom)
    ViewChanged { center: LatLng, zoom: f64 },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was removed from the map
    LayerRemove { layer_id: String },
    /// A layer's popup was opened
    PopupOpen { layer_id: String },
}

impl MapEvent {
    /// Leaflet-style event name, used as the listener key
    pub fn name(&self) -> &'static str {
        match self {
            MapEvent::Ready => "ready",
            MapEvent::Click { .. } => "click",
            MapEvent::DoubleClick { .. } => "dblclick",
            MapEvent::TileLoading { .. } => "loading",
            MapEvent::TileLoad { .. } => "load",
            MapEvent::ViewChanged { .. } => "viewchanged",
            MapEvent::LayerAdd { .. } => "layeradd",
            MapEvent::LayerRemove { .. } => "layerremove",
            MapEvent::PopupOpen { .. } => "popupopen",
        }
    }

    /// Geographic position attached to pointer events
    pub fn lat_lng(&self) -> Option<LatLng> {
        match self {
            MapEvent::Click { lat_lng } | MapEvent::DoubleClick { lat_lng } => Some(*lat_lng),
            _ => None,
        }
    }

    /// Id of the layer this event concerns, if any
    pub fn layer_id(&self) -> Option<&str> {
        match self {
            MapEvent::TileLoading { layer_id }
            | MapEvent::TileLoad { layer_id }
            | MapEvent::LayerAdd { layer_id }
            | MapEvent::LayerRemove { layer_id }
            | MapEvent::PopupOpen { layer_id } => Some(layer_id),
            _ => None,
        }
    }

    pub fn is_pointer_event(&self) -> bool {
        matches!(self, MapEvent::Click { .. } | MapEvent::DoubleClick { .. })
    }
}
