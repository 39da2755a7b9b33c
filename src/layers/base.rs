use crate::core::geo::{LatLng, LatLngBounds};
use crate::ui::popup::Popup;

/// Engine-assigned layer identifier
pub type LayerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Tile,
    Marker,
    Circle,
}

impl LayerType {
    /// Leaflet pane z-index: tiles below overlays below markers
    pub fn pane_z_index(&self) -> i32 {
        match self {
            LayerType::Tile => 200,
            LayerType::Circle => 400,
            LayerType::Marker => 600,
        }
    }
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Tile => write!(f, "tile"),
            LayerType::Marker => write!(f, "marker"),
            LayerType::Circle => write!(f, "circle"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerProperties {
    pub id: LayerId,
    pub layer_type: LayerType,
}

impl LayerProperties {
    pub fn new(id: LayerId, layer_type: LayerType) -> Self {
        Self { id, layer_type }
    }
}

/// Behaviour shared by every overlay the headless engine keeps
pub trait LayerTrait: std::fmt::Debug {
    fn id(&self) -> &str;
    fn layer_type(&self) -> LayerType;

    fn z_index(&self) -> i32 {
        self.layer_type().pane_z_index()
    }

    /// Leaflet-shaped options of this layer
    fn options(&self) -> serde_json::Value;

    /// Geographic extent, `None` for layers without one (tiles)
    fn bounds(&self) -> Option<LatLngBounds>;

    /// Anchor position of point layers
    fn position(&self) -> Option<LatLng> {
        None
    }

    fn popup(&self) -> Option<&Popup> {
        None
    }

    fn popup_mut(&mut self) -> Option<&mut Popup> {
        None
    }

    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pane_order() {
        assert!(LayerType::Tile.pane_z_index() < LayerType::Circle.pane_z_index());
        assert!(LayerType::Circle.pane_z_index() < LayerType::Marker.pane_z_index());
    }

    #[test]
    fn test_layer_type_display() {
        assert_eq!(LayerType::Tile.to_string(), "tile");
        assert_eq!(LayerType::Circle.to_string(), "circle");
        assert_eq!(LayerType::Marker.to_string(), "marker");
    }
}
