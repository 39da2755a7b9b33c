use crate::{
    core::{
        config::MarkerIcon,
        geo::{LatLng, LatLngBounds},
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    ui::popup::Popup,
};

#[derive(Debug)]
pub struct Marker {
    properties: LayerProperties,
    position: LatLng,
    icon: Option<MarkerIcon>,
    popup: Option<Popup>,
}

impl Marker {
    pub fn new(id: String, position: LatLng) -> Self {
        Self {
            properties: LayerProperties::new(id, LayerType::Marker),
            position,
            icon: None,
            popup: None,
        }
    }

    pub fn with_icon(mut self, icon: MarkerIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn set_position(&mut self, position: LatLng) {
        self.position = position;
    }

    /// Custom icon, `None` means the default icon
    pub fn icon(&self) -> Option<&MarkerIcon> {
        self.icon.as_ref()
    }

    /// Binds popup content, replacing any previous popup
    pub fn bind_popup(&mut self, content: impl Into<String>) {
        self.popup = Some(Popup::new(content.into()));
    }

    pub fn is_popup_open(&self) -> bool {
        self.popup.as_ref().is_some_and(Popup::is_open)
    }
}

impl LayerTrait for Marker {
    crate::impl_layer_trait!(Marker, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "position": {
                "lat": self.position.lat,
                "lng": self.position.lng
            },
            "icon": self.icon,
            "popup": self.popup.as_ref().map(Popup::content)
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(LatLngBounds::new(self.position, self.position))
    }

    fn position(&self) -> Option<LatLng> {
        Some(self.position)
    }

    fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    fn popup_mut(&mut self) -> Option<&mut Popup> {
        self.popup.as_mut()
    }
}
