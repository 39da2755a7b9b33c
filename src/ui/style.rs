use crate::core::constants;
use serde::{Deserialize, Serialize};

/// Style configuration for the element's shadow tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementStyle {
    /// Default of `--leaflet-map-min-height`
    pub min_height: String,
    /// Fallback of `--leaflet-popup-item-spacing`
    pub popup_item_spacing: String,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            min_height: "50vh".to_string(),
            popup_item_spacing: "0.25rem".to_string(),
        }
    }
}

impl ElementStyle {
    /// Stylesheet adopted by the shadow root
    pub fn stylesheet(&self) -> String {
        format!(
            ":host {{\n  --leaflet-map-min-height: {min_height};\n\n  display: block;\n}}\n\n\
             .map {{\n  width: 100%;\n  height: 100%;\n  min-height: var(--leaflet-map-min-height);\n}}\n\n\
             .popup-title,\n.popup-url {{\n  display: block;\n}}\n\n\
             .popup-title + .popup-url {{\n  margin-top: var(--leaflet-popup-item-spacing, {spacing});\n}}\n",
            min_height = self.min_height,
            spacing = self.popup_item_spacing,
        )
    }

    /// Shadow template: the Leaflet stylesheet and the map container
    pub fn template(&self) -> String {
        format!(
            r#"<link rel="stylesheet" href="{}" /><div class="map"></div>"#,
            constants::leaflet_stylesheet_url()
        )
    }
}
