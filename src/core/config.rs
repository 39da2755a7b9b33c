//! Configuration for the element and the overlays it creates
//!
//! Everything here has a default matching the element's public behavior, so a
//! host only has to spell out what it wants to change. Configurations can be
//! loaded from JSON, which is how the web binding receives them.

use crate::core::constants::{
    self, CENTER_ICON_SHADOW_URL, CENTER_ICON_URL, CLICK_DELAY_MS, MARKER_ICON_ANCHOR,
    MARKER_ICON_SIZE, MARKER_POPUP_ANCHOR, MARKER_SHADOW_SIZE, OSM_ATTRIBUTION, OSM_SUBDOMAINS,
    OSM_TILE_URL, RADIUS_FILL_OPACITY, RADIUS_OPACITY, RADIUS_WEIGHT, RESIZE_DEBOUNCE_MS,
};
use crate::ui::style::ElementStyle;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level element configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementConfig {
    pub tile_layer: TileLayerOptions,
    /// Icon of the marker placed on the center coordinate
    pub center_icon: MarkerIcon,
    /// Image directory for markers without a custom icon
    pub default_icon_path: String,
    pub radius_style: CircleOptions,
    pub click_delay_ms: u64,
    pub resize_debounce_ms: u64,
    /// Treat a latitude or longitude of exactly 0 as a usable coordinate
    pub allow_zero_coordinates: bool,
    pub style: ElementStyle,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            tile_layer: TileLayerOptions::default(),
            center_icon: MarkerIcon::default(),
            default_icon_path: constants::default_icon_path(),
            radius_style: CircleOptions::default(),
            click_delay_ms: CLICK_DELAY_MS,
            resize_debounce_ms: RESIZE_DEBOUNCE_MS,
            allow_zero_coordinates: false,
            style: ElementStyle::default(),
        }
    }
}

impl ElementConfig {
    /// Parses a (possibly partial) JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn click_delay(&self) -> Duration {
        Duration::from_millis(self.click_delay_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

/// Configuration for a tile layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TileLayerOptions {
    /// URL template for tiles (e.g., "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png")
    pub url_template: String,
    /// Available subdomains for load balancing
    pub subdomains: Vec<String>,
    /// Attribution HTML
    pub attribution: String,
    /// Tile size in pixels
    pub tile_size: u32,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Request higher zoom tiles on high density displays
    pub detect_retina: bool,
}

impl Default for TileLayerOptions {
    fn default() -> Self {
        Self {
            url_template: OSM_TILE_URL.to_string(),
            subdomains: OSM_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
            attribution: OSM_ATTRIBUTION.to_string(),
            tile_size: constants::TILE_SIZE,
            min_zoom: 0,
            max_zoom: constants::DEFAULT_MAX_ZOOM as u8,
            detect_retina: true,
        }
    }
}

impl TileLayerOptions {
    /// Copy of these options with the element's per-mount attributes applied
    pub fn with_attributes(&self, detect_retina: bool, max_zoom: i32) -> Self {
        Self {
            detect_retina,
            max_zoom: max_zoom.clamp(0, u8::MAX as i32) as u8,
            ..self.clone()
        }
    }
}

/// Custom marker icon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkerIcon {
    pub icon_url: String,
    pub shadow_url: Option<String>,
    pub icon_size: (u32, u32),
    pub icon_anchor: (u32, u32),
    pub popup_anchor: (i32, i32),
    pub shadow_size: (u32, u32),
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            icon_url: CENTER_ICON_URL.to_string(),
            shadow_url: Some(CENTER_ICON_SHADOW_URL.to_string()),
            icon_size: MARKER_ICON_SIZE,
            icon_anchor: MARKER_ICON_ANCHOR,
            popup_anchor: MARKER_POPUP_ANCHOR,
            shadow_size: MARKER_SHADOW_SIZE,
        }
    }
}

/// Path options of the radius circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircleOptions {
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl Default for CircleOptions {
    fn default() -> Self {
        Self {
            weight: RADIUS_WEIGHT,
            opacity: RADIUS_OPACITY,
            fill_opacity: RADIUS_FILL_OPACITY,
        }
    }
}
