//! Core constants derived from Leaflet defaults and the element's public defaults.
//! Keeping them in a single place makes it easier to tweak element-wide magic numbers.

/// Default center latitude of a freshly constructed element.
pub const DEFAULT_LATITUDE: f64 = 47.38991;

/// Default center longitude of a freshly constructed element.
pub const DEFAULT_LONGITUDE: f64 = 8.51604;

/// Zoom used when recentering a map that has no zoom yet.
pub const DEFAULT_ZOOM: i32 = 16;

/// Highest zoom the tile layer serves.
pub const DEFAULT_MAX_ZOOM: i32 = 19;

/// How long a single click waits for a second click before it counts.
pub const CLICK_DELAY_MS: u64 = 500;

/// Quiet period for window resize coalescing.
pub const RESIZE_DEBOUNCE_MS: u64 = 200;

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// OpenStreetMap tile endpoint.
pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// OpenStreetMap tile subdomains.
pub const OSM_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Attribution required by the OpenStreetMap tile usage policy.
pub const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Leaflet release the stylesheet and default marker images are pinned to.
pub const LEAFLET_VERSION: &str = "1.9.4";

/// Red center marker icon.
pub const CENTER_ICON_URL: &str =
    "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-2x-red.png";

/// Shadow drawn under the center marker.
pub const CENTER_ICON_SHADOW_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet/0.7.7/images/marker-shadow.png";

/// Marker icon default size (regular PNG).
pub const MARKER_ICON_SIZE: (u32, u32) = (25, 41);

/// Anchor inside the icon (hot-spot) in pixel coords.
pub const MARKER_ICON_ANCHOR: (u32, u32) = (12, 41);

/// Popup anchor relative to the icon anchor.
pub const MARKER_POPUP_ANCHOR: (i32, i32) = (1, -34);

/// Marker shadow size.
pub const MARKER_SHADOW_SIZE: (u32, u32) = (41, 41);

/// Radius circle stroke weight in pixels.
pub const RADIUS_WEIGHT: f64 = 2.0;

/// Radius circle stroke opacity.
pub const RADIUS_OPACITY: f64 = 0.4;

/// Radius circle fill opacity.
pub const RADIUS_FILL_OPACITY: f64 = 0.1;

/// Maximum width of the scale control in pixels.
pub const SCALE_MAX_WIDTH: f64 = 100.0;

/// Mean earth radius used by Leaflet's CRS for distances, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Default icon image directory for markers without a custom icon.
pub fn default_icon_path() -> String {
    format!("https://unpkg.com/leaflet@{}/dist/images/", LEAFLET_VERSION)
}

/// Leaflet stylesheet matching [`LEAFLET_VERSION`].
pub fn leaflet_stylesheet_url() -> String {
    format!("https://unpkg.com/leaflet@{}/dist/leaflet.css", LEAFLET_VERSION)
}
