//! Slippy-map tile layer
//!
//! The headless engine does not fetch anything. The layer works out which
//! tiles a viewport needs, builds their URLs the way Leaflet's `L.TileLayer`
//! does and tracks the `loading` / `load` cycle so the element sees the same
//! event sequence as in a browser.

use crate::{
    core::{
        config::TileLayerOptions,
        geo::{LatLngBounds, TileCoord},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    prelude::HashSet,
};

/// A tile-based layer that displays map tiles from a tile server
#[derive(Debug)]
pub struct TileLayer {
    /// Base layer properties
    properties: LayerProperties,
    /// Tile layer specific options
    options: TileLayerOptions,
    /// Whether high density tiles are requested
    retina: bool,
    /// Tiles required by the last viewport update
    wanted_tiles: HashSet<TileCoord>,
    /// Tiles considered loaded
    loaded_tiles: HashSet<TileCoord>,
    loading: bool,
}

impl TileLayer {
    /// Create a tile layer for a display with the given device pixel ratio
    pub fn new(id: String, options: TileLayerOptions, device_pixel_ratio: f64) -> Self {
        let retina = options.detect_retina && device_pixel_ratio > 1.0 && options.max_zoom > 0;

        Self {
            properties: LayerProperties::new(id, LayerType::Tile),
            options,
            retina,
            wanted_tiles: HashSet::default(),
            loaded_tiles: HashSet::default(),
            loading: false,
        }
    }

    pub fn tile_options(&self) -> &TileLayerOptions {
        &self.options
    }

    pub fn is_retina(&self) -> bool {
        self.retina
    }

    /// Retina tiles are fetched one zoom level deeper at half the size
    pub fn zoom_offset(&self) -> u8 {
        u8::from(self.retina)
    }

    /// Displayed tile size in pixels
    pub fn tile_size(&self) -> u32 {
        if self.retina {
            self.options.tile_size / 2
        } else {
            self.options.tile_size
        }
    }

    /// Highest zoom before the offset is applied
    fn effective_max_zoom(&self) -> u8 {
        if self.retina {
            self.options.max_zoom.saturating_sub(1).max(self.options.min_zoom)
        } else {
            self.options.max_zoom
        }
    }

    /// Zoom level used in tile URLs for a view zoom
    pub fn tile_zoom(&self, view_zoom: f64) -> u8 {
        let clamped = view_zoom
            .round()
            .clamp(self.options.min_zoom as f64, self.effective_max_zoom() as f64);
        clamped as u8 + self.zoom_offset()
    }

    /// Builds the URL of one tile by substituting `{s}`, `{z}`, `{x}`, `{y}` and `{r}`
    pub fn tile_url(&self, coord: TileCoord) -> String {
        let subdomain = if self.options.subdomains.is_empty() {
            ""
        } else {
            let index = (coord.x as usize + coord.y as usize) % self.options.subdomains.len();
            self.options.subdomains[index].as_str()
        };

        self.options
            .url_template
            .replace("{s}", subdomain)
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
            .replace("{r}", if self.retina { "@2x" } else { "" })
    }

    /// Get tiles that should be visible in the current viewport
    pub fn visible_tiles(&self, viewport: &Viewport) -> Vec<TileCoord> {
        let zoom = self.tile_zoom(viewport.zoom);
        let bounds = viewport.bounds();

        let min = TileCoord::containing(&bounds.north_west(), zoom);
        let max = TileCoord::containing(&bounds.south_east(), zoom);

        let mut tiles = Vec::new();
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                tiles.push(TileCoord::new(x, y, zoom));
            }
        }
        tiles
    }

    /// Recomputes the wanted tile set for `viewport`.
    ///
    /// Returns `true` when this starts a new loading cycle, which is when
    /// Leaflet fires `loading`.
    pub fn update(&mut self, viewport: &Viewport) -> bool {
        self.wanted_tiles = self.visible_tiles(viewport).into_iter().collect();

        let missing = self
            .wanted_tiles
            .iter()
            .any(|coord| !self.loaded_tiles.contains(coord));

        if missing && !self.loading {
            log::trace!(
                "tile layer {} loading {} tiles",
                self.properties.id,
                self.wanted_tiles.len()
            );
            self.loading = true;
            return true;
        }
        false
    }

    /// Marks every wanted tile as loaded; returns `true` if a loading cycle ended
    pub fn complete_loading(&mut self) -> bool {
        if !self.loading {
            return false;
        }
        self.loaded_tiles.extend(self.wanted_tiles.iter().copied());
        self.loading = false;
        true
    }

    /// Returns true if there are any tiles currently being downloaded.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn wanted_tile_count(&self) -> usize {
        self.wanted_tiles.len()
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);

    fn options(&self) -> serde_json::Value {
        let mut options = serde_json::to_value(&self.options).unwrap_or_default();
        options["retina"] = serde_json::Value::Bool(self.retina);
        options
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        None
    }
}
