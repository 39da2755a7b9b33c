//! [`MapBackend`] over Leaflet's global `L`
//!
//! Options cross the boundary as JSON: the Rust side serializes them with
//! serde and `JSON.parse` turns them into plain objects Leaflet accepts.
//! Leaflet callbacks only push [`MapEvent`]s into a shared queue; the element
//! picks them up on its next poll.

use crate::core::config::{CircleOptions, MarkerIcon, TileLayerOptions};
use crate::core::geo::{LatLng, LatLngBounds};
use crate::input::events::MapEvent;
use crate::layers::base::{LayerId, LayerType};
use crate::prelude::{HashMap, VecDeque};
use crate::traits::MapBackend;
use crate::{MapError, Result};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    /// `L.Map`
    #[derive(Debug, Clone)]
    pub type LeafletMap;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    fn create_map(container: &web_sys::HtmlElement) -> LeafletMap;

    #[wasm_bindgen(method, js_name = whenReady)]
    fn when_ready(this: &LeafletMap, callback: &js_sys::Function);

    #[wasm_bindgen(method)]
    fn on(this: &LeafletMap, event: &str, callback: &js_sys::Function);

    #[wasm_bindgen(method, getter, js_name = tapHold)]
    fn tap_hold(this: &LeafletMap) -> Option<Handler>;

    #[wasm_bindgen(method, js_name = getZoom)]
    fn get_zoom(this: &LeafletMap) -> JsValue;

    #[wasm_bindgen(method, catch, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &JsValue, zoom: f64) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = panTo)]
    fn pan_to(this: &LeafletMap, center: &JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = fitBounds)]
    fn fit_bounds(this: &LeafletMap, bounds: &JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = invalidateSize)]
    fn invalidate_size(this: &LeafletMap);

    /// Map interaction handler such as `tapHold`
    type Handler;

    #[wasm_bindgen(method)]
    fn disable(this: &Handler);

    /// Anything with `addTo`: layers and controls
    #[derive(Debug, Clone)]
    type Layer;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &Layer, map: &LeafletMap) -> Layer;

    #[wasm_bindgen(method)]
    fn remove(this: &Layer);

    #[wasm_bindgen(method, js_name = on)]
    fn on_layer(this: &Layer, event: &str, callback: &js_sys::Function);

    #[wasm_bindgen(method, js_name = bindPopup)]
    fn bind_popup(this: &Layer, html: &str);

    #[wasm_bindgen(method, js_name = openPopup)]
    fn open_popup(this: &Layer);

    #[wasm_bindgen(method, catch, js_name = getLatLng)]
    fn get_lat_lng(this: &Layer) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getBounds)]
    fn get_bounds(this: &Layer) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn tile_layer(url_template: &str, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn marker(position: &JsValue, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = icon)]
    fn create_icon(options: &JsValue) -> JsValue;

    #[wasm_bindgen(js_namespace = L, js_name = circle)]
    fn circle(center: &JsValue, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = ["L", "control"], js_name = scale)]
    fn scale_control() -> Layer;
}

type Callback = Closure<dyn FnMut(JsValue)>;

pub(crate) fn js_error(err: JsValue) -> MapError {
    MapError::Backend(
        err.as_string()
            .unwrap_or_else(|| format!("{:?}", err)),
    )
}

/// Serializes a value into a plain JS object
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    let json = serde_json::to_string(value)?;
    js_sys::JSON::parse(&json).map_err(js_error)
}

fn read_f64(value: &JsValue, key: &str) -> Option<f64> {
    js_sys::Reflect::get(value, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_f64())
}

fn read_lat_lng(value: &JsValue) -> Option<LatLng> {
    Some(LatLng::new(read_f64(value, "lat")?, read_f64(value, "lng")?))
}

// Leaflet takes bounds as [[south, west], [north, east]]
fn bounds_to_js(bounds: &LatLngBounds) -> Result<JsValue> {
    to_js(&[
        [bounds.south_west.lat, bounds.south_west.lng],
        [bounds.north_east.lat, bounds.north_east.lng],
    ])
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TileOptionsJs<'a> {
    subdomains: &'a [String],
    attribution: &'a str,
    tile_size: u32,
    min_zoom: u8,
    max_zoom: u8,
    detect_retina: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CircleOptionsJs<'a> {
    radius: f64,
    #[serde(flatten)]
    style: &'a CircleOptions,
}

/// A live Leaflet map
pub struct LeafletBackend {
    map: LeafletMap,
    layers: HashMap<LayerId, Layer>,
    events: Rc<RefCell<VecDeque<MapEvent>>>,
    // Leaflet holds these as listeners; dropping one would detach it
    callbacks: Vec<Callback>,
    next_layer_id: u64,
}

impl LeafletBackend {
    /// Creates a Leaflet map in `container` and starts listening for clicks
    pub fn new(container: &web_sys::HtmlElement) -> Self {
        let mut backend = Self {
            map: create_map(container),
            layers: HashMap::default(),
            events: Rc::new(RefCell::new(VecDeque::new())),
            callbacks: Vec::new(),
            next_layer_id: 0,
        };

        let click = backend.pointer_callback(|lat_lng| MapEvent::Click { lat_lng });
        backend.map.on("click", click.as_ref().unchecked_ref());
        backend.callbacks.push(click);

        let dblclick = backend.pointer_callback(|lat_lng| MapEvent::DoubleClick { lat_lng });
        backend.map.on("dblclick", dblclick.as_ref().unchecked_ref());
        backend.callbacks.push(dblclick);

        backend
    }

    /// The underlying `L.Map`
    pub fn leaflet_map(&self) -> &LeafletMap {
        &self.map
    }

    fn queue(&self, event: MapEvent) -> Callback {
        let events = Rc::clone(&self.events);
        Closure::new(move |_: JsValue| events.borrow_mut().push_back(event.clone()))
    }

    fn pointer_callback(&self, make: fn(LatLng) -> MapEvent) -> Callback {
        let events = Rc::clone(&self.events);
        Closure::new(move |event: JsValue| {
            let position = js_sys::Reflect::get(&event, &JsValue::from_str("latlng"))
                .ok()
                .and_then(|value| read_lat_lng(&value));
            match position {
                Some(lat_lng) => events.borrow_mut().push_back(make(lat_lng)),
                None => log::debug!("pointer event without latlng"),
            }
        })
    }

    fn next_id(&mut self, layer_type: LayerType) -> LayerId {
        self.next_layer_id += 1;
        format!("{}_{}", layer_type, self.next_layer_id)
    }

    fn insert(&mut self, layer_type: LayerType, layer: Layer) -> LayerId {
        let layer_id = self.next_id(layer_type);
        log::debug!("added {}", layer_id);
        self.layers.insert(layer_id.clone(), layer);
        layer_id
    }

    fn layer(&self, layer_id: &str) -> Result<&Layer> {
        self.layers
            .get(layer_id)
            .ok_or_else(|| MapError::LayerNotFound(layer_id.to_string()))
    }
}

impl std::fmt::Debug for LeafletBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafletBackend")
            .field("layers", &self.layers.len())
            .field("queued_events", &self.events.borrow().len())
            .finish()
    }
}

impl MapBackend for LeafletBackend {
    fn when_ready(&mut self) {
        let ready = self.queue(MapEvent::Ready);
        self.map.when_ready(ready.as_ref().unchecked_ref());
        self.callbacks.push(ready);
    }

    fn disable_tap_hold(&mut self) {
        if let Some(tap_hold) = self.map.tap_hold() {
            tap_hold.disable();
        }
    }

    fn add_tile_layer(&mut self, options: &TileLayerOptions) -> Result<LayerId> {
        let js_options = to_js(&TileOptionsJs {
            subdomains: &options.subdomains,
            attribution: &options.attribution,
            tile_size: options.tile_size,
            min_zoom: options.min_zoom,
            max_zoom: options.max_zoom,
            detect_retina: options.detect_retina,
        })?;
        let layer = tile_layer(&options.url_template, &js_options).add_to(&self.map);
        let layer_id = self.insert(LayerType::Tile, layer.clone());

        let loading = self.queue(MapEvent::TileLoading {
            layer_id: layer_id.clone(),
        });
        layer.on_layer("loading", loading.as_ref().unchecked_ref());
        let load = self.queue(MapEvent::TileLoad {
            layer_id: layer_id.clone(),
        });
        layer.on_layer("load", load.as_ref().unchecked_ref());
        self.callbacks.extend([loading, load]);

        Ok(layer_id)
    }

    fn add_scale_control(&mut self) -> Result<()> {
        scale_control().add_to(&self.map);
        Ok(())
    }

    fn zoom(&self) -> Option<f64> {
        self.map.get_zoom().as_f64()
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        self.map.set_view(&to_js(&center)?, zoom).map_err(js_error)
    }

    fn pan_to(&mut self, center: LatLng) -> Result<()> {
        self.map.pan_to(&to_js(&center)?).map_err(js_error)
    }

    fn fit_bounds(&mut self, bounds: &LatLngBounds) -> Result<()> {
        self.map.fit_bounds(&bounds_to_js(bounds)?).map_err(js_error)
    }

    fn invalidate_size(&mut self) -> Result<()> {
        self.map.invalidate_size();
        Ok(())
    }

    fn add_marker(&mut self, position: LatLng, icon: Option<&MarkerIcon>) -> Result<LayerId> {
        let options = js_sys::Object::new();
        if let Some(icon_options) = icon {
            js_sys::Reflect::set(
                &options,
                &JsValue::from_str("icon"),
                &create_icon(&to_js(icon_options)?),
            )
            .map_err(js_error)?;
        }

        let layer = marker(&to_js(&position)?, &options).add_to(&self.map);
        Ok(self.insert(LayerType::Marker, layer))
    }

    fn add_circle(
        &mut self,
        center: LatLng,
        radius: f64,
        options: &CircleOptions,
    ) -> Result<LayerId> {
        let js_options = to_js(&CircleOptionsJs {
            radius,
            style: options,
        })?;
        let layer = circle(&to_js(&center)?, &js_options).add_to(&self.map);
        Ok(self.insert(LayerType::Circle, layer))
    }

    fn remove_layer(&mut self, layer_id: &str) -> Result<()> {
        let layer = self
            .layers
            .remove(layer_id)
            .ok_or_else(|| MapError::LayerNotFound(layer_id.to_string()))?;
        layer.remove();
        Ok(())
    }

    fn bind_popup(&mut self, layer_id: &str, html: &str) -> Result<()> {
        self.layer(layer_id)?.bind_popup(html);
        Ok(())
    }

    fn open_popup(&mut self, layer_id: &str) -> Result<()> {
        self.layer(layer_id)?.open_popup();
        Ok(())
    }

    fn layer_position(&self, layer_id: &str) -> Option<LatLng> {
        let value = self.layers.get(layer_id)?.get_lat_lng().ok()?;
        read_lat_lng(&value)
    }

    fn layer_bounds(&self, layer_id: &str) -> Option<LatLngBounds> {
        let bounds = self.layers.get(layer_id)?.get_bounds().ok()?;
        let corner = |name: &str| {
            js_sys::Reflect::get(&bounds, &JsValue::from_str(name))
                .ok()
                .and_then(|value| read_lat_lng(&value))
        };
        Some(LatLngBounds::new(corner("_southWest")?, corner("_northEast")?))
    }

    fn process_events(&mut self) -> Vec<MapEvent> {
        self.events.borrow_mut().drain(..).collect()
    }
}
