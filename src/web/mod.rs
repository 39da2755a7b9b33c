//! Browser binding: Leaflet backend and DOM glue

pub mod dom;
pub mod leaflet;

pub use dom::{bind_window_resize, dispatch_notification, WindowResizeBinding};
pub use leaflet::{LeafletBackend, LeafletMap};

use crate::element::{MapElement, MapHandle};
use crate::runtime::Clock;
use wasm_bindgen::JsValue;

/// Points `L.Icon.Default.imagePath` at `path`
pub fn set_default_icon_path(path: &str) -> crate::Result<()> {
    let get = |target: &JsValue, key: &str| {
        js_sys::Reflect::get(target, &JsValue::from_str(key)).map_err(leaflet::js_error)
    };

    let global: JsValue = js_sys::global().into();
    let leaflet = get(&global, "L")?;
    let default_icon = get(&get(&leaflet, "Icon")?, "Default")?;
    js_sys::Reflect::set(
        &default_icon,
        &JsValue::from_str("imagePath"),
        &JsValue::from_str(path),
    )
    .map_err(leaflet::js_error)?;
    Ok(())
}

/// Creates a Leaflet map in `container` and mounts it on `element`
pub fn mount_leaflet<C: Clock>(
    element: &mut MapElement<LeafletBackend, C>,
    container: &web_sys::HtmlElement,
) -> crate::Result<MapHandle<LeafletBackend>> {
    set_default_icon_path(&element.config().default_icon_path)?;
    element.mount(LeafletBackend::new(container))
}

/// Routes Rust panics to the browser console
pub fn install_panic_hook() {
    console_error_panic_hook::set_once();
}
