//! DOM glue: window resizes in, element notifications out

use super::leaflet::{js_error, LeafletBackend};
use crate::element::notify::{ElementEvent, Notification};
use crate::element::resize::{WindowEvents, WindowSignal};
use crate::{MapError, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, CustomEventInit, EventTarget};

/// Forwards DOM `resize` events to a [`WindowEvents`] while alive
pub struct WindowResizeBinding {
    window: web_sys::Window,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for WindowResizeBinding {
    fn drop(&mut self) {
        let removed = self
            .window
            .remove_event_listener_with_callback("resize", self.callback.as_ref().unchecked_ref());
        if let Err(err) = removed {
            log::debug!("resize listener already gone: {:?}", err);
        }
    }
}

pub fn bind_window_resize(events: WindowEvents) -> Result<WindowResizeBinding> {
    let window = web_sys::window().ok_or_else(|| MapError::Backend("no window".into()))?;
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
        events.dispatch(WindowSignal::Resize);
    });

    window
        .add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
        .map_err(js_error)?;

    Ok(WindowResizeBinding { window, callback })
}

fn object(entries: &[(&str, JsValue)]) -> Result<JsValue> {
    let object = js_sys::Object::new();
    for (key, value) in entries {
        js_sys::Reflect::set(&object, &JsValue::from_str(key), value).map_err(js_error)?;
    }
    Ok(object.into())
}

fn detail(event: &ElementEvent<LeafletBackend>) -> Result<JsValue> {
    match event {
        ElementEvent::TilesLoading(loaded) => {
            let loaded = loaded.clone();
            let promise = wasm_bindgen_futures::future_to_promise(async move {
                if loaded.await {
                    Ok(JsValue::UNDEFINED)
                } else {
                    Err(JsValue::from_str("tile layer went away before loading finished"))
                }
            });
            object(&[("promise", promise.into())])
        }
        ElementEvent::CenterUpdated(center) => object(&[
            ("latitude", JsValue::from_f64(center.lat)),
            ("longitude", JsValue::from_f64(center.lng)),
        ]),
        ElementEvent::MapReady(handle) => {
            let map: JsValue = handle.borrow().leaflet_map().clone().into();
            object(&[("map", map)])
        }
    }
}

/// Dispatches a notification as a DOM `CustomEvent` on `target`
pub fn dispatch_notification(
    target: &EventTarget,
    notification: &Notification<LeafletBackend>,
) -> Result<bool> {
    let init = CustomEventInit::new();
    init.set_bubbles(notification.bubbles);
    init.set_composed(notification.composed);
    init.set_detail(&detail(&notification.event)?);

    let event = CustomEvent::new_with_event_init_dict(notification.name(), &init)
        .map_err(js_error)?;
    target.dispatch_event(&event).map_err(js_error)
}
