use crate::dom::Listener;
use letter_core::bridge::{parse_inbound, InboundMessage, OutboundMessage};
use letter_core::{ConfigUpdate, OriginPolicy};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Listen for `update_config` messages from the embedding page.
pub fn listen(
    window: &web::Window,
    origins: OriginPolicy,
    on_update: impl Fn(ConfigUpdate) + 'static,
) -> Listener {
    Listener::new(window, "message", move |ev: web::Event| {
        let Some(ev) = ev.dyn_ref::<web::MessageEvent>() else {
            return;
        };
        let origin = ev.origin();
        if !origins.accepts(&origin) {
            log::warn!("[bridge] ignoring message from origin {}", origin);
            return;
        }
        let Some(value) = js_to_json(&ev.data()) else {
            return;
        };
        if let Some(InboundMessage::UpdateConfig { update, warnings }) = parse_inbound(value) {
            log::debug!("[bridge] update_config from {}", origin);
            for w in &warnings {
                log::warn!("[bridge] {}", w);
            }
            on_update(update);
        }
    })
}

fn js_to_json(value: &JsValue) -> Option<serde_json::Value> {
    if value.is_undefined() || value.is_null() {
        return None;
    }
    // Strings are accepted as already-serialized messages.
    let text = match value.as_string() {
        Some(s) => s,
        None => js_sys::JSON::stringify(value).ok()?.as_string()?,
    };
    serde_json::from_str(&text).ok()
}

/// Tell the parent context the first render is on screen.
pub fn post_ready() {
    let Some(window) = web::window() else { return };
    let target = match window.parent() {
        Ok(Some(parent)) => parent,
        _ => window,
    };
    let msg = match OutboundMessage::ViewerReady.to_json() {
        Ok(msg) => msg,
        Err(e) => {
            log::error!("[bridge] {}", e);
            return;
        }
    };
    match js_sys::JSON::parse(&msg) {
        Ok(payload) => {
            if let Err(e) = target.post_message(&payload, "*") {
                log::warn!("[bridge] viewer_ready not delivered: {:?}", e);
            } else {
                log::info!("[bridge] viewer_ready sent");
            }
        }
        Err(e) => log::error!("[bridge] {:?}", e),
    }
}

/// Decode a host-supplied config object. Mistyped fields are logged and dropped.
pub fn config_from_js(value: &JsValue) -> anyhow::Result<ConfigUpdate> {
    if value.is_undefined() || value.is_null() {
        return Ok(ConfigUpdate::default());
    }
    let text = js_sys::JSON::stringify(value)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .as_string()
        .unwrap_or_default();
    let (update, warnings) = ConfigUpdate::from_json(&text)?;
    for w in &warnings {
        log::warn!("[config] {}", w);
    }
    Ok(update)
}
