#![cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

mod bridge;
mod constants;
mod controls;
mod dom;
mod events;
mod frame;
mod loader;
mod overlay;
mod query;
mod render;
mod viewer;

pub use viewer::LetterViewer;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("letter-preview starting");

    // Self-booting page: a container with the default id gets a viewer
    // configured from the URL, fed by the host bridge.
    let has_container = dom::window_document()
        .and_then(|d| d.get_element_by_id(constants::DEFAULT_CONTAINER_ID))
        .is_some();
    if has_container {
        let initial = query::config_from_query();
        let viewer = LetterViewer::create(
            constants::DEFAULT_CONTAINER_ID,
            initial,
            letter_core::ViewerOptions::default(),
        );
        // Lives as long as the page.
        std::mem::forget(viewer);
    } else {
        log::debug!(
            "[viewer] no #{} element, waiting for LetterViewer construction",
            constants::DEFAULT_CONTAINER_ID
        );
    }
    Ok(())
}

/// Known fonts as `[key, display name]` pairs, for host font pickers.
#[wasm_bindgen(js_name = knownFonts)]
pub fn known_fonts() -> js_sys::Array {
    letter_core::KNOWN_FONTS
        .iter()
        .map(|f| {
            let pair = js_sys::Array::new();
            pair.push(&JsValue::from_str(f.key));
            pair.push(&JsValue::from_str(f.display_name));
            JsValue::from(pair)
        })
        .collect()
}
