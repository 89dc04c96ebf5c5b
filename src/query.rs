use letter_core::{ConfigError, ConfigUpdate};
use web_sys as web;

/// Decoded `(key, value)` pairs of the page's query string.
pub fn page_query_pairs() -> Vec<(String, String)> {
    let search = web::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    let params = match web::UrlSearchParams::new_with_str(&search) {
        Ok(p) => p,
        Err(_) => return Vec::new(),
    };
    let mut pairs = Vec::new();
    for entry in params.entries() {
        let Ok(entry) = entry else { continue };
        let entry = js_sys::Array::from(&entry);
        if let (Some(k), Some(v)) = (entry.get(0).as_string(), entry.get(1).as_string()) {
            pairs.push((k, v));
        }
    }
    pairs
}

/// Configuration seeded from the page URL. Bad parameters are logged and skipped.
pub fn config_from_query() -> ConfigUpdate {
    let (update, warnings): (ConfigUpdate, Vec<ConfigError>) =
        ConfigUpdate::from_query_pairs(page_query_pairs());
    for w in warnings {
        log::warn!("[config] query: {}", w);
    }
    update
}
