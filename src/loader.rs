use anyhow::anyhow;
use letter_core::Typeface;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Fetch and parse a typeface-description asset.
pub async fn fetch_typeface(url: &str) -> anyhow::Result<Typeface> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| anyhow!("fetch {}: {:?}", url, e))?;
    let resp: web::Response = resp
        .dyn_into()
        .map_err(|e| anyhow!("fetch {}: not a Response: {:?}", url, e))?;
    if !resp.ok() {
        return Err(anyhow!("fetch {}: HTTP {}", url, resp.status()));
    }
    let text = JsFuture::from(resp.text().map_err(|e| anyhow!("{:?}", e))?)
        .await
        .map_err(|e| anyhow!("read {}: {:?}", url, e))?;
    let text = text
        .as_string()
        .ok_or_else(|| anyhow!("read {}: body is not text", url))?;
    Ok(Typeface::from_json(&text)?)
}
