use crate::constants::*;
use crate::dom;
use web_sys as web;

/// Loading spinner plus the fatal-error surfaces of one container.
#[derive(Clone)]
pub struct Overlay {
    container: web::Element,
    spinner: web::Element,
}

impl Overlay {
    pub fn new(document: &web::Document, container: &web::Element) -> anyhow::Result<Self> {
        let spinner = dom::create(document, "div", SPINNER_CLASS, SPINNER_STYLE)?;
        spinner.set_text_content(Some(SPINNER_TEXT));
        dom::append(container, &spinner)?;
        Ok(Self {
            container: container.clone(),
            spinner,
        })
    }

    #[inline]
    pub fn show_spinner(&self) {
        dom::set_hidden(&self.spinner, false);
    }

    #[inline]
    pub fn hide_spinner(&self) {
        dom::set_hidden(&self.spinner, true);
    }

    /// Replace the container's content with the refresh message.
    pub fn show_font_failure(&self) {
        self.hide_spinner();
        self.container.set_inner_html("");
        if let Some(doc) = dom::window_document() {
            if let Ok(msg) = dom::create(&doc, "div", ERROR_BANNER_CLASS, FAILURE_STYLE) {
                msg.set_text_content(Some(FONT_FAILURE_MESSAGE));
                _ = dom::append(&self.container, &msg);
            }
        }
    }

    /// Append a red banner carrying `message`; the rest of the container stays.
    pub fn show_error_banner(&self, message: &str) {
        self.hide_spinner();
        if let Some(doc) = dom::window_document() {
            if let Ok(banner) = dom::create(&doc, "div", ERROR_BANNER_CLASS, ERROR_BANNER_STYLE) {
                banner.set_text_content(Some(&format!("{}{}", ERROR_BANNER_PREFIX, message)));
                _ = dom::append(&self.container, &banner);
            }
        }
    }

    pub fn remove(&self) {
        self.spinner.remove();
    }
}
