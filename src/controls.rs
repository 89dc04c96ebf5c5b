use crate::constants::*;
use crate::dom;
use letter_core::controls::{lights_label, rotation_label, ControlAction};
use letter_core::ControlPanel;
use web_sys as web;

/// The control panel's DOM: one button per [`ControlAction`].
pub struct PanelDom {
    root: web::Element,
    buttons: Vec<(ControlAction, web::Element)>,
    listeners: Vec<dom::Listener>,
}

impl PanelDom {
    pub fn new(document: &web::Document, container: &web::Element) -> anyhow::Result<Self> {
        let root = dom::create(document, "div", PANEL_CLASS, PANEL_STYLE)?;
        let mut buttons = Vec::with_capacity(ControlAction::ALL.len());
        for action in ControlAction::ALL {
            let button = dom::create(document, "button", "", "")?;
            button.set_id(action.element_id());
            _ = button.set_attribute("type", "button");
            button.set_text_content(Some(action.default_label()));
            dom::append(&root, &button)?;
            buttons.push((action, button));
        }
        dom::set_hidden(&root, true);
        dom::append(container, &root)?;
        Ok(Self {
            root,
            buttons,
            listeners: Vec::new(),
        })
    }

    /// Route every button click to `on_action`.
    pub fn bind(&mut self, on_action: impl Fn(ControlAction) + Clone + 'static) {
        for (action, button) in &self.buttons {
            let action = *action;
            let handler = on_action.clone();
            self.listeners
                .push(dom::Listener::new(button, "click", move |_| handler(action)));
        }
    }

    /// Mirror panel visibility and toggle labels.
    pub fn sync(&self, panel: &ControlPanel, animating: bool, lights_on: bool) {
        dom::set_hidden(&self.root, !panel.is_visible());
        for (action, button) in &self.buttons {
            let label = match action {
                ControlAction::ToggleRotation => rotation_label(animating),
                ControlAction::ToggleLights => lights_label(lights_on),
                _ => continue,
            };
            button.set_text_content(Some(label));
        }
    }

    pub fn remove(&mut self) {
        self.listeners.clear();
        self.root.remove();
    }
}
