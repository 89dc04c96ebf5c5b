use crate::constants::{RIGHT_BUTTON, WHEEL_LINE_PX};
use crate::dom::Listener;
use crate::viewer::Shared;
use std::cell::{Cell, RefCell};
use std::rc::Weak;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone, Copy, Debug)]
struct Drag {
    pointer_id: i32,
    x: f32,
    y: f32,
    pan: bool,
}

/// Orbit input on the canvas: drag rotates, right- or shift-drag pans, wheel dollies.
pub fn wire_orbit_input(
    canvas: &web::HtmlCanvasElement,
    shared: Weak<RefCell<Shared>>,
) -> Vec<Listener> {
    let drag = std::rc::Rc::new(Cell::new(None::<Drag>));
    let mut listeners = Vec::with_capacity(6);

    {
        let drag = drag.clone();
        let canvas_c = canvas.clone();
        listeners.push(Listener::new(canvas, "pointerdown", move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            drag.set(Some(Drag {
                pointer_id: ev.pointer_id(),
                x: ev.client_x() as f32,
                y: ev.client_y() as f32,
                pan: ev.button() == RIGHT_BUTTON || ev.shift_key(),
            }));
            _ = canvas_c.set_pointer_capture(ev.pointer_id());
        }));
    }
    {
        let drag = drag.clone();
        let canvas_c = canvas.clone();
        let shared = shared.clone();
        listeners.push(Listener::new(canvas, "pointermove", move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            let Some(mut d) = drag.get() else { return };
            if d.pointer_id != ev.pointer_id() {
                return;
            }
            let (x, y) = (ev.client_x() as f32, ev.client_y() as f32);
            let (dx, dy) = (x - d.x, y - d.y);
            d.x = x;
            d.y = y;
            drag.set(Some(d));

            let Some(shared) = shared.upgrade() else { return };
            let Ok(mut s) = shared.try_borrow_mut() else {
                return;
            };
            let h = canvas_c.client_height() as f32;
            let camera = s.core.camera_mut();
            if d.pan {
                camera.pan(dx, dy, h);
            } else {
                camera.rotate(dx, dy, h);
            }
        }));
    }
    for kind in ["pointerup", "pointercancel"] {
        let drag = drag.clone();
        let canvas_c = canvas.clone();
        listeners.push(Listener::new(canvas, kind, move |ev| {
            if let Some(ev) = ev.dyn_ref::<web::PointerEvent>() {
                _ = canvas_c.release_pointer_capture(ev.pointer_id());
            }
            drag.set(None);
        }));
    }
    {
        let shared = shared.clone();
        listeners.push(Listener::new(canvas, "wheel", move |ev| {
            let Some(wheel) = ev.dyn_ref::<web::WheelEvent>() else {
                return;
            };
            ev.prevent_default();
            let mut dy = wheel.delta_y() as f32;
            if wheel.delta_mode() == 1 {
                dy *= WHEEL_LINE_PX;
            }
            if let Some(shared) = shared.upgrade() {
                if let Ok(mut s) = shared.try_borrow_mut() {
                    s.core.camera_mut().dolly(dy);
                }
            }
        }));
    }
    listeners.push(Listener::new(canvas, "contextmenu", |ev| ev.prevent_default()));
    listeners
}
