use crate::dom;
use crate::viewer::Shared;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

impl Shared {
    /// One display frame: damping, optional rotation, draw.
    ///
    /// A surface error the renderer could not recover from halts the widget.
    pub fn frame(&mut self) {
        self.core.tick();
        let Some(gpu) = &mut self.gpu else { return };
        gpu.resize_if_needed(self.canvas.width(), self.canvas.height());
        if let Err(e) = gpu.render(&self.core) {
            let message = format!("rendering failed ({})", e);
            if self.core.fault(message.as_str()) {
                self.halted.set(true);
                self.overlay.show_error_banner(&message);
            }
        }
    }
}

type Tick = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn request(tick: &Tick) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

/// Drive `shared` from requestAnimationFrame until `alive` goes false.
pub fn start_loop(shared: Weak<RefCell<Shared>>, alive: Rc<Cell<bool>>) {
    let tick: Tick = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let running = alive.get() && shared.upgrade().is_some_and(|s| {
            if let Ok(mut s) = s.try_borrow_mut() {
                if !s.halted.get() {
                    s.frame();
                }
            }
            true
        });
        if running {
            request(&tick_clone);
        } else {
            // Drop the closure outside of its own invocation.
            let tick = tick_clone.clone();
            dom::set_timeout(0, move || drop(tick.borrow_mut().take()));
            log::debug!("[viewer] render loop stopped");
        }
    }) as Box<dyn FnMut()>));
    request(&tick);
}
