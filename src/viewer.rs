use crate::bridge;
use crate::constants::*;
use crate::controls::PanelDom;
use crate::dom::{self, Listener};
use crate::events;
use crate::frame;
use crate::loader;
use crate::overlay::Overlay;
use crate::render::GpuState;
use instant::Instant;
use letter_core::{
    ConfigChange, ConfigUpdate, ControlAction, LoadOutcome, RebuildPlan, Viewer, ViewerOptions,
    Viewport,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

/// Everything one viewer instance owns on the page.
pub(crate) struct Shared {
    pub core: Viewer,
    pub gpu: Option<GpuState>,
    pub canvas: web::HtmlCanvasElement,
    pub overlay: Overlay,
    pub panel: PanelDom,
    pub listeners: Vec<Listener>,
    /// Set by the fault handler; the widget does not resume afterwards.
    pub halted: Rc<Cell<bool>>,
    pub font_failed: bool,
}

impl Shared {
    /// Mirror core state onto the spinner and control panel.
    fn sync_dom(&self) {
        if self.font_failed || self.halted.get() {
            return;
        }
        if self.core.panel().is_loading() {
            self.overlay.show_spinner();
        } else {
            self.overlay.hide_spinner();
        }
        self.panel.sync(
            self.core.panel(),
            self.core.is_animating(),
            self.core.lights().is_on(),
        );
    }

    fn on_resize(&mut self) {
        let (w, h) = dom::sync_canvas_backing_size(&self.canvas);
        self.core.on_resize(w, h);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize_if_needed(w, h);
        }
    }
}

fn apply_outcome(shared: &Rc<RefCell<Shared>>, outcome: LoadOutcome) {
    let mut s = shared.borrow_mut();
    match outcome {
        LoadOutcome::Rendered { first_ready } => {
            s.sync_dom();
            // The failure screen replaced the canvas; nothing is on show.
            if first_ready && !s.font_failed {
                bridge::post_ready();
            }
        }
        LoadOutcome::Failed(message) => {
            log::error!("[viewer] {}", message);
            s.font_failed = true;
            s.overlay.show_font_failure();
        }
        LoadOutcome::Ignored(reason) => log::debug!("[viewer] load ignored: {:?}", reason),
    }
}

/// Carry out whatever a rebuild asked for.
fn run_plan(shared: &Rc<RefCell<Shared>>, plan: RebuildPlan) {
    let (generation, timeout_ms) = {
        let s = shared.borrow();
        s.sync_dom();
        (s.core.generation(), s.core.options().loading_timeout_ms)
    };

    let weak = Rc::downgrade(shared);
    dom::set_timeout(timeout_ms, move || {
        if let Some(shared) = weak.upgrade() {
            if let Ok(mut s) = shared.try_borrow_mut() {
                if s.core.loading_timed_out(generation) {
                    s.sync_dom();
                }
            }
        }
    });

    match plan {
        RebuildPlan::Immediate(outcome) => apply_outcome(shared, outcome),
        RebuildPlan::NeedsTypeface(request) => {
            let weak = Rc::downgrade(shared);
            log::info!("[font] loading {}", request.url());
            spawn_local(async move {
                let started = Instant::now();
                let result = loader::fetch_typeface(request.url())
                    .await
                    .map_err(|e| format!("{:#}", e));
                log::debug!(
                    "[font] fetch #{} finished in {} ms",
                    request.generation,
                    started.elapsed().as_millis()
                );
                // The viewer may have been dropped or disposed while the fetch was in flight.
                let Some(shared) = weak.upgrade() else { return };
                let outcome = shared
                    .borrow_mut()
                    .core
                    .complete_font_load(&request, result);
                apply_outcome(&shared, outcome);
            });
        }
    }
}

fn handle_change(shared: &Rc<RefCell<Shared>>, change: ConfigChange) {
    for w in &change.warnings {
        log::warn!("[config] {}", w);
    }
    run_plan(shared, change.plan);
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Embeddable 3D letter preview bound to one container element.
#[wasm_bindgen]
pub struct LetterViewer {
    shared: Option<Rc<RefCell<Shared>>>,
    alive: Rc<Cell<bool>>,
}

impl LetterViewer {
    pub(crate) fn create(container_id: &str, initial: ConfigUpdate, options: ViewerOptions) -> Self {
        match Self::try_create(container_id, initial, options) {
            Ok(v) => v,
            Err(e) => {
                log::error!("[viewer] initialization failed: {:#}", e);
                show_setup_failure(container_id, &format!("{:#}", e));
                Self {
                    shared: None,
                    alive: Rc::new(Cell::new(false)),
                }
            }
        }
    }

    fn try_create(
        container_id: &str,
        initial: ConfigUpdate,
        options: ViewerOptions,
    ) -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let document = dom::document()?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| anyhow::anyhow!("missing #{}", container_id))?;
        if let Some(html) = container.dyn_ref::<web::HtmlElement>() {
            let style = html.style();
            if style.get_property_value("position").unwrap_or_default().is_empty() {
                _ = style.set_property("position", "relative");
            }
        }

        let canvas: web::HtmlCanvasElement =
            dom::create(&document, "canvas", CANVAS_CLASS, CANVAS_STYLE)?
                .dyn_into()
                .map_err(|e| anyhow::anyhow!("not a canvas: {:?}", e))?;
        dom::append(&container, &canvas)?;
        let (width, height) = dom::sync_canvas_backing_size(&canvas);
        let overlay = Overlay::new(&document, &container)?;
        let panel = PanelDom::new(&document, &container)?;

        let origins = options.origins.clone();
        let (core, _warnings) = Viewer::new(options, initial, Viewport { width, height });
        let lights = core.lights().clone();
        let halted = Rc::new(Cell::new(false));
        let shared = Rc::new(RefCell::new(Shared {
            core,
            gpu: None,
            canvas: canvas.clone(),
            overlay: overlay.clone(),
            panel,
            listeners: Vec::new(),
            halted: halted.clone(),
            font_failed: false,
        }));
        let alive = Rc::new(Cell::new(true));
        let weak = Rc::downgrade(&shared);

        let mut listeners = Vec::new();
        {
            let weak = weak.clone();
            listeners.push(Listener::new(&window, "resize", move |_| {
                if let Some(shared) = weak.upgrade() {
                    if let Ok(mut s) = shared.try_borrow_mut() {
                        s.on_resize();
                    }
                }
            }));
        }
        {
            let overlay = overlay.clone();
            let halted = halted.clone();
            listeners.push(Listener::new(&window, "error", move |ev| {
                let message = ev
                    .dyn_ref::<web::ErrorEvent>()
                    .map(|e| e.message())
                    .unwrap_or_else(|| "unexpected error".to_string());
                log::error!("[viewer] uncaught error: {}", message);
                halted.set(true);
                overlay.show_error_banner(&message);
            }));
        }
        {
            let weak = weak.clone();
            listeners.push(bridge::listen(&window, origins, move |update| {
                if let Some(shared) = weak.upgrade() {
                    let change = shared.borrow_mut().core.set_config(update);
                    handle_change(&shared, change);
                }
            }));
        }
        listeners.extend(events::wire_orbit_input(&canvas, weak.clone()));
        {
            let mut s = shared.borrow_mut();
            s.listeners = listeners;
            let weak = weak.clone();
            s.panel.bind(move |action| {
                if let Some(shared) = weak.upgrade() {
                    let mut s = shared.borrow_mut();
                    s.core.apply_action(action);
                    s.sync_dom();
                }
            });
        }

        {
            let weak = weak.clone();
            let alive = alive.clone();
            spawn_local(async move {
                match GpuState::new(&canvas, &lights).await {
                    Ok(gpu) => match weak.upgrade() {
                        Some(shared) if alive.get() => shared.borrow_mut().gpu = Some(gpu),
                        _ => gpu.destroy(),
                    },
                    Err(e) => {
                        log::error!("[gpu] init error: {:#}", e);
                        halted.set(true);
                        overlay.show_error_banner(&format!("{:#}", e));
                    }
                }
            });
        }
        frame::start_loop(weak, alive.clone());

        let plan = shared.borrow_mut().core.rebuild();
        run_plan(&shared, plan);
        Ok(Self {
            shared: Some(shared),
            alive,
        })
    }

    fn with(&self, f: impl FnOnce(&Rc<RefCell<Shared>>)) {
        if let Some(shared) = &self.shared {
            f(shared);
        }
    }

    fn change(&self, f: impl FnOnce(&mut Viewer) -> ConfigChange) {
        self.with(|shared| {
            let change = f(&mut shared.borrow_mut().core);
            handle_change(shared, change);
        });
    }

    fn mutate(&self, f: impl FnOnce(&mut Viewer)) {
        self.with(|shared| {
            let mut s = shared.borrow_mut();
            f(&mut s.core);
            s.sync_dom();
        });
    }
}

fn show_setup_failure(container_id: &str, message: &str) {
    let Some(document) = dom::window_document() else { return };
    let host = document
        .get_element_by_id(container_id)
        .or_else(|| document.body().map(Into::into));
    if let Some(host) = host {
        let banner = dom::create(&document, "div", ERROR_BANNER_CLASS, ERROR_BANNER_STYLE);
        if let Ok(banner) = banner {
            banner.set_text_content(Some(&format!("{}{}", ERROR_BANNER_PREFIX, message)));
            _ = dom::append(&host, &banner);
        }
    }
}

#[wasm_bindgen]
impl LetterViewer {
    /// Create a viewer inside the element with id `container_id`.
    ///
    /// A missing container leaves an inert viewer and a visible error banner.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, config: JsValue) -> LetterViewer {
        let initial = bridge::config_from_js(&config).unwrap_or_else(|e| {
            log::warn!("[config] initial config ignored: {:#}", e);
            ConfigUpdate::default()
        });
        Self::create(container_id, initial, ViewerOptions::default())
    }

    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&self, config: JsValue) -> Result<(), JsValue> {
        let update = bridge::config_from_js(&config).map_err(|e| js_err(format!("{:#}", e)))?;
        self.change(|v| v.set_config(update));
        Ok(())
    }

    #[wasm_bindgen(js_name = setMaterial)]
    pub fn set_material(&self, name: &str) {
        self.mutate(|v| {
            if let Err(e) = v.set_material(name) {
                log::warn!("[config] {}", e);
            }
        });
    }

    #[wasm_bindgen(js_name = setFinish)]
    pub fn set_finish(&self, name: &str) {
        self.mutate(|v| {
            if let Err(e) = v.set_finish(name) {
                log::warn!("[config] {}", e);
            }
        });
    }

    #[wasm_bindgen(js_name = setColor)]
    pub fn set_color(&self, hex: &str) {
        self.mutate(|v| {
            if let Err(e) = v.set_color(hex) {
                log::warn!("[config] {}", e);
            }
        });
    }

    /// `letter_colors` is a plain object mapping keys to `#rrggbb` strings.
    #[wasm_bindgen(js_name = setMultiColor)]
    pub fn set_multi_color(&self, enabled: bool, letter_colors: JsValue) {
        let colors = if letter_colors.is_undefined() || letter_colors.is_null() {
            None
        } else {
            js_sys::JSON::stringify(&letter_colors)
                .ok()
                .and_then(|s| s.as_string())
                .and_then(|s| match serde_json::from_str::<BTreeMap<String, String>>(&s) {
                    Ok(map) => Some(map),
                    Err(e) => {
                        log::warn!("[config] malformed letterColors: {}", e);
                        None
                    }
                })
        };
        self.mutate(|v| {
            v.set_multi_color(enabled, colors);
        });
    }

    #[wasm_bindgen(js_name = setLedLighting)]
    pub fn set_led_lighting(&self, on: bool) {
        self.mutate(|v| v.set_led_lighting(on));
    }

    #[wasm_bindgen(js_name = setDimensions)]
    pub fn set_dimensions(&self, height: f32, depth: f32) {
        self.change(|v| v.set_dimensions(height, depth));
    }

    #[wasm_bindgen(js_name = setLetters)]
    pub fn set_letters(&self, text: &str) {
        self.change(|v| v.set_letters(text));
    }

    #[wasm_bindgen(js_name = setFont)]
    pub fn set_font(&self, name_or_url: &str) {
        self.change(|v| v.set_font(name_or_url));
    }

    /// Without an argument the current state is flipped.
    #[wasm_bindgen(js_name = toggleAnimation)]
    pub fn toggle_animation(&self, enabled: Option<bool>) {
        self.mutate(|v| match enabled {
            Some(on) => v.set_animation(on),
            None => {
                v.toggle_animation();
            }
        });
    }

    /// Without an argument the current state is flipped.
    #[wasm_bindgen(js_name = toggleLights)]
    pub fn toggle_lights(&self, on: Option<bool>) {
        self.mutate(|v| match on {
            Some(on) => v.set_lights(on),
            None => {
                v.toggle_lights();
            }
        });
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&self) {
        self.mutate(|v| v.apply_action(ControlAction::ZoomIn));
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&self) {
        self.mutate(|v| v.apply_action(ControlAction::ZoomOut));
    }

    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&self) {
        self.mutate(|v| v.reset_view());
    }

    #[wasm_bindgen(js_name = zoomToFit)]
    pub fn zoom_to_fit(&self) {
        self.mutate(|v| v.zoom_to_fit());
    }

    #[wasm_bindgen(js_name = onResize)]
    pub fn on_resize(&self) {
        self.with(|shared| shared.borrow_mut().on_resize());
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.shared
            .as_ref()
            .is_some_and(|s| s.borrow().core.is_ready())
    }

    #[wasm_bindgen(js_name = meshCount)]
    pub fn mesh_count(&self) -> usize {
        self.shared
            .as_ref()
            .map_or(0, |s| s.borrow().core.letters().len())
    }

    /// Stop rendering and release everything. Safe to call more than once.
    pub fn dispose(&self) {
        self.alive.set(false);
        let Some(shared) = &self.shared else { return };
        let mut s = shared.borrow_mut();
        if !s.core.dispose() {
            return;
        }
        s.listeners.clear();
        s.panel.remove();
        s.overlay.remove();
        if let Some(gpu) = s.gpu.take() {
            gpu.destroy();
        }
        s.canvas.remove();
    }
}

impl Drop for LetterViewer {
    fn drop(&mut self) {
        self.dispose();
    }
}
