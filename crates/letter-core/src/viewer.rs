//! Platform-independent viewer state machine.
//!
//! The [`Viewer`] owns configuration, letter meshes, camera, lights and panel
//! state. It never performs I/O: a rebuild that needs a typeface it does not
//! have returns a [`FontRequest`], and the caller reports the fetch result
//! back through [`Viewer::complete_font_load`]. Every completion is checked
//! against the liveness flag so a load finishing after [`Viewer::dispose`]
//! leaves the torn-down viewer untouched.
//!
//! The renderer mirrors this state lazily: `geometry_revision` bumps whenever
//! the mesh set is replaced, `material_revision` whenever any letter's shading
//! changes.

use std::collections::BTreeMap;

use glam::{Mat4, Vec3};

use crate::bridge::ReadyLatch;
use crate::camera::OrbitCamera;
use crate::config::{ConfigUpdate, StaleLoadPolicy, ViewerConfig, ViewerOptions};
use crate::constants::{GROUND_GAP, GROUND_SIZE_FACTOR, INITIAL_CAMERA_DISTANCE, ROTATION_STEP_RAD};
use crate::controls::{ControlAction, ControlPanel};
use crate::error::ConfigError;
use crate::fonts::{FontResolver, ResolvedFont};
use crate::geometry::Aabb;
use crate::layout::{build_letters, letters_bounds, LetterMesh};
use crate::lights::LightRig;
use crate::material::derive_material;
use crate::typeface::Typeface;

/// A typeface the caller must fetch and hand back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontRequest {
    pub generation: u64,
    pub font: ResolvedFont,
}

impl FontRequest {
    #[inline]
    pub fn url(&self) -> &str {
        &self.font.url
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    Disposed,
    /// A newer rebuild was requested before this load finished.
    Stale,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    /// Meshes were rebuilt. `first_ready` is true only for the first
    /// successful render since initialization.
    Rendered { first_ready: bool },
    Failed(String),
    Ignored(IgnoreReason),
}

#[derive(Clone, Debug, PartialEq)]
pub enum RebuildPlan {
    /// The typeface was cached and the rebuild already happened.
    Immediate(LoadOutcome),
    NeedsTypeface(FontRequest),
}

/// Result of a configuration change: what to do next plus rejected fields.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigChange {
    pub plan: RebuildPlan,
    pub warnings: Vec<ConfigError>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameState {
    pub rotation: f32,
    pub camera_moved: bool,
}

/// Shadow-catching floor under the letters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundPlane {
    pub center: Vec3,
    pub half_extent: f32,
}

#[derive(Clone, Debug)]
struct CachedTypeface {
    url: String,
    typeface: Typeface,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

pub struct Viewer {
    options: ViewerOptions,
    config: ViewerConfig,
    fonts: FontResolver,
    typeface: Option<CachedTypeface>,
    letters: Vec<LetterMesh>,
    /// Union of letter bounds before the group rotation.
    group_bounds: Aabb,
    camera: OrbitCamera,
    lights: LightRig,
    panel: ControlPanel,
    ready: ReadyLatch,
    animating: bool,
    rotation: f32,
    generation: u64,
    geometry_revision: u64,
    material_revision: u64,
    viewport: Viewport,
    last_error: Option<String>,
    faulted: bool,
    disposed: bool,
}

impl Viewer {
    pub fn new(
        options: ViewerOptions,
        initial: ConfigUpdate,
        viewport: Viewport,
    ) -> (Self, Vec<ConfigError>) {
        let (config, warnings) = ViewerConfig::from_update(initial);
        for w in &warnings {
            log::warn!("[config] {}", w);
        }
        let mut camera = OrbitCamera::default();
        camera.set_viewport(viewport.width, viewport.height);
        let viewer = Self {
            fonts: FontResolver::new(options.font_base_url.clone()),
            animating: options.auto_rotate,
            options,
            config,
            typeface: None,
            letters: Vec::new(),
            group_bounds: Aabb::EMPTY,
            camera,
            lights: LightRig::new(),
            panel: ControlPanel::new(),
            ready: ReadyLatch::default(),
            rotation: 0.0,
            generation: 0,
            geometry_revision: 0,
            material_revision: 0,
            viewport,
            last_error: None,
            faulted: false,
            disposed: false,
        };
        log::info!(
            "[viewer] initialized {}x{} letters='{}'",
            viewport.width,
            viewport.height,
            viewer.config.letters
        );
        (viewer, warnings)
    }

    // ---- configuration ----

    /// Merge `update` and rebuild every letter.
    pub fn set_config(&mut self, update: ConfigUpdate) -> ConfigChange {
        if self.disposed {
            return ConfigChange {
                plan: RebuildPlan::Immediate(LoadOutcome::Ignored(IgnoreReason::Disposed)),
                warnings: Vec::new(),
            };
        }
        let warnings = self.config.merge(update);
        for w in &warnings {
            log::warn!("[config] {}", w);
        }
        ConfigChange {
            plan: self.rebuild(),
            warnings,
        }
    }

    /// Start a full rebuild with the current configuration.
    pub fn rebuild(&mut self) -> RebuildPlan {
        if self.disposed {
            return RebuildPlan::Immediate(LoadOutcome::Ignored(IgnoreReason::Disposed));
        }
        self.generation += 1;
        self.panel.begin_loading(self.generation);
        let font = self.fonts.resolve(&self.config.font);
        log::debug!(
            "[viewer] rebuild #{} font={} letters='{}'",
            self.generation,
            font.key,
            self.config.letters
        );

        let cached = self.typeface.take();
        match cached {
            Some(c) if c.url == font.url => {
                let outcome = self.build(&c.typeface);
                self.typeface = Some(c);
                RebuildPlan::Immediate(outcome)
            }
            other => {
                self.typeface = other;
                RebuildPlan::NeedsTypeface(FontRequest {
                    generation: self.generation,
                    font,
                })
            }
        }
    }

    /// Hand back the result of a typeface fetch started by a [`FontRequest`].
    pub fn complete_font_load(
        &mut self,
        request: &FontRequest,
        result: Result<Typeface, String>,
    ) -> LoadOutcome {
        if self.disposed {
            log::debug!("[viewer] font load finished after dispose, ignoring");
            return LoadOutcome::Ignored(IgnoreReason::Disposed);
        }
        if self.options.stale_loads == StaleLoadPolicy::DiscardStale
            && request.generation != self.generation
        {
            log::debug!(
                "[viewer] discarding stale font load #{} (current #{})",
                request.generation,
                self.generation
            );
            return LoadOutcome::Ignored(IgnoreReason::Stale);
        }
        match result {
            Ok(typeface) => {
                log::info!(
                    "[font] loaded '{}' ({} glyphs)",
                    request.font.key,
                    typeface.glyph_count()
                );
                let outcome = self.build(&typeface);
                self.typeface = Some(CachedTypeface {
                    url: request.font.url.clone(),
                    typeface,
                });
                outcome
            }
            // A newer rebuild is still pending, so this failure is not final.
            Err(message) if request.generation != self.generation => {
                log::warn!(
                    "[font] superseded load #{} of {} failed: {}",
                    request.generation,
                    request.font.url,
                    message
                );
                LoadOutcome::Ignored(IgnoreReason::Stale)
            }
            Err(message) => {
                log::error!("[font] failed to load {}: {}", request.font.url, message);
                self.fail(message)
            }
        }
    }

    fn fail(&mut self, message: String) -> LoadOutcome {
        self.panel.fail_loading();
        self.last_error = Some(message.clone());
        LoadOutcome::Failed(message)
    }

    fn build(&mut self, typeface: &Typeface) -> LoadOutcome {
        let letters = match build_letters(typeface, &self.config, &self.options) {
            Ok(l) => l,
            Err(e) => {
                log::error!("[viewer] geometry rebuild failed: {}", e);
                return self.fail(e.to_string());
            }
        };
        // Replacing the vector drops every previous mesh.
        self.letters = letters;
        self.group_bounds = letters_bounds(&self.letters);
        self.geometry_revision += 1;
        self.material_revision += 1;
        self.last_error = None;
        self.reset_view();
        self.panel.finish_loading();

        let first_ready = self.ready.fire();
        if first_ready {
            log::info!("[viewer] first render ready ({} letters)", self.letters.len());
        } else {
            log::debug!("[viewer] rebuilt {} letters", self.letters.len());
        }
        LoadOutcome::Rendered { first_ready }
    }

    /// Stuck-load safeguard for the rebuild tagged `generation`.
    pub fn loading_timed_out(&mut self, generation: u64) -> bool {
        !self.disposed && self.panel.loading_timed_out(generation)
    }

    // ---- material-only updates ----

    fn reapply_materials(&mut self) {
        for letter in &mut self.letters {
            letter.material = derive_material(&self.config, letter.ordinal, letter.character);
        }
        self.material_revision += 1;
    }

    pub fn set_material(&mut self, name: &str) -> Result<(), ConfigError> {
        if self.disposed {
            return Ok(());
        }
        self.config.material = name.parse()?;
        self.reapply_materials();
        Ok(())
    }

    pub fn set_finish(&mut self, name: &str) -> Result<(), ConfigError> {
        if self.disposed {
            return Ok(());
        }
        self.config.finish = name.parse()?;
        self.reapply_materials();
        Ok(())
    }

    pub fn set_color(&mut self, hex: &str) -> Result<(), ConfigError> {
        if self.disposed {
            return Ok(());
        }
        let update = ConfigUpdate {
            color: Some(hex.to_string()),
            ..Default::default()
        };
        if let Some(e) = self.config.merge(update).into_iter().next() {
            return Err(e);
        }
        self.reapply_materials();
        Ok(())
    }

    /// Switch multi-color mode, optionally replacing the per-letter colors.
    /// Invalid colors are dropped and returned.
    pub fn set_multi_color(
        &mut self,
        enabled: bool,
        letter_colors: Option<BTreeMap<String, String>>,
    ) -> Vec<ConfigError> {
        if self.disposed {
            return Vec::new();
        }
        let warnings = self.config.merge(ConfigUpdate {
            multi_color: Some(enabled),
            letter_colors,
            ..Default::default()
        });
        for w in &warnings {
            log::warn!("[config] {}", w);
        }
        self.reapply_materials();
        warnings
    }

    pub fn set_led_lighting(&mut self, on: bool) {
        if self.disposed {
            return;
        }
        self.config.led_lighting = on;
        self.reapply_materials();
    }

    // ---- geometry updates ----

    pub fn set_dimensions(&mut self, height: f32, depth: f32) -> ConfigChange {
        self.set_config(ConfigUpdate {
            height: Some(height),
            depth: Some(depth),
            ..Default::default()
        })
    }

    pub fn set_letters(&mut self, text: &str) -> ConfigChange {
        self.set_config(ConfigUpdate {
            letters: Some(text.to_string()),
            ..Default::default()
        })
    }

    pub fn set_font(&mut self, name_or_url: &str) -> ConfigChange {
        self.set_config(ConfigUpdate {
            font: Some(name_or_url.to_string()),
            ..Default::default()
        })
    }

    // ---- controls ----

    pub fn set_animation(&mut self, enabled: bool) {
        self.animating = enabled;
    }

    pub fn toggle_animation(&mut self) -> bool {
        self.animating = !self.animating;
        self.animating
    }

    pub fn set_lights(&mut self, on: bool) {
        self.lights.set_on(on);
    }

    pub fn toggle_lights(&mut self) -> bool {
        self.lights.toggle()
    }

    pub fn zoom_in(&mut self) {
        self.camera.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.camera.zoom_out();
    }

    /// Frame the current letters from the front.
    pub fn reset_view(&mut self) {
        let bounds = self.bounds();
        self.camera.frame(&bounds);
        if bounds.is_empty() {
            log::debug!(
                "[viewer] nothing to frame, camera at distance {}",
                INITIAL_CAMERA_DISTANCE
            );
        }
    }

    pub fn zoom_to_fit(&mut self) {
        self.reset_view();
    }

    pub fn apply_action(&mut self, action: ControlAction) {
        match action {
            ControlAction::ResetView => self.reset_view(),
            ControlAction::ToggleRotation => {
                self.toggle_animation();
            }
            ControlAction::ToggleLights => {
                self.toggle_lights();
            }
            ControlAction::ZoomIn => self.zoom_in(),
            ControlAction::ZoomOut => self.zoom_out(),
        }
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport { width, height };
        self.camera.set_viewport(width, height);
    }

    /// Advance one display frame.
    pub fn tick(&mut self) -> FrameState {
        if self.disposed || self.faulted {
            return FrameState::default();
        }
        let camera_moved = self.camera.update();
        if self.animating {
            self.rotation = (self.rotation + ROTATION_STEP_RAD) % std::f32::consts::TAU;
        }
        FrameState {
            rotation: self.rotation,
            camera_moved,
        }
    }

    /// Record an unrecoverable runtime failure such as a lost GPU device.
    /// Animation stops and the viewer no longer advances. Returns true only
    /// the first time, so the caller reports the fault once.
    pub fn fault(&mut self, message: impl Into<String>) -> bool {
        if self.faulted || self.disposed {
            return false;
        }
        let message = message.into();
        log::error!("[viewer] halted: {}", message);
        self.faulted = true;
        self.animating = false;
        self.panel.fail_loading();
        self.last_error = Some(message);
        true
    }

    /// Release every mesh. Returns false if already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        self.letters.clear();
        self.group_bounds = Aabb::EMPTY;
        self.typeface = None;
        self.geometry_revision += 1;
        self.panel.fail_loading();
        log::info!("[viewer] disposed");
        true
    }

    // ---- accessors ----

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn letters(&self) -> &[LetterMesh] {
        &self.letters
    }

    /// World-space bounds of all letters, including the group rotation.
    pub fn bounds(&self) -> Aabb {
        self.group_bounds
            .transformed(&Mat4::from_rotation_y(self.rotation))
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn geometry_revision(&self) -> u64 {
        self.geometry_revision
    }

    pub fn material_revision(&self) -> u64 {
        self.material_revision
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.has_fired()
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn ground(&self) -> Option<GroundPlane> {
        if !self.options.ground_plane {
            return None;
        }
        if self.group_bounds.is_empty() {
            return Some(GroundPlane {
                center: Vec3::ZERO,
                half_extent: INITIAL_CAMERA_DISTANCE,
            });
        }
        let b = self.group_bounds;
        let center = b.center();
        Some(GroundPlane {
            center: Vec3::new(center.x, b.min.y - GROUND_GAP, center.z),
            half_extent: (b.max_dim() * GROUND_SIZE_FACTOR * 0.5).max(1.0),
        })
    }
}
