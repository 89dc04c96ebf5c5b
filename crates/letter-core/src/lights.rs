//! Fixed light rig: ambient, a shadow-casting key light, a directional fill
//! and a point back light. Only intensities change at runtime.

use glam::Vec3;

use crate::constants::{LIGHTS_BRIGHT, LIGHTS_DIM};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    /// World position; for directional lights the direction is toward the origin.
    pub position: Vec3,
    pub intensity: f32,
    pub casts_shadow: bool,
}

impl Light {
    /// Unit vector from the lit point toward a directional light.
    pub fn direction_to_light(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    pub ambient: Light,
    pub key: Light,
    pub fill: Light,
    pub back: Light,
    on: bool,
}

impl Default for LightRig {
    fn default() -> Self {
        Self::new()
    }
}

impl LightRig {
    pub fn new() -> Self {
        let [ambient, key, fill, back] = LIGHTS_BRIGHT;
        Self {
            ambient: Light {
                kind: LightKind::Ambient,
                position: Vec3::ZERO,
                intensity: ambient,
                casts_shadow: false,
            },
            key: Light {
                kind: LightKind::Directional,
                position: Vec3::new(5.0, 10.0, 7.5),
                intensity: key,
                casts_shadow: true,
            },
            fill: Light {
                kind: LightKind::Directional,
                position: Vec3::new(-5.0, 5.0, -5.0),
                intensity: fill,
                casts_shadow: false,
            },
            back: Light {
                kind: LightKind::Point,
                position: Vec3::new(0.0, 5.0, -10.0),
                intensity: back,
                casts_shadow: false,
            },
            on: true,
        }
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn set_on(&mut self, on: bool) {
        self.on = on;
        let [a, k, f, b] = if on { LIGHTS_BRIGHT } else { LIGHTS_DIM };
        self.ambient.intensity = a;
        self.key.intensity = k;
        self.fill.intensity = f;
        self.back.intensity = b;
    }

    /// Flip between the bright and dim presets; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.set_on(!self.on);
        self.on
    }

    /// `[ambient, key, fill, back]`
    pub fn intensities(&self) -> [f32; 4] {
        [
            self.ambient.intensity,
            self.key.intensity,
            self.fill.intensity,
            self.back.intensity,
        ]
    }
}
