//! Perspective camera and damped orbit controls.
//!
//! The orbit state is a target point plus spherical coordinates around it:
//! `theta` is the azimuth around +Y (0 looks down -Z from +Z) and `phi` the
//! polar angle from +Y (`PI / 2` is level with the target). User input only
//! accumulates deltas; [`OrbitCamera::update`] applies a `damping` fraction of
//! the pending deltas per frame so motion eases out.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};

use crate::constants::*;
use crate::geometry::Aabb;

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

const PHI_EPS: f32 = 1e-3;

#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    radius: f32,
    theta: f32,
    phi: f32,
    pending_theta: f32,
    pending_phi: f32,
    pending_pan: Vec3,
    pending_scale: f32,
    pub damping: f32,
    pub fovy_radians: f32,
    pub aspect: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl OrbitCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            radius: INITIAL_CAMERA_DISTANCE,
            theta: 0.0,
            phi: PI / 2.0,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_pan: Vec3::ZERO,
            pending_scale: 1.0,
            damping: DAMPING_FACTOR,
            fovy_radians: FOV_Y_DEGREES.to_radians(),
            aspect,
        }
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.target + self.radius * Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
    }

    pub fn camera(&self) -> Camera {
        Camera {
            eye: self.eye(),
            target: self.target,
            up: Vec3::Y,
            aspect: self.aspect,
            fovy_radians: self.fovy_radians,
            znear: Z_NEAR,
            zfar: Z_FAR,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Queue an orbit from a pointer drag of `(dx, dy)` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.pending_theta -= TAU * dx / h * ROTATE_SPEED;
        self.pending_phi -= TAU * dy / h * ROTATE_SPEED;
    }

    /// Queue a screen-space pan from a pointer drag of `(dx, dy)` pixels.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        let world_per_px = 2.0 * self.radius * (self.fovy_radians * 0.5).tan() / h * PAN_SPEED;
        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        self.pending_pan += (-right * dx + up * dy) * world_per_px;
    }

    /// Queue a dolly from a wheel delta; positive moves away.
    pub fn dolly(&mut self, wheel_delta_y: f32) {
        if wheel_delta_y > 0.0 {
            self.pending_scale /= DOLLY_STEP;
        } else if wheel_delta_y < 0.0 {
            self.pending_scale *= DOLLY_STEP;
        }
    }

    /// Scale the distance to the target immediately.
    pub fn zoom_by(&mut self, factor: f32) {
        self.radius = (self.radius * factor).max(Z_NEAR);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(ZOOM_IN_FACTOR);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(ZOOM_OUT_FACTOR);
    }

    /// Distance that fits a box with largest dimension `max_dim` in view.
    pub fn framing_distance(&self, max_dim: f32) -> f32 {
        (max_dim / (self.fovy_radians * 0.5).sin() * FRAME_MARGIN).max(MIN_CAMERA_DISTANCE)
    }

    /// Look at the center of `bounds` from the front, far enough to see all of it.
    ///
    /// An empty box resets to the initial view.
    pub fn frame(&mut self, bounds: &Aabb) {
        self.clear_pending();
        self.theta = 0.0;
        self.phi = PI / 2.0;
        if bounds.is_empty() {
            self.target = Vec3::ZERO;
            self.radius = INITIAL_CAMERA_DISTANCE;
            return;
        }
        self.target = bounds.center();
        self.radius = self.framing_distance(bounds.max_dim());
    }

    fn clear_pending(&mut self) {
        self.pending_theta = 0.0;
        self.pending_phi = 0.0;
        self.pending_pan = Vec3::ZERO;
        self.pending_scale = 1.0;
    }

    /// Advance damping by one frame. Returns true if the view changed.
    pub fn update(&mut self) -> bool {
        let d = self.damping.clamp(0.0, 1.0);
        let before = (self.theta, self.phi, self.radius, self.target);

        self.theta += self.pending_theta * d;
        self.phi = (self.phi + self.pending_phi * d).clamp(PHI_EPS, PI - PHI_EPS);
        self.target += self.pending_pan * d;
        self.radius = (self.radius * self.pending_scale).max(Z_NEAR);

        self.pending_theta *= 1.0 - d;
        self.pending_phi *= 1.0 - d;
        self.pending_pan *= 1.0 - d;
        self.pending_scale = 1.0;
        if self.pending_theta.abs() < 1e-6 {
            self.pending_theta = 0.0;
        }
        if self.pending_phi.abs() < 1e-6 {
            self.pending_phi = 0.0;
        }

        before != (self.theta, self.phi, self.radius, self.target)
    }
}
