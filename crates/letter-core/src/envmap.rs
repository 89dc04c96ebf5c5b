//! Procedural environment cube map for reflective materials.
//!
//! A small studio: bright sky gradient above, dim floor below and two soft
//! highlights matching the key and fill lights. Faces are RGBA8 sRGB in the
//! layer order WebGPU expects: +X, -X, +Y, -Y, +Z, -Z.

use glam::Vec3;

use crate::lights::LightRig;

pub const FACE_COUNT: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentMap {
    pub size: u32,
    pub faces: [Vec<u8>; FACE_COUNT],
}

impl EnvironmentMap {
    pub fn bytes_per_row(&self) -> u32 {
        self.size * 4
    }
}

const ZENITH: Vec3 = Vec3::new(0.78, 0.85, 0.95);
const HORIZON: Vec3 = Vec3::new(0.95, 0.95, 0.95);
const FLOOR: Vec3 = Vec3::new(0.25, 0.25, 0.27);

/// World direction through texel `(u, v)` (both in -1..1) of `face`.
pub fn face_direction(face: usize, u: f32, v: f32) -> Vec3 {
    let d = match face {
        0 => Vec3::new(1.0, -v, -u),
        1 => Vec3::new(-1.0, -v, u),
        2 => Vec3::new(u, 1.0, v),
        3 => Vec3::new(u, -1.0, -v),
        4 => Vec3::new(u, -v, 1.0),
        _ => Vec3::new(-u, -v, -1.0),
    };
    d.normalize()
}

fn radiance(dir: Vec3, highlights: &[(Vec3, f32)]) -> Vec3 {
    let mut c = if dir.y >= 0.0 {
        HORIZON.lerp(ZENITH, dir.y.powf(0.6))
    } else {
        HORIZON.lerp(FLOOR, (-dir.y).powf(0.4))
    };
    for &(to_light, strength) in highlights {
        let lobe = dir.dot(to_light).max(0.0).powi(48);
        c += Vec3::splat(lobe * strength);
    }
    c
}

#[inline]
fn to_byte(x: f32) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

pub fn bake_environment(size: u32, lights: &LightRig) -> EnvironmentMap {
    let size = size.max(1);
    let highlights = [
        (lights.key.direction_to_light(), 1.5),
        (lights.fill.direction_to_light(), 0.6),
    ];
    let faces = std::array::from_fn(|face| {
        let mut texels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let u = 2.0 * (x as f32 + 0.5) / size as f32 - 1.0;
                let v = 2.0 * (y as f32 + 0.5) / size as f32 - 1.0;
                let c = radiance(face_direction(face, u, v), &highlights);
                texels.extend_from_slice(&[to_byte(c.x), to_byte(c.y), to_byte(c.z), 255]);
            }
        }
        texels
    });
    EnvironmentMap { size, faces }
}
