use super::helpers;
use glam::{Mat4, Vec3};
use letter_core::Aabb;

pub const SHADOW_MAP_SIZE: u32 = 2048;

pub struct ShadowMap {
    texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl ShadowMap {
    pub fn new(device: &wgpu::Device) -> Self {
        let (texture, view) = helpers::create_depth_texture(
            device,
            "shadow_map",
            SHADOW_MAP_SIZE,
            SHADOW_MAP_SIZE,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
        }
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Orthographic key-light projection covering `bounds` and the ground under it.
pub fn light_view_proj(to_light: Vec3, bounds: &Aabb, ground_half_extent: f32) -> Mat4 {
    let (center, radius) = if bounds.is_empty() {
        (Vec3::ZERO, ground_half_extent.max(1.0))
    } else {
        let half = bounds.size() * 0.5;
        (bounds.center(), half.length().max(ground_half_extent * 0.5).max(0.5))
    };
    let dir = to_light.normalize_or_zero();
    let dir = if dir == Vec3::ZERO { Vec3::Y } else { dir };
    let distance = radius * 3.0;
    let eye = center + dir * distance;
    let up = if dir.abs_diff_eq(Vec3::Y, 1e-3) {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let view = Mat4::look_at_rh(eye, center, up);
    let proj = Mat4::orthographic_rh(
        -radius,
        radius,
        -radius,
        radius,
        0.01,
        distance + radius * 2.0,
    );
    proj * view
}
