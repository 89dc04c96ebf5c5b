use glam::Mat4;
use letter_core::{MaterialParams, MeshData};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct ObjectUniforms {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
    params: [f32; 4],
}

impl ObjectUniforms {
    pub fn letter(model: Mat4, material: &MaterialParams) -> Self {
        let [r, g, b] = material.base_color.to_linear();
        Self {
            model: model.to_cols_array_2d(),
            base_color: [r, g, b, material.opacity],
            params: [
                material.roughness,
                material.metalness,
                if material.env_reflections { 1.0 } else { 0.0 },
                material.emissive,
            ],
        }
    }

    pub fn ground() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            base_color: [0.0; 4],
            params: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// GPU copy of one mesh plus its per-object uniforms.
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub transparent: bool,
    /// Center in mesh space, used to sort transparent letters.
    pub center: glam::Vec3,
}

impl GpuMesh {
    /// `None` for meshes without triangles.
    pub fn upload(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        mesh: &MeshData,
        uniforms: ObjectUniforms,
        transparent: bool,
    ) -> Option<Self> {
        if mesh.is_empty() {
            return None;
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.interleaved()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        Some(Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            uniform_buffer,
            bind_group,
            transparent,
            center: mesh.bounds().center(),
        })
    }

    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &ObjectUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, object_group: u32) {
        pass.set_bind_group(object_group, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Free GPU memory now instead of waiting for the last handle to drop.
    pub fn release(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.uniform_buffer.destroy();
    }
}
