use bytemuck::Zeroable;
use glam::{Mat4, Vec3};
use letter_core::constants::{ENV_FACE_SIZE, SHADOW_OPACITY};
use letter_core::envmap::bake_environment;
use letter_core::geometry::ground_quad;
use letter_core::{LightRig, Viewer};
use wgpu::util::DeviceExt;
use web_sys as web;

mod environment;
mod helpers;
mod mesh;
mod shadow;

use environment::EnvironmentTexture;
use mesh::{GpuMesh, ObjectUniforms};
use shadow::ShadowMap;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    key_dir: [f32; 4],
    fill_dir: [f32; 4],
    back_pos: [f32; 4],
    ambient: [f32; 4],
}

struct Pipelines {
    opaque: wgpu::RenderPipeline,
    transparent: wgpu::RenderPipeline,
    ground: wgpu::RenderPipeline,
    shadow: wgpu::RenderPipeline,
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    pipelines: Pipelines,
    object_bgl: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    frame_bg: wgpu::BindGroup,
    shadow_frame_bg: wgpu::BindGroup,

    depth: (wgpu::Texture, wgpu::TextureView),
    shadow: ShadowMap,
    env: EnvironmentTexture,

    letters: Vec<GpuMesh>,
    ground: Option<GpuMesh>,
    geometry_revision: u64,
    material_revision: u64,
    last_rotation: f32,
}

impl GpuState {
    pub async fn new(canvas: &web::HtmlCanvasElement, lights: &LightRig) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(letter_core::SCENE_WGSL.into()),
        });

        let vf = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bgl"),
            entries: &[
                helpers::uniform_entry(0, vf),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let shadow_frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_frame_bgl"),
            entries: &[helpers::uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let object_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bgl"),
            entries: &[helpers::uniform_entry(0, vf)],
        });

        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_layout"),
            bind_group_layouts: &[&frame_bgl, &object_bgl],
            push_constant_ranges: &[],
        });
        let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow_layout"),
            bind_group_layouts: &[&shadow_frame_bgl, &object_bgl],
            push_constant_ranges: &[],
        });

        let alpha = Some(wgpu::BlendState::ALPHA_BLENDING);
        let pipelines = Pipelines {
            opaque: helpers::make_scene_pipeline(
                &device,
                helpers::PipelineSpec {
                    label: "letters_opaque",
                    layout: &scene_layout,
                    shader: &shader,
                    vs_entry: "vs_main",
                    fs_entry: Some("fs_main"),
                    color_format: Some(format),
                    blend: None,
                    depth_write: true,
                    cull_mode: None,
                    depth_bias: wgpu::DepthBiasState::default(),
                },
            ),
            transparent: helpers::make_scene_pipeline(
                &device,
                helpers::PipelineSpec {
                    label: "letters_transparent",
                    layout: &scene_layout,
                    shader: &shader,
                    vs_entry: "vs_main",
                    fs_entry: Some("fs_main"),
                    color_format: Some(format),
                    blend: alpha,
                    depth_write: false,
                    cull_mode: None,
                    depth_bias: wgpu::DepthBiasState::default(),
                },
            ),
            ground: helpers::make_scene_pipeline(
                &device,
                helpers::PipelineSpec {
                    label: "ground",
                    layout: &scene_layout,
                    shader: &shader,
                    vs_entry: "vs_main",
                    fs_entry: Some("fs_ground"),
                    color_format: Some(format),
                    blend: alpha,
                    depth_write: false,
                    cull_mode: None,
                    depth_bias: wgpu::DepthBiasState::default(),
                },
            ),
            shadow: helpers::make_scene_pipeline(
                &device,
                helpers::PipelineSpec {
                    label: "shadow",
                    layout: &shadow_layout,
                    shader: &shader,
                    vs_entry: "vs_shadow",
                    fs_entry: None,
                    color_format: None,
                    blend: None,
                    depth_write: true,
                    cull_mode: None,
                    depth_bias: wgpu::DepthBiasState {
                        constant: 2,
                        slope_scale: 2.0,
                        clamp: 0.0,
                    },
                },
            ),
        };

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let shadow = ShadowMap::new(&device);
        let env = EnvironmentTexture::upload(
            &device,
            &queue,
            &bake_environment(ENV_FACE_SIZE, lights),
        );
        let frame_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bg"),
            layout: &frame_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&env.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&env.sampler),
                },
            ],
        });
        let shadow_frame_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_frame_bg"),
            layout: &shadow_frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });
        let depth = helpers::create_depth_texture(
            &device,
            "depth",
            width,
            height,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        log::info!("[gpu] ready {}x{} format={:?}", width, height, format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipelines,
            object_bgl,
            frame_buffer,
            frame_bg,
            shadow_frame_bg,
            depth,
            shadow,
            env,
            letters: Vec::new(),
            ground: None,
            // Force the first sync to upload.
            geometry_revision: u64::MAX,
            material_revision: u64::MAX,
            last_rotation: f32::NAN,
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth.0.destroy();
        self.depth = helpers::create_depth_texture(
            &self.device,
            "depth",
            width,
            height,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
    }

    fn release_meshes(&mut self) {
        for m in self.letters.drain(..) {
            m.release();
        }
        if let Some(g) = self.ground.take() {
            g.release();
        }
    }

    /// Bring GPU buffers in line with the viewer's revisions.
    fn sync(&mut self, viewer: &Viewer) {
        if viewer.geometry_revision() != self.geometry_revision {
            self.release_meshes();
            let rotation = viewer.rotation();
            for letter in viewer.letters() {
                let label = format!("letter_{}", letter.ordinal);
                let uniforms =
                    ObjectUniforms::letter(letter.model_matrix(rotation), &letter.material);
                if let Some(mut m) = GpuMesh::upload(
                    &self.device,
                    &self.object_bgl,
                    &label,
                    &letter.mesh,
                    uniforms,
                    letter.material.transparent,
                ) {
                    m.center += letter.offset;
                    self.letters.push(m);
                }
            }
            self.ground = viewer.ground().and_then(|g| {
                GpuMesh::upload(
                    &self.device,
                    &self.object_bgl,
                    "ground",
                    &ground_quad(g.center, g.half_extent),
                    ObjectUniforms::ground(),
                    true,
                )
            });
            log::debug!("[gpu] uploaded {} letter meshes", self.letters.len());
            self.geometry_revision = viewer.geometry_revision();
            self.material_revision = viewer.material_revision();
            self.last_rotation = rotation;
            return;
        }

        let rotation = viewer.rotation();
        if viewer.material_revision() != self.material_revision || rotation != self.last_rotation {
            // Letters without triangles have no GPU mesh, so match by skipping them.
            let drawable = viewer.letters().iter().filter(|l| !l.mesh.is_empty());
            for (gpu, letter) in self.letters.iter_mut().zip(drawable) {
                gpu.transparent = letter.material.transparent;
                gpu.write_uniforms(
                    &self.queue,
                    &ObjectUniforms::letter(letter.model_matrix(rotation), &letter.material),
                );
            }
            self.material_revision = viewer.material_revision();
            self.last_rotation = rotation;
        }
    }

    fn frame_uniforms(&self, viewer: &Viewer) -> FrameUniforms {
        let camera = viewer.camera().camera();
        let lights = viewer.lights();
        let ground_half = viewer.ground().map(|g| g.half_extent).unwrap_or(0.0);
        let light_vp = shadow::light_view_proj(
            lights.key.direction_to_light(),
            &viewer.bounds(),
            ground_half,
        );
        let dir4 = |v: Vec3, w: f32| [v.x, v.y, v.z, w];
        FrameUniforms {
            view_proj: camera.view_projection().to_cols_array_2d(),
            light_view_proj: light_vp.to_cols_array_2d(),
            camera_pos: dir4(camera.eye, 1.0),
            key_dir: dir4(lights.key.direction_to_light(), lights.key.intensity),
            fill_dir: dir4(lights.fill.direction_to_light(), lights.fill.intensity),
            back_pos: dir4(lights.back.position, lights.back.intensity),
            ambient: [lights.ambient.intensity, SHADOW_OPACITY, 0.0, 0.0],
        }
    }

    pub fn render(&mut self, viewer: &Viewer) -> Result<(), wgpu::SurfaceError> {
        self.sync(viewer);
        let uniforms = self.frame_uniforms(viewer);
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniforms));

        let frame = match self.surface.get_current_texture() {
            Ok(f) => f,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipelines.shadow);
            pass.set_bind_group(0, &self.shadow_frame_bg, &[]);
            for m in &self.letters {
                m.draw(&mut pass, 1);
            }
        }

        let [r, g, b] = viewer.config().background_color.to_linear();
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.1,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.frame_bg, &[]);

            pass.set_pipeline(&self.pipelines.opaque);
            for m in self.letters.iter().filter(|m| !m.transparent) {
                m.draw(&mut pass, 1);
            }

            if let Some(ground) = &self.ground {
                pass.set_pipeline(&self.pipelines.ground);
                ground.draw(&mut pass, 1);
            }

            // Back to front.
            let eye = viewer.camera().eye();
            let group = Mat4::from_rotation_y(viewer.rotation());
            let mut transparent: Vec<(&GpuMesh, f32)> = self
                .letters
                .iter()
                .filter(|m| m.transparent)
                .map(|m| (m, group.transform_point3(m.center).distance_squared(eye)))
                .collect();
            if !transparent.is_empty() {
                transparent.sort_by(|a, b| b.1.total_cmp(&a.1));
                pass.set_pipeline(&self.pipelines.transparent);
                for (m, _) in transparent {
                    m.draw(&mut pass, 1);
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Release every GPU resource and unconfigure the canvas.
    pub fn destroy(mut self) {
        self.release_meshes();
        self.frame_buffer.destroy();
        self.depth.0.destroy();
        self.shadow.destroy();
        self.env.destroy();
        self.device.destroy();
        log::info!("[gpu] released");
    }
}
