//! Forward renderer for scene graphs on wgpu.

mod hud;
pub mod uniforms;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Mat4;
use log::{info, warn};
use wgpu::util::DeviceExt;
use winit::event::WindowEvent;
use winit::window::Window;

use self::hud::Hud;
use self::uniforms::{draw_order, CameraUniform, LightsUniform, ModelUniform, Vertex};
use crate::config::{LightsConfig, RendererConfig};
use crate::core::ViewerStatus;
use crate::math::Color;
use crate::scene::{NodeId, SceneGraph};
use crate::traits::SceneRenderer;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MSAA_SAMPLES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    blended: bool,
    cull_mode: Option<wgpu::Face>,
}

/// GPU copy of one mesh node
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
}

/// Render targets that follow the surface size
struct Targets {
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
}

/// Surface settings picked from what the adapter supports
#[derive(Debug, Clone, Copy, PartialEq)]
struct SurfaceModes {
    format: wgpu::TextureFormat,
    alpha_mode: wgpu::CompositeAlphaMode,
    present_mode: wgpu::PresentMode,
}

impl SurfaceModes {
    /// Prefers an sRGB format, and a compositing alpha mode when `transparent`
    fn choose(caps: &wgpu::SurfaceCapabilities, transparent: bool) -> Result<Self> {
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("Surface reports no supported texture formats")?;

        // See-through clear color needs a compositing alpha mode
        let alpha_mode = caps
            .alpha_modes
            .iter()
            .copied()
            .find(|m| {
                transparent
                    && matches!(
                        m,
                        wgpu::CompositeAlphaMode::PreMultiplied | wgpu::CompositeAlphaMode::PostMultiplied
                    )
            })
            .or_else(|| caps.alpha_modes.first().copied())
            .context("Surface reports no supported alpha modes")?;

        let present_mode = caps
            .present_modes
            .first()
            .copied()
            .context("Surface reports no supported present modes")?;

        Ok(Self {
            format,
            alpha_mode,
            present_mode,
        })
    }
}

pub struct WgpuRenderer {
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    targets: Targets,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    camera_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    meshes: HashMap<NodeId, GpuMesh>,
    clear_color: wgpu::Color,
    lights: LightsConfig,
    hud: Option<Hud>,
}

impl WgpuRenderer {
    pub async fn new(
        window: Arc<Window>,
        config: &RendererConfig,
        lights: &LightsConfig,
        show_ui: bool,
    ) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let surface_config = Self::create_surface_config(&surface, &adapter, size, config.clear_alpha < 1.0)?;
        surface.configure(&device, &surface_config);

        let msaa_supported = adapter
            .get_texture_format_features(surface_config.format)
            .flags
            .sample_count_supported(MSAA_SAMPLES);
        let sample_count = if config.antialias && msaa_supported {
            MSAA_SAMPLES
        } else {
            1
        };

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lights_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lights Buffer"),
            size: std::mem::size_of::<LightsUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0), uniform_entry(1)],
            label: Some("frame_bind_group_layout"),
        });
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0)],
            label: Some("model_bind_group_layout"),
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
            label: Some("frame_bind_group"),
        });

        let pipelines = Self::create_pipelines(
            &device,
            &[&frame_layout, &model_layout],
            surface_config.format,
            sample_count,
        );
        let targets = Self::create_targets(&device, &surface_config, sample_count);

        let hud = show_ui.then(|| Hud::new(&device, surface_config.format, &window));

        let clear = Color::from_hex(config.clear_color);
        let clear_color = wgpu::Color {
            r: clear.r as f64,
            g: clear.g as f64,
            b: clear.b as f64,
            a: config.clear_alpha as f64,
        };

        info!(
            "Renderer initialized: {}x{} {:?}, {}x MSAA",
            size.width, size.height, surface_config.format, sample_count
        );

        Ok(Self {
            window,
            device,
            queue,
            surface,
            surface_config,
            sample_count,
            targets,
            pipelines,
            camera_buffer,
            lights_buffer,
            frame_bind_group,
            model_layout,
            meshes: HashMap::new(),
            clear_color,
            lights: lights.clone(),
            hud,
        })
    }

    async fn request_adapter(instance: &wgpu::Instance, surface: &wgpu::Surface<'_>) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find appropriate adapter")
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
        transparent: bool,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let surface_caps = surface.get_capabilities(adapter);
        let modes = SurfaceModes::choose(&surface_caps, transparent)?;

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: modes.format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: modes.present_mode,
            alpha_mode: modes.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    fn create_targets(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, sample_count: u32) -> Targets {
        let size = wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        };

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let msaa_view = (sample_count > 1).then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("MSAA Color Texture"),
                    size,
                    mip_level_count: 1,
                    sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: config.format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        Targets {
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            msaa_view,
        }
    }

    fn create_pipelines(
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> HashMap<PipelineKey, wgpu::RenderPipeline> {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        let mut pipelines = HashMap::new();
        for blended in [false, true] {
            for cull_mode in [Some(wgpu::Face::Back), Some(wgpu::Face::Front), None] {
                let key = PipelineKey { blended, cull_mode };
                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(if blended { "Blended Mesh Pipeline" } else { "Opaque Mesh Pipeline" }),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        buffers: &[Vertex::layout()],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: surface_format,
                            blend: Some(if blended {
                                wgpu::BlendState::ALPHA_BLENDING
                            } else {
                                wgpu::BlendState::REPLACE
                            }),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: DEPTH_FORMAT,
                        // Blended surfaces still test against opaque depth
                        depth_write_enabled: !blended,
                        depth_compare: wgpu::CompareFunction::LessEqual,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState {
                        count: sample_count,
                        mask: !0,
                        alpha_to_coverage_enabled: false,
                    },
                    multiview: None,
                    cache: None,
                });
                pipelines.insert(key, pipeline);
            }
        }
        pipelines
    }

    /// Forward a window event to the overlay. True means the overlay used it
    /// and nothing else should.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match &mut self.hud {
            Some(hud) => hud.handle_event(&self.window, event),
            None => false,
        }
    }

    fn upload_mesh(&self, id: NodeId, scene: &SceneGraph) -> Option<GpuMesh> {
        let mesh = scene.mesh(id)?;
        let geometry = &mesh.geometry;
        if geometry.indices.is_empty() {
            return None;
        }

        let vertices: Vec<Vertex> = geometry
            .positions
            .iter()
            .zip(&geometry.normals)
            .map(|(p, n)| Vertex {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect();

        let label = scene.get(id).map(|n| n.display_name()).unwrap_or("mesh");
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let model_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<ModelUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let model_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
            label: Some("model_bind_group"),
        });

        Some(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
            model_buffer,
            model_bind_group,
        })
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
        self.targets = Self::create_targets(&self.device, &self.surface_config, self.sample_count);
    }

    fn pipeline_key(scene: &SceneGraph, id: NodeId) -> Option<PipelineKey> {
        let node = scene.get(id)?;
        let material = scene.mesh(id)?.effective_material();
        let cull_mode = if material.double_sided {
            None
        } else if node.world().determinant() < 0.0 {
            // Mirrored transforms flip winding
            Some(wgpu::Face::Front)
        } else {
            Some(wgpu::Face::Back)
        };
        Some(PipelineKey {
            blended: material.is_blended(),
            cull_mode,
        })
    }
}

impl SceneRenderer for WgpuRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.reconfigure();
    }

    fn render(&mut self, scene: &SceneGraph, camera: NodeId, status: &ViewerStatus) -> Result<()> {
        let projection = scene
            .camera(camera)
            .map(|c| c.projection_matrix())
            .ok_or_else(|| anyhow!("node {} is not a camera", camera.index()))?;
        let camera_world = scene.world_transform(camera).unwrap_or(Mat4::IDENTITY);
        let camera_uniform = CameraUniform::new(projection, camera_world);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera_uniform]));

        let lights = LightsUniform::build(&self.lights, &scene.lights());
        self.queue
            .write_buffer(&self.lights_buffer, 0, bytemuck::cast_slice(&[lights]));

        let eye = camera_world.transform_point3(glam::Vec3::ZERO);
        let (opaque, blended) = draw_order(scene, eye);

        for &id in opaque.iter().chain(&blended) {
            if !self.meshes.contains_key(&id) {
                if let Some(gpu) = self.upload_mesh(id, scene) {
                    self.meshes.insert(id, gpu);
                }
            }
            if let (Some(gpu), Some(node), Some(mesh)) = (self.meshes.get(&id), scene.get(id), scene.mesh(id)) {
                let model = ModelUniform::new(node.world(), mesh.effective_material());
                self.queue
                    .write_buffer(&gpu.model_buffer, 0, bytemuck::cast_slice(&[model]));
            }
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Skip this frame; the next one draws to the fresh surface
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to acquire surface texture"),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let (color_view, resolve_target) = match &self.targets.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

            // Opaque first, then blended back to front
            for &id in opaque.iter().chain(&blended) {
                let (Some(gpu), Some(key)) = (self.meshes.get(&id), Self::pipeline_key(scene, id)) else {
                    continue;
                };
                let Some(pipeline) = self.pipelines.get(&key) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &gpu.model_bind_group, &[]);
                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }
        }

        if let Some(hud) = &mut self.hud {
            hud.paint(
                &self.device,
                &self.queue,
                &mut encoder,
                &view,
                &self.window,
                [self.surface_config.width, self.surface_config.height],
                status,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
