//! CPU-side layouts of the shader uniforms and the per-frame draw order.

use glam::{Mat4, Vec3};

use crate::config::LightsConfig;
use crate::math::Color;
use crate::scene::{LightKind, Material, NodeId, SceneGraph, WorldLight};

/// Lights beyond this count are not shaded
pub const MAX_LIGHTS: usize = 8;

const KIND_DIRECTIONAL: f32 = 0.0;
const KIND_POINT: f32 = 1.0;
const KIND_SPOT: f32 = 2.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Camera uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

impl CameraUniform {
    pub fn new(projection: Mat4, camera_world: Mat4) -> Self {
        let eye = camera_world.transform_point3(Vec3::ZERO);
        Self {
            view_proj: (projection * camera_world.inverse()).to_cols_array_2d(),
            eye: eye.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// xyz: direction towards the light (directional) or position; w: kind
    pub vector: [f32; 4],
    /// rgb: color times intensity
    pub color: [f32; 4],
    /// x: range or 0 when unbounded, y: cos outer cone, z: cos inner cone
    pub cone: [f32; 4],
    /// xyz: direction a spot light points
    pub aim: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub ambient: [f32; 4],
    pub count: [u32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl LightsUniform {
    /// The configured ambient and directional lights followed by the scene's
    /// own lights, in traversal order, up to [`MAX_LIGHTS`]
    pub fn build(config: &LightsConfig, scene_lights: &[WorldLight]) -> Self {
        let mut ambient = Color::from_hex(config.ambient.color).scaled(config.ambient.intensity);
        let mut lights = Vec::with_capacity(MAX_LIGHTS);

        let position = Vec3::from_array(config.directional.position);
        if config.directional.intensity > 0.0 {
            lights.push(LightUniform {
                vector: position.normalize_or(Vec3::Y).extend(KIND_DIRECTIONAL).to_array(),
                color: radiance(Color::from_hex(config.directional.color).scaled(config.directional.intensity)),
                cone: [0.0; 4],
                aim: [0.0; 4],
            });
        }

        for world in scene_lights {
            let radiance = radiance(world.light.radiance());
            let packed = match world.light.kind {
                LightKind::Ambient => {
                    let add = world.light.radiance();
                    ambient = Color::new(ambient.r + add.r, ambient.g + add.g, ambient.b + add.b);
                    continue;
                }
                LightKind::Directional => LightUniform {
                    vector: (-world.direction).extend(KIND_DIRECTIONAL).to_array(),
                    color: radiance,
                    cone: [0.0; 4],
                    aim: [0.0; 4],
                },
                LightKind::Point { range } => LightUniform {
                    vector: world.position.extend(KIND_POINT).to_array(),
                    color: radiance,
                    cone: [range.unwrap_or(0.0), -1.0, -1.0, 0.0],
                    aim: [0.0; 4],
                },
                LightKind::Spot {
                    range,
                    inner_cone_angle,
                    outer_cone_angle,
                } => LightUniform {
                    vector: world.position.extend(KIND_SPOT).to_array(),
                    color: radiance,
                    cone: [
                        range.unwrap_or(0.0),
                        outer_cone_angle.cos(),
                        inner_cone_angle.cos(),
                        0.0,
                    ],
                    aim: world.direction.extend(0.0).to_array(),
                },
            };
            if lights.len() == MAX_LIGHTS {
                log::warn!("Scene has more than {} lights, extra lights are ignored", MAX_LIGHTS);
                break;
            }
            lights.push(packed);
        }

        let mut uniform = Self {
            ambient: [ambient.r, ambient.g, ambient.b, 1.0],
            count: [lights.len() as u32, 0, 0, 0],
            lights: [LightUniform::default(); MAX_LIGHTS],
        };
        uniform.lights[..lights.len()].copy_from_slice(&lights);
        uniform
    }
}

fn radiance(color: Color) -> [f32; 4] {
    [color.r, color.g, color.b, 0.0]
}

/// Per-mesh transform and surface color
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    /// Linear rgb and opacity
    pub color: [f32; 4],
}

impl ModelUniform {
    pub fn new(world: Mat4, material: &Material) -> Self {
        let opacity = if material.transparent { material.opacity } else { 1.0 };
        Self {
            model: world.to_cols_array_2d(),
            normal: world.inverse().transpose().to_cols_array_2d(),
            color: [material.color.r, material.color.g, material.color.b, opacity],
        }
    }
}

/// Mesh nodes split into the opaque pass, in traversal order, and the
/// blended pass, farthest from `eye` first
pub fn draw_order(scene: &SceneGraph, eye: Vec3) -> (Vec<NodeId>, Vec<NodeId>) {
    let mut opaque = Vec::new();
    let mut blended = Vec::new();

    for (id, node, mesh) in scene.meshes() {
        if mesh.effective_material().is_blended() {
            let center = mesh
                .geometry
                .bounds
                .map(|b| b.transformed(&node.world()).center())
                .unwrap_or_else(|| node.world().transform_point3(Vec3::ZERO));
            blended.push((id, center.distance_squared(eye)));
        } else {
            opaque.push(id);
        }
    }

    blended.sort_by(|a, b| b.1.total_cmp(&a.1));
    (opaque, blended.into_iter().map(|(id, _)| id).collect())
}
