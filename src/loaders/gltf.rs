use std::path::Path;

use glam::{Mat4, Vec3};

use crate::error::LoadError;
use crate::math::Color;
use crate::scene::{Camera, Geometry, Light, LightKind, Material, Mesh, NodeId, NodeKind, SceneGraph};
use crate::traits::SceneLoader;

/// Loads `.gltf` / `.glb` files through the `gltf` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfLoader;

impl SceneLoader for GltfLoader {
    fn load(&self, path: &Path) -> Result<SceneGraph, LoadError> {
        load_gltf_file(path)
    }

    fn name(&self) -> &str {
        "glTF"
    }
}

/// Builds a scene graph from the file's default scene, or its first scene
pub fn load_gltf_file(path: impl AsRef<Path>) -> Result<SceneGraph, LoadError> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {:?}", path);

    let (document, buffers, _images) = gltf::import(path).map_err(|source| LoadError::Import {
        path: path.to_path_buf(),
        source,
    })?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| LoadError::NoScene(path.to_path_buf()))?;

    log::debug!("Using scene {:?} ({} top-level nodes)", scene.name(), scene.nodes().count());

    let mut graph = SceneGraph::new();
    for node in scene.nodes() {
        process_node(&node, &buffers, None, &mut graph)?;
    }
    graph.update_world_transforms();

    let stats = graph.stats();
    log::info!(
        "glTF loaded: {} nodes, {} meshes ({} triangles), {} cameras, {} lights",
        stats.nodes,
        stats.meshes,
        stats.triangles,
        stats.cameras,
        stats.lights
    );

    Ok(graph)
}

/// Adds `node` and its subtree. A node carrying several attachments keeps the
/// first of camera, mesh, light as its own kind; the others become children
/// with identity transforms.
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: Option<NodeId>,
    graph: &mut SceneGraph,
) -> Result<(), LoadError> {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let name = node
        .name()
        .or_else(|| node.mesh().and_then(|m| m.name()))
        .map(str::to_string);

    let mut meshes = match node.mesh() {
        Some(mesh) => read_mesh(&mesh, buffers)?,
        None => Vec::new(),
    };
    let camera = node.camera().map(|c| convert_camera(&c));
    let mut light = node.light().map(|l| convert_light(&l));

    let kind = if let Some(camera) = camera {
        NodeKind::Camera(camera)
    } else if meshes.len() == 1 {
        NodeKind::Mesh(meshes.remove(0).1)
    } else if meshes.is_empty() {
        light.take().map(NodeKind::Light).unwrap_or(NodeKind::Group)
    } else {
        NodeKind::Group
    };

    let id = graph.add_node(parent, name.clone(), local, kind);

    // Multi-primitive meshes become one child per primitive
    for (index, mesh) in meshes {
        let child_name = format!("{}#{}", name.as_deref().unwrap_or("mesh"), index);
        graph.add_node(Some(id), Some(child_name), Mat4::IDENTITY, NodeKind::Mesh(mesh));
    }
    if let Some(light) = light {
        graph.add_node(Some(id), name.clone(), Mat4::IDENTITY, NodeKind::Light(light));
    }

    for child in node.children() {
        process_node(&child, buffers, Some(id), graph)?;
    }

    Ok(())
}

/// Reads every triangle primitive of a mesh, keyed by primitive index
fn read_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<Vec<(usize, Mesh)>, LoadError> {
    let mesh_name = mesh.name().unwrap_or("<unnamed>");
    let mut out = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping mesh {:?} primitive {}: mode {:?} is not a triangle list",
                mesh_name,
                primitive.index(),
                primitive.mode()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .ok_or_else(|| LoadError::MissingPositions {
                mesh: mesh_name.to_string(),
                primitive: primitive.index(),
            })?
            .map(Vec3::from_array)
            .collect();

        if positions.is_empty() {
            log::warn!("Skipping mesh {:?} primitive {}: no vertices", mesh_name, primitive.index());
            continue;
        }

        let normals = reader
            .read_normals()
            .map(|n| n.map(Vec3::from_array).collect::<Vec<_>>());
        let indices = reader.read_indices().map(|i| i.into_u32().collect::<Vec<_>>());

        let geometry = Geometry::new(positions, normals, indices);
        out.push((primitive.index(), Mesh::new(geometry, convert_material(&primitive.material()))));
    }

    Ok(out)
}

fn convert_material(material: &gltf::Material) -> Material {
    let [r, g, b, a] = material.pbr_metallic_roughness().base_color_factor();

    Material {
        name: material.name().map(str::to_string),
        color: Color::new(r, g, b),
        opacity: a,
        transparent: material.alpha_mode() == gltf::material::AlphaMode::Blend,
        double_sided: material.double_sided(),
    }
}

fn convert_camera(camera: &gltf::Camera) -> Camera {
    match camera.projection() {
        gltf::camera::Projection::Perspective(p) => {
            Camera::perspective(p.yfov(), p.aspect_ratio().unwrap_or(1.0), p.znear(), p.zfar())
        }
        gltf::camera::Projection::Orthographic(o) => {
            Camera::orthographic(o.xmag(), o.ymag(), o.znear(), o.zfar())
        }
    }
}

fn convert_light(light: &gltf::khr_lights_punctual::Light) -> Light {
    use gltf::khr_lights_punctual::Kind;

    let kind = match light.kind() {
        Kind::Directional => LightKind::Directional,
        Kind::Point => LightKind::Point { range: light.range() },
        Kind::Spot {
            inner_cone_angle,
            outer_cone_angle,
        } => LightKind::Spot {
            range: light.range(),
            inner_cone_angle,
            outer_cone_angle,
        },
    };

    Light {
        kind,
        color: Color::from_array(light.color()),
        intensity: light.intensity(),
    }
}
