//! Typed scene graph built from a loaded asset.

mod camera;
mod graph;
mod light;
mod material;
mod mesh;

pub use camera::{Camera, Projection};
pub use graph::{Node, NodeId, NodeKind, SceneGraph, SceneStats, Traverse};
pub use light::{Light, LightKind, WorldLight};
pub use material::Material;
pub use mesh::{Geometry, Mesh};
