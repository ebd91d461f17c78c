use glam::{Mat4, Vec3};

use super::{Camera, Light, Mesh, WorldLight};
use crate::math::AABB;

/// Handle to a node inside one [`SceneGraph`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a node is; exactly one variant per node
#[derive(Clone, Debug)]
pub enum NodeKind {
    Group,
    Camera(Camera),
    Light(Light),
    Mesh(Mesh),
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Group => "group",
            NodeKind::Camera(_) => "camera",
            NodeKind::Light(_) => "light",
            NodeKind::Mesh(_) => "mesh",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: Option<String>,
    pub local: Mat4,
    pub kind: NodeKind,
    world: Mat4,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn world(&self) -> Mat4 {
        self.world
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// Counts reported after loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub nodes: usize,
    pub meshes: usize,
    pub cameras: usize,
    pub lights: usize,
    pub triangles: usize,
}

/// Arena of nodes with ordered roots. Nodes are never removed.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node under `parent`, or as a new root. A parent id that does
    /// not belong to this graph also yields a root.
    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        name: Option<String>,
        local: Mat4,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = parent.filter(|p| p.0 < self.nodes.len());
        let world = match parent {
            Some(p) => self.nodes[p.0].world * local,
            None => local,
        };

        self.nodes.push(Node {
            name,
            local,
            kind,
            world,
            parent,
            children: Vec::new(),
        });

        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Depth-first, parent before children, siblings in insertion order
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            graph: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Recomputes every cached world transform from the local ones
    pub fn update_world_transforms(&mut self) {
        let mut stack: Vec<(NodeId, Mat4)> =
            self.roots.iter().rev().map(|&id| (id, Mat4::IDENTITY)).collect();
        self.propagate(&mut stack);
    }

    fn propagate(&mut self, stack: &mut Vec<(NodeId, Mat4)>) {
        while let Some((id, parent_world)) = stack.pop() {
            let node = &mut self.nodes[id.0];
            node.world = parent_world * node.local;
            let world = node.world;
            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }
    }

    pub fn world_transform(&self, id: NodeId) -> Option<Mat4> {
        self.get(id).map(Node::world)
    }

    /// Places a node at `world` by rewriting its local transform relative to the
    /// parent, then refreshes the subtree.
    pub fn set_world_transform(&mut self, id: NodeId, world: Mat4) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        let parent_world = node
            .parent
            .map(|p| self.nodes[p.0].world)
            .unwrap_or(Mat4::IDENTITY);

        self.nodes[id.0].local = parent_world.inverse() * world;
        let mut stack = vec![(id, parent_world)];
        self.propagate(&mut stack);
    }

    pub fn camera(&self, id: NodeId) -> Option<&Camera> {
        match &self.get(id)?.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self, id: NodeId) -> Option<&mut Camera> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn mesh(&self, id: NodeId) -> Option<&Mesh> {
        match &self.get(id)?.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut Mesh> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Every mesh node in traversal order
    pub fn meshes(&self) -> impl Iterator<Item = (NodeId, &Node, &Mesh)> + '_ {
        self.traverse().filter_map(move |id| {
            let node = &self.nodes[id.0];
            match &node.kind {
                NodeKind::Mesh(mesh) => Some((id, node, mesh)),
                _ => None,
            }
        })
    }

    /// Lights with their world-space position and travel direction
    pub fn lights(&self) -> Vec<WorldLight> {
        self.traverse()
            .filter_map(|id| {
                let node = &self.nodes[id.0];
                match &node.kind {
                    NodeKind::Light(light) => Some(WorldLight {
                        light: light.clone(),
                        position: node.world.transform_point3(Vec3::ZERO),
                        direction: node
                            .world
                            .transform_vector3(Vec3::NEG_Z)
                            .try_normalize()
                            .unwrap_or(Vec3::NEG_Z),
                    }),
                    _ => None,
                }
            })
            .collect()
    }

    /// World-space bounds of all mesh geometry
    pub fn bounds(&self) -> Option<AABB> {
        self.meshes()
            .filter_map(|(_, node, mesh)| mesh.geometry.bounds.map(|b| b.transformed(&node.world)))
            .reduce(|acc, b| acc.union(&b))
    }

    pub fn stats(&self) -> SceneStats {
        self.nodes
            .iter()
            .fold(SceneStats { nodes: self.nodes.len(), ..Default::default() }, |mut stats, node| {
                match &node.kind {
                    NodeKind::Mesh(mesh) => {
                        stats.meshes += 1;
                        stats.triangles += mesh.geometry.triangle_count();
                    }
                    NodeKind::Camera(_) => stats.cameras += 1,
                    NodeKind::Light(_) => stats.lights += 1,
                    NodeKind::Group => {}
                }
                stats
            })
    }
}

/// Iterator returned by [`SceneGraph::traverse`]
pub struct Traverse<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl Iterator for Traverse<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.graph.nodes[id.0].children.iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Option<String> {
        Some(name.to_string())
    }

    #[test]
    fn test_traverse_parent_before_children() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node(None, named("a"), Mat4::IDENTITY, NodeKind::Group);
        let b = graph.add_node(Some(a), named("b"), Mat4::IDENTITY, NodeKind::Group);
        let c = graph.add_node(Some(b), named("c"), Mat4::IDENTITY, NodeKind::Group);
        let d = graph.add_node(Some(a), named("d"), Mat4::IDENTITY, NodeKind::Group);
        let e = graph.add_node(None, named("e"), Mat4::IDENTITY, NodeKind::Group);

        let order: Vec<NodeId> = graph.traverse().collect();
        assert_eq!(order, vec![a, b, c, d, e]);
    }

    #[test]
    fn test_world_transform_composes_parent() {
        let mut graph = SceneGraph::new();
        let parent = graph.add_node(
            None,
            None,
            Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            NodeKind::Group,
        );
        let child = graph.add_node(
            Some(parent),
            None,
            Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)),
            NodeKind::Group,
        );

        let origin = graph.world_transform(child).unwrap().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 2.0, 0.0)).length() < 0.0001);
    }

    #[test]
    fn test_update_world_transforms_after_local_edit() {
        let mut graph = SceneGraph::new();
        let parent = graph.add_node(None, None, Mat4::IDENTITY, NodeKind::Group);
        let child = graph.add_node(
            Some(parent),
            None,
            Mat4::from_translation(Vec3::Z),
            NodeKind::Group,
        );

        graph.get_mut(parent).unwrap().local = Mat4::from_translation(Vec3::X);
        graph.update_world_transforms();

        let origin = graph.world_transform(child).unwrap().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 0.0, 1.0)).length() < 0.0001);
    }

    #[test]
    fn test_set_world_transform_under_parent() {
        let mut graph = SceneGraph::new();
        let parent = graph.add_node(
            None,
            None,
            Mat4::from_translation(Vec3::new(0.0, 10.0, 0.0)),
            NodeKind::Group,
        );
        let child = graph.add_node(Some(parent), None, Mat4::IDENTITY, NodeKind::Group);
        let grandchild = graph.add_node(
            Some(child),
            None,
            Mat4::from_translation(Vec3::X),
            NodeKind::Group,
        );

        graph.set_world_transform(child, Mat4::from_translation(Vec3::new(0.0, 5.0, 10.0)));

        let child_pos = graph.world_transform(child).unwrap().transform_point3(Vec3::ZERO);
        assert!((child_pos - Vec3::new(0.0, 5.0, 10.0)).length() < 0.0001);
        let local_pos = graph.get(child).unwrap().local.transform_point3(Vec3::ZERO);
        assert!((local_pos - Vec3::new(0.0, -5.0, 10.0)).length() < 0.0001);
        let grand_pos = graph.world_transform(grandchild).unwrap().transform_point3(Vec3::ZERO);
        assert!((grand_pos - Vec3::new(1.0, 5.0, 10.0)).length() < 0.0001);
    }

    #[test]
    fn test_invalid_parent_becomes_root() {
        let mut graph = SceneGraph::new();
        let stray = graph.add_node(Some(NodeId(42)), None, Mat4::IDENTITY, NodeKind::Group);
        assert_eq!(graph.roots(), &[stray]);
        assert_eq!(graph.get(stray).unwrap().parent(), None);
    }

    #[test]
    fn test_stats_counts_kinds() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(None, None, Mat4::IDENTITY, NodeKind::Group);
        graph.add_node(Some(root), None, Mat4::IDENTITY, NodeKind::Camera(Camera::default()));
        graph.add_node(
            Some(root),
            None,
            Mat4::IDENTITY,
            NodeKind::Light(Light::directional(crate::math::Color::WHITE, 1.0)),
        );

        let stats = graph.stats();
        assert_eq!(stats.nodes, 3);
        assert_eq!(stats.cameras, 1);
        assert_eq!(stats.lights, 1);
        assert_eq!(stats.meshes, 0);
    }

    #[test]
    fn test_lights_direction_follows_node() {
        let mut graph = SceneGraph::new();
        graph.add_node(
            None,
            None,
            Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2),
            NodeKind::Light(Light::directional(crate::math::Color::WHITE, 1.0)),
        );
        let lights = graph.lights();
        assert_eq!(lights.len(), 1);
        // -Z rotated by -90 degrees about X points down
        assert!((lights[0].direction - Vec3::NEG_Y).length() < 0.0001);
    }
}
