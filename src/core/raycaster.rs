use glam::{Mat4, Vec2, Vec3};

use super::triangle_intersection::{closest_intersection, Facing};
use crate::math::Ray;
use crate::scene::{Camera, NodeId, Projection, SceneGraph};

/// One mesh hit by a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub node: NodeId,
    /// World-space distance from the ray origin
    pub distance: f32,
    pub point: Vec3,
}

/// Picking ray with an optional distance cutoff
#[derive(Debug, Clone, Copy)]
pub struct Raycaster {
    pub ray: Ray,
    pub far: f32,
}

impl Raycaster {
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            far: f32::INFINITY,
        }
    }

    /// Ray through `ndc` as seen by a camera placed at `world`. Perspective rays
    /// start at the eye; orthographic rays start on the near plane and travel
    /// along the view direction.
    pub fn from_camera(ndc: Vec2, camera: &Camera, world: Mat4) -> Self {
        let unproject = world * camera.projection_matrix().inverse();

        let ray = match camera.projection() {
            Projection::Perspective { .. } => {
                let origin = world.transform_point3(Vec3::ZERO);
                let through = unproject.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
                Ray::new(origin, through - origin)
            }
            Projection::Orthographic { .. } => {
                // Depth 0 is the near plane for right-handed 0..1 projections
                let origin = unproject.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
                Ray::new(origin, world.transform_vector3(Vec3::NEG_Z))
            }
        };

        Self::new(ray)
    }

    pub fn intersect_scene(&self, scene: &SceneGraph) -> Vec<Intersection> {
        intersect_scene(scene, &self.ray)
            .into_iter()
            .filter(|hit| hit.distance <= self.far)
            .collect()
    }
}

/// Nearest hit per mesh node, sorted by ascending distance. Equal distances
/// keep traversal order.
pub fn intersect_scene(scene: &SceneGraph, ray: &Ray) -> Vec<Intersection> {
    let mut hits = Vec::new();

    for (id, node, mesh) in scene.meshes() {
        let world = node.world();

        // Broad phase against the world-space box
        let Some(bounds) = mesh.geometry.bounds else {
            continue;
        };
        if ray.intersect_aabb(&bounds.transformed(&world)).is_none() {
            continue;
        }

        let facing = if mesh.effective_material().double_sided {
            Facing::Both
        } else {
            Facing::Front
        };
        // Mirroring transforms flip winding
        let mirrored = world.determinant() < 0.0;

        let triangles = mesh.geometry.triangles().map(|tri| {
            let [a, b, c] = tri.map(|p| world.transform_point3(p));
            if mirrored {
                [a, c, b]
            } else {
                [a, b, c]
            }
        });

        if let Some((_, hit)) = closest_intersection(ray.origin, ray.direction, triangles, facing) {
            hits.push(Intersection {
                node: id,
                distance: hit.t,
                point: ray.at(hit.t),
            });
        }
    }

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, Material, Mesh, NodeKind};

    fn quad(double_sided: bool) -> Mesh {
        // Unit quad in the XY plane facing +Z
        let positions = vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ];
        let geometry = Geometry::new(positions, None, Some(vec![0, 1, 2, 0, 2, 3]));
        let material = Material {
            double_sided,
            ..Default::default()
        };
        Mesh::new(geometry, material)
    }

    fn camera_at(z: f32) -> (Camera, Mat4) {
        let mut camera = Camera::perspective(50f32.to_radians(), 1.0, 0.1, Some(100.0));
        camera.update_projection_matrix();
        (camera, Mat4::from_translation(Vec3::new(0.0, 0.0, z)))
    }

    #[test]
    fn test_center_ray_points_forward() {
        let (camera, world) = camera_at(10.0);
        let caster = Raycaster::from_camera(Vec2::ZERO, &camera, world);

        assert!((caster.ray.origin - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);
        assert!((caster.ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_corner_ray_spreads_with_fov() {
        let (camera, world) = camera_at(0.0);
        let caster = Raycaster::from_camera(Vec2::new(0.0, 1.0), &camera, world);

        // Top edge of a 50 degree frustum
        let angle = caster.ray.direction.angle_between(Vec3::NEG_Z);
        assert!((angle - 25f32.to_radians()).abs() < 1e-3);
        assert!(caster.ray.direction.y > 0.0);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let mut camera = Camera::orthographic(2.0, 2.0, 0.1, 100.0);
        camera.update_projection_matrix();
        let world = Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0));

        let left = Raycaster::from_camera(Vec2::new(-1.0, 0.0), &camera, world);
        let right = Raycaster::from_camera(Vec2::new(1.0, 0.0), &camera, world);

        assert!((left.ray.direction - right.ray.direction).length() < 1e-5);
        assert!((left.ray.origin.x + 2.0).abs() < 1e-4);
        assert!((right.ray.origin.x - 2.0).abs() < 1e-4);
        assert!((left.ray.origin.z - 9.9).abs() < 1e-3);
    }

    #[test]
    fn test_hits_sorted_nearest_first() {
        let mut scene = SceneGraph::new();
        let far = scene.add_node(None, None, Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)), NodeKind::Mesh(quad(false)));
        let near = scene.add_node(None, None, Mat4::IDENTITY, NodeKind::Mesh(quad(false)));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let hits = intersect_scene(&scene, &ray);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, near);
        assert_eq!(hits[1].node, far);
        assert!((hits[0].distance - 10.0).abs() < 1e-4);
        assert!((hits[1].distance - 15.0).abs() < 1e-4);
        assert!(hits[0].point.z.abs() < 1e-4);
    }

    #[test]
    fn test_back_faces_ignored_unless_double_sided() {
        let mut scene = SceneGraph::new();
        scene.add_node(None, None, Mat4::IDENTITY, NodeKind::Mesh(quad(false)));

        // Looking at the quad from behind
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        assert!(intersect_scene(&scene, &ray).is_empty());

        let mut scene = SceneGraph::new();
        let id = scene.add_node(None, None, Mat4::IDENTITY, NodeKind::Mesh(quad(true)));
        let hits = intersect_scene(&scene, &ray);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, id);
    }

    #[test]
    fn test_mirrored_mesh_keeps_front_face() {
        let mut scene = SceneGraph::new();
        // Flipping Z turns the quad to face -Z
        let id = scene.add_node(None, None, Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0)), NodeKind::Mesh(quad(false)));

        let from_front = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        assert_eq!(intersect_scene(&scene, &from_front).first().map(|h| h.node), Some(id));

        let from_back = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(intersect_scene(&scene, &from_back).is_empty());
    }

    #[test]
    fn test_far_limit_filters_hits() {
        let mut scene = SceneGraph::new();
        scene.add_node(None, None, Mat4::IDENTITY, NodeKind::Mesh(quad(false)));

        let mut caster = Raycaster::new(Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z));
        assert_eq!(caster.intersect_scene(&scene).len(), 1);

        caster.far = 5.0;
        assert!(caster.intersect_scene(&scene).is_empty());
    }

    #[test]
    fn test_miss_returns_empty() {
        let mut scene = SceneGraph::new();
        scene.add_node(None, None, Mat4::IDENTITY, NodeKind::Mesh(quad(true)));

        let ray = Ray::new(Vec3::new(3.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(intersect_scene(&scene, &ray).is_empty());
    }
}
