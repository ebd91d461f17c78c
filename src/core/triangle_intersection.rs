use glam::Vec3;

const EPSILON: f32 = 1e-6;

/// Which triangle faces a ray may hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Only faces wound counter-clockwise towards the ray origin
    Front,
    Both,
}

/// Result of triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleIntersection {
    pub t: f32, // Distance along ray
    pub u: f32, // Barycentric coordinate u
    pub v: f32, // Barycentric coordinate v
}

/// Möller-Trumbore ray-triangle intersection algorithm
///
/// The determinant is positive exactly when the ray sees the counter-clockwise
/// side of the triangle, so front-only tests reject non-positive values.
pub fn moller_trumbore_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    [v0, v1, v2]: [Vec3; 3],
    facing: Facing,
) -> Option<TriangleIntersection> {
    // Find vectors for two edges sharing v0
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    // Calculate determinant
    let h = ray_dir.cross(edge2);
    let a = edge1.dot(h);

    let rejected = match facing {
        Facing::Front => a < EPSILON,
        // Ray is parallel to triangle
        Facing::Both => a.abs() < EPSILON,
    };
    if rejected {
        return None;
    }

    let f = 1.0 / a;
    let s = ray_origin - v0;
    let u = f * s.dot(h);

    // Intersection outside triangle
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray_dir.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Ray intersection behind origin
    if t < EPSILON {
        return None;
    }

    Some(TriangleIntersection { t, u, v })
}

/// Nearest hit over a triangle soup, with the index of the triangle hit
pub fn closest_intersection<I>(
    ray_origin: Vec3,
    ray_dir: Vec3,
    triangles: I,
    facing: Facing,
) -> Option<(usize, TriangleIntersection)>
where
    I: IntoIterator<Item = [Vec3; 3]>,
{
    let mut closest_hit = None;
    let mut closest_t = f32::INFINITY;

    for (idx, triangle) in triangles.into_iter().enumerate() {
        if let Some(hit) = moller_trumbore_intersect(ray_origin, ray_dir, triangle, facing) {
            if hit.t < closest_t {
                closest_t = hit.t;
                closest_hit = Some((idx, hit));
            }
        }
    }

    closest_hit
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counter-clockwise when seen from the origin
    fn create_test_triangle() -> [Vec3; 3] {
        [
            Vec3::new(-1.0, 0.0, -5.0),
            Vec3::new(1.0, 0.0, -5.0),
            Vec3::new(0.0, 1.0, -5.0),
        ]
    }

    fn reversed([a, b, c]: [Vec3; 3]) -> [Vec3; 3] {
        [a, c, b]
    }

    #[test]
    fn test_moller_trumbore_hit() {
        let ray_dir = Vec3::new(0.0, 0.0, -1.0);
        let hit = moller_trumbore_intersect(Vec3::ZERO, ray_dir, create_test_triangle(), Facing::Front);

        let hit = hit.expect("front face should be hit");
        assert!((hit.t - 5.0).abs() < 1e-5);
        assert!(hit.u >= 0.0 && hit.u <= 1.0);
        assert!(hit.v >= 0.0 && hit.v <= 1.0);
        assert!(hit.u + hit.v <= 1.0);
    }

    #[test]
    fn test_moller_trumbore_miss() {
        let ray_dir = Vec3::new(5.0, 0.0, -1.0).normalize();
        let hit = moller_trumbore_intersect(Vec3::ZERO, ray_dir, create_test_triangle(), Facing::Both);
        assert!(hit.is_none());
    }

    #[test]
    fn test_behind_ray() {
        let ray_dir = Vec3::new(0.0, 0.0, 1.0);
        let hit = moller_trumbore_intersect(Vec3::ZERO, ray_dir, create_test_triangle(), Facing::Both);
        assert!(hit.is_none());
    }

    #[test]
    fn test_back_face_culled_when_front_only() {
        let ray_dir = Vec3::new(0.0, 0.0, -1.0);
        let back = reversed(create_test_triangle());

        assert!(moller_trumbore_intersect(Vec3::ZERO, ray_dir, back, Facing::Front).is_none());

        let hit = moller_trumbore_intersect(Vec3::ZERO, ray_dir, back, Facing::Both)
            .expect("double-sided test accepts back faces");
        assert!((hit.t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_hit_point_from_barycentrics() {
        let tri = create_test_triangle();
        let ray_origin = Vec3::new(0.25, 0.25, 0.0);
        let hit = moller_trumbore_intersect(ray_origin, Vec3::NEG_Z, tri, Facing::Front).unwrap();

        let from_weights = tri[0] * (1.0 - hit.u - hit.v) + tri[1] * hit.u + tri[2] * hit.v;
        let along_ray = ray_origin + Vec3::NEG_Z * hit.t;
        assert!((from_weights - along_ray).length() < 1e-5);
    }

    #[test]
    fn test_closest_intersection_picks_nearest() {
        let far = create_test_triangle().map(|p| p - Vec3::Z * 5.0);
        let near = create_test_triangle();

        let (idx, hit) = closest_intersection(Vec3::ZERO, Vec3::NEG_Z, [far, near], Facing::Front).unwrap();
        assert_eq!(idx, 1);
        assert!((hit.t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_edge_case_parallel_ray() {
        let ray_origin = Vec3::new(0.0, 0.0, -5.0);
        let ray_dir = Vec3::new(1.0, 0.0, 0.0); // Parallel to triangle plane

        let hit = moller_trumbore_intersect(ray_origin, ray_dir, create_test_triangle(), Facing::Both);
        assert!(hit.is_none());
    }
}
