use glam::Vec3;

use super::AABB;

/// Half-line starting at `origin`; `direction` is kept normalized
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<f32> {
        intersect_aabb(self.origin, self.direction, aabb.min, aabb.max)
    }
}

/// Slab test. Returns the entry distance, or the exit distance when the origin
/// lies inside the box.
pub fn intersect_aabb(ray_origin: Vec3, ray_dir: Vec3, box_min: Vec3, box_max: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-8;

    // Near-zero components are clamped so the slab for that axis becomes infinite
    let inv_dir = Vec3::new(
        if ray_dir.x.abs() < EPSILON { 1.0 / EPSILON.copysign(ray_dir.x) } else { 1.0 / ray_dir.x },
        if ray_dir.y.abs() < EPSILON { 1.0 / EPSILON.copysign(ray_dir.y) } else { 1.0 / ray_dir.y },
        if ray_dir.z.abs() < EPSILON { 1.0 / EPSILON.copysign(ray_dir.z) } else { 1.0 / ray_dir.z },
    );

    let t_min = (box_min - ray_origin) * inv_dir;
    let t_max = (box_max - ray_origin) * inv_dir;

    let t1 = t_min.min(t_max);
    let t2 = t_min.max(t_max);

    let t_near = t1.x.max(t1.y).max(t1.z);
    let t_far = t2.x.min(t2.y).min(t2.z);

    if t_near > t_far || t_far < 0.0 {
        return None;
    }

    if t_near < 0.0 {
        Some(t_far)
    } else {
        Some(t_near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_aabb_hit() {
        let t = intersect_aabb(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(5.0, -1.0, -1.0),
            Vec3::new(10.0, 1.0, 1.0),
        );
        assert!((t.unwrap() - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_intersect_aabb_miss() {
        let t = intersect_aabb(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(5.0, 2.0, 2.0),
            Vec3::new(10.0, 3.0, 3.0),
        );
        assert!(t.is_none());
    }

    #[test]
    fn test_intersect_aabb_inside() {
        let t = intersect_aabb(
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::X,
            Vec3::new(0.0, -1.0, -1.0),
            Vec3::new(10.0, 1.0, 1.0),
        );
        assert!((t.unwrap() - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_ray_new_normalizes() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(ray.direction, Vec3::NEG_Z);
        assert_eq!(ray.at(2.0), Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_ray_flat_box() {
        // Zero-thickness boxes come from planar meshes
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let flat = AABB::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        assert!((ray.intersect_aabb(&flat).unwrap() - 5.0).abs() < 0.001);
    }
}
