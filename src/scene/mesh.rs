use glam::Vec3;

use super::Material;
use crate::math::AABB;

/// Indexed triangle list in the owning node's local space
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub bounds: Option<AABB>,
}

impl Geometry {
    /// Builds a geometry, filling in flat normals when none are supplied.
    /// Without indices the positions are read as a plain triangle list.
    pub fn new(positions: Vec<Vec3>, normals: Option<Vec<Vec3>>, indices: Option<Vec<u32>>) -> Self {
        let indices = indices.unwrap_or_else(|| (0..positions.len() as u32).collect());
        let normals = match normals {
            Some(n) if n.len() == positions.len() => n,
            _ => flat_normals(&positions, &indices),
        };
        let bounds = AABB::from_points(&positions);

        Self {
            positions,
            normals,
            indices,
            bounds,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex positions of every complete triangle, skipping out-of-range indices
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            Some([
                *self.positions.get(tri[0] as usize)?,
                *self.positions.get(tri[1] as usize)?,
                *self.positions.get(tri[2] as usize)?,
            ])
        })
    }
}

fn flat_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

/// A renderable: geometry plus the material it was loaded with.
///
/// `override_material` replaces `material` while set; interaction code uses it
/// so the loaded material is never modified in place.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
    pub override_material: Option<Material>,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            override_material: None,
        }
    }

    pub fn effective_material(&self) -> &Material {
        self.override_material.as_ref().unwrap_or(&self.material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Vec<Vec3> {
        vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_geometry_flat_normals_face_viewer() {
        let geometry = Geometry::new(quad(), None, Some(vec![0, 1, 2, 0, 2, 3]));
        for n in &geometry.normals {
            assert!((n.z - 1.0).abs() < 0.001);
        }
        assert_eq!(geometry.triangle_count(), 2);
    }

    #[test]
    fn test_geometry_without_indices_is_triangle_list() {
        let positions = quad()[..3].to_vec();
        let geometry = Geometry::new(positions, None, None);
        assert_eq!(geometry.indices, vec![0, 1, 2]);
        assert_eq!(geometry.triangles().count(), 1);
    }

    #[test]
    fn test_geometry_skips_bad_indices() {
        let geometry = Geometry::new(quad(), None, Some(vec![0, 1, 2, 0, 2, 9]));
        assert_eq!(geometry.triangles().count(), 1);
    }

    #[test]
    fn test_geometry_bounds() {
        let geometry = Geometry::new(quad(), None, Some(vec![0, 1, 2]));
        let bounds = geometry.bounds.unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_effective_material_prefers_override() {
        let mut mesh = Mesh::new(Geometry::default(), Material::default());
        assert_eq!(mesh.effective_material().opacity, 1.0);

        mesh.override_material = Some(Material {
            opacity: 0.5,
            ..Material::default()
        });
        assert_eq!(mesh.effective_material().opacity, 0.5);
        assert_eq!(mesh.material.opacity, 1.0);
    }
}
