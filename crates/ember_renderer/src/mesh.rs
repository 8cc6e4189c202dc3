//! Triangle mesh surface backed by a spatial index.

use std::path::Path;

use ember_core::{MeshData, MeshResult};
use ember_math::{Aabb, Ray, Vec3};

use crate::kdtree::{KdTree, MeshHit};
use crate::surface::SurfaceHit;
use crate::triangle::intersect_triangle;

/// Mesh geometry with per-face normals and its triangle index.
pub struct MeshSurface {
    data: MeshData,
    face_normals: Vec<Vec3>,
    tree: KdTree,
}

impl MeshSurface {
    pub fn new(data: MeshData) -> Self {
        let face_normals = data.face_normals();
        let tree = KdTree::build(&data);
        Self {
            data,
            face_normals,
            tree,
        }
    }

    /// Load an OBJ file and index it.
    pub fn load(path: impl AsRef<Path>) -> MeshResult<Self> {
        Ok(Self::new(MeshData::load_obj(path)?))
    }

    pub fn tree(&self) -> &KdTree {
        &self.tree
    }

    /// Nearest triangle via the index.
    pub fn nearest_triangle(&self, ray: &Ray) -> Option<MeshHit> {
        self.tree.intersect(&self.data, ray)
    }

    /// Nearest triangle by testing every triangle in order.
    ///
    /// Reference for the indexed query; ties keep the lower index.
    pub fn intersect_exhaustive(&self, ray: &Ray) -> Option<MeshHit> {
        let mut closest: Option<MeshHit> = None;
        for index in 0..self.data.triangle_count() {
            let [v0, v1, v2] = self.data.triangle_vertices(index);
            if let Some(hit) = intersect_triangle(ray, v0, v1, v2) {
                if closest.map_or(true, |c| hit.t < c.t) {
                    closest = Some(MeshHit {
                        triangle: index,
                        t: hit.t,
                        point: ray.at(hit.t),
                    });
                }
            }
        }
        closest
    }

    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        self.nearest_triangle(ray).map(|hit| SurfaceHit {
            t: hit.t,
            point: hit.point,
            normal: self.face_normals[hit.triangle],
        })
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        self.tree.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshSurface {
        MeshSurface::new(MeshData::parse_obj(
            "v -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 0\nf 1 2 3\nf 1 3 4\n",
        ))
    }

    #[test]
    fn test_mesh_hit_uses_face_normal() {
        let mesh = quad();
        let ray = Ray::new(Vec3::new(0.3, 0.5, 2.0), Vec3::NEG_Z);
        let hit = mesh.intersect(&ray).unwrap();

        assert!((hit.t - 2.0).abs() < 1e-12);
        assert!((hit.normal.normalize() - Vec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_indexed_matches_exhaustive() {
        let mesh = quad();
        let ray = Ray::new(Vec3::new(-0.4, 0.2, -3.0), Vec3::Z);
        let indexed = mesh.nearest_triangle(&ray).unwrap();
        let brute = mesh.intersect_exhaustive(&ray).unwrap();
        assert_eq!(indexed.triangle, brute.triangle);
        assert_eq!(indexed.t, brute.t);
    }

    #[test]
    fn test_empty_mesh_never_hits() {
        let mesh = MeshSurface::new(MeshData::new(Vec::new(), Vec::new()));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(mesh.intersect(&ray).is_none());
        assert!(mesh.bounding_box().is_none());
    }
}
