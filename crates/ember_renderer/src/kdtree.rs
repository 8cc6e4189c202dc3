//! Spatial index over the triangles of one mesh.
//!
//! A binary tree split at the median triangle centroid, cycling the split
//! axis x, y, z with depth. Leaves hold at most [`LEAF_CAPACITY`] triangle
//! indices. Triangle data stays in the mesh; queries borrow it.

use ember_core::MeshData;
use ember_math::{Aabb, Ray, Vec3, EPSILON};

use crate::triangle::intersect_triangle;

/// Maximum triangles per leaf node before splitting.
pub const LEAF_CAPACITY: usize = 5;

/// Nearest triangle hit found by a mesh query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    /// Index of the triangle in the mesh
    pub triangle: usize,
    pub t: f64,
    pub point: Vec3,
}

/// Tree node - either an interior split with two children or a leaf.
enum KdNode {
    Interior {
        bbox: Aabb,
        left: Box<KdNode>,
        right: Box<KdNode>,
    },
    Leaf {
        bbox: Aabb,
        triangles: Vec<usize>,
    },
}

impl KdNode {
    fn bbox(&self) -> &Aabb {
        match self {
            KdNode::Interior { bbox, .. } | KdNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// Median-split tree over one mesh's triangles.
pub struct KdTree {
    root: Option<Box<KdNode>>,
}

impl KdTree {
    /// Build the tree for every triangle of `mesh`.
    pub fn build(mesh: &MeshData) -> Self {
        let centroids: Vec<Vec3> = (0..mesh.triangle_count())
            .map(|i| mesh.triangle_centroid(i))
            .collect();
        let indices: Vec<usize> = (0..mesh.triangle_count()).collect();

        let tree = Self {
            root: Self::build_node(mesh, &centroids, indices, 0).map(Box::new),
        };

        log::debug!(
            "Built mesh index: {} triangles, {} nodes, {} leaves, depth {}",
            mesh.triangle_count(),
            tree.node_count(),
            tree.leaf_count(),
            tree.depth()
        );

        tree
    }

    fn build_node(
        mesh: &MeshData,
        centroids: &[Vec3],
        mut indices: Vec<usize>,
        depth: usize,
    ) -> Option<KdNode> {
        if indices.is_empty() {
            return None;
        }

        // Padded so hits exactly on a node face are not lost to rounding
        let bbox = indices
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| {
                Aabb::surrounding(&acc, &Aabb::from_points(&mesh.triangle_vertices(i)))
            })
            .expand(EPSILON);

        if indices.len() <= LEAF_CAPACITY {
            return Some(KdNode::Leaf {
                bbox,
                triangles: indices,
            });
        }

        let axis = depth % 3;
        indices.sort_unstable_by(|&a, &b| centroids[a][axis].total_cmp(&centroids[b][axis]));

        let upper = indices.split_off(indices.len() / 2);
        let left = Self::build_node(mesh, centroids, indices, depth + 1)?;
        let right = Self::build_node(mesh, centroids, upper, depth + 1)?;

        Some(KdNode::Interior {
            bbox,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Nearest triangle hit along `ray`.
    ///
    /// `mesh` must be the mesh this tree was built from.
    pub fn intersect(&self, mesh: &MeshData, ray: &Ray) -> Option<MeshHit> {
        self.root
            .as_deref()
            .and_then(|root| Self::intersect_node(root, mesh, ray))
    }

    fn intersect_node(node: &KdNode, mesh: &MeshData, ray: &Ray) -> Option<MeshHit> {
        node.bbox().intersect(ray)?;

        match node {
            KdNode::Leaf { triangles, .. } => {
                let mut closest: Option<MeshHit> = None;
                for &index in triangles {
                    let [v0, v1, v2] = mesh.triangle_vertices(index);
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
            KdNode::Interior { left, right, .. } => {
                // Children overlap, so both are always searched
                let left_hit = Self::intersect_node(left, mesh, ray);
                let right_hit = Self::intersect_node(right, mesh, ray);
                match (left_hit, right_hit) {
                    (Some(l), Some(r)) => Some(if r.t < l.t { r } else { l }),
                    (l, r) => l.or(r),
                }
            }
        }
    }

    /// Triangle index sets of every leaf, left to right.
    pub fn leaves(&self) -> Vec<&[usize]> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            Self::collect_leaves(root, &mut out);
        }
        out
    }

    fn collect_leaves<'a>(node: &'a KdNode, out: &mut Vec<&'a [usize]>) {
        match node {
            KdNode::Leaf { triangles, .. } => out.push(triangles),
            KdNode::Interior { left, right, .. } => {
                Self::collect_leaves(left, out);
                Self::collect_leaves(right, out);
            }
        }
    }

    /// Bounds of the root node, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_deref().map(|n| *n.bbox())
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &KdNode) -> usize {
            match node {
                KdNode::Leaf { .. } => 1,
                KdNode::Interior { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        self.root.as_deref().map_or(0, depth_of)
    }

    pub fn node_count(&self) -> usize {
        fn count(node: &KdNode) -> usize {
            match node {
                KdNode::Leaf { .. } => 1,
                KdNode::Interior { left, right, .. } => 1 + count(left) + count(right),
            }
        }
        self.root.as_deref().map_or(0, count)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A row of `n` small triangles along +X, facing +Z.
    fn strip(n: usize) -> MeshData {
        let mut positions = Vec::new();
        let mut triangles = Vec::new();
        for i in 0..n {
            let x = i as f64;
            let base = positions.len();
            positions.push(Vec3::new(x, 0.0, 0.0));
            positions.push(Vec3::new(x + 0.8, 0.0, 0.0));
            positions.push(Vec3::new(x, 0.8, 0.0));
            triangles.push([base, base + 1, base + 2]);
        }
        MeshData::new(positions, triangles)
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = MeshData::new(Vec::new(), Vec::new());
        let tree = KdTree::build(&mesh);
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z);
        assert!(tree.intersect(&mesh, &ray).is_none());
    }

    #[test]
    fn test_small_mesh_is_single_leaf() {
        let mesh = strip(LEAF_CAPACITY);
        let tree = KdTree::build(&mesh);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.leaves(), vec![&[0usize, 1, 2, 3, 4][..]]);
    }

    #[test]
    fn test_leaves_partition_triangles() {
        let mesh = strip(37);
        let tree = KdTree::build(&mesh);

        let mut seen: Vec<usize> = Vec::new();
        for leaf in tree.leaves() {
            assert!(!leaf.is_empty());
            assert!(leaf.len() <= LEAF_CAPACITY);
            seen.extend_from_slice(leaf);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..37).collect::<Vec<_>>());
        assert_eq!(tree.node_count(), 2 * tree.leaf_count() - 1);
    }

    #[test]
    fn test_median_split_on_x_first() {
        let mesh = strip(12);
        let tree = KdTree::build(&mesh);
        let leaves = tree.leaves();

        // Left subtree holds the lower half along X
        let left_max = leaves[..leaves.len() / 2]
            .iter()
            .flat_map(|l| l.iter())
            .max()
            .copied()
            .unwrap();
        assert_eq!(left_max, 5);
    }

    #[test]
    fn test_nearest_hit() {
        // Two parallel triangles stacked along Z
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(1.0, 0.0, 2.0),
            Vec3::new(0.0, 1.0, 2.0),
        ];
        let mesh = MeshData::new(positions, vec![[0, 1, 2], [3, 4, 5]]);
        let tree = KdTree::build(&mesh);

        let ray = Ray::new(Vec3::new(0.2, 0.2, 5.0), Vec3::NEG_Z);
        let hit = tree.intersect(&mesh, &ray).unwrap();
        assert_eq!(hit.triangle, 1);
        assert!((hit.t - 3.0).abs() < 1e-12);
        assert!((hit.point - Vec3::new(0.2, 0.2, 2.0)).length() < 1e-12);
    }

    #[test]
    fn test_strip_query_finds_each_triangle() {
        let mesh = strip(40);
        let tree = KdTree::build(&mesh);
        for i in 0..40 {
            let ray = Ray::new(Vec3::new(i as f64 + 0.1, 0.1, 1.0), Vec3::NEG_Z);
            let hit = tree.intersect(&mesh, &ray).unwrap();
            assert_eq!(hit.triangle, i);
        }
    }
}
