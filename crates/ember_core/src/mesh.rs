//! Triangle mesh source data.
//!
//! A `MeshData` is plain geometry: a vertex buffer and a triangle-index
//! buffer. It is populated from the line-oriented `v`/`f` text format and
//! handed to the renderer, which builds its spatial index on top of it.

use std::fs;
use std::path::Path;

use ember_math::{Aabb, Vec3};
use thiserror::Error;

/// Errors that can occur while loading a mesh file.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Failed to read mesh {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type MeshResult<T> = Result<T, MeshError>;

/// A triangle mesh: vertex positions plus three vertex indices per triangle.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// Vertex positions in declaration order
    pub positions: Vec<Vec3>,

    /// Triangles as 0-based indices into `positions`
    pub triangles: Vec<[usize; 3]>,
}

impl MeshData {
    /// Create a mesh from positions and triangles.
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[usize; 3]>) -> Self {
        Self {
            positions,
            triangles,
        }
    }

    /// Read and parse a mesh file.
    pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| MeshError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mesh = Self::parse_obj(&source);
        log::info!(
            "Loaded {} with {} verts and {} tris",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Parse the `v x y z` / `f a b c` text format.
    ///
    /// Parsing is lenient: any line that is not a well-formed vertex or
    /// triangle is skipped. Face references may carry `/`-separated suffixes;
    /// only the leading vertex index is used. Faces that reference vertices
    /// which were never declared are dropped.
    pub fn parse_obj(source: &str) -> Self {
        let mut positions = Vec::new();
        let mut faces = Vec::new();

        for line in source.lines() {
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    if let Some(p) = parse_vertex(tokens) {
                        positions.push(p);
                    }
                }
                Some("f") => {
                    if let Some(face) = parse_face(tokens) {
                        faces.push(face);
                    }
                }
                _ => {}
            }
        }

        let vertex_count = positions.len();
        let triangles: Vec<[usize; 3]> = faces
            .into_iter()
            .filter(|face| {
                let valid = face.iter().all(|&i| i < vertex_count);
                if !valid {
                    log::warn!(
                        "Dropping face {:?} referencing missing vertices (vertex count: {})",
                        face,
                        vertex_count
                    );
                }
                valid
            })
            .collect();

        Self::new(positions, triangles)
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// The three corner positions of triangle `index`.
    #[inline]
    pub fn triangle_vertices(&self, index: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[index];
        [self.positions[a], self.positions[b], self.positions[c]]
    }

    /// Mean of the three corners of triangle `index`.
    pub fn triangle_centroid(&self, index: usize) -> Vec3 {
        let [a, b, c] = self.triangle_vertices(index);
        (a + b + c) * (1.0 / 3.0)
    }

    /// One unnormalized face normal per triangle: `(v1 - v0) x (v2 - v0)`.
    pub fn face_normals(&self) -> Vec<Vec3> {
        (0..self.triangle_count())
            .map(|i| {
                let [v0, v1, v2] = self.triangle_vertices(i);
                (v1 - v0).cross(v2 - v0)
            })
            .collect()
    }

    /// Bounding box over every vertex.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }
}

fn parse_vertex<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<Vec3> {
    let mut coord = || tokens.next()?.parse::<f64>().ok();
    Some(Vec3::new(coord()?, coord()?, coord()?))
}

fn parse_face<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<[usize; 3]> {
    let mut index = || {
        let token = tokens.next()?;
        let first = token.split('/').next()?;
        let one_based = first.parse::<usize>().ok()?;
        one_based.checked_sub(1)
    };
    Some([index()?, index()?, index()?])
}
