//! Ember Core - scene data and file formats.
//!
//! This crate provides:
//!
//! - **Mesh data**: `MeshData` and the `v`/`f` text format parser
//! - **Environment maps**: HDR radiance images looked up by direction
//! - **Raster output**: 24-bit BMP writing
//! - **Scene descriptions**: serde types describing a scene to render
//!
//! # Example
//!
//! ```ignore
//! use ember_core::MeshData;
//!
//! let mesh = MeshData::load_obj("bunny.obj")?;
//! println!("Loaded {} triangles", mesh.triangle_count());
//! ```

pub mod environment;
pub mod mesh;
pub mod raster;
pub mod scene;

// Re-export commonly used types
pub use environment::{EnvironmentError, EnvironmentMap, EnvironmentResult};
pub use mesh::{MeshData, MeshError, MeshResult};
pub use raster::{encode_bmp, write_bmp, RasterError, RasterResult};
pub use scene::{
    vec3, CameraDescription, EnvironmentDescription, LightDescription, MaterialDescription,
    MaterialKind, ObjectDescription, SceneDescription, ShapeDescription,
};
