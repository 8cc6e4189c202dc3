//! Scene description types.
//!
//! A renderer-agnostic, serde-deserializable description of what to render:
//! camera, background, optional environment, point lights and surfaces with
//! their materials. The renderer turns this into its own `Scene`.

use std::path::{Path, PathBuf};

use ember_math::{Color, Vec3};
use serde::Deserialize;

/// The whole scene file.
#[derive(Clone, Debug, Deserialize)]
pub struct SceneDescription {
    /// Pinhole camera and output resolution
    pub camera: CameraDescription,

    /// Radiance for escaped rays when no environment is set (RGB, linear)
    #[serde(default = "default_background")]
    pub background: [f64; 3],

    /// Optional HDR environment replacing the background
    #[serde(default)]
    pub environment: Option<EnvironmentDescription>,

    /// Point lights, used only by the direct-lighting shader
    #[serde(default)]
    pub lights: Vec<LightDescription>,

    /// Surfaces in insertion order
    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
}

impl SceneDescription {
    /// Background color as a vector.
    pub fn background_color(&self) -> Color {
        Color::from_array(self.background)
    }

    /// Rewrite every relative file path to be relative to `base_dir`.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        if let Some(env) = &mut self.environment {
            env.path = resolve(base_dir, &env.path);
        }
        for object in &mut self.objects {
            if let ShapeDescription::Mesh { path } = &mut object.shape {
                *path = resolve(base_dir, path);
            }
        }
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn default_background() -> [f64; 3] {
    [0.0, 0.0, 0.0]
}

/// Camera placement and image size.
#[derive(Clone, Debug, Deserialize)]
pub struct CameraDescription {
    /// Eye position
    #[serde(default)]
    pub position: [f64; 3],

    /// Viewing direction (normalized on use)
    #[serde(default = "default_forward")]
    pub forward: [f64; 3],

    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov: f64,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,
}

fn default_forward() -> [f64; 3] {
    [0.0, 0.0, -1.0]
}

fn default_fov() -> f64 {
    45.0
}

/// An environment radiance image.
#[derive(Clone, Debug, Deserialize)]
pub struct EnvironmentDescription {
    /// Path to a Radiance `.hdr` image
    pub path: PathBuf,

    /// Yaw rotation in degrees
    #[serde(default)]
    pub rotation: f64,
}

/// A point light for the direct-lighting shader.
#[derive(Clone, Debug, Deserialize)]
pub struct LightDescription {
    pub position: [f64; 3],

    /// Radiant intensity; falls off with the squared distance
    pub intensity: f64,

    #[serde(default = "default_white")]
    pub color: [f64; 3],
}

fn default_white() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

/// A surface with its material.
#[derive(Clone, Debug, Deserialize)]
pub struct ObjectDescription {
    pub shape: ShapeDescription,

    #[serde(default)]
    pub material: MaterialDescription,
}

/// Geometry of a surface.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeDescription {
    Sphere {
        center: [f64; 3],
        radius: f64,
    },
    Plane {
        normal: [f64; 3],
        center: [f64; 3],
        /// Radius of a finite disk around `center`; infinite when absent
        #[serde(default)]
        size: Option<f64>,
    },
    Mesh {
        path: PathBuf,
    },
}

/// Scattering behavior of a material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    #[default]
    Diffuse,
    Metal,
    Dielectric,
}

/// Material parameters. Unused fields are ignored by the chosen kind.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MaterialDescription {
    pub kind: MaterialKind,
    pub albedo: [f64; 3],
    pub emissive: [f64; 3],
    /// Metal fuzz radius
    pub roughness: f64,
    /// Dielectric index of refraction
    pub refractive_index: f64,
}

impl Default for MaterialDescription {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Diffuse,
            albedo: [0.8, 0.8, 0.8],
            emissive: [0.0, 0.0, 0.0],
            roughness: 0.0,
            refractive_index: 1.5,
        }
    }
}

impl MaterialDescription {
    pub fn albedo_color(&self) -> Color {
        Color::from_array(self.albedo)
    }

    pub fn emissive_color(&self) -> Color {
        Color::from_array(self.emissive)
    }
}

/// Convert a `[x, y, z]` triple from a description into a vector.
#[inline]
pub fn vec3(v: [f64; 3]) -> Vec3 {
    Vec3::from_array(v)
}
