//! Environment radiance map.
//!
//! A latitude/longitude radiance image looked up by direction for rays that
//! escape the scene. Loaded from Radiance `.hdr` files through the `image`
//! crate and stored as linear float RGB triplets.

use std::f64::consts::PI;
use std::path::Path;

use ember_math::{Color, Vec3, Vec3Ext};
use thiserror::Error;

/// Scale applied by the radiance compression curve.
const COMPRESSION_SCALE: f64 = 0.6;

/// Exponent of the radiance compression curve.
const COMPRESSION_GAMMA: f64 = 0.8;

/// Upper bound on a looked-up radiance channel.
const MAX_RADIANCE: f64 = 2.0;

/// Errors that can occur during environment loading.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Failed to load environment {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Environment {0} has no pixels")]
    Empty(String),

    #[error("Environment pixel buffer has {actual} texels, expected {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },
}

pub type EnvironmentResult<T> = Result<T, EnvironmentError>;

/// A width x height buffer of linear RGB radiance.
#[derive(Clone, Debug)]
pub struct EnvironmentMap {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Linear RGB radiance, row-major, top row first
    pub pixels: Vec<[f32; 3]>,

    /// Yaw rotation (radians) applied to lookup directions about +Y
    pub rotation: f64,
}

impl EnvironmentMap {
    /// Create an environment map from raw pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 3]>) -> EnvironmentResult<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return Err(EnvironmentError::SizeMismatch {
                width,
                height,
                actual: pixels.len(),
            });
        }
        if pixels.is_empty() {
            return Err(EnvironmentError::Empty("<memory>".to_string()));
        }
        Ok(Self {
            width,
            height,
            pixels,
            rotation: 0.0,
        })
    }

    /// Load a radiance image from disk.
    ///
    /// Any failure is returned to the caller; a partially decoded image is
    /// never produced.
    pub fn load(path: impl AsRef<Path>) -> EnvironmentResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| EnvironmentError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb32f();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(EnvironmentError::Empty(path.display().to_string()));
        }

        let pixels: Vec<[f32; 3]> = rgb.pixels().map(|p| p.0).collect();

        log::debug!(
            "Loaded environment: {} ({}x{}, {:.1} KB)",
            path.display(),
            width,
            height,
            (pixels.len() * std::mem::size_of::<[f32; 3]>()) as f64 / 1024.0
        );

        Self::new(width, height, pixels)
    }

    /// Set the yaw rotation in radians.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Radiance arriving from direction `dir` (need not be normalized).
    pub fn sample(&self, dir: Vec3) -> Color {
        let (u, v) = self.direction_to_uv(dir);

        let x = ((u * self.width as f64) as u32).min(self.width - 1);
        let y = ((v * self.height as f64) as u32).min(self.height - 1);
        let texel = self.get_pixel(x, y);

        Color::new(
            compress(texel[0] as f64),
            compress(texel[1] as f64),
            compress(texel[2] as f64),
        )
        .clamp_components(0.0, MAX_RADIANCE)
    }

    /// Spherical (longitude/latitude) projection of a direction into
    /// `[0, 1] x [0, 1]`, after the yaw rotation.
    pub fn direction_to_uv(&self, dir: Vec3) -> (f64, f64) {
        let mut dir = dir.normalize_or_self();

        if self.rotation != 0.0 {
            let mag = (dir.x * dir.x + dir.z * dir.z).sqrt();
            let angle = dir.z.atan2(dir.x) + self.rotation;
            dir.x = mag * angle.cos();
            dir.z = mag * angle.sin();
            dir = dir.normalize_or_self();
        }

        let u = 0.5 + dir.z.atan2(dir.x) / (2.0 * PI);
        let v = 0.5 - dir.y.clamp(-1.0, 1.0).asin() / PI;
        (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0))
    }

    fn get_pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let idx = (y * self.width + x) as usize;
        self.pixels.get(idx).copied().unwrap_or([0.0; 3])
    }
}

/// Gamma-style compression `a * x^gamma` of one radiance channel.
fn compress(value: f64) -> f64 {
    COMPRESSION_SCALE * value.max(0.0).powf(COMPRESSION_GAMMA)
}
