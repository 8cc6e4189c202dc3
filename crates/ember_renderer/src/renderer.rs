//! Image rendering.
//!
//! Implements the render loop with:
//! - Multi-sampled, jittered primary rays per pixel
//! - Bucketed parallel rendering with one seeded RNG per bucket
//! - Gamma correction and 8-bit quantization at output

use std::path::Path;
use std::time::Instant;

use ember_core::{write_bmp, RasterResult};
use ember_math::{Color, Vec3Ext};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::Deserialize;

use crate::bucket::{bucket_seed, generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::camera::Camera;
use crate::integrator::{DirectLighting, Integrator, PathTracer};
use crate::scene::Scene;

/// Which light transport estimator to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegratorKind {
    /// Path tracing with light sampling
    #[default]
    Path,
    /// Point lights only, one bounce
    Direct,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum surface interactions per path
    pub max_bounces: u32,
    /// Bounce index after which Russian roulette starts
    pub russian_roulette_depth: u32,
    pub next_event_estimation: bool,
    pub integrator: IntegratorKind,
    /// Output gamma; 1.0 writes linear values
    pub gamma: f64,
    /// Base seed for the per-bucket generators
    pub seed: u64,
    pub bucket_size: u32,
    /// Worker threads; 0 uses the global rayon pool
    pub threads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 16,
            max_bounces: 8,
            russian_roulette_depth: 3,
            next_event_estimation: true,
            integrator: IntegratorKind::Path,
            gamma: 2.2,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
            threads: 0,
        }
    }
}

impl RenderConfig {
    /// The configured integrator.
    pub fn integrator(&self) -> Box<dyn Integrator> {
        match self.integrator {
            IntegratorKind::Path => Box::new(PathTracer {
                max_bounces: self.max_bounces,
                russian_roulette_depth: self.russian_roulette_depth,
                next_event_estimation: self.next_event_estimation,
            }),
            IntegratorKind::Direct => Box::new(DirectLighting),
        }
    }
}

/// Convert linear radiance to 8-bit RGB.
pub fn color_to_rgb(color: Color, gamma: f64) -> [u8; 3] {
    let c = (color.gamma_adjust(gamma) * 255.0).clamp_components(0.0, 255.0);
    [c.x as u8, c.y as u8, c.z as u8]
}

/// Average of `samples` jittered estimates through pixel `(x, y)`.
pub fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    integrator: &dyn Integrator,
    x: u32,
    y: u32,
    samples: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = samples.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += integrator.radiance(scene, &ray, rng);
    }

    pixel_color / samples as f64
}

/// Linear radiance per pixel, row-major, top row first.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width as usize) * (height as usize)],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for local_y in 0..bucket.height {
            for local_x in 0..bucket.width {
                let color = result.pixels[(local_y * bucket.width + local_x) as usize];
                self.set(bucket.x + local_x, bucket.y + local_y, color);
            }
        }
    }

    /// Quantize to 8-bit RGB.
    pub fn to_rgb8(&self, gamma: f64) -> Vec<[u8; 3]> {
        self.pixels.iter().map(|c| color_to_rgb(*c, gamma)).collect()
    }

    /// Write as a 24-bit BMP.
    pub fn save_bmp(&self, path: impl AsRef<Path>, gamma: f64) -> RasterResult<()> {
        write_bmp(path, self.width, self.height, &self.to_rgb8(gamma))
    }
}

/// Render the scene through `camera`.
///
/// Buckets are rendered in parallel on the rayon pool. Each bucket
/// draws from its own generator seeded from `config.seed` and the bucket's
/// position, so output does not depend on the thread count.
pub fn render(scene: &Scene, camera: &Camera, config: &RenderConfig) -> ImageBuffer {
    let start = Instant::now();
    let integrator = config.integrator();
    let buckets = generate_buckets(
        camera.image_width,
        camera.image_height,
        config.bucket_size.max(1),
    );

    let render_buckets = || {
        log::info!(
            "Rendering {}x{} at {} spp ({:?}, {} buckets, {} threads)",
            camera.image_width,
            camera.image_height,
            config.samples_per_pixel,
            config.integrator,
            buckets.len(),
            rayon::current_num_threads()
        );

        buckets
            .par_iter()
            .map(|bucket| {
                let mut rng = StdRng::seed_from_u64(bucket_seed(config.seed, bucket));
                let pixels = render_bucket(
                    bucket,
                    scene,
                    camera,
                    integrator.as_ref(),
                    config.samples_per_pixel,
                    &mut rng,
                );
                BucketResult::new(*bucket, pixels)
            })
            .collect::<Vec<BucketResult>>()
    };

    let results = match config.threads {
        0 => render_buckets(),
        threads => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(render_buckets),
            Err(e) => {
                log::warn!("Could not build a {}-thread pool ({}), using the global pool", threads, e);
                render_buckets()
            }
        },
    };

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}
