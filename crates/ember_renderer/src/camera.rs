//! Pinhole camera for primary ray generation.

use ember_core::{vec3, CameraDescription};
use ember_math::{Ray, Vec3, Vec3Ext, EPSILON};
use rand::RngCore;

use crate::sampling::gen_f64;

/// Pinhole camera looking along `forward` with a vertical field of view.
///
/// The image plane sits one unit in front of the eye. Pixel `(0, 0)` is the
/// top-left corner.
#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    origin: Vec3,
    forward: Vec3,
    vfov: f64,

    // Cached basis, refreshed on every change
    right: Vec3,
    up: Vec3,
    half_height: f64,
}

impl Camera {
    /// 800x450 camera at the origin looking down -Z with a 45 degree fov.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 800,
            image_height: 450,
            origin: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            vfov: 45.0,
            right: Vec3::X,
            up: Vec3::Y,
            half_height: 0.0,
        };
        camera.update_basis();
        camera
    }

    pub fn from_description(desc: &CameraDescription) -> Self {
        Self::new()
            .with_resolution(desc.width, desc.height)
            .with_fov(desc.fov)
            .with_position(vec3(desc.position), vec3(desc.forward))
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self
    }

    /// Set vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f64) -> Self {
        self.vfov = vfov;
        self.update_basis();
        self
    }

    /// Set eye position and viewing direction.
    pub fn with_position(mut self, origin: Vec3, forward: Vec3) -> Self {
        self.move_to(origin, forward);
        self
    }

    /// Reposition the camera in place.
    pub fn move_to(&mut self, origin: Vec3, forward: Vec3) {
        self.origin = origin;
        self.forward = forward;
        self.update_basis();
    }

    fn update_basis(&mut self) {
        let forward = self.forward.normalize_or_self();
        self.forward = if forward.length_squared() < EPSILON {
            Vec3::NEG_Z
        } else {
            forward
        };

        // Looking straight up or down needs a different reference axis
        let world_up = if self.forward.cross(Vec3::Y).length_squared() < EPSILON {
            Vec3::Z
        } else {
            Vec3::Y
        };

        self.right = self.forward.cross(world_up).normalize();
        self.up = self.right.cross(self.forward);
        self.half_height = (self.vfov.to_radians() / 2.0).tan();
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Ray through continuous image coordinates (`x` right, `y` down).
    pub fn ray_through(&self, x: f64, y: f64) -> Ray {
        let aspect = self.image_width as f64 / self.image_height as f64;
        let sx = (2.0 * x / self.image_width as f64 - 1.0) * self.half_height * aspect;
        let sy = (1.0 - 2.0 * y / self.image_height as f64) * self.half_height;

        let direction = (self.forward + self.right * sx + self.up * sy).normalize();
        Ray::new(self.origin, direction)
    }

    /// Ray through a random point inside pixel `(i, j)`.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        self.ray_through(i as f64 + gen_f64(rng), j as f64 + gen_f64(rng))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
