//! Point lights for the direct-lighting shader.

use ember_math::{Color, Vec3};

/// An isotropic point light with inverse-square falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f64,
    pub color: Color,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: f64) -> Self {
        Self {
            position,
            intensity,
            color: Color::ONE,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Radiance scale arriving at a point `distance_squared` away.
    #[inline]
    pub fn falloff(&self, distance_squared: f64) -> Color {
        self.color * (self.intensity / distance_squared)
    }
}
