// Vector/color utilities on top of glam::DVec3
//
// glam already provides dot, cross, length and componentwise min/max. This
// adds the handful of operations the renderer needs with its own epsilon
// policy.

use glam::DVec3;

/// Shared tolerance for every geometric test (parallel rays, degenerate
/// triangles, self-intersection at the ray origin).
pub const EPSILON: f64 = 1e-6;

/// Stand-in for "no hit yet" distances.
pub const INF: f64 = 1e10;

/// Extension trait for DVec3 used as both a vector and an RGB color.
pub trait Vec3Ext {
    /// Normalize, or return the vector unchanged when its length is at or
    /// below `EPSILON`.
    fn normalize_or_self(self) -> Self;

    /// Clamp every component to `[lo, hi]`.
    fn clamp_components(self, lo: f64, hi: f64) -> Self;

    /// Componentwise `c^(1/gamma)`. Negative components become zero.
    fn gamma_adjust(self, gamma: f64) -> Self;

    /// Largest of the three components.
    fn max_component(self) -> f64;

    /// Mirror reflection of `self` about the normal `n`.
    fn reflect(self, n: Self) -> Self;

    /// True when every component is (exactly) zero.
    fn is_black(self) -> bool;
}

impl Vec3Ext for DVec3 {
    #[inline]
    fn normalize_or_self(self) -> Self {
        let len = self.length();
        if len > EPSILON {
            self / len
        } else {
            self
        }
    }

    #[inline]
    fn clamp_components(self, lo: f64, hi: f64) -> Self {
        self.clamp(DVec3::splat(lo), DVec3::splat(hi))
    }

    fn gamma_adjust(self, gamma: f64) -> Self {
        let inv = 1.0 / gamma;
        DVec3::new(
            self.x.max(0.0).powf(inv),
            self.y.max(0.0).powf(inv),
            self.z.max(0.0).powf(inv),
        )
    }

    #[inline]
    fn max_component(self) -> f64 {
        self.max_element()
    }

    #[inline]
    fn reflect(self, n: Self) -> Self {
        self - 2.0 * self.dot(n) * n
    }

    #[inline]
    fn is_black(self) -> bool {
        self == DVec3::ZERO
    }
}
