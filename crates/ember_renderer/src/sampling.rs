//! Random sampling helpers.
//!
//! Every function takes the caller's RNG explicitly so each render worker
//! owns its own generator and seeded runs are reproducible.

use ember_math::Vec3;
use rand::{Rng, RngCore};
use std::f64::consts::PI;

/// Uniform value in [0, 1).
#[inline]
pub fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Uniform point strictly inside the unit sphere (rejection sampled).
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_f64(rng) * 2.0 - 1.0,
            gen_f64(rng) * 2.0 - 1.0,
            gen_f64(rng) * 2.0 - 1.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform direction inside the cone around unit `axis` whose half-angle
/// has cosine `cos_theta_max`.
pub fn sample_cone(axis: Vec3, cos_theta_max: f64, rng: &mut dyn RngCore) -> Vec3 {
    let u = gen_f64(rng);
    let v = gen_f64(rng);

    let cos_theta = (1.0 - u) + u * cos_theta_max;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * v;

    let (tangent, bitangent) = axis.any_orthonormal_pair();
    (tangent * (phi.cos() * sin_theta) + bitangent * (phi.sin() * sin_theta) + axis * cos_theta)
        .normalize()
}

/// Solid angle subtended by a cone with half-angle cosine `cos_theta_max`.
#[inline]
pub fn cone_solid_angle(cos_theta_max: f64) -> f64 {
    2.0 * PI * (1.0 - cos_theta_max)
}
