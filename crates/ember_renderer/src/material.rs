//! Surface scattering models.
//!
//! A material is one of three mutually exclusive scattering behaviors plus
//! an independent emissive color.

use ember_math::{Vec3, Vec3Ext, EPSILON};
use rand::RngCore;

use crate::sampling::{gen_f64, random_in_unit_sphere};

/// Color type alias (linear RGB, unclamped)
pub type Color = Vec3;

/// How a surface redirects incoming light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scattering {
    /// Cosine-weighted diffuse reflection
    Diffuse,
    /// Mirror reflection perturbed by a fuzz sphere of radius `roughness`
    Metal { roughness: f64 },
    /// Glass-like refraction/reflection chosen with Schlick's approximation
    Dielectric { refractive_index: f64 },
}

/// Geometry at a shading point.
#[derive(Debug, Clone, Copy)]
pub struct Interaction {
    /// World-space hit location
    pub point: Vec3,
    /// Unit surface normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Whether the ray arrived on the side the outward normal points to
    pub front_face: bool,
}

impl Interaction {
    /// Build from an outward (not necessarily unit) normal.
    ///
    /// The stored normal is flipped to face the ray, and `front_face`
    /// remembers which side was hit.
    pub fn new(ray_dir: Vec3, point: Vec3, outward_normal: Vec3) -> Self {
        let outward = outward_normal.normalize_or_self();
        let front_face = ray_dir.dot(outward) < 0.0;
        Self {
            point,
            normal: if front_face { outward } else { -outward },
            front_face,
        }
    }
}

/// A successful scatter event.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Per-channel reflectance applied to the path throughput
    pub attenuation: Color,
    /// Unit direction of the scattered ray
    pub direction: Vec3,
}

/// Per-surface reflectance and emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub scattering: Scattering,
    pub albedo: Color,
    pub emissive: Color,
}

impl Material {
    /// Lambertian material with the given albedo.
    pub fn diffuse(albedo: Color) -> Self {
        Self {
            scattering: Scattering::Diffuse,
            albedo,
            emissive: Color::ZERO,
        }
    }

    /// Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `roughness`: Fuzz radius, 0.0 = perfect mirror
    pub fn metal(albedo: Color, roughness: f64) -> Self {
        Self {
            scattering: Scattering::Metal {
                roughness: roughness.max(0.0),
            },
            albedo,
            emissive: Color::ZERO,
        }
    }

    /// Dielectric (glass) material.
    ///
    /// - `refractive_index`: 1.0 = air, 1.5 = glass, 2.4 = diamond
    pub fn dielectric(refractive_index: f64) -> Self {
        Self {
            scattering: Scattering::Dielectric { refractive_index },
            albedo: Color::ONE,
            emissive: Color::ZERO,
        }
    }

    /// Add an emissive component.
    pub fn with_emission(mut self, emissive: Color) -> Self {
        self.emissive = emissive;
        self
    }

    /// Get emitted radiance.
    #[inline]
    pub fn emitted(&self) -> Color {
        self.emissive
    }

    pub fn is_emissive(&self) -> bool {
        !self.emissive.is_black()
    }

    pub fn is_diffuse(&self) -> bool {
        matches!(self.scattering, Scattering::Diffuse)
    }

    /// Scatter a ray arriving along unit `ray_dir`.
    ///
    /// Returns `None` when the ray is absorbed.
    pub fn scatter(
        &self,
        ray_dir: Vec3,
        hit: &Interaction,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match self.scattering {
            Scattering::Diffuse => {
                let mut direction = (hit.normal + random_in_unit_sphere(rng)).normalize_or_self();

                // Catch degenerate scatter direction
                if direction.length_squared() < EPSILON {
                    direction = hit.normal;
                }

                Some(ScatterResult {
                    attenuation: self.albedo,
                    direction,
                })
            }
            Scattering::Metal { roughness } => {
                let reflected = ray_dir.reflect(hit.normal);
                let direction =
                    (reflected + random_in_unit_sphere(rng) * roughness).normalize_or_self();

                // Only scatter if the reflected ray stays above the surface
                (direction.dot(hit.normal) > 0.0).then_some(ScatterResult {
                    attenuation: self.albedo,
                    direction,
                })
            }
            Scattering::Dielectric { refractive_index } => {
                let unit_direction = ray_dir.normalize_or_self();
                let ratio = if hit.front_face {
                    1.0 / refractive_index
                } else {
                    refractive_index
                };
                let cosine = (-unit_direction).dot(hit.normal);

                let refracted = refract(unit_direction, hit.normal, ratio);
                let reflect_prob = match refracted {
                    Some(_) => schlick(cosine, refractive_index),
                    // Total internal reflection
                    None => 1.0,
                };

                let direction = match refracted {
                    Some(refracted) if gen_f64(rng) >= reflect_prob => refracted,
                    _ => unit_direction.reflect(hit.normal),
                };

                Some(ScatterResult {
                    attenuation: Color::ONE,
                    direction: direction.normalize_or_self(),
                })
            }
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::diffuse(Color::splat(0.8))
    }
}

/// Schlick's approximation of Fresnel reflectance.
///
/// `r0 = ((1 - n) / (1 + n))^2`, `R(cos) = r0 + (1 - r0)(1 - cos)^5`.
pub fn schlick(cosine: f64, refractive_index: f64) -> f64 {
    let r0 = ((1.0 - refractive_index) / (1.0 + refractive_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Snell refraction of unit `uv` through a surface with normal `n` facing
/// the incoming ray. `None` on total internal reflection.
pub fn refract(uv: Vec3, n: Vec3, ni_over_nt: f64) -> Option<Vec3> {
    let dt = uv.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    (discriminant > 0.0).then(|| (uv - n * dt) * ni_over_nt - n * discriminant.sqrt())
}
