//! Light transport.
//!
//! [`PathTracer`] follows one path per camera ray, iteratively, with
//! next-event estimation toward emissive spheres and Russian roulette.
//! [`DirectLighting`] is a single-bounce shader lit by point lights.

use std::f64::consts::PI;

use ember_math::{Color, Ray, Vec3, Vec3Ext};
use rand::RngCore;

use crate::sampling::{cone_solid_angle, gen_f64, sample_cone};
use crate::scene::Scene;
use crate::surface::HitRecord;

/// Estimates the radiance arriving along a camera ray.
pub trait Integrator: Send + Sync {
    fn radiance(&self, scene: &Scene, ray: &Ray, rng: &mut dyn RngCore) -> Color;
}

/// Iterative Monte Carlo path tracer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathTracer {
    /// Maximum number of surface interactions per path
    pub max_bounces: u32,
    /// Bounce index after which Russian roulette may end the path
    pub russian_roulette_depth: u32,
    /// Sample emissive spheres directly at diffuse hits
    pub next_event_estimation: bool,
}

impl Default for PathTracer {
    fn default() -> Self {
        Self {
            max_bounces: 8,
            russian_roulette_depth: 3,
            next_event_estimation: true,
        }
    }
}

/// Where next-event estimation last ran.
#[derive(Clone, Copy)]
struct LightSampled {
    surface_index: usize,
    point: Vec3,
}

impl LightSampled {
    /// Whether the estimate taken here already accounted for light from
    /// the sphere light at `light_index`.
    fn covers(&self, scene: &Scene, light_index: usize) -> bool {
        light_index != self.surface_index
            && scene
                .surface(light_index)
                .and_then(|s| s.as_sphere())
                .and_then(|sphere| sphere.cone_from(self.point))
                .is_some()
    }
}

impl PathTracer {
    /// Direct light from every emissive sphere other than the one hit,
    /// one cone sample each.
    fn sample_sphere_lights(
        &self,
        scene: &Scene,
        rec: &HitRecord<'_>,
        rng: &mut dyn RngCore,
    ) -> Color {
        let point = rec.point();
        let normal = rec.normal();
        let albedo = rec.material().albedo;
        let mut direct = Color::ZERO;

        for (index, sphere, light) in scene.sphere_lights() {
            if index == rec.surface_index {
                continue;
            }
            let Some(cos_theta_max) = sphere.cone_from(point) else {
                continue;
            };

            let axis = (sphere.center - point).normalize();
            let direction = sample_cone(axis, cos_theta_max, rng);
            let cos_surface = direction.dot(normal);
            if cos_surface <= 0.0 {
                continue;
            }

            let shadow = Ray::new(point, direction);
            let visible = scene
                .hit(&shadow)
                .is_some_and(|blocker| blocker.surface_index == index);
            if visible {
                let omega = cone_solid_angle(cos_theta_max);
                direct += albedo * light.emitted() * (omega * cos_surface / PI);
            }
        }

        direct
    }
}

impl Integrator for PathTracer {
    fn radiance(&self, scene: &Scene, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut ray = *ray;
        let mut last_light_sample: Option<LightSampled> = None;

        for bounce in 0..self.max_bounces {
            let Some(rec) = scene.hit(&ray) else {
                radiance += throughput * scene.miss_radiance(ray.direction);
                break;
            };

            let material = rec.material();

            // Emission already counted by the previous light sample is skipped
            if material.is_emissive() {
                let counted = rec.surface.is_sphere_light()
                    && last_light_sample.is_some_and(|s| s.covers(scene, rec.surface_index));
                if !counted {
                    radiance += throughput * material.emitted();
                }
            }

            last_light_sample = None;
            if self.next_event_estimation && material.is_diffuse() {
                radiance += throughput * self.sample_sphere_lights(scene, &rec, rng);
                last_light_sample = Some(LightSampled {
                    surface_index: rec.surface_index,
                    point: rec.point(),
                });
            }

            let Some(scatter) = material.scatter(ray.direction, &rec.interaction, rng) else {
                break;
            };
            throughput *= scatter.attenuation;

            if bounce > self.russian_roulette_depth {
                let survival = throughput.max_component().min(1.0);
                if survival <= 0.0 || gen_f64(rng) >= survival {
                    break;
                }
                throughput /= survival;
            }

            ray = Ray::new(rec.point(), scatter.direction);
        }

        radiance
    }
}

/// Single-bounce shading from point lights with hard shadows.
///
/// Each light adds `albedo * color * intensity / r^2 * max(0, n . l)` when
/// unoccluded. Emissive surfaces add their emission.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DirectLighting;

impl Integrator for DirectLighting {
    fn radiance(&self, scene: &Scene, ray: &Ray, _rng: &mut dyn RngCore) -> Color {
        let Some(rec) = scene.hit(ray) else {
            return scene.miss_radiance(ray.direction);
        };

        let point = rec.point();
        let normal = rec.normal();
        let material = rec.material();
        let mut color = material.emitted();

        for light in scene.lights() {
            let to_light = light.position - point;
            let distance_squared = to_light.length_squared();
            let l = to_light.normalize_or_self();
            let cos = normal.dot(l);
            if cos <= 0.0 {
                continue;
            }

            let occluded = scene
                .hit(&Ray::new(point, l))
                .is_some_and(|blocker| blocker.t * blocker.t < distance_squared);
            if !occluded {
                color += material.albedo * light.falloff(distance_squared) * cos;
            }
        }

        color
    }
}
