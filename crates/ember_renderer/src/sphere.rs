//! Sphere primitive.

use ember_math::{Aabb, Ray, Vec3, EPSILON};

use crate::surface::SurfaceHit;

/// A sphere given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Nearest intersection with `t > EPSILON`.
    ///
    /// From outside this is the near root; from inside, the near root is
    /// behind the origin and the far root is taken.
    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in front of the origin
        let mut root = (h - sqrtd) / a;
        if root <= EPSILON {
            root = (h + sqrtd) / a;
            if root <= EPSILON {
                return None;
            }
        }

        let point = ray.at(root);
        Some(SurfaceHit {
            t: root,
            point,
            normal: point - self.center,
        })
    }

    pub fn bounding_box(&self) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        Aabb::new(self.center - rvec, self.center + rvec)
    }

    /// Cosine of the half-angle of the cone the sphere subtends from
    /// `point`. `None` when `point` is inside or on the sphere.
    pub fn cone_from(&self, point: Vec3) -> Option<f64> {
        let dist_squared = (self.center - point).length_squared();
        let radius_squared = self.radius * self.radius;
        if dist_squared <= radius_squared {
            return None;
        }
        Some((1.0 - radius_squared / dist_squared).max(0.0).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_hit_from_outside() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);

        let hit = sphere.intersect(&ray).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-12);
        assert!((hit.point - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-12);
        assert!((hit.normal.normalize() - Vec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = sphere.intersect(&ray).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 2.0, 5.0), Vec3::NEG_Z);
        assert!(sphere.intersect(&ray).is_none());

        // Behind the origin
        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(sphere.intersect(&away).is_none());
    }

    #[test]
    fn test_unnormalized_direction() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -2.0));
        let hit = sphere.intersect(&ray).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_cone_from() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let cos = sphere.cone_from(Vec3::new(0.0, 0.0, 2.0)).unwrap();
        // sin = r / d = 0.5
        assert!((cos - (0.75f64).sqrt()).abs() < 1e-12);
        assert!(sphere.cone_from(Vec3::new(0.0, 0.5, 0.0)).is_none());
    }

    #[test]
    fn test_bounding_box() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5);
        let bbox = sphere.bounding_box();
        assert_eq!(bbox.min, Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(bbox.max, Vec3::new(1.5, 2.5, 3.5));
    }
}
