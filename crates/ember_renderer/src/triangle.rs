//! Ray-triangle intersection.
//!
//! Möller-Trumbore: solves for distance and barycentric coordinates without
//! precomputing the triangle's plane.

use ember_math::{Ray, Vec3, EPSILON};

/// Distance along the ray and barycentric coordinates of a triangle hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub t: f64,
    /// Weight of `v1`
    pub u: f64,
    /// Weight of `v2`
    pub v: f64,
}

/// Intersect `ray` with triangle `(v0, v1, v2)`.
///
/// Hits are accepted only for `t` in `(EPSILON, 1 / EPSILON)` and with
/// barycentrics inside the triangle, edges included.
pub fn intersect_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray parallel to the triangle plane
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t > EPSILON && t < 1.0 / EPSILON {
        Some(TriangleHit { t, u, v })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> (Vec3, Vec3, Vec3) {
        (
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_hit_reports_barycentrics() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::NEG_Z);

        let hit = intersect_triangle(&ray, v0, v1, v2).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-12);
        assert!((hit.u - 0.25).abs() < 1e-12);
        assert!((hit.v - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_back_side_also_hits() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, -2.0), Vec3::Z);
        let hit = intersect_triangle(&ray, v0, v1, v2).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_miss_outside() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Vec3::new(0.75, 0.75, 1.0), Vec3::NEG_Z);
        assert!(intersect_triangle(&ray, v0, v1, v2).is_none());
    }

    #[test]
    fn test_miss_past_v0_v2_edge() {
        // u < 0
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Vec3::new(-0.1, 0.5, 1.0), Vec3::NEG_Z);
        assert!(intersect_triangle(&ray, v0, v1, v2).is_none());
    }

    #[test]
    fn test_miss_past_v0_v1_edge() {
        // v < 0
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Vec3::new(0.5, -0.1, 1.0), Vec3::NEG_Z);
        assert!(intersect_triangle(&ray, v0, v1, v2).is_none());
    }

    #[test]
    fn test_oblique_hit_off_center() {
        let v0 = Vec3::new(1.0, 0.0, 0.0);
        let v1 = Vec3::new(0.0, 2.0, 0.0);
        let v2 = Vec3::new(0.0, 0.0, 3.0);
        let target = v0 + (v1 - v0) * 0.2 + (v2 - v0) * 0.3;
        let origin = Vec3::new(2.0, 3.0, 4.0);
        let ray = Ray::new(origin, (target - origin).normalize());

        let hit = intersect_triangle(&ray, v0, v1, v2).unwrap();
        assert!((hit.t - (target - origin).length()).abs() < 1e-9);
        assert!((hit.u - 0.2).abs() < 1e-9);
        assert!((hit.v - 0.3).abs() < 1e-9);
        assert!((ray.at(hit.t) - target).length() < 1e-9);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Vec3::new(-1.0, 0.25, 0.0), Vec3::X);
        assert!(intersect_triangle(&ray, v0, v1, v2).is_none());
    }

    #[test]
    fn test_behind_origin_misses() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::Z);
        assert!(intersect_triangle(&ray, v0, v1, v2).is_none());
    }

    #[test]
    fn test_too_far_misses() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 2.0e6), Vec3::NEG_Z);
        assert!(intersect_triangle(&ray, v0, v1, v2).is_none());
    }
}
