//! Plane primitive, infinite or clipped to a disk.

use ember_math::{Aabb, Ray, Vec3, Vec3Ext, EPSILON};

use crate::surface::SurfaceHit;

/// A plane through `center` with unit `normal`.
///
/// With `size` set, only points within that distance of `center` count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub center: Vec3,
    pub size: Option<f64>,
}

impl Plane {
    /// Infinite plane. The normal is normalized here.
    pub fn new(normal: Vec3, center: Vec3) -> Self {
        Self {
            normal: normal.normalize_or_self(),
            center,
            size: None,
        }
    }

    /// Disk of radius `size` around `center`.
    pub fn finite(normal: Vec3, center: Vec3, size: f64) -> Self {
        Self {
            size: Some(size),
            ..Self::new(normal, center)
        }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let denom = ray.direction.dot(self.normal);
        if denom.abs() < EPSILON {
            return None;
        }

        let t = (self.center - ray.origin).dot(self.normal) / denom;
        if t < EPSILON {
            return None;
        }

        let point = ray.at(t);
        if let Some(size) = self.size {
            if (point - self.center).length_squared() > size * size {
                return None;
            }
        }

        Some(SurfaceHit {
            t,
            point,
            normal: self.normal,
        })
    }

    /// Box around the disk; `None` for an infinite plane.
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.size.map(|size| {
            let extent = Vec3::splat(size);
            Aabb::new(self.center - extent, self.center + extent)
        })
    }
}
