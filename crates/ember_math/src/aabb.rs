use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for the spatial index.
///
/// Defined by its `min` and `max` corners with `min <= max` componentwise.
/// Immutable once built.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from two opposite corners (in any order).
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create the tightest AABB around a set of points.
    ///
    /// Returns `Aabb::EMPTY` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Aabb::EMPTY, |acc, p| Aabb {
            min: acc.min.min(*p),
            max: acc.max.max(*p),
        })
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Grow the box by `delta` on every side.
    pub fn expand(&self, delta: f64) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(delta),
            max: self.max + Vec3::splat(delta),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        Interval::new(self.min[n], self.max[n])
    }

    /// Slab test.
    ///
    /// Returns the entry distance along the ray if the ray crosses the box
    /// volume, or `None` otherwise. For a ray starting inside the box the
    /// entry distance is non-positive. Boxes entirely behind the origin are
    /// misses.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let mut ray_t = Interval::UNIVERSE;

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let orig = ray.origin[axis];
            let dir = ray.direction[axis];

            if dir == 0.0 {
                // Parallel to this slab: either always inside it or never.
                if !slab.contains(orig) {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t0 = (slab.min - orig) * inv;
            let mut t1 = (slab.max - orig) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t = ray_t.intersect(&Interval::new(t0, t1));
            if ray_t.is_empty() {
                return None;
            }
        }

        if ray_t.max < 0.0 {
            return None;
        }
        Some(ray_t.min)
    }

    /// Contains nothing; the identity for `surrounding`.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f64::INFINITY),
        max: Vec3::splat(f64::NEG_INFINITY),
    };
}
