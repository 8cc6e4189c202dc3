// Re-export the double precision glam types used everywhere
pub use glam::{dvec3, DVec3};

// Ember math types
mod aabb;
mod interval;
mod ray;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use vector::{Vec3Ext, EPSILON, INF};

/// Position/direction vector.
pub type Vec3 = DVec3;

/// Linear RGB radiance or reflectance. Not clamped until output.
pub type Color = DVec3;
