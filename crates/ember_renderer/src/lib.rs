//! Ember renderer - CPU path tracing
//!
//! A Monte Carlo path tracer over spheres, planes and indexed triangle
//! meshes, with next-event estimation toward emissive spheres, Russian
//! roulette and bucketed parallel rendering.

mod bucket;
mod camera;
mod integrator;
mod kdtree;
mod light;
mod material;
mod mesh;
mod plane;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod surface;
mod triangle;

pub use bucket::{
    bucket_seed, generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE,
};
pub use camera::Camera;
pub use integrator::{DirectLighting, Integrator, PathTracer};
pub use kdtree::{KdTree, MeshHit, LEAF_CAPACITY};
pub use light::PointLight;
pub use material::{refract, schlick, Color, Interaction, Material, ScatterResult, Scattering};
pub use mesh::MeshSurface;
pub use plane::Plane;
pub use renderer::{color_to_rgb, render, render_pixel, ImageBuffer, IntegratorKind, RenderConfig};
pub use sampling::{cone_solid_angle, gen_f64, random_in_unit_sphere, sample_cone};
pub use scene::{Scene, SceneError, SceneResult};
pub use sphere::Sphere;
pub use surface::{HitRecord, Shape, Surface, SurfaceHit};
pub use triangle::{intersect_triangle, TriangleHit};

/// Re-export common math types from ember_math
pub use ember_math::{Aabb, Ray, Vec3, EPSILON, INF};
