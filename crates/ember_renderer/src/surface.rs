//! Renderable surfaces: a closed set of shapes paired with a material.

use ember_math::{Aabb, Ray, Vec3};

use crate::material::{Interaction, Material};
use crate::mesh::MeshSurface;
use crate::plane::Plane;
use crate::sphere::Sphere;

/// Raw intersection reported by a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub t: f64,
    pub point: Vec3,
    /// Outward normal, not necessarily unit length
    pub normal: Vec3,
}

/// Geometry of a surface.
pub enum Shape {
    Sphere(Sphere),
    Plane(Plane),
    Mesh(MeshSurface),
}

impl Shape {
    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        match self {
            Shape::Sphere(sphere) => sphere.intersect(ray),
            Shape::Plane(plane) => plane.intersect(ray),
            Shape::Mesh(mesh) => mesh.intersect(ray),
        }
    }

    /// `None` for unbounded shapes and empty meshes.
    pub fn bounding_box(&self) -> Option<Aabb> {
        match self {
            Shape::Sphere(sphere) => Some(sphere.bounding_box()),
            Shape::Plane(plane) => plane.bounding_box(),
            Shape::Mesh(mesh) => mesh.bounding_box(),
        }
    }
}

/// A shape with its material.
pub struct Surface {
    pub shape: Shape,
    pub material: Material,
}

impl Surface {
    pub fn new(shape: Shape, material: Material) -> Self {
        Self { shape, material }
    }

    pub fn sphere(center: Vec3, radius: f64, material: Material) -> Self {
        Self::new(Shape::Sphere(Sphere::new(center, radius)), material)
    }

    pub fn plane(normal: Vec3, center: Vec3, material: Material) -> Self {
        Self::new(Shape::Plane(Plane::new(normal, center)), material)
    }

    pub fn mesh(mesh: MeshSurface, material: Material) -> Self {
        Self::new(Shape::Mesh(mesh), material)
    }

    /// The sphere, if this surface is one.
    pub fn as_sphere(&self) -> Option<&Sphere> {
        match &self.shape {
            Shape::Sphere(sphere) => Some(sphere),
            _ => None,
        }
    }

    /// Emissive spheres are the only area lights sampled directly.
    pub fn is_sphere_light(&self) -> bool {
        self.material.is_emissive() && self.as_sphere().is_some()
    }
}

/// Record of a ray-scene intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Distance along the ray
    pub t: f64,
    /// Position of the surface in the scene
    pub surface_index: usize,
    pub surface: &'a Surface,
    pub interaction: Interaction,
}

impl<'a> HitRecord<'a> {
    pub fn new(ray: &Ray, hit: SurfaceHit, surface_index: usize, surface: &'a Surface) -> Self {
        Self {
            t: hit.t,
            surface_index,
            surface,
            interaction: Interaction::new(ray.direction, hit.point, hit.normal),
        }
    }

    #[inline]
    pub fn material(&self) -> &'a Material {
        &self.surface.material
    }

    #[inline]
    pub fn point(&self) -> Vec3 {
        self.interaction.point
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.interaction.normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Color;

    #[test]
    fn test_hit_record_normal_faces_ray() {
        let surface = Surface::sphere(Vec3::ZERO, 2.0, Material::default());
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = surface.shape.intersect(&ray).unwrap();

        let rec = HitRecord::new(&ray, hit, 3, &surface);
        assert_eq!(rec.surface_index, 3);
        assert!(!rec.interaction.front_face);
        assert!((rec.normal() - Vec3::NEG_X).length() < 1e-12);
    }

    #[test]
    fn test_sphere_light_detection() {
        let light = Surface::sphere(
            Vec3::ZERO,
            1.0,
            Material::diffuse(Color::ONE).with_emission(Color::splat(5.0)),
        );
        let glowing_floor = Surface::plane(
            Vec3::Y,
            Vec3::ZERO,
            Material::diffuse(Color::ONE).with_emission(Color::ONE),
        );
        assert!(light.is_sphere_light());
        assert!(!glowing_floor.is_sphere_light());
        assert!(glowing_floor.as_sphere().is_none());
    }
}
