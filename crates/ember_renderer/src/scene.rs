//! Scene assembly and ray queries.

use std::path::Path;

use ember_core::{
    vec3, EnvironmentError, EnvironmentMap, MaterialDescription, MaterialKind, MeshError,
    SceneDescription, ShapeDescription,
};
use ember_math::{Aabb, Color, Ray, Vec3};
use thiserror::Error;

use crate::camera::Camera;
use crate::light::PointLight;
use crate::material::Material;
use crate::mesh::MeshSurface;
use crate::plane::Plane;
use crate::renderer::{render, ImageBuffer, RenderConfig};
use crate::sphere::Sphere;
use crate::surface::{HitRecord, Shape, Surface};

/// Errors that can occur while assembling a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Everything a ray can hit, plus what it sees when it escapes.
pub struct Scene {
    surfaces: Vec<Surface>,
    lights: Vec<PointLight>,
    environment: Option<EnvironmentMap>,
    background: Color,
    /// Indices of emissive spheres, in insertion order
    sphere_lights: Vec<usize>,
}

impl Scene {
    /// Empty scene with a constant background.
    pub fn new(background: Color) -> Self {
        Self {
            surfaces: Vec::new(),
            lights: Vec::new(),
            environment: None,
            background,
            sphere_lights: Vec::new(),
        }
    }

    /// Append a surface and return its index.
    pub fn add_surface(&mut self, surface: Surface) -> usize {
        let index = self.surfaces.len();
        if surface.is_sphere_light() {
            self.sphere_lights.push(index);
        }
        self.surfaces.push(surface);
        index
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    /// Load an environment image; `rotation` is a yaw in radians.
    ///
    /// On failure the scene is left unchanged.
    pub fn set_environment(
        &mut self,
        path: impl AsRef<Path>,
        rotation: Option<f64>,
    ) -> SceneResult<()> {
        let env = EnvironmentMap::load(path)?.with_rotation(rotation.unwrap_or(0.0));
        self.environment = Some(env);
        Ok(())
    }

    pub fn set_environment_map(&mut self, env: EnvironmentMap) {
        self.environment = Some(env);
    }

    pub fn environment(&self) -> Option<&EnvironmentMap> {
        self.environment.as_ref()
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn surface(&self, index: usize) -> Option<&Surface> {
        self.surfaces.get(index)
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// Emissive spheres with their surface index.
    pub fn sphere_lights(&self) -> impl Iterator<Item = (usize, &Sphere, &Material)> + '_ {
        self.sphere_lights.iter().filter_map(move |&index| {
            let surface = &self.surfaces[index];
            surface
                .as_sphere()
                .map(|sphere| (index, sphere, &surface.material))
        })
    }

    /// Nearest intersection over all surfaces.
    ///
    /// Linear scan; on equal distance the earlier surface wins.
    pub fn hit(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;
        for (index, surface) in self.surfaces.iter().enumerate() {
            if let Some(hit) = surface.shape.intersect(ray) {
                if closest.map_or(true, |c| hit.t < c.t) {
                    closest = Some(HitRecord::new(ray, hit, index, surface));
                }
            }
        }
        closest
    }

    /// Radiance seen along a ray that hits nothing.
    pub fn miss_radiance(&self, direction: Vec3) -> Color {
        match &self.environment {
            Some(env) => env.sample(direction),
            None => self.background,
        }
    }

    /// Union of all bounded surfaces.
    pub fn bounds(&self) -> Option<Aabb> {
        self.surfaces
            .iter()
            .filter_map(|s| s.shape.bounding_box())
            .reduce(|a, b| Aabb::surrounding(&a, &b))
    }

    /// Render through `camera`.
    pub fn render(&self, camera: &Camera, config: &RenderConfig) -> ImageBuffer {
        render(self, camera, config)
    }

    /// Build a scene from its description, loading meshes and the
    /// environment from disk.
    pub fn from_description(desc: &SceneDescription) -> SceneResult<Self> {
        let mut scene = Scene::new(desc.background_color());

        if let Some(env) = &desc.environment {
            scene.set_environment(&env.path, Some(env.rotation.to_radians()))?;
        }

        for light in &desc.lights {
            scene.add_light(
                PointLight::new(vec3(light.position), light.intensity)
                    .with_color(vec3(light.color)),
            );
        }

        for object in &desc.objects {
            let shape = match &object.shape {
                ShapeDescription::Sphere { center, radius } => {
                    Shape::Sphere(Sphere::new(vec3(*center), *radius))
                }
                ShapeDescription::Plane {
                    normal,
                    center,
                    size,
                } => Shape::Plane(match size {
                    Some(size) => Plane::finite(vec3(*normal), vec3(*center), *size),
                    None => Plane::new(vec3(*normal), vec3(*center)),
                }),
                ShapeDescription::Mesh { path } => Shape::Mesh(MeshSurface::load(path)?),
            };
            scene.add_surface(Surface::new(shape, material_from(&object.material)));
        }

        log::info!(
            "Scene: {} surfaces ({} sphere lights), {} point lights, environment: {}",
            scene.surfaces.len(),
            scene.sphere_lights.len(),
            scene.lights.len(),
            if scene.environment.is_some() { "yes" } else { "no" }
        );

        Ok(scene)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Color::ZERO)
    }
}

fn material_from(desc: &MaterialDescription) -> Material {
    let material = match desc.kind {
        MaterialKind::Diffuse => Material::diffuse(desc.albedo_color()),
        MaterialKind::Metal => Material::metal(desc.albedo_color(), desc.roughness),
        MaterialKind::Dielectric => Material::dielectric(desc.refractive_index),
    };
    material.with_emission(desc.emissive_color())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_spheres() -> Scene {
        let mut scene = Scene::new(Color::new(0.1, 0.2, 0.3));
        scene.add_surface(Surface::sphere(
            Vec3::new(0.0, 0.0, -5.0),
            1.0,
            Material::default(),
        ));
        scene.add_surface(Surface::sphere(
            Vec3::new(0.0, 0.0, -2.0),
            0.5,
            Material::diffuse(Color::ONE).with_emission(Color::ONE),
        ));
        scene
    }

    #[test]
    fn test_hit_returns_nearest() {
        let scene = two_spheres();
        let rec = scene.hit(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).unwrap();
        assert_eq!(rec.surface_index, 1);
        assert!((rec.t - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_miss_returns_background() {
        let scene = two_spheres();
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(scene.hit(&ray).is_none());
        assert_eq!(scene.miss_radiance(ray.direction), Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_environment_replaces_background() {
        let mut scene = two_spheres();
        scene.set_environment_map(EnvironmentMap::new(1, 1, vec![[1.0, 1.0, 1.0]]).unwrap());
        assert!((scene.miss_radiance(Vec3::Y) - Color::splat(0.6)).length() < 1e-9);
    }

    #[test]
    fn test_failed_environment_leaves_scene_unchanged() {
        let mut scene = two_spheres();
        let err = scene.set_environment("/no/such/sky.hdr", None).unwrap_err();
        assert!(matches!(err, SceneError::Environment(_)));
        assert!(scene.environment().is_none());
    }

    #[test]
    fn test_sphere_lights_tracked() {
        let scene = two_spheres();
        let lights: Vec<usize> = scene.sphere_lights().map(|(i, _, _)| i).collect();
        assert_eq!(lights, vec![1]);
    }

    #[test]
    fn test_empty_scene() {
        let scene = Scene::default();
        assert!(scene.hit(&Ray::new(Vec3::ZERO, Vec3::X)).is_none());
        assert!(scene.bounds().is_none());
    }

    #[test]
    fn test_from_description() {
        let json = r#"{
            "camera": { "width": 8, "height": 8 },
            "lights": [ { "position": [0, 5, 0], "intensity": 10 } ],
            "objects": [
                { "shape": { "type": "sphere", "center": [0, 0, -3], "radius": 1 },
                  "material": { "kind": "metal", "roughness": 0.3 } },
                { "shape": { "type": "plane", "normal": [0, 1, 0], "center": [0, -1, 0], "size": 4 },
                  "material": { "emissive": [2, 2, 2] } }
            ]
        }"#;
        let desc: SceneDescription = serde_json::from_str(json).unwrap();
        let scene = Scene::from_description(&desc).unwrap();

        assert_eq!(scene.surfaces().len(), 2);
        assert_eq!(scene.lights().len(), 1);
        assert!(matches!(
            scene.surfaces()[0].material.scattering,
            crate::material::Scattering::Metal { roughness } if roughness == 0.3
        ));
        assert!(scene.surfaces()[1].material.is_emissive());
        // Emissive planes are not sampled as lights
        assert_eq!(scene.sphere_lights().count(), 0);
    }

    #[test]
    fn test_missing_mesh_is_an_error() {
        let json = r#"{
            "camera": { "width": 8, "height": 8 },
            "objects": [ { "shape": { "type": "mesh", "path": "/no/such/mesh.obj" } } ]
        }"#;
        let desc: SceneDescription = serde_json::from_str(json).unwrap();
        assert!(matches!(
            Scene::from_description(&desc),
            Err(SceneError::Mesh(_))
        ));
    }
}
