//! Simple path tracer example.
//!
//! Renders a floor with glass, metal and diffuse spheres lit by an
//! emissive sphere, and saves it as a BMP.

use ember_renderer::{Camera, Color, Material, RenderConfig, Scene, Surface, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // Build the scene
    let start = std::time::Instant::now();
    let scene = build_scene();
    println!("Scene built in {:?}", start.elapsed());

    let camera = Camera::new()
        .with_resolution(640, 360)
        .with_fov(30.0)
        .with_position(Vec3::new(0.0, 2.0, 12.0), Vec3::new(0.0, -0.15, -1.0));

    let config = RenderConfig {
        samples_per_pixel: 64,
        ..RenderConfig::default()
    };

    let image = scene.render(&camera, &config);

    let filename = "output.bmp";
    image.save_bmp(filename, config.gamma)?;
    println!("Saved to {}", filename);
    Ok(())
}

fn build_scene() -> Scene {
    let mut scene = Scene::new(Color::new(0.05, 0.06, 0.08));

    // Ground
    scene.add_surface(Surface::plane(
        Vec3::Y,
        Vec3::ZERO,
        Material::diffuse(Color::splat(0.5)),
    ));

    // Light
    scene.add_surface(Surface::sphere(
        Vec3::new(-2.0, 6.0, 2.0),
        1.5,
        Material::diffuse(Color::ZERO).with_emission(Color::splat(12.0)),
    ));

    // Three main spheres
    scene.add_surface(Surface::sphere(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Material::dielectric(1.5),
    ));
    scene.add_surface(Surface::sphere(
        Vec3::new(-2.5, 1.0, 0.0),
        1.0,
        Material::diffuse(Color::new(0.4, 0.2, 0.1)),
    ));
    scene.add_surface(Surface::sphere(
        Vec3::new(2.5, 1.0, 0.0),
        1.0,
        Material::metal(Color::new(0.7, 0.6, 0.5), 0.05),
    ));

    // Small random spheres
    let mut rng = StdRng::seed_from_u64(1);
    for a in -4..4 {
        for b in -2..3 {
            let center = Vec3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );
            let crowded = [-2.5, 0.0, 2.5]
                .iter()
                .any(|&x| (center - Vec3::new(x, 0.2, 0.0)).length() < 1.3);
            if crowded {
                continue;
            }

            let choose_mat: f64 = rng.gen();
            let material = if choose_mat < 0.8 {
                Material::diffuse(Color::new(
                    rng.gen::<f64>() * rng.gen::<f64>(),
                    rng.gen::<f64>() * rng.gen::<f64>(),
                    rng.gen::<f64>() * rng.gen::<f64>(),
                ))
            } else if choose_mat < 0.95 {
                Material::metal(
                    Color::splat(0.5 + 0.5 * rng.gen::<f64>()),
                    0.5 * rng.gen::<f64>(),
                )
            } else {
                Material::dielectric(1.5)
            };
            scene.add_surface(Surface::sphere(center, 0.2, material));
        }
    }

    println!("Created {} surfaces", scene.surfaces().len());
    scene
}
