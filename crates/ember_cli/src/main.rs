use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{arg, value_parser, ArgMatches, Command};
use ember_core::SceneDescription;
use ember_renderer::{Camera, IntegratorKind, RenderConfig, Scene};
use serde::Deserialize;

/// A scene file: the scene description plus optional render settings.
#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(flatten)]
    scene: SceneDescription,

    #[serde(default)]
    render: RenderConfig,
}

fn cli() -> Command {
    Command::new("ember")
        .about("Offline path tracer for sphere, plane and triangle mesh scenes.")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(arg!(<SCENE> "Scene description (.json)").value_parser(value_parser!(PathBuf)))
        .arg(
            arg!(-o --output <FILE> "Output bitmap")
                .value_parser(value_parser!(PathBuf))
                .default_value("render.bmp"),
        )
        .arg(arg!(-s --samples <N> "Samples per pixel").value_parser(value_parser!(u32)))
        .arg(arg!(-b --bounces <N> "Maximum bounces per path").value_parser(value_parser!(u32)))
        .arg(arg!(--seed <N> "Random seed").value_parser(value_parser!(u64)))
        .arg(arg!(-t --threads <N> "Worker threads (0 = all cores)").value_parser(value_parser!(usize)))
        .arg(arg!(--direct "Use the point-light direct shader instead of path tracing"))
        .arg(arg!(--"no-nee" "Disable direct sampling of emissive spheres"))
}

/// Command line values take precedence over the scene file.
fn apply_overrides(config: &mut RenderConfig, matches: &ArgMatches) {
    if let Some(&samples) = matches.get_one::<u32>("samples") {
        config.samples_per_pixel = samples;
    }
    if let Some(&bounces) = matches.get_one::<u32>("bounces") {
        config.max_bounces = bounces;
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config.seed = seed;
    }
    if let Some(&threads) = matches.get_one::<usize>("threads") {
        config.threads = threads;
    }
    if matches.get_flag("direct") {
        config.integrator = IntegratorKind::Direct;
    }
    if matches.get_flag("no-nee") {
        config.next_event_estimation = false;
    }
}

fn load_scene_file(path: &Path) -> Result<SceneFile> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene {}", path.display()))?;
    let mut file: SceneFile = serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse scene {}", path.display()))?;

    if let Some(dir) = path.parent() {
        file.scene.resolve_paths(dir);
    }
    Ok(file)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let matches = cli().get_matches();

    let scene_path = matches
        .get_one::<PathBuf>("SCENE")
        .context("No scene file given")?;
    let output = matches
        .get_one::<PathBuf>("output")
        .context("No output path given")?;

    let SceneFile {
        scene: description,
        render: mut config,
    } = load_scene_file(scene_path)?;
    apply_overrides(&mut config, &matches);

    let scene = Scene::from_description(&description)
        .with_context(|| format!("Failed to build scene {}", scene_path.display()))?;
    let camera = Camera::from_description(&description.camera);

    let image = scene.render(&camera, &config);
    image
        .save_bmp(output, config.gamma)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let matches = cli().try_get_matches_from(["ember", "scene.json"]).unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("output"),
            Some(&PathBuf::from("render.bmp"))
        );

        let mut config = RenderConfig::default();
        apply_overrides(&mut config, &matches);
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_cli_overrides() {
        let matches = cli()
            .try_get_matches_from([
                "ember", "scene.json", "-s", "64", "-b", "3", "--seed", "9", "-t", "2", "--direct",
                "--no-nee",
            ])
            .unwrap();

        let mut config = RenderConfig::default();
        apply_overrides(&mut config, &matches);
        assert_eq!(config.samples_per_pixel, 64);
        assert_eq!(config.max_bounces, 3);
        assert_eq!(config.seed, 9);
        assert_eq!(config.threads, 2);
        assert_eq!(config.integrator, IntegratorKind::Direct);
        assert!(!config.next_event_estimation);
    }

    #[test]
    fn test_cli_requires_scene() {
        assert!(cli().try_get_matches_from(["ember"]).is_err());
    }

    #[test]
    fn test_scene_file_with_render_section() {
        let json = r#"{
            "camera": { "width": 4, "height": 4 },
            "objects": [ { "shape": { "type": "sphere", "center": [0, 0, -3], "radius": 1 } } ],
            "render": { "samples_per_pixel": 2, "gamma": 1.0 }
        }"#;
        let file: SceneFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.scene.objects.len(), 1);
        assert_eq!(file.render.samples_per_pixel, 2);
        assert_eq!(file.render.gamma, 1.0);
        assert_eq!(file.render.max_bounces, 8);
    }

    #[test]
    fn test_scene_file_without_render_section() {
        let json = r#"{ "camera": { "width": 4, "height": 4 } }"#;
        let file: SceneFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.render, RenderConfig::default());
    }
}
