#![deny(unsafe_code)]
//! CLI binary for the raybend beam renderer.
//!
//! Subcommands:
//! - `render <scene>`: tick a scene, rasterize the beams, write PNG
//! - `dump <scene>`: print the instance list as JSON
//! - `list`: print field profiles, emitter patterns and config options

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use log::warn;
use raybend_core::{CameraSnapshot, EmitterPattern, InstanceRecord, Profile, RendererConfig};
use raybend_scene::Scene;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "raybend", about = "Field-bent ray beam renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tick a scene and write a PNG preview of its beams.
    Render {
        /// Scene file (JSON).
        scene: PathBuf,

        /// Output file path.
        #[arg(short, long, default_value = "beams.png")]
        output: PathBuf,

        /// Image width in pixels.
        #[arg(short = 'W', long, default_value_t = 512)]
        width: usize,

        /// Image height in pixels.
        #[arg(short = 'H', long, default_value_t = 512)]
        height: usize,

        /// Frames to tick (defaults to the scene's `frames`).
        #[arg(short, long)]
        frames: Option<usize>,
    },
    /// Print the instances produced by a scene as JSON.
    Dump {
        /// Scene file (JSON).
        scene: PathBuf,

        /// Frames to tick (defaults to the scene's `frames`).
        #[arg(short, long)]
        frames: Option<usize>,
    },
    /// List field profiles, emitter patterns and renderer options.
    List,
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let schema = RendererConfig::param_schema();
            if cli.json {
                let info = serde_json::json!({
                    "profiles": Profile::NAMES,
                    "patterns": EmitterPattern::NAMES,
                    "config": schema,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Profiles:");
                println!("  {}", Profile::NAMES.join(", "));
                println!("Emitter patterns:");
                println!("  {}", EmitterPattern::NAMES.join(", "));
                println!("Config options:");
                if let Some(options) = schema.as_object() {
                    for (name, spec) in options {
                        println!(
                            "  {name:<36} {:<8} default {}",
                            spec["type"].as_str().unwrap_or("?"),
                            spec["default"]
                        );
                    }
                }
            }
        }
        Command::Render {
            scene,
            output,
            width,
            height,
            frames,
        } => {
            if width == 0 || height == 0 {
                return Err(CliError::ImageSize { width, height });
            }
            let loaded = Scene::load(&scene).map_err(|e| CliError::loading(&scene, e))?;
            let frames = frames.unwrap_or(loaded.frames);
            let (renderer, rebuilt) = loaded.render_frames(frames);

            let camera = loaded.camera_snapshot().unwrap_or_else(|| {
                warn!("scene has no camera; writing an empty preview");
                CameraSnapshot::default()
            });
            let fov = loaded.camera.as_ref().map_or(60.0, |c| c.fov_degrees);
            raybend_scene::snapshot::write_png(
                renderer.instances(),
                &camera,
                width,
                height,
                fov,
                &output,
            )
            .map_err(|e| CliError::writing(&output, width, height, e))?;

            if cli.json {
                let info = serde_json::json!({
                    "scene": scene.display().to_string(),
                    "width": width,
                    "height": height,
                    "frames": frames,
                    "rebuilds": rebuilt,
                    "instances": renderer.instances().len(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({width}x{height}, {frames} frames, {} instances) -> {}",
                    scene.display(),
                    renderer.instances().len(),
                    output.display()
                );
            }
        }
        Command::Dump { scene, frames } => {
            let loaded = Scene::load(&scene).map_err(|e| CliError::loading(&scene, e))?;
            let frames = frames.unwrap_or(loaded.frames);
            let (renderer, _) = loaded.render_frames(frames);
            let records: Vec<InstanceRecord> =
                renderer.instances().iter().map(InstanceRecord::from).collect();
            let info = serde_json::json!({
                "scene": scene.display().to_string(),
                "frames": frames,
                "config": renderer.config().params(),
                "instances": records,
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
