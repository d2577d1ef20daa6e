use anyhow::{bail, Context, Result};
use clap::Parser;
use glint_renderer::{Camera, HittableList, ImageBuffer, PpmWriter};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

mod cli;
mod logger;
mod scene;

use cli::Args;
use logger::init_logger;
use scene::SceneDescription;

/// Where the finished pixels go, chosen from the output path.
enum Output<'a> {
    Stdout,
    Ppm(&'a Path),
    Png(&'a Path),
}

impl<'a> Output<'a> {
    fn from_path(path: &'a Path) -> Result<Self> {
        if path.as_os_str() == "-" {
            return Ok(Output::Stdout);
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ppm") => Ok(Output::Ppm(path)),
            Some(ext) if ext.eq_ignore_ascii_case("png") => Ok(Output::Png(path)),
            _ => bail!(
                "Unsupported output '{}': use a .ppm or .png path, or '-' for stdout",
                path.display()
            ),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(args.log_level.into());
    info!("Glint {}", env!("CARGO_PKG_VERSION"));

    let output = Output::from_path(&args.output)?;
    let mut rng = StdRng::seed_from_u64(args.seed);

    let scene = match &args.scene {
        Some(path) => SceneDescription::load(path)
            .and_then(SceneDescription::build)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => {
            info!("Using built-in scene {:?}", args.builtin);
            args.builtin.build(&mut rng)
        }
    };
    info!("Scene contains {} objects", scene.world.len());

    let camera = args
        .apply_overrides(scene.camera)
        .build()
        .context("Invalid camera settings")?;

    render_to(&output, &camera, &scene.world, &mut rng)
}

fn render_to(
    output: &Output,
    camera: &Camera,
    world: &HittableList,
    rng: &mut StdRng,
) -> Result<()> {
    match output {
        Output::Stdout => {
            let mut sink = PpmWriter::new(BufWriter::new(io::stdout().lock()));
            camera.render(world, &mut sink, rng)?;
        }
        Output::Ppm(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut sink = PpmWriter::new(BufWriter::new(file));
            camera.render(world, &mut sink, rng)?;
            info!("Saved to {}", path.display());
        }
        Output::Png(path) => {
            let mut image = ImageBuffer::default();
            camera.render(world, &mut image, rng)?;
            image
                .save_png(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Saved to {}", path.display());
        }
    }
    Ok(())
}
