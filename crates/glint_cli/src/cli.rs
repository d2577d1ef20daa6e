use clap::{Parser, ValueEnum};
use glint_renderer::CameraSettings;
use log::LevelFilter;
use std::path::PathBuf;

/// Log levels selectable from the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Scenes compiled into the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Builtin {
    /// Ground plane with a diffuse, a glass and a metal sphere
    Quickstart,
    /// Field of small random spheres around three large ones
    Cover,
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "glint")]
#[command(about = "A recursive ray tracer that writes PPM or PNG images")]
pub struct Args {
    /// JSON scene description to render
    #[arg(long, conflicts_with = "builtin")]
    pub scene: Option<PathBuf>,

    /// Built-in scene to render when no scene file is given
    #[arg(long, value_enum, default_value = "quickstart")]
    pub builtin: Builtin,

    /// Output path: `.ppm` streams plain PPM, `.png` encodes PNG, `-` writes PPM to stdout
    #[arg(short, long, default_value = "image.ppm")]
    pub output: PathBuf,

    /// Override the image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Override the number of samples per pixel
    #[arg(long, short = 's')]
    pub samples: Option<u32>,

    /// Override the maximum number of ray bounces
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Seed for the random number generator
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Logging level; RUST_LOG overrides it when set
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Apply command line overrides on top of the scene's camera.
    pub fn apply_overrides(&self, mut settings: CameraSettings) -> CameraSettings {
        if let Some(width) = self.width {
            settings.image_width = width;
        }
        if let Some(samples) = self.samples {
            settings.samples_per_pixel = samples;
        }
        if let Some(max_depth) = self.max_depth {
            settings.max_depth = max_depth;
        }
        settings
    }
}
