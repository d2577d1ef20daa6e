//! Camera for ray generation and scene rendering.

use crate::random::{random_in_unit_disk, sample_square};
use crate::renderer::{average_samples, color_to_rgb, ray_color, RenderError};
use crate::{Color, Hittable, PixelSink, Ray};
use glint_math::{Vec2, Vec3};
use rand::RngCore;
use serde::Deserialize;
use std::time::Instant;
use thiserror::Error;

/// Rejected camera configurations.
#[derive(Debug, Error, PartialEq)]
pub enum CameraError {
    #[error("Image width must be at least 1 pixel")]
    ZeroImageWidth,

    #[error("Aspect ratio must be finite and positive, got {0}")]
    InvalidAspectRatio(f32),

    #[error("Samples per pixel must be at least 1")]
    ZeroSamples,

    #[error("Vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f32),

    #[error("Focus distance must be finite and positive, got {0}")]
    InvalidFocusDistance(f32),

    #[error("Defocus angle must be finite and below 180 degrees, got {0}")]
    InvalidDefocusAngle(f32),

    #[error("Camera {0} vector is not finite")]
    NonFiniteVector(&'static str),

    #[error("Look-from and look-at points coincide")]
    DegenerateView,

    #[error("Up vector is parallel to the viewing direction")]
    UpParallelToView,

    #[error("Image of {width}x{height} pixels is too large")]
    ImageTooLarge { width: u32, height: f32 },
}

/// User-facing camera parameters.
///
/// Build a [`Camera`] from these with [`CameraSettings::build`]. Angles are
/// in degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    // Image settings
    pub aspect_ratio: f32,
    pub image_width: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,

    // Camera positioning
    pub vfov: f32,
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,

    // Lens settings
    pub defocus_angle: f32, // Variation angle of rays through each pixel
    pub focus_dist: f32,    // Distance from camera to plane of perfect focus
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            vfov: 90.0,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            defocus_angle: 0.0,
            focus_dist: 10.0,
        }
    }
}

impl CameraSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set image width and aspect ratio; height is derived.
    pub fn with_resolution(mut self, image_width: u32, aspect_ratio: f32) -> Self {
        self.image_width = image_width;
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Validate the settings and derive the viewport geometry.
    pub fn build(&self) -> Result<Camera, CameraError> {
        Camera::new(self)
    }

    fn validate(&self) -> Result<(), CameraError> {
        if self.image_width == 0 {
            return Err(CameraError::ZeroImageWidth);
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(CameraError::InvalidAspectRatio(self.aspect_ratio));
        }
        if self.samples_per_pixel == 0 {
            return Err(CameraError::ZeroSamples);
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(CameraError::InvalidFieldOfView(self.vfov));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return Err(CameraError::InvalidFocusDistance(self.focus_dist));
        }
        if !(self.defocus_angle.is_finite() && self.defocus_angle < 180.0) {
            return Err(CameraError::InvalidDefocusAngle(self.defocus_angle));
        }

        for (name, vector) in [
            ("look-from", self.look_from),
            ("look-at", self.look_at),
            ("up", self.vup),
        ] {
            if !vector.is_finite() {
                return Err(CameraError::NonFiniteVector(name));
            }
        }

        let view = self.look_from - self.look_at;
        if view.length_squared() <= f32::EPSILON * f32::EPSILON {
            return Err(CameraError::DegenerateView);
        }
        if self.vup.normalize_or_zero().cross(view.normalize()).length_squared() <= 1e-12 {
            return Err(CameraError::UpParallelToView);
        }

        Ok(())
    }

    /// Image height in pixels: `floor(width / aspect)`, at least 1.
    ///
    /// Fails when the height does not fit a `u32` or the RGB buffer size
    /// would overflow `usize`.
    fn image_height(&self) -> Result<u32, CameraError> {
        let height = (self.image_width as f32 / self.aspect_ratio).floor();
        let too_large = CameraError::ImageTooLarge {
            width: self.image_width,
            height,
        };
        // u32::MAX rounds up to 2^32 as f32
        if !(height < u32::MAX as f32) {
            return Err(too_large);
        }
        let image_height = (height as u32).max(1);

        (self.image_width as usize)
            .checked_mul(image_height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or(too_large)?;

        Ok(image_height)
    }
}

/// A validated camera with its viewport geometry precomputed.
///
/// Immutable once built; build a new one to change any setting.
#[derive(Debug, Clone)]
pub struct Camera {
    image_width: u32,
    image_height: u32,
    samples_per_pixel: u32,
    max_depth: u32,
    defocus_angle: f32,

    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    // Camera frame: u right, v up, w back toward the viewer
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Derive the camera from `settings`, failing on degenerate input.
    pub fn new(settings: &CameraSettings) -> Result<Self, CameraError> {
        settings.validate()?;

        let image_width = settings.image_width;
        let image_height = settings.image_height()?;
        let center = settings.look_from;

        // Viewport dimensions; width uses the real pixel ratio, not the
        // requested one, since the height was rounded down
        let h = (settings.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h * settings.focus_dist;
        let viewport_width = viewport_height * (image_width as f32 / image_height as f32);

        let w = (settings.look_from - settings.look_at).normalize();
        let u = settings.vup.cross(w).normalize();
        let v = w.cross(u);

        // Vectors across the horizontal and down the vertical viewport edges
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / image_width as f32;
        let pixel_delta_v = viewport_v / image_height as f32;

        let viewport_upper_left =
            center - settings.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = settings.focus_dist * (settings.defocus_angle / 2.0).to_radians().tan();

        Ok(Self {
            image_width,
            image_height,
            samples_per_pixel: settings.samples_per_pixel,
            max_depth: settings.max_depth,
            defocus_angle: settings.defocus_angle,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            w,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        })
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Camera position in world space.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// World position of the center of pixel (0, 0), the upper-left pixel.
    pub fn pixel00_loc(&self) -> Vec3 {
        self.pixel00_loc
    }

    pub fn pixel_delta_u(&self) -> Vec3 {
        self.pixel_delta_u
    }

    pub fn pixel_delta_v(&self) -> Vec3 {
        self.pixel_delta_v
    }

    /// Orthonormal camera frame `(u, v, w)`.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    /// Generate a jittered ray for pixel (i, j).
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        self.ray_through(i, j, offset, origin)
    }

    /// Ray from `origin` through pixel (i, j) shifted by `offset` pixel deltas.
    fn ray_through(&self, i: u32, j: u32, offset: Vec2, origin: Vec3) -> Ray {
        let pixel_sample = self.pixel00_loc
            + (i as f32 + offset.x) * self.pixel_delta_u
            + (j as f32 + offset.y) * self.pixel_delta_v;

        Ray::new(origin, pixel_sample - origin)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }

    /// Average linear color of pixel (i, j) over all samples.
    pub fn pixel_color(
        &self,
        i: u32,
        j: u32,
        world: &dyn Hittable,
        rng: &mut dyn RngCore,
    ) -> Color {
        average_samples(self.samples_per_pixel, || {
            let ray = self.get_ray(i, j, rng);
            ray_color(&ray, self.max_depth, world, rng)
        })
    }

    /// Render the whole image into `sink`, top row first, left to right.
    pub fn render(
        &self,
        world: &dyn Hittable,
        sink: &mut dyn PixelSink,
        rng: &mut dyn RngCore,
    ) -> Result<(), RenderError> {
        log::info!(
            "Rendering {}x{} @ {} spp, max depth {}",
            self.image_width,
            self.image_height,
            self.samples_per_pixel,
            self.max_depth
        );
        let start = Instant::now();

        sink.begin(self.image_width, self.image_height)?;

        for j in 0..self.image_height {
            log::debug!("Scanlines remaining: {}", self.image_height - j);
            for i in 0..self.image_width {
                let color = self.pixel_color(i, j, world, rng);
                sink.write_pixel(color_to_rgb(color))?;
            }
        }

        sink.finish()?;
        log::info!("Rendered in {:.2?}", start.elapsed());

        Ok(())
    }
}
