//! Recursive color integrator.
//!
//! Implements the path tracing core:
//! - Recursive ray bouncing bounded by a depth budget
//! - Sky gradient background for rays that escape the scene
//! - Gamma correction and 8-bit quantization of averaged samples

use crate::{Color, Hittable, Ray};
use glint_math::Interval;
use rand::RngCore;
use thiserror::Error;

/// Smallest accepted hit distance. Rejects hits at the ray's own origin
/// caused by floating point error ("shadow acne").
pub const T_MIN: f32 = 0.001;

/// Maximum channel value of quantized output pixels.
pub const MAX_CHANNEL_VALUE: u8 = 255;

/// Errors that can occur while rendering to a sink.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Compute the color seen by a ray.
///
/// Each scatter event multiplies the result by the material's attenuation;
/// the recursion stops when `depth` reaches zero, a ray is absorbed, or the
/// ray leaves the scene.
pub fn ray_color(ray: &Ray, depth: u32, world: &dyn Hittable, rng: &mut dyn RngCore) -> Color {
    // Bounce budget exhausted, no more light is gathered
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::from_min(T_MIN)) else {
        return sky_gradient(ray);
    };

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => result.attenuation * ray_color(&result.scattered, depth - 1, world, rng),
        None => Color::ZERO,
    }
}

/// Vertical white-to-blue background gradient.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Sum `count` samples and scale by `1 / count`.
pub fn average_samples(count: u32, mut sample: impl FnMut() -> Color) -> Color {
    if count == 0 {
        return Color::ZERO;
    }

    let mut sum = Color::ZERO;
    for _ in 0..count {
        sum += sample();
    }
    sum * (1.0 / count as f32)
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let unit = Interval::new(0.0, 1.0);
    let quantize =
        |channel: f32| (MAX_CHANNEL_VALUE as f32 * unit.clamp(linear_to_gamma(channel))) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}
