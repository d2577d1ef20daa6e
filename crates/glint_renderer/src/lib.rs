//! Glint renderer - recursive CPU ray tracing.
//!
//! A camera shoots jittered rays through every pixel, the scene reports the
//! closest surface hit, and the surface material decides whether the ray is
//! absorbed or scattered onward. Colors are averaged per pixel, gamma
//! corrected and written to a [`PixelSink`] in scanline order.
//!
//! All randomness comes from a caller-supplied [`rand::RngCore`], so a render
//! with a fixed seed is reproducible.
//!
//! # Example
//!
//! ```ignore
//! use glint_renderer::*;
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::sync::Arc;
//!
//! let mut world = HittableList::new();
//! world.add(Box::new(Sphere::new(
//!     Vec3::new(0.0, 0.0, -1.0),
//!     0.5,
//!     Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
//! )));
//!
//! let camera = CameraSettings::new().with_resolution(400, 16.0 / 9.0).build()?;
//! let mut out = PpmWriter::new(std::io::stdout().lock());
//! camera.render(&world, &mut out, &mut StdRng::seed_from_u64(0))?;
//! ```

mod camera;
mod hittable;
mod material;
mod output;
pub mod random;
mod renderer;
mod sphere;

pub use camera::{Camera, CameraError, CameraSettings};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{reflect, refract, Color, Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use output::{ImageBuffer, PixelSink, PpmWriter};
pub use renderer::{
    average_samples, color_to_rgb, linear_to_gamma, ray_color, sky_gradient, RenderError,
    MAX_CHANNEL_VALUE, T_MIN,
};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from glint_math
pub use glint_math::{Interval, Ray, Vec3};
