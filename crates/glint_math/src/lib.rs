//! Glint math - vector types, rays, and parameter intervals.
//!
//! `Vec3` and friends come straight from glam; this crate only adds the
//! small ray tracing primitives built on top of them.

// Re-export glam for convenience
pub use glam::*;

mod interval;
mod ray;

pub use interval::Interval;
pub use ray::Ray;
