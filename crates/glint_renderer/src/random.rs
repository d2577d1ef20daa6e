//! Sampling helpers.
//!
//! Every function draws from a generator passed in by the caller, so a render
//! seeded with the same value is reproducible and no global state is shared.

use glint_math::{Vec2, Vec3};
use rand::{Rng, RngCore};

/// Uniform sample in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform sample in [min, max).
#[inline]
pub fn gen_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// Uniform sample in the square [-0.5, 0.5) x [-0.5, 0.5).
pub fn sample_square(rng: &mut dyn RngCore) -> Vec2 {
    Vec2::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5)
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Rejection sampling in the enclosing cube keeps the distribution uniform
    loop {
        let p = Vec3::new(
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
        );
        let len_sq = p.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Uniform point inside the unit disk on the z = 0 plane.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_range(rng, -1.0, 1.0), gen_range(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Color with each channel uniform in [min, max).
pub fn random_color(rng: &mut dyn RngCore, min: f32, max: f32) -> Vec3 {
    Vec3::new(
        gen_range(rng, min, max),
        gen_range(rng, min, max),
        gen_range(rng, min, max),
    )
}
