//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Ray};
use glint_math::{Interval, Vec3};

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal, always pointing against the incoming ray
    pub normal: Vec3,
    /// Ray parameter where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Material of the surface that was struck
    pub material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// Build a record for a hit at parameter `t`.
    ///
    /// `outward_normal` must be unit length and point out of the surface; it
    /// is flipped as needed so the stored normal opposes the ray.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, material: &'a dyn Material) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            t,
            front_face: true,
            material,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        // Ray and outward normal pointing the same way means we're inside
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Closest intersection with `ray` whose parameter lies strictly inside
    /// `ray_t`, or `None`.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>>;
}

/// An unordered collection of hittables that answers with the closest hit.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Clear all objects from the list.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl FromIterator<Box<dyn Hittable>> for HittableList {
    fn from_iter<I: IntoIterator<Item = Box<dyn Hittable>>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

impl Extend<Box<dyn Hittable>> for HittableList {
    fn extend<I: IntoIterator<Item = Box<dyn Hittable>>>(&mut self, iter: I) {
        self.objects.extend(iter);
    }
}

impl Hittable for HittableList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            // Shrink the far bound so farther hits are rejected by the object itself
            let closest_so_far = closest.as_ref().map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far)) {
                closest = Some(rec);
            }
        }

        closest
    }
}
