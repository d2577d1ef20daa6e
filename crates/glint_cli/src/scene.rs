//! Scene descriptions: JSON files and the built-in demo scenes.

use crate::cli::Builtin;
use glint_renderer::random::{gen_f32, gen_range, random_color};
use glint_renderer::{
    CameraSettings, Color, Dielectric, HittableList, Lambertian, Material, Metal, Sphere, Vec3,
};
use rand::RngCore;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors produced while loading or assembling a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Failed to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sphere {index} references unknown material '{name}'")]
    UnknownMaterial { index: usize, name: String },

    #[error("Sphere {index} has non-positive radius {radius}")]
    InvalidRadius { index: usize, radius: f32 },

    #[error("Material '{0}' has a non-positive index of refraction")]
    InvalidIor(String),
}

/// A material entry in a scene file, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MaterialData {
    Lambertian {
        albedo: Color,
    },
    Metal {
        albedo: Color,
        #[serde(default)]
        fuzz: f32,
    },
    Dielectric {
        ior: f32,
    },
}

impl MaterialData {
    fn build(&self, name: &str) -> Result<Arc<dyn Material>, SceneError> {
        Ok(match *self {
            MaterialData::Lambertian { albedo } => Arc::new(Lambertian::new(albedo)),
            MaterialData::Metal { albedo, fuzz } => Arc::new(Metal::new(albedo, fuzz)),
            MaterialData::Dielectric { ior } => {
                if !(ior > 0.0) {
                    return Err(SceneError::InvalidIor(name.to_string()));
                }
                Arc::new(Dielectric::new(ior))
            }
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SphereData {
    pub center: Vec3,
    pub radius: f32,
    /// Key into the scene's material table
    pub material: String,
}

/// On-disk scene layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub camera: CameraSettings,
    pub materials: BTreeMap<String, MaterialData>,
    pub spheres: Vec<SphereData>,
}

/// A scene ready to render.
pub struct Scene {
    pub camera: CameraSettings,
    pub world: HittableList,
}

impl SceneDescription {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Resolve material references and assemble the world.
    ///
    /// Each named material is instantiated once and shared by every sphere
    /// that refers to it.
    pub fn build(self) -> Result<Scene, SceneError> {
        let materials = self
            .materials
            .iter()
            .map(|(name, data)| Ok((name.as_str(), data.build(name)?)))
            .collect::<Result<BTreeMap<_, _>, SceneError>>()?;

        let mut world = HittableList::new();
        for (index, sphere) in self.spheres.iter().enumerate() {
            if !(sphere.radius > 0.0) {
                return Err(SceneError::InvalidRadius {
                    index,
                    radius: sphere.radius,
                });
            }
            let material = materials.get(sphere.material.as_str()).ok_or_else(|| {
                SceneError::UnknownMaterial {
                    index,
                    name: sphere.material.clone(),
                }
            })?;
            world.add(Box::new(Sphere::new(
                sphere.center,
                sphere.radius,
                Arc::clone(material),
            )));
        }

        log::debug!(
            "Built scene with {} materials, {} spheres",
            materials.len(),
            world.len()
        );

        Ok(Scene {
            camera: self.camera,
            world,
        })
    }
}

impl Builtin {
    /// Construct the scene. `cover` draws its sphere layout from `rng`.
    pub fn build(self, rng: &mut dyn RngCore) -> Scene {
        match self {
            Builtin::Quickstart => quickstart(),
            Builtin::Cover => cover(rng),
        }
    }
}

fn quickstart() -> Scene {
    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.8, 0.8, 0.0)));
    let center: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.1, 0.2, 0.5)));
    let left: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    let bubble: Arc<dyn Material> = Arc::new(Dielectric::new(1.0 / 1.5));
    let right: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 1.0));

    let mut world = HittableList::new();
    world.add(Box::new(Sphere::new(Vec3::new(0.0, -100.5, -1.0), 100.0, ground)));
    world.add(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -1.2), 0.5, center)));
    world.add(Box::new(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, left)));
    world.add(Box::new(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.4, bubble)));
    world.add(Box::new(Sphere::new(Vec3::new(1.0, 0.0, -1.0), 0.5, right)));

    let camera = CameraSettings::new()
        .with_resolution(400, 16.0 / 9.0)
        .with_quality(50, 50)
        .with_position(Vec3::new(-2.0, 2.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(20.0, 10.0, 3.4);

    Scene { camera, world }
}

fn cover(rng: &mut dyn RngCore) -> Scene {
    let mut world = HittableList::new();

    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
    )));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(rng);
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );

            // Keep clear of the large metal sphere
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let material: Arc<dyn Material> = if choose_mat < 0.8 {
                let albedo = random_color(rng, 0.0, 1.0) * random_color(rng, 0.0, 1.0);
                Arc::new(Lambertian::new(albedo))
            } else if choose_mat < 0.95 {
                let albedo = random_color(rng, 0.5, 1.0);
                Arc::new(Metal::new(albedo, gen_range(rng, 0.0, 0.5)))
            } else {
                Arc::new(Dielectric::new(1.5))
            };
            world.add(Box::new(Sphere::new(center, 0.2, material)));
        }
    }

    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    world.add(Box::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
    )));
    world.add(Box::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    let camera = CameraSettings::new()
        .with_resolution(1200, 16.0 / 9.0)
        .with_quality(10, 50)
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0);

    Scene { camera, world }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_renderer::{Hittable, Interval, Ray, T_MIN};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SHIPPED_SCENE: &str = include_str!("../../../scenes/quickstart.json");

    #[test]
    fn test_shipped_scene_matches_builtin() {
        let description = SceneDescription::from_json(SHIPPED_SCENE).unwrap();
        let builtin = quickstart();

        assert_eq!(description.camera, builtin.camera);

        let scene = description.build().unwrap();
        assert_eq!(scene.world.len(), builtin.world.len());

        let ray = Ray::new(Vec3::new(-2.0, 2.0, 1.0), Vec3::new(2.0, -2.0, -2.2));
        let from_file = scene.world.hit(&ray, Interval::from_min(T_MIN)).unwrap();
        let compiled = builtin.world.hit(&ray, Interval::from_min(T_MIN)).unwrap();
        assert!((from_file.t - compiled.t).abs() < 1e-5);
    }

    #[test]
    fn test_materials_are_shared() {
        let description = SceneDescription::from_json(
            r#"{
                "materials": {
                    "chrome": { "type": "metal", "albedo": [0.9, 0.9, 0.9] }
                },
                "spheres": [
                    { "center": [0, 0, -1], "radius": 0.5, "material": "chrome" },
                    { "center": [2, 0, -1], "radius": 0.5, "material": "chrome" }
                ]
            }"#,
        )
        .unwrap();

        let scene = description.build().unwrap();
        assert_eq!(scene.world.len(), 2);

        let toward = |x: f32| Ray::new(Vec3::new(x, 0.0, 1.0), Vec3::NEG_Z);
        let left = scene.world.hit(&toward(0.0), Interval::from_min(T_MIN)).unwrap();
        let right = scene.world.hit(&toward(2.0), Interval::from_min(T_MIN)).unwrap();
        assert!(std::ptr::eq(
            left.material as *const dyn Material as *const (),
            right.material as *const dyn Material as *const (),
        ));
        assert_eq!(scene.camera, CameraSettings::default());
    }

    #[test]
    fn test_metal_fuzz_defaults_to_zero() {
        let data: MaterialData =
            serde_json::from_str(r#"{ "type": "metal", "albedo": [1, 1, 1] }"#).unwrap();
        assert!(matches!(data, MaterialData::Metal { fuzz, .. } if fuzz == 0.0));
    }

    #[test]
    fn test_unknown_material_is_rejected() {
        let description = SceneDescription::from_json(
            r#"{ "spheres": [ { "center": [0, 0, -1], "radius": 0.5, "material": "missing" } ] }"#,
        )
        .unwrap();

        match description.build() {
            Err(SceneError::UnknownMaterial { index, name }) => {
                assert_eq!(index, 0);
                assert_eq!(name, "missing");
            }
            other => panic!("expected unknown material error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_bad_radius_and_ior_are_rejected() {
        let radius = SceneDescription::from_json(
            r#"{
                "materials": { "m": { "type": "lambertian", "albedo": [1, 0, 0] } },
                "spheres": [ { "center": [0, 0, 0], "radius": 0.0, "material": "m" } ]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            radius.build(),
            Err(SceneError::InvalidRadius { index: 0, .. })
        ));

        let ior = SceneDescription::from_json(
            r#"{ "materials": { "glass": { "type": "dielectric", "ior": -1.0 } } }"#,
        )
        .unwrap();
        assert!(matches!(ior.build(), Err(SceneError::InvalidIor(name)) if name == "glass"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SceneDescription::from_json("{ \"spheres\": 3 }"),
            Err(SceneError::Json(_))
        ));
        assert!(matches!(
            SceneDescription::from_json(r#"{ "materials": { "x": { "type": "plastic" } } }"#),
            Err(SceneError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SceneDescription::load("/nonexistent/glint/scene.json").unwrap_err();
        assert!(matches!(err, SceneError::Io { .. }));
    }

    #[test]
    fn test_cover_scene_is_seeded() {
        let first = Builtin::Cover.build(&mut StdRng::seed_from_u64(3));
        let second = Builtin::Cover.build(&mut StdRng::seed_from_u64(3));

        assert_eq!(first.world.len(), second.world.len());
        // Ground, three feature spheres, and most of the 22x22 grid
        assert!(first.world.len() > 400);
        assert!(first.camera.build().is_ok());
    }

    #[test]
    fn test_quickstart_camera_is_valid() {
        let scene = Builtin::Quickstart.build(&mut StdRng::seed_from_u64(0));
        let camera = scene.camera.build().unwrap();
        assert_eq!(camera.image_height(), 225);
    }
}
