//! Procedural scenes that populate a chunk

use std::fmt;
use std::str::FromStr;

use glam::{IVec3, UVec3, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::voxel::voxel::Voxel;

/// Per-channel probability that a sphere voxel becomes emissive
pub const DEFAULT_EMISSIVE_RATE: f32 = 0.03;

/// The built-in scenes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    /// Hollow sphere whose shell is speckled with random emitters
    InvertedSphere,
    /// Room with walls on every chunk face and a spherical light near the ceiling
    SimpleRoom,
    /// Red and green side walls, ceiling light, two solid blocks
    #[default]
    CornellBox,
}

/// Tunables that scenes read while generating
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneParams {
    pub emissive_rate: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            emissive_rate: DEFAULT_EMISSIVE_RATE,
        }
    }
}

impl SceneKind {
    pub const ALL: [SceneKind; 3] = [
        SceneKind::InvertedSphere,
        SceneKind::SimpleRoom,
        SceneKind::CornellBox,
    ];

    /// Voxel at `point` in a chunk of side `size`
    pub fn voxel_at<R: Rng>(
        self,
        point: UVec3,
        size: u32,
        params: &SceneParams,
        rng: &mut R,
    ) -> Voxel {
        match self {
            SceneKind::InvertedSphere => inverted_sphere(point, size, params, rng),
            SceneKind::SimpleRoom => simple_room(point, size),
            SceneKind::CornellBox => cornell_box(point, size),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SceneKind::InvertedSphere => "inverted_sphere",
            SceneKind::SimpleRoom => "simple_room",
            SceneKind::CornellBox => "cornell_box",
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SceneKind::ALL
            .into_iter()
            .find(|scene| scene.name() == s)
            .ok_or_else(|| Error::Config(format!("unknown scene '{s}'")))
    }
}

fn inverted_sphere<R: Rng>(point: UVec3, size: u32, params: &SceneParams, rng: &mut R) -> Voxel {
    let center = Vec3::splat(size as f32 / 2.0);
    let radius = size as f32 / 2.0 - 1.0;
    if point.as_vec3().distance(center) <= radius {
        return Voxel::AIR;
    }

    let rate = params.emissive_rate.clamp(0.0, 1.0) as f64;
    let mut channel = || if rng.random_bool(rate) { 1.0 } else { 0.0 };
    let emission = Vec3::new(channel(), channel(), channel());
    Voxel::solid(Vec3::ONE).with_emission(emission)
}

fn simple_room(point: UVec3, size: u32) -> Voxel {
    let max = size - 1;
    if point.min_element() == 0 || point.max_element() == max {
        return Voxel::solid(Vec3::ONE);
    }

    let n = size as f32;
    let light_position = Vec3::splat(n / 2.0) + Vec3::new(0.0, n / 4.0, 0.0);
    let light_radius = n / 8.0;
    if point.as_vec3().distance(light_position) < light_radius {
        return Voxel::light(Vec3::new(1.0, 0.9, 0.7));
    }
    Voxel::AIR
}

fn cornell_box(point: UVec3, size: u32) -> Voxel {
    let n = size;
    let max = n - 1;
    let p = point.as_ivec3();
    let half = (n / 2) as i32;
    let light_half_width = (n / 8) as i32;

    if point.x == 0 {
        return Voxel::solid(Vec3::new(1.0, 0.0, 0.0));
    }
    if point.x == max {
        return Voxel::solid(Vec3::new(0.0, 1.0, 0.0));
    }
    if point.y == max
        && (p.x - half).abs() < light_half_width
        && (p.z - half).abs() < light_half_width
    {
        return Voxel::light(Vec3::splat(5.0));
    }
    if point.y == 0 || point.z == 0 || point.y == max || point.z == max {
        return Voxel::solid(Vec3::ONE);
    }

    let block1_min = UVec3::new(n / 4, 1, n / 6);
    let block1_max = block1_min + UVec3::new(n / 6, n / 2, n / 5);
    let block2_min = UVec3::new(n - n / 2, 1, n / 3);
    let block2_max = block2_min + UVec3::new(n / 5, n / 4, n / 5);
    if in_box(p, block1_min, block1_max) || in_box(p, block2_min, block2_max) {
        return Voxel::solid(Vec3::splat(0.9));
    }
    Voxel::AIR
}

/// Inclusive box test
fn in_box(p: IVec3, min: UVec3, max: UVec3) -> bool {
    p.cmpge(min.as_ivec3()).all() && p.cmple(max.as_ivec3()).all()
}
