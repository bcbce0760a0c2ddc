//! Per-frame pool of random unit directions for the lighting pass

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use half::f16;
use rand::Rng;

/// Unit vector packed as half floats: `xy = x | y << 16`, `z` in the low half.
/// Decoded bit by bit in `light_update.wgsl`, which needs no f16 shader support.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct PackedDirection {
    pub xy: u32,
    pub z: u32,
}

impl PackedDirection {
    pub fn pack(dir: Vec3) -> Self {
        let bits = |c: f32| f16::from_f32(c).to_bits() as u32;
        Self {
            xy: bits(dir.x) | (bits(dir.y) << 16),
            z: bits(dir.z),
        }
    }

    pub fn unpack(self) -> Vec3 {
        let half = |bits: u32| f16::from_bits((bits & 0xffff) as u16).to_f32();
        Vec3::new(half(self.xy), half(self.xy >> 16), half(self.z))
    }
}

/// Random directions shared by every voxel for one frame
pub struct DirectionPool {
    entries: Vec<PackedDirection>,
}

impl DirectionPool {
    /// Pool of `count` directions, filled immediately
    pub fn new<R: Rng>(count: u32, rng: &mut R) -> Self {
        let mut pool = Self {
            entries: vec![PackedDirection::default(); count as usize],
        };
        pool.refresh(rng);
        pool
    }

    /// Replace every entry with a fresh independent draw
    pub fn refresh<R: Rng>(&mut self, rng: &mut R) {
        for entry in &mut self.entries {
            *entry = PackedDirection::pack(random_unit_vector(rng));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PackedDirection] {
        &self.entries
    }

    /// Decoded direction at `index`
    pub fn direction(&self, index: usize) -> Vec3 {
        self.entries[index].unpack()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.entries)
    }
}

/// Uniform direction on the unit sphere from three Box–Muller normals
pub fn random_unit_vector<R: Rng>(rng: &mut R) -> Vec3 {
    loop {
        let (x, y) = gaussian_pair(rng);
        let (z, _) = gaussian_pair(rng);
        let v = Vec3::new(x, y, z);
        let len = v.length();
        if len > 1e-4 && len.is_finite() {
            return v / len;
        }
    }
}

fn gaussian_pair<R: Rng>(rng: &mut R) -> (f32, f32) {
    // (0, 1] so the log stays finite
    let u1 = 1.0 - rng.random::<f32>();
    let u2 = rng.random::<f32>();
    let r = (-2.0 * u1.ln()).sqrt();
    let theta = std::f32::consts::TAU * u2;
    (r * theta.cos(), r * theta.sin())
}

/// PCG hash, bit-identical to `pcg_hash` in `shaders/common.wgsl`
pub fn pcg_hash(value: u32) -> u32 {
    let state = value.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277_803_737);
    (word >> 22) ^ word
}

/// Pool index of sample `k` for a voxel in a given frame
pub fn sample_direction_index(
    voxel_index: u32,
    frame: u32,
    k: u32,
    samples_per_frame: u32,
    direction_count: u32,
) -> u32 {
    pcg_hash(voxel_index)
        .wrapping_add(frame.wrapping_mul(samples_per_frame))
        .wrapping_add(k)
        % direction_count
}
