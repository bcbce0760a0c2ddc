//! Dispatch grid shared by the host and every WGSL program.
//!
//! [`GridConfig`] is the only place the chunk size, workgroup size and
//! sampling constants are defined. Shaders receive them through
//! [`GridConfig::wgsl_preamble`], so the two sides cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::CHUNK_SIZE;

/// Invocations per workgroup along each axis
pub const WORKGROUP_SIZE: u32 = 4;
/// Entries in the random direction pool
pub const DIRECTION_COUNT: u32 = 256;
/// Rays traced per voxel per frame
pub const SAMPLES_PER_FRAME: u32 = 8;
/// Lower bound on the per-frame blend weight
pub const MIN_BLEND: f32 = 0.02;
/// Largest accepted chunk side, 20 MiB of voxels
pub const MAX_CHUNK_SIZE: u32 = 64;

/// Host-side source of truth for grid and sampling constants
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Voxels per chunk side
    pub chunk_size: u32,
    /// Compute invocations per workgroup side
    pub workgroup_size: u32,
    /// Size of the random direction pool
    pub direction_count: u32,
    /// Rays per voxel per frame
    pub samples_per_frame: u32,
    /// Blend weight floor once the running average has warmed up
    pub min_blend: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            workgroup_size: WORKGROUP_SIZE,
            direction_count: DIRECTION_COUNT,
            samples_per_frame: SAMPLES_PER_FRAME,
            min_blend: MIN_BLEND,
        }
    }
}

impl GridConfig {
    /// Grid with a different chunk size and default everything else
    pub fn with_chunk_size(chunk_size: u32) -> Self {
        Self {
            chunk_size,
            ..Self::default()
        }
    }

    /// Check that workgroups tile the chunk exactly
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.workgroup_size == 0 {
            return Err(Error::Config(
                "chunk_size and workgroup_size must be positive".into(),
            ));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::Config(format!(
                "chunk_size {} exceeds the maximum of {}",
                self.chunk_size, MAX_CHUNK_SIZE
            )));
        }
        if self.chunk_size % self.workgroup_size != 0 {
            return Err(Error::Config(format!(
                "workgroup_size {} does not divide chunk_size {}",
                self.workgroup_size, self.chunk_size
            )));
        }
        if self.workgroup_size.pow(3) > 256 {
            return Err(Error::Config(format!(
                "workgroup of {}³ invocations exceeds the 256 invocation limit",
                self.workgroup_size
            )));
        }
        if self.direction_count == 0 || self.samples_per_frame == 0 {
            return Err(Error::Config(
                "direction_count and samples_per_frame must be positive".into(),
            ));
        }
        if !(self.min_blend > 0.0 && self.min_blend <= 1.0) {
            return Err(Error::Config(format!(
                "min_blend {} must be in (0, 1]",
                self.min_blend
            )));
        }
        Ok(())
    }

    /// Workgroups per axis
    pub fn group_count(&self) -> u32 {
        self.chunk_size / self.workgroup_size
    }

    pub fn voxel_count(&self) -> usize {
        (self.chunk_size as usize).pow(3)
    }

    /// Upper bound on DDA steps for one ray
    pub fn max_steps(&self) -> u32 {
        3 * self.chunk_size
    }

    /// WGSL `const` declarations prepended to every shader program
    pub fn wgsl_preamble(&self) -> String {
        format!(
            "const CHUNK_SIZE: u32 = {}u;\n\
             const WORKGROUP_SIZE: u32 = {}u;\n\
             const DIRECTION_COUNT: u32 = {}u;\n\
             const SAMPLES_PER_FRAME: u32 = {}u;\n\
             const MAX_STEPS: u32 = {}u;\n\
             const MIN_BLEND: f32 = {:?};\n",
            self.chunk_size,
            self.workgroup_size,
            self.direction_count,
            self.samples_per_frame,
            self.max_steps(),
            self.min_blend,
        )
    }
}
