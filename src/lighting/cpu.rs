//! CPU reference backend for the light update.
//!
//! Runs the same per-voxel contract as `shaders/light_update.wgsl`, spread
//! across the rayon pool. Used for headless runs, tests and benchmarks.

use glam::{UVec3, Vec3};
use rayon::prelude::*;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::lighting::backend::LightingBackend;
use crate::lighting::directions::{DirectionPool, sample_direction_index};
use crate::lighting::grid::GridConfig;
use crate::lighting::state::LightParams;
use crate::lighting::trace::{RayHit, march};
use crate::voxel::{Chunk, Voxel};

/// Lighting backend that owns the chunk in host memory
pub struct CpuLighting {
    chunk: Chunk,
    grid: GridConfig,
    directions: Vec<Vec3>,
    dispatches: u64,
}

impl CpuLighting {
    pub fn new(chunk: Chunk, grid: GridConfig) -> Result<Self> {
        grid.validate()?;
        if chunk.size() != grid.chunk_size {
            return Err(Error::Layout(format!(
                "chunk is {}³ but the grid expects {}³",
                chunk.size(),
                grid.chunk_size
            )));
        }
        Ok(Self {
            chunk,
            grid,
            directions: Vec::new(),
            dispatches: 0,
        })
    }

    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    /// Number of dispatches run so far
    pub fn dispatches(&self) -> u64 {
        self.dispatches
    }
}

impl LightingBackend for CpuLighting {
    fn write_directions(&mut self, pool: &DirectionPool) -> Result<()> {
        if pool.len() != self.grid.direction_count as usize {
            return Err(Error::Layout(format!(
                "direction pool has {} entries, expected {}",
                pool.len(),
                self.grid.direction_count
            )));
        }
        self.directions.clear();
        self.directions.extend((0..pool.len()).map(|i| pool.direction(i)));
        Ok(())
    }

    fn dispatch(&mut self, params: &LightParams) -> Result<()> {
        if self.directions.is_empty() {
            return Err(Error::Pipeline("dispatch before directions were written".into()));
        }

        let read = params.read_index as usize;
        let voxels = self.chunk.voxels();
        let size = self.chunk.size();
        let grid = &self.grid;
        let directions = &self.directions;

        // Read slot `read` everywhere, commit to the other slot afterwards
        let updated: Vec<Vec3> = (0..voxels.len())
            .into_par_iter()
            .map(|index| light_voxel(voxels, size, index, directions, params, grid))
            .collect();

        let write = 1 - read;
        for (voxel, color) in self.chunk.voxels_mut().iter_mut().zip(updated) {
            voxel.set_color(write, color);
        }
        self.dispatches += 1;
        Ok(())
    }

    fn barrier(&mut self) -> Result<()> {
        // Writes are committed synchronously by `dispatch`
        Ok(())
    }
}

/// New color for the voxel at `index`, given current-slot colors everywhere
pub fn light_voxel(
    voxels: &[Voxel],
    size: u32,
    index: usize,
    directions: &[Vec3],
    params: &LightParams,
    grid: &GridConfig,
) -> Vec3 {
    let read = params.read_index as usize;
    let voxel = &voxels[index];
    let current = voxel.color(read);
    if !voxel.exists() {
        return current;
    }

    let n = size as usize;
    let start = UVec3::new(
        (index / (n * n)) as u32,
        ((index / n) % n) as u32,
        (index % n) as u32,
    );

    let mut sum = Vec3::ZERO;
    let mut accepted = 0u32;
    for k in 0..params.samples_per_frame {
        let slot = sample_direction_index(
            index as u32,
            params.frame_number,
            k,
            params.samples_per_frame,
            directions.len() as u32,
        );
        match march(voxels, size, start, directions[slot as usize], grid.max_steps()) {
            // Points straight into the neighbouring solid
            RayHit::Hit { steps: 0, .. } => continue,
            RayHit::Hit { index: hit, .. } => {
                sum += voxels[hit].emission() + voxels[hit].color(read);
            }
            RayHit::Escaped => {}
        }
        accepted += 1;
    }

    if accepted == 0 {
        return current;
    }
    let gathered = voxel.diffuse() * (sum / accepted as f32);
    let blend = (1.0 / (params.frame_number as f32 + 1.0)).max(grid.min_blend);
    current.lerp(gathered, blend)
}
