//! Voxel-grid DDA ray march, mirrored by `march` in `shaders/common.wgsl`

use glam::{IVec3, UVec3, Vec3};

use crate::voxel::Voxel;

/// Outcome of marching one ray through the chunk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RayHit {
    /// Left the chunk or ran out of steps
    Escaped,
    /// Entered an existing voxel
    Hit {
        /// Flat index of the voxel hit
        index: usize,
        /// Cells stepped before the hit, 0 for the first cell entered
        steps: u32,
    },
}

/// March from the center of `start` along `dir`.
///
/// `voxels` is the flat x-major grid of side `size`. The starting cell
/// itself is never reported as a hit.
pub fn march(voxels: &[Voxel], size: u32, start: UVec3, dir: Vec3, max_steps: u32) -> RayHit {
    let n = size as i32;
    let mut cell = start.as_ivec3();
    let step = IVec3::new(
        if dir.x >= 0.0 { 1 } else { -1 },
        if dir.y >= 0.0 { 1 } else { -1 },
        if dir.z >= 0.0 { 1 } else { -1 },
    );
    let abs_dir = dir.abs().max(Vec3::splat(1e-6));
    let t_delta = Vec3::ONE / abs_dir;
    // Starting from a cell center, every boundary is half a cell away
    let mut t_max = Vec3::splat(0.5) / abs_dir;

    for i in 0..max_steps {
        if t_max.x < t_max.y && t_max.x < t_max.z {
            cell.x += step.x;
            t_max.x += t_delta.x;
        } else if t_max.y < t_max.z {
            cell.y += step.y;
            t_max.y += t_delta.y;
        } else {
            cell.z += step.z;
            t_max.z += t_delta.z;
        }

        if cell.min_element() < 0 || cell.max_element() >= n {
            return RayHit::Escaped;
        }
        let index = ((cell.x * n + cell.y) * n + cell.z) as usize;
        if voxels[index].exists() {
            return RayHit::Hit { index, steps: i };
        }
    }
    RayHit::Escaped
}
