//! Dense cubic voxel grid shared with the GPU

use glam::{IVec3, UVec3};
use rand::Rng;

use crate::voxel::scene::{SceneKind, SceneParams};
use crate::voxel::voxel::Voxel;

/// Default number of voxels per chunk side
pub const CHUNK_SIZE: u32 = 32;

/// A cube of `size³` voxels stored flat in x-major order, matching
/// `voxel_index` in `shaders/common.wgsl`
pub struct Chunk {
    size: u32,
    voxels: Vec<Voxel>,
}

impl Chunk {
    /// Create a chunk filled with air
    pub fn new(size: u32) -> Self {
        assert!(size > 0, "chunk size must be positive");
        Self {
            size,
            voxels: vec![Voxel::AIR; (size as usize).pow(3)],
        }
    }

    /// Evaluate `scene` at every coordinate in `[0, size)³`
    pub fn generate<R: Rng>(size: u32, scene: SceneKind, params: &SceneParams, rng: &mut R) -> Self {
        let mut chunk = Self::new(size);
        for x in 0..size {
            for y in 0..size {
                for z in 0..size {
                    let point = UVec3::new(x, y, z);
                    let index = chunk.index(point);
                    chunk.voxels[index] = scene.voxel_at(point, size, params, rng);
                }
            }
        }
        log::info!(
            "Generated {} scene: {}³ voxels, {} solid",
            scene,
            size,
            chunk.existing_count()
        );
        chunk
    }

    /// Voxels per side
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Total voxel count
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Flat index of an in-bounds coordinate
    pub fn index(&self, point: UVec3) -> usize {
        debug_assert!(point.max_element() < self.size);
        let n = self.size as usize;
        (point.x as usize * n + point.y as usize) * n + point.z as usize
    }

    /// Coordinate of a flat index
    pub fn coord(&self, index: usize) -> UVec3 {
        let n = self.size as usize;
        UVec3::new((index / (n * n)) as u32, ((index / n) % n) as u32, (index % n) as u32)
    }

    /// Check whether a signed coordinate lies inside the chunk
    pub fn contains(&self, cell: IVec3) -> bool {
        cell.min_element() >= 0 && cell.max_element() < self.size as i32
    }

    pub fn get(&self, point: UVec3) -> Option<&Voxel> {
        if point.max_element() < self.size {
            Some(&self.voxels[self.index(point)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, point: UVec3) -> Option<&mut Voxel> {
        if point.max_element() < self.size {
            let index = self.index(point);
            Some(&mut self.voxels[index])
        } else {
            None
        }
    }

    /// Voxel at a signed coordinate, `None` outside the chunk
    pub fn get_cell(&self, cell: IVec3) -> Option<&Voxel> {
        if self.contains(cell) {
            self.get(cell.as_uvec3())
        } else {
            None
        }
    }

    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    pub fn voxels_mut(&mut self) -> &mut [Voxel] {
        &mut self.voxels
    }

    /// Raw bytes for the one-time GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.voxels)
    }

    /// Size of the GPU buffer in bytes
    pub fn byte_size(&self) -> u64 {
        std::mem::size_of_val(self.voxels.as_slice()) as u64
    }

    /// Number of solid voxels
    pub fn existing_count(&self) -> usize {
        self.voxels.iter().filter(|v| v.exists()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generate(scene: SceneKind, seed: u64) -> Chunk {
        let mut rng = StdRng::seed_from_u64(seed);
        Chunk::generate(CHUNK_SIZE, scene, &SceneParams::default(), &mut rng)
    }

    #[test]
    fn test_index_roundtrip() {
        let chunk = Chunk::new(8);
        for index in [0, 1, 7, 8, 63, 64, 511] {
            assert_eq!(chunk.index(chunk.coord(index)), index);
        }
        // x-major: z is the fastest axis
        assert_eq!(chunk.index(UVec3::new(0, 0, 1)), 1);
        assert_eq!(chunk.index(UVec3::new(1, 0, 0)), 64);
    }

    #[test]
    fn test_bounds() {
        let chunk = Chunk::new(4);
        assert!(chunk.get(UVec3::new(3, 3, 3)).is_some());
        assert!(chunk.get(UVec3::new(4, 0, 0)).is_none());
        assert!(chunk.get_cell(IVec3::new(-1, 0, 0)).is_none());
        assert_eq!(chunk.byte_size(), 64 * 80);
        assert_eq!(chunk.as_bytes().len(), 64 * 80);
    }

    #[test]
    fn test_walled_scenes_have_solid_boundaries() {
        for scene in [SceneKind::SimpleRoom, SceneKind::CornellBox] {
            let chunk = generate(scene, 7);
            let max = CHUNK_SIZE - 1;
            for index in 0..chunk.len() {
                let p = chunk.coord(index);
                if p.min_element() == 0 || p.max_element() == max {
                    assert!(chunk.voxels()[index].exists(), "{scene}: {p} is not a wall");
                }
            }
        }
    }

    #[test]
    fn test_geometry_is_deterministic() {
        for scene in SceneKind::ALL {
            let a = generate(scene, 1);
            let b = generate(scene, 2);
            for (va, vb) in a.voxels().iter().zip(b.voxels()) {
                assert_eq!(va.flags, vb.flags);
                assert_eq!(va.diffuse, vb.diffuse);
            }
        }
    }

    #[test]
    fn test_emissive_speckle_rate() {
        let rate = 0.03;
        let mut rng = StdRng::seed_from_u64(99);
        let chunk = Chunk::generate(
            CHUNK_SIZE,
            SceneKind::InvertedSphere,
            &SceneParams { emissive_rate: rate },
            &mut rng,
        );

        let solid: Vec<_> = chunk.voxels().iter().filter(|v| v.exists()).collect();
        assert!(!solid.is_empty());
        for channel in 0..3 {
            let lit = solid.iter().filter(|v| v.emission[channel] > 0.0).count();
            let observed = lit as f32 / solid.len() as f32;
            assert!((observed - rate).abs() < 0.01, "channel {channel}: {observed}");
        }
        assert!(chunk.voxels().iter().filter(|v| !v.exists()).all(|v| !v.is_emissive()));
    }

    #[test]
    fn test_colors_start_dark() {
        let chunk = generate(SceneKind::CornellBox, 3);
        assert!(chunk.voxels().iter().all(|v| v.color == [[0.0; 4]; 2]));
    }
}
