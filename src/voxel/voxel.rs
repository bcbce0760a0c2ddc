//! Voxel data type shared with the GPU

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Voxel flags
pub mod flags {
    /// The voxel is solid. Voxels without it are empty space.
    pub const EXISTS: u32 = 1 << 0;
}

/// Single voxel - exactly 80 bytes
///
/// Mirrors `struct Voxel` in `shaders/common.wgsl`. WGSL gives every
/// `vec3<f32>` a 16-byte slot, so each RGB triple carries one padding float.
/// Field order and padding must not change without changing the shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Voxel {
    /// Emitted radiance (linear RGB), offset 0
    pub emission: [f32; 3],
    pub _pad0: f32,
    /// Diffuse reflectance in [0, 1], offset 16
    pub diffuse: [f32; 3],
    pub _pad1: f32,
    /// Double-buffered accumulated light, offsets 32 and 48.
    /// The slot in use is chosen by the chunk-wide read index.
    pub color: [[f32; 4]; 2],
    /// Flags (exists), offset 64
    pub flags: u32,
    pub _pad2: [u32; 3],
}

impl Voxel {
    /// Offsets of the fields `struct Voxel` declares, checked against the
    /// compiled shaders before any pipeline is built
    pub const GPU_MEMBERS: [(&'static str, usize); 4] = [
        ("emission", std::mem::offset_of!(Voxel, emission)),
        ("diffuse", std::mem::offset_of!(Voxel, diffuse)),
        ("color", std::mem::offset_of!(Voxel, color)),
        ("flags", std::mem::offset_of!(Voxel, flags)),
    ];

    /// Empty space
    pub const AIR: Voxel = Voxel {
        emission: [0.0; 3],
        _pad0: 0.0,
        diffuse: [0.0; 3],
        _pad1: 0.0,
        color: [[0.0; 4]; 2],
        flags: 0,
        _pad2: [0; 3],
    };

    /// Solid, non-emissive voxel with the given reflectance
    pub fn solid(diffuse: Vec3) -> Self {
        Self {
            diffuse: diffuse.to_array(),
            flags: flags::EXISTS,
            ..Self::AIR
        }
    }

    /// Solid light source that reflects nothing
    pub fn light(emission: Vec3) -> Self {
        Self {
            emission: emission.to_array(),
            flags: flags::EXISTS,
            ..Self::AIR
        }
    }

    /// Copy of this voxel with the given emission
    pub fn with_emission(self, emission: Vec3) -> Self {
        Self {
            emission: emission.to_array(),
            ..self
        }
    }

    /// Check if the voxel is solid
    pub fn exists(&self) -> bool {
        self.flags & flags::EXISTS != 0
    }

    /// Check if the voxel emits any light
    pub fn is_emissive(&self) -> bool {
        self.exists() && self.emission.iter().any(|c| *c > 0.0)
    }

    pub fn emission(&self) -> Vec3 {
        Vec3::from(self.emission)
    }

    pub fn diffuse(&self) -> Vec3 {
        Vec3::from(self.diffuse)
    }

    /// Accumulated light stored in `slot` (0 or 1)
    pub fn color(&self, slot: usize) -> Vec3 {
        Vec3::from_slice(&self.color[slot][..3])
    }

    /// Store accumulated light into `slot` (0 or 1)
    pub fn set_color(&mut self, slot: usize, color: Vec3) {
        self.color[slot] = color.extend(0.0).to_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, offset_of, size_of};

    #[test]
    fn test_gpu_layout() {
        assert_eq!(size_of::<Voxel>(), 80);
        assert_eq!(align_of::<Voxel>(), 4);
        assert_eq!(offset_of!(Voxel, emission), 0);
        assert_eq!(offset_of!(Voxel, diffuse), 16);
        assert_eq!(offset_of!(Voxel, color), 32);
        assert_eq!(offset_of!(Voxel, flags), 64);
    }

    #[test]
    fn test_air_is_zeroed() {
        assert_eq!(Voxel::AIR, Voxel::zeroed());
        assert!(!Voxel::AIR.exists());
        assert!(!Voxel::AIR.with_emission(Vec3::ONE).is_emissive());
    }

    #[test]
    fn test_constructors() {
        let wall = Voxel::solid(Vec3::new(1.0, 0.0, 0.0));
        assert!(wall.exists());
        assert!(!wall.is_emissive());
        assert_eq!(wall.diffuse(), Vec3::X);

        let lamp = Voxel::light(Vec3::splat(5.0));
        assert!(lamp.is_emissive());
        assert_eq!(lamp.diffuse(), Vec3::ZERO);
    }

    #[test]
    fn test_color_slots_are_independent() {
        let mut voxel = Voxel::solid(Vec3::ONE);
        voxel.set_color(1, Vec3::new(0.25, 0.5, 0.75));
        assert_eq!(voxel.color(0), Vec3::ZERO);
        assert_eq!(voxel.color(1), Vec3::new(0.25, 0.5, 0.75));
        // padding lane stays zero
        assert_eq!(voxel.color[1][3], 0.0);
    }
}
