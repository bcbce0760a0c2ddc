//! GPU uniform buffer for camera data

use bytemuck::{Pod, Zeroable};
use crate::core::camera::Camera;
use crate::lighting::state::LitFrame;

/// Camera uniform data for GPU (must match `CameraUniform` in raymarch.wgsl)
/// WGSL mat3x3 columns and vec3 have 16-byte alignment, so we need explicit padding
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    /// Camera-to-world rotation, column-major, one padding float per column (offset 0)
    pub rotation: [[f32; 4]; 3],
    /// Camera position in chunk space (offset 48)
    pub position: [f32; 3],
    /// Viewport width / height (offset 60)
    pub aspect: f32,
    /// Color slot to shade with (offset 64)
    pub read_index: u32,
    /// Voxels per chunk side (offset 68)
    pub chunk_size: u32,
    /// Padding to 80 bytes
    pub _pad: [u32; 2],
}

impl CameraUniform {
    pub const GPU_MEMBERS: [(&'static str, usize); 5] = [
        ("rotation", std::mem::offset_of!(CameraUniform, rotation)),
        ("position", std::mem::offset_of!(CameraUniform, position)),
        ("aspect", std::mem::offset_of!(CameraUniform, aspect)),
        ("read_index", std::mem::offset_of!(CameraUniform, read_index)),
        ("chunk_size", std::mem::offset_of!(CameraUniform, chunk_size)),
    ];

    pub fn new(camera: &Camera, read_index: u32, chunk_size: u32) -> Self {
        let m = camera.rotation_matrix();
        Self {
            rotation: [
                m.x_axis.extend(0.0).to_array(),
                m.y_axis.extend(0.0).to_array(),
                m.z_axis.extend(0.0).to_array(),
            ],
            position: camera.position.to_array(),
            aspect: camera.aspect_ratio(),
            read_index,
            chunk_size,
            _pad: [0; 2],
        }
    }
}

/// GPU buffer for camera uniform
pub struct CameraBuffer {
    buffer: wgpu::Buffer,
    chunk_size: u32,
}

impl CameraBuffer {
    /// Create new camera buffer
    pub fn new(device: &wgpu::Device, chunk_size: u32) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_uniform"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self { buffer, chunk_size }
    }

    /// Upload the camera with the slot the lighting pass just wrote
    pub fn update(&self, queue: &wgpu::Queue, camera: &Camera, frame: &LitFrame) {
        let uniform = CameraUniform::new(camera, frame.read_index.as_u32(), self.chunk_size);
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Get the raw buffer
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}
