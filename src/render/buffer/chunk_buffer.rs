//! GPU storage buffer holding the voxel chunk

use wgpu::util::DeviceExt;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::Chunk;

/// The chunk in device memory. Uploaded once and then owned by the GPU:
/// the lighting pass rewrites the color slots in place.
pub struct ChunkBuffer {
    buffer: wgpu::Buffer,
    size: u32,
}

impl ChunkBuffer {
    /// Upload `chunk`, or fail with `Unsupported` if the device cannot bind it
    pub fn new(device: &wgpu::Device, chunk: &Chunk) -> Result<Self> {
        check_fits(chunk.byte_size(), &device.limits())?;

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("chunk_voxels"),
            contents: chunk.as_bytes(),
            usage: wgpu::BufferUsages::STORAGE,
        });
        log::info!(
            "Uploaded {}³ chunk ({} KB)",
            chunk.size(),
            chunk.byte_size() / 1024
        );
        Ok(Self {
            buffer,
            size: chunk.size(),
        })
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Voxels per chunk side
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// Both the allocation and the whole-buffer storage binding must fit
fn check_fits(bytes: u64, limits: &wgpu::Limits) -> Result<()> {
    let limit = limits
        .max_buffer_size
        .min(limits.max_storage_buffer_binding_size as u64);
    if bytes > limit {
        return Err(Error::Unsupported(format!(
            "chunk needs a {} MiB storage buffer, device allows {} MiB",
            bytes >> 20,
            limit >> 20
        )));
    }
    Ok(())
}
