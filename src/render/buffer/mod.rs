//! GPU buffer management

pub mod chunk_buffer;
pub mod camera_buffer;

pub use chunk_buffer::ChunkBuffer;
pub use camera_buffer::{CameraBuffer, CameraUniform};
