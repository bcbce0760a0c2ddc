//! Voxel data model and scene generation

pub mod voxel;
pub mod chunk;
pub mod scene;

pub use voxel::Voxel;
pub use chunk::{Chunk, CHUNK_SIZE};
pub use scene::{SceneKind, SceneParams};
