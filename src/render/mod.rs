//! Rendering system and GPU interfaces

pub mod context;
pub mod shader;
pub mod buffer;
pub mod pipeline;
pub mod renderer;
pub mod window;

pub use renderer::VoxelRenderer;
pub use shader::{ShaderLibrary, ShaderProgram};
