//! Render pipelines

pub mod lighting;
pub mod raymarch;

pub use lighting::GpuLighting;
pub use raymarch::RaymarchPipeline;
