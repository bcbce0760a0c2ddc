//! voxgi - real-time voxel renderer with GPU light propagation

pub mod core;
pub mod voxel;
pub mod lighting;
pub mod render;
pub mod frame;
