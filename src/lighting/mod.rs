//! Light propagation: direction sampling, the per-frame state machine and
//! the backends that execute it

pub mod grid;
pub mod directions;
pub mod state;
pub mod backend;
pub mod trace;
pub mod cpu;
pub mod pipeline;

pub use grid::{GridConfig, DIRECTION_COUNT, MAX_CHUNK_SIZE, MIN_BLEND, SAMPLES_PER_FRAME, WORKGROUP_SIZE};
pub use directions::{DirectionPool, PackedDirection};
pub use state::{Barrier, FrameCounter, LightParams, LightingStep, LitFrame, ReadIndex};
pub use backend::LightingBackend;
pub use cpu::CpuLighting;
pub use pipeline::LightingPipeline;
