//! Per-frame lighting state: read index, frame counter and step ordering

use bytemuck::{Pod, Zeroable};

/// Selects which of the two color slots is current
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReadIndex(u32);

impl ReadIndex {
    pub const ZERO: ReadIndex = ReadIndex(0);

    /// Slot the current colors are read from
    pub fn slot(self) -> usize {
        self.0 as usize
    }

    /// Slot the next colors are written to
    pub fn write_slot(self) -> usize {
        1 - self.0 as usize
    }

    pub fn toggled(self) -> ReadIndex {
        ReadIndex(self.0 ^ 1)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Completed-frame counter, wraps at 2³²
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCounter(u32);

impl FrameCounter {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Steps of one lighting frame, executed in declaration order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightingStep {
    RefreshSamples,
    Dispatch,
    Barrier,
    SwapIndex,
}

impl LightingStep {
    /// Step that must run after this one
    pub fn next(self) -> LightingStep {
        match self {
            LightingStep::RefreshSamples => LightingStep::Dispatch,
            LightingStep::Dispatch => LightingStep::Barrier,
            LightingStep::Barrier => LightingStep::SwapIndex,
            LightingStep::SwapIndex => LightingStep::RefreshSamples,
        }
    }
}

/// Proof that the lighting writes of a frame are visible to later passes.
/// Only the lighting pipeline can create one.
#[derive(Debug, PartialEq, Eq)]
pub struct Barrier {
    frame_number: u32,
}

impl Barrier {
    pub(crate) fn new(frame_number: u32) -> Self {
        Self { frame_number }
    }

    /// Frame whose writes this barrier covers
    pub fn frame_number(&self) -> u32 {
        self.frame_number
    }
}

/// Uniform block read by `light_update.wgsl`
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LightParams {
    pub frame_number: u32,
    pub read_index: u32,
    pub chunk_size: u32,
    pub samples_per_frame: u32,
}

impl LightParams {
    pub const GPU_MEMBERS: [(&'static str, usize); 4] = [
        ("frame_number", std::mem::offset_of!(LightParams, frame_number)),
        ("read_index", std::mem::offset_of!(LightParams, read_index)),
        ("chunk_size", std::mem::offset_of!(LightParams, chunk_size)),
        ("samples_per_frame", std::mem::offset_of!(LightParams, samples_per_frame)),
    ];
}

/// Result of one lighting frame, consumed by the render pass
#[derive(Debug)]
pub struct LitFrame {
    /// Slot the render pass reads, the one the dispatch just wrote
    pub read_index: ReadIndex,
    /// Frame the dispatch ran as
    pub frame_number: u32,
    pub barrier: Barrier,
}
