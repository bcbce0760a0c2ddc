//! Per-frame lighting state machine

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::lighting::backend::LightingBackend;
use crate::lighting::directions::DirectionPool;
use crate::lighting::grid::GridConfig;
use crate::lighting::state::{Barrier, FrameCounter, LightParams, LightingStep, LitFrame, ReadIndex};

/// Drives `RefreshSamples → Dispatch → Barrier → SwapIndex` once per frame.
///
/// Steps may be called one by one or through [`LightingPipeline::run_frame`].
/// Calling a step out of order is an error and leaves the state untouched.
pub struct LightingPipeline {
    grid: GridConfig,
    pool: DirectionPool,
    rng: StdRng,
    read_index: ReadIndex,
    frame: FrameCounter,
    next_step: LightingStep,
}

impl LightingPipeline {
    pub fn new(grid: GridConfig, seed: u64) -> Result<Self> {
        grid.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let pool = DirectionPool::new(grid.direction_count, &mut rng);
        Ok(Self {
            grid,
            pool,
            rng,
            read_index: ReadIndex::ZERO,
            frame: FrameCounter::default(),
            next_step: LightingStep::RefreshSamples,
        })
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn pool(&self) -> &DirectionPool {
        &self.pool
    }

    /// Slot currently holding the authoritative colors
    pub fn read_index(&self) -> ReadIndex {
        self.read_index
    }

    /// Number of the frame that will run next
    pub fn frame_number(&self) -> u32 {
        self.frame.get()
    }

    pub fn next_step(&self) -> LightingStep {
        self.next_step
    }

    /// Parameters for this frame's dispatch
    pub fn params(&self) -> LightParams {
        LightParams {
            frame_number: self.frame.get(),
            read_index: self.read_index.as_u32(),
            chunk_size: self.grid.chunk_size,
            samples_per_frame: self.grid.samples_per_frame,
        }
    }

    fn enter(&self, step: LightingStep) -> Result<()> {
        if self.next_step != step {
            return Err(Error::Pipeline(format!(
                "{:?} requested while {:?} is pending",
                step, self.next_step
            )));
        }
        Ok(())
    }

    /// Draw a fresh direction pool and hand it to the backend
    pub fn refresh_direction_pool<B: LightingBackend>(&mut self, backend: &mut B) -> Result<()> {
        self.enter(LightingStep::RefreshSamples)?;
        self.pool.refresh(&mut self.rng);
        backend.write_directions(&self.pool)?;
        self.next_step = LightingStep::Dispatch;
        Ok(())
    }

    /// Run the light update reading the current slot
    pub fn dispatch<B: LightingBackend>(&mut self, backend: &mut B) -> Result<()> {
        self.enter(LightingStep::Dispatch)?;
        backend.dispatch(&self.params())?;
        self.next_step = LightingStep::Barrier;
        Ok(())
    }

    /// Close the dispatch so its writes are visible to the render pass
    pub fn barrier<B: LightingBackend>(&mut self, backend: &mut B) -> Result<Barrier> {
        self.enter(LightingStep::Barrier)?;
        backend.barrier()?;
        self.next_step = LightingStep::SwapIndex;
        Ok(Barrier::new(self.frame.get()))
    }

    /// Make the freshly written slot current and complete the frame
    pub fn swap_read_index(&mut self) -> Result<ReadIndex> {
        self.enter(LightingStep::SwapIndex)?;
        self.read_index = self.read_index.toggled();
        self.frame.advance();
        self.next_step = LightingStep::RefreshSamples;
        Ok(self.read_index)
    }

    /// Run all four steps for one frame
    pub fn run_frame<B: LightingBackend>(&mut self, backend: &mut B) -> Result<LitFrame> {
        let frame_number = self.frame.get();
        let dispatched = self.read_index;

        self.refresh_direction_pool(backend)?;
        self.dispatch(backend)?;
        let barrier = self.barrier(backend)?;
        let read_index = self.swap_read_index()?;
        debug_assert_eq!(read_index.slot(), dispatched.write_slot());

        log::trace!(
            "Lighting frame {} wrote slot {}",
            frame_number,
            read_index.slot()
        );
        Ok(LitFrame {
            read_index,
            frame_number,
            barrier,
        })
    }
}
