//! Seam between the lighting state machine and whatever executes it

use crate::core::types::Result;
use crate::lighting::directions::DirectionPool;
use crate::lighting::state::LightParams;

/// Executes the three device-facing lighting steps.
///
/// Calls arrive in the order `write_directions`, `dispatch`, `barrier` once
/// per frame. After `barrier` returns, the slot written by `dispatch` must be
/// visible to anything recorded or read afterwards.
pub trait LightingBackend {
    /// Upload this frame's direction pool
    fn write_directions(&mut self, pool: &DirectionPool) -> Result<()>;

    /// Run the light update over every voxel, reading slot
    /// `params.read_index` and writing the other slot
    fn dispatch(&mut self, params: &LightParams) -> Result<()>;

    /// Make the dispatch's writes visible to later passes
    fn barrier(&mut self) -> Result<()>;
}
