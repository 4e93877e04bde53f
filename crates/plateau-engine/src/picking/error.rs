use thiserror::Error;

use super::ReadbackPhase;
use crate::frame::FrameError;
use crate::image::LayoutError;
use crate::memory::MemoryError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickError {
    #[error("picking: id {0} does not fit in 24 bits")]
    IdOutOfRange(u32),

    #[error("picking: readback slot {0} does not exist")]
    NoSuchSlot(usize),

    #[error("picking: readback slot {slot} cannot go from {from:?} to {to:?}")]
    InvalidTransition {
        slot: usize,
        from: ReadbackPhase,
        to: ReadbackPhase,
    },

    #[error("picking: readback of slot {slot} failed ({reason})")]
    MapFailed { slot: usize, reason: String },

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}
