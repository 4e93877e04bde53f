use std::time::Duration;

use thiserror::Error;

use super::SlotState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame scheduler: fence not signaled within {0:?}")]
    Timeout(Duration),

    #[error("frame scheduler: device lost ({0})")]
    DeviceLost(String),

    #[error("frame scheduler: out of memory")]
    OutOfMemory,

    #[error("frame scheduler: slot {slot} cannot go from {from:?} to {to:?}")]
    InvalidTransition {
        slot: usize,
        from: SlotState,
        to: SlotState,
    },

    #[error("frame scheduler: frame belongs to slot {got}, current slot is {expected}")]
    ForeignFrame { expected: usize, got: usize },
}
