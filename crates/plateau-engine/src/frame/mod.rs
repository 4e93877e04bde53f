//! Frames-in-flight scheduling.
//!
//! The scheduler owns N frame slots and drives a [`FrameBackend`] through
//! begin/end of each frame. A slot is only reused once the fence from its
//! previous submission has signaled, which bounds CPU run-ahead to N frames.

mod backend;
mod error;
mod scheduler;
mod slot;

pub use backend::{AcquireStatus, Extent, FrameBackend, PresentStatus};
pub use error::FrameError;
pub use scheduler::{BeginOutcome, EndOutcome, Frame, FrameScheduler, SkipReason};
pub use slot::SlotState;
