use super::FrameError;

/// Lifecycle of a frame slot.
///
/// `Idle → Acquiring → Recording → Submitted → Presenting → Idle`. Acquisition
/// may also fall back to `Idle` when the frame is skipped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SlotState {
    Idle,
    Acquiring,
    Recording,
    Submitted,
    Presenting,
}

impl SlotState {
    pub fn can_become(self, next: SlotState) -> bool {
        use SlotState::*;
        matches!(
            (self, next),
            (Idle, Acquiring)
                | (Acquiring, Recording)
                | (Acquiring, Idle)
                | (Recording, Submitted)
                | (Recording, Idle)
                | (Submitted, Presenting)
                | (Presenting, Idle)
        )
    }
}

/// Per-slot bookkeeping: state and the fence of the last submission.
#[derive(Debug)]
pub(crate) struct FrameSlot<F> {
    pub(crate) state: SlotState,
    pub(crate) fence: Option<F>,
}

impl<F> FrameSlot<F> {
    pub(crate) fn new() -> Self {
        Self {
            state: SlotState::Idle,
            fence: None,
        }
    }

    pub(crate) fn transition(&mut self, index: usize, next: SlotState) -> Result<(), FrameError> {
        if !self.state.can_become(next) {
            return Err(FrameError::InvalidTransition {
                slot: index,
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}
