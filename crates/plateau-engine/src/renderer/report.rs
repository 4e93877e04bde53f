use crate::arena::ObjectId;
use crate::frame::SkipReason;
use crate::picking::Cursor;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// Presented, then swap resources were rebuilt.
    Recreated,
    Skipped(SkipReason),
}

/// The object found under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedObject {
    pub id: ObjectId,
    pub name: String,
}

/// A completed pick. `frame` is the frame the ids were drawn in, which lags
/// the current frame by up to the number of frames in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct PickResult {
    pub frame: u64,
    pub cursor: Cursor,
    /// `None` means no selection.
    pub object: Option<PickedObject>,
}

/// What one `run_frame` call did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Number of the frame recorded by this call; `None` when skipped.
    pub frame: Option<u64>,
    pub outcome: FrameOutcome,
    /// Newest completed pick.
    pub pick: Option<PickResult>,
}

impl FrameReport {
    pub fn presented(&self) -> bool {
        matches!(self.outcome, FrameOutcome::Presented | FrameOutcome::Recreated)
    }

    pub fn picked(&self) -> Option<&PickedObject> {
        self.pick.as_ref()?.object.as_ref()
    }
}
