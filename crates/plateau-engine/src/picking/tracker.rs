//! Readback bookkeeping, kept apart from the buffers so it can be driven
//! without a device.

use super::{Cursor, PickError};

/// Where one slot's readback is.
///
/// `Idle → Recorded → Mapping → Mapped → Idle`; a recorded copy that is never
/// submitted goes straight back to `Idle`, as does a failed mapping.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadbackPhase {
    Idle,
    /// Copy recorded, not yet submitted.
    Recorded,
    /// Submitted; waiting for the map callback.
    Mapping,
    /// Mapped and decoded; stays mapped until the slot is reused.
    Mapped,
}

/// One decoded picking result.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickSample {
    /// Frame the id image was drawn in.
    pub frame: u64,
    pub cursor: Cursor,
    /// Raw value under the cursor; `None` when the cursor was outside the image.
    pub value: Option<u32>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Pending {
    frame: u64,
    cursor: Cursor,
}

#[derive(Debug)]
pub struct ReadbackTracker {
    phases: Vec<ReadbackPhase>,
    pending: Vec<Option<Pending>>,
    latest: Option<PickSample>,
    /// Slot still holding the image behind `latest`.
    latest_slot: Option<usize>,
    /// Samples drawn before this frame are dropped on arrival.
    accept_from: u64,
    last_recorded: u64,
}

impl ReadbackTracker {
    pub fn new(slots: usize) -> Self {
        Self {
            phases: vec![ReadbackPhase::Idle; slots],
            pending: vec![None; slots],
            latest: None,
            latest_slot: None,
            accept_from: 0,
            last_recorded: 0,
        }
    }

    pub fn phase(&self, slot: usize) -> Option<ReadbackPhase> {
        self.phases.get(slot).copied()
    }

    /// Newest sample accepted so far.
    #[inline]
    pub fn latest(&self) -> Option<PickSample> {
        self.latest
    }

    /// Slot whose mapped image produced [`Self::latest`], while it is still mapped.
    #[inline]
    pub fn latest_slot(&self) -> Option<usize> {
        self.latest_slot
    }

    /// Whether any readback is recorded or in flight.
    pub fn has_pending(&self) -> bool {
        self.phases
            .iter()
            .any(|p| matches!(p, ReadbackPhase::Recorded | ReadbackPhase::Mapping))
    }

    /// Puts a finished slot back to `Idle`. Returns whether it was mapped, in
    /// which case the caller unmaps its buffer.
    pub fn recycle(&mut self, slot: usize) -> Result<bool, PickError> {
        let was_mapped = match self.phase_of(slot)? {
            ReadbackPhase::Idle => false,
            ReadbackPhase::Mapped => true,
            from => return Err(transition(slot, from, ReadbackPhase::Idle)),
        };
        self.set_idle(slot);
        Ok(was_mapped)
    }

    pub fn record(&mut self, slot: usize, frame: u64, cursor: Cursor) -> Result<(), PickError> {
        let from = self.phase_of(slot)?;
        if from != ReadbackPhase::Idle {
            return Err(transition(slot, from, ReadbackPhase::Recorded));
        }
        self.phases[slot] = ReadbackPhase::Recorded;
        self.pending[slot] = Some(Pending { frame, cursor });
        self.last_recorded = self.last_recorded.max(frame);
        Ok(())
    }

    /// Drops a recorded copy that will never be submitted.
    pub fn cancel(&mut self, slot: usize) {
        if self.phase(slot) == Some(ReadbackPhase::Recorded) {
            self.set_idle(slot);
        }
    }

    /// Moves a recorded slot to `Mapping`. Returns false when the slot had
    /// nothing recorded this frame.
    pub fn submitted(&mut self, slot: usize) -> bool {
        if self.phase(slot) != Some(ReadbackPhase::Recorded) {
            return false;
        }
        self.phases[slot] = ReadbackPhase::Mapping;
        true
    }

    /// Completes a mapping. `decode` reads the value under the recorded cursor.
    ///
    /// Returns the sample when it was accepted; samples older than the last
    /// [`Self::invalidate`] are dropped.
    pub fn finished(
        &mut self,
        slot: usize,
        decode: impl FnOnce(Cursor) -> Option<u32>,
    ) -> Result<Option<PickSample>, PickError> {
        let from = self.phase_of(slot)?;
        if from != ReadbackPhase::Mapping {
            return Err(transition(slot, from, ReadbackPhase::Mapped));
        }
        self.phases[slot] = ReadbackPhase::Mapped;

        let Some(pending) = self.pending[slot].take() else {
            return Ok(None);
        };
        if pending.frame < self.accept_from {
            return Ok(None);
        }

        let sample = PickSample {
            frame: pending.frame,
            cursor: pending.cursor,
            value: decode(pending.cursor),
        };
        if self.latest.is_none_or(|l| l.frame < sample.frame) {
            self.latest = Some(sample);
            self.latest_slot = Some(slot);
        }
        Ok(Some(sample))
    }

    /// A mapping failed; the slot is reusable.
    pub fn failed(&mut self, slot: usize) {
        if self.phase(slot) == Some(ReadbackPhase::Mapping) {
            self.set_idle(slot);
        }
    }

    /// Forgets the newest sample and every readback recorded so far, including
    /// those still in flight.
    pub fn invalidate(&mut self) {
        self.latest = None;
        self.latest_slot = None;
        self.accept_from = self.last_recorded + 1;
    }

    pub fn clear(&mut self) {
        for slot in 0..self.phases.len() {
            self.set_idle(slot);
        }
        self.latest = None;
    }

    fn phase_of(&self, slot: usize) -> Result<ReadbackPhase, PickError> {
        self.phase(slot).ok_or(PickError::NoSuchSlot(slot))
    }

    fn set_idle(&mut self, slot: usize) {
        self.phases[slot] = ReadbackPhase::Idle;
        self.pending[slot] = None;
        if self.latest_slot == Some(slot) {
            self.latest_slot = None;
        }
    }
}

fn transition(slot: usize, from: ReadbackPhase, to: ReadbackPhase) -> PickError {
    PickError::InvalidTransition { slot, from, to }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> Cursor {
        Cursor::new(x, y)
    }

    /// Records, submits and completes one readback on `slot`.
    fn complete(t: &mut ReadbackTracker, slot: usize, frame: u64, value: u32) -> Option<PickSample> {
        t.recycle(slot).unwrap();
        t.record(slot, frame, at(1.0, 2.0)).unwrap();
        assert!(t.submitted(slot));
        t.finished(slot, |_| Some(value)).unwrap()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn slot_walks_through_every_phase() {
        let mut t = ReadbackTracker::new(2);
        assert_eq!(t.phase(0), Some(ReadbackPhase::Idle));

        t.record(0, 1, at(3.0, 4.0)).unwrap();
        assert_eq!(t.phase(0), Some(ReadbackPhase::Recorded));
        assert!(t.has_pending());

        assert!(t.submitted(0));
        assert_eq!(t.phase(0), Some(ReadbackPhase::Mapping));

        let sample = t.finished(0, |c| Some(c.x as u32 + c.y as u32)).unwrap();
        assert_eq!(
            sample,
            Some(PickSample {
                frame: 1,
                cursor: at(3.0, 4.0),
                value: Some(7),
            })
        );
        assert_eq!(t.phase(0), Some(ReadbackPhase::Mapped));
        assert!(!t.has_pending());
        assert_eq!(t.latest_slot(), Some(0));

        assert!(t.recycle(0).unwrap());
        assert_eq!(t.phase(0), Some(ReadbackPhase::Idle));
        assert_eq!(t.latest_slot(), None);
        assert_eq!(t.latest().map(|s| s.frame), Some(1));
    }

    #[test]
    fn busy_slots_cannot_be_recorded_or_recycled() {
        let mut t = ReadbackTracker::new(1);
        t.record(0, 1, at(0.0, 0.0)).unwrap();
        assert_eq!(
            t.record(0, 2, at(0.0, 0.0)),
            Err(PickError::InvalidTransition {
                slot: 0,
                from: ReadbackPhase::Recorded,
                to: ReadbackPhase::Recorded,
            })
        );
        t.submitted(0);
        assert!(t.recycle(0).is_err());
        assert_eq!(t.record(5, 1, at(0.0, 0.0)), Err(PickError::NoSuchSlot(5)));
    }

    #[test]
    fn submit_without_a_recorded_copy_is_a_no_op() {
        let mut t = ReadbackTracker::new(1);
        assert!(!t.submitted(0));
        assert_eq!(t.phase(0), Some(ReadbackPhase::Idle));
        assert!(t.finished(0, |_| Some(0)).is_err());
    }

    #[test]
    fn cancel_drops_only_recorded_copies() {
        let mut t = ReadbackTracker::new(2);
        t.record(0, 1, at(0.0, 0.0)).unwrap();
        t.cancel(0);
        assert_eq!(t.phase(0), Some(ReadbackPhase::Idle));
        assert!(!t.submitted(0));

        t.record(1, 2, at(0.0, 0.0)).unwrap();
        t.submitted(1);
        t.cancel(1);
        assert_eq!(t.phase(1), Some(ReadbackPhase::Mapping));
    }

    #[test]
    fn failed_mapping_frees_the_slot() {
        let mut t = ReadbackTracker::new(1);
        t.record(0, 1, at(0.0, 0.0)).unwrap();
        t.submitted(0);
        t.failed(0);
        assert_eq!(t.phase(0), Some(ReadbackPhase::Idle));
        assert_eq!(t.latest(), None);
        t.record(0, 2, at(0.0, 0.0)).unwrap();
    }

    // ── newest sample ─────────────────────────────────────────────────────

    #[test]
    fn newest_frame_wins_regardless_of_completion_order() {
        let mut t = ReadbackTracker::new(2);
        t.record(0, 1, at(0.0, 0.0)).unwrap();
        t.record(1, 2, at(0.0, 0.0)).unwrap();
        t.submitted(0);
        t.submitted(1);

        t.finished(1, |_| Some(20)).unwrap();
        t.finished(0, |_| Some(10)).unwrap();

        let latest = t.latest().unwrap();
        assert_eq!((latest.frame, latest.value), (2, Some(20)));
        assert_eq!(t.latest_slot(), Some(1));
    }

    #[test]
    fn later_frames_replace_the_latest_sample() {
        let mut t = ReadbackTracker::new(2);
        complete(&mut t, 0, 1, 4);
        complete(&mut t, 1, 2, 5);
        complete(&mut t, 0, 3, 6);
        assert_eq!(t.latest().map(|s| (s.frame, s.value)), Some((3, Some(6))));
    }

    // ── invalidation ──────────────────────────────────────────────────────

    #[test]
    fn invalidate_forgets_the_latest_sample() {
        let mut t = ReadbackTracker::new(2);
        complete(&mut t, 0, 1, 0);
        assert!(t.latest().is_some());

        t.invalidate();
        assert_eq!(t.latest(), None);
        assert_eq!(t.latest_slot(), None);
    }

    #[test]
    fn readbacks_in_flight_at_invalidation_are_dropped() {
        let mut t = ReadbackTracker::new(2);
        t.record(0, 1, at(0.0, 0.0)).unwrap();
        t.submitted(0);

        t.invalidate();
        assert_eq!(t.finished(0, |_| Some(0)).unwrap(), None);
        assert_eq!(t.latest(), None);
        assert_eq!(t.phase(0), Some(ReadbackPhase::Mapped));

        assert!(complete(&mut t, 1, 2, 3).is_some());
        assert_eq!(t.latest().map(|s| s.value), Some(Some(3)));
    }
}
