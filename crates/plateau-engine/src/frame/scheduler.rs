use std::time::Duration;

use super::slot::FrameSlot;
use super::{AcquireStatus, Extent, FrameBackend, FrameError, PresentStatus, SlotState};

/// Why `begin_frame` produced no frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The surface has no area (minimized window).
    ZeroArea,
    /// Swap resources were stale and have been rebuilt.
    Recreated,
    /// The presentation engine had no image ready.
    AcquireTimeout,
}

/// A frame being recorded.
///
/// Owned by the caller between `begin_frame` and `end_frame`.
pub struct Frame<B: FrameBackend> {
    slot: usize,
    number: u64,
    extent: Extent,
    pub target: B::Target,
    pub recorder: B::Recorder,
}

impl<B: FrameBackend> Frame<B> {
    /// Index of the frame slot, in `[0, frames_in_flight)`.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Monotonic frame counter, starting at 1.
    #[inline]
    pub fn number(&self) -> u64 {
        self.number
    }

    #[inline]
    pub fn extent(&self) -> Extent {
        self.extent
    }
}

pub enum BeginOutcome<B: FrameBackend> {
    Ready(Frame<B>),
    Skipped(SkipReason),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    Presented,
    /// Presented, then swap resources were rebuilt.
    Recreated,
}

/// Drives N frame slots over a backend.
pub struct FrameScheduler<B: FrameBackend> {
    slots: Vec<FrameSlot<B::Fence>>,
    current: usize,
    frame_number: u64,
    fence_timeout: Duration,
    resized: bool,
}

impl<B: FrameBackend> FrameScheduler<B> {
    pub fn new(frames_in_flight: usize, fence_timeout: Duration) -> Self {
        assert!(frames_in_flight > 0, "at least one frame slot is required");
        Self {
            slots: (0..frames_in_flight).map(|_| FrameSlot::new()).collect(),
            current: 0,
            frame_number: 0,
            fence_timeout,
            resized: false,
        }
    }

    #[inline]
    pub fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn current_slot(&self) -> usize {
        self.current
    }

    /// Number of frames handed out so far.
    #[inline]
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn slot_state(&self, slot: usize) -> Option<SlotState> {
        self.slots.get(slot).map(|s| s.state)
    }

    /// Fence of the last submission from `slot`, until the slot is reused.
    pub fn fence(&self, slot: usize) -> Option<&B::Fence> {
        self.slots.get(slot)?.fence.as_ref()
    }

    /// Requests swap-resource recreation at the end of the next frame.
    pub fn notify_resized(&mut self) {
        self.resized = true;
    }

    pub fn begin_frame(&mut self, backend: &mut B) -> Result<BeginOutcome<B>, FrameError> {
        let extent = backend.extent();
        if extent.is_zero_area() {
            return Ok(BeginOutcome::Skipped(SkipReason::ZeroArea));
        }

        let index = self.current;
        let slot = &mut self.slots[index];
        slot.transition(index, SlotState::Acquiring)?;

        if let Some(fence) = slot.fence.as_ref() {
            if let Err(e) = backend.wait_fence(fence, self.fence_timeout) {
                slot.state = SlotState::Idle;
                return Err(e);
            }
        }

        let target = match backend.acquire() {
            Ok(AcquireStatus::Ready(target)) => target,
            Ok(AcquireStatus::Stale) => {
                slot.transition(index, SlotState::Idle)?;
                log::info!("swap resources stale; recreating");
                backend.recreate()?;
                self.resized = false;
                return Ok(BeginOutcome::Skipped(SkipReason::Recreated));
            }
            Ok(AcquireStatus::Timeout) => {
                slot.transition(index, SlotState::Idle)?;
                log::warn!("no swap image available; skipping frame");
                return Ok(BeginOutcome::Skipped(SkipReason::AcquireTimeout));
            }
            Err(e) => {
                slot.state = SlotState::Idle;
                return Err(e);
            }
        };

        // The previous submission from this slot has retired.
        slot.fence = None;
        slot.transition(index, SlotState::Recording)?;
        let recorder = backend.begin_recording(index);

        self.frame_number += 1;
        Ok(BeginOutcome::Ready(Frame {
            slot: index,
            number: self.frame_number,
            extent,
            target,
            recorder,
        }))
    }

    pub fn end_frame(&mut self, backend: &mut B, frame: Frame<B>) -> Result<EndOutcome, FrameError> {
        let index = self.current;
        if frame.slot != index {
            return Err(FrameError::ForeignFrame {
                expected: index,
                got: frame.slot,
            });
        }
        let slot = &mut self.slots[index];

        slot.transition(index, SlotState::Submitted)?;
        slot.fence = Some(backend.submit(frame.recorder));

        slot.transition(index, SlotState::Presenting)?;
        let status = backend.present(frame.target);
        slot.transition(index, SlotState::Idle)?;

        self.current = (index + 1) % self.slots.len();

        if status == PresentStatus::Suboptimal || self.resized {
            self.resized = false;
            log::info!("recreating swap resources after frame {}", frame.number);
            backend.recreate()?;
            return Ok(EndOutcome::Recreated);
        }
        Ok(EndOutcome::Presented)
    }

    /// Drops a frame without submitting it. The slot stays current.
    pub fn cancel_frame(&mut self, frame: Frame<B>) -> Result<(), FrameError> {
        if frame.slot != self.current {
            return Err(FrameError::ForeignFrame {
                expected: self.current,
                got: frame.slot,
            });
        }
        self.slots[frame.slot].transition(frame.slot, SlotState::Idle)
    }

    /// Waits for every slot's outstanding submission.
    pub fn wait_idle(&mut self, backend: &mut B) -> Result<(), FrameError> {
        backend.wait_idle()?;
        for slot in &mut self.slots {
            slot.fence = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use super::*;

    // ── mock backend ──────────────────────────────────────────────────────

    /// Fences are submission counters; nothing signals until the test says so.
    #[derive(Default)]
    struct MockBackend {
        extent: Extent,
        next_fence: u64,
        signaled: HashSet<u64>,
        acquire_script: VecDeque<AcquireStatus<()>>,
        present_script: VecDeque<PresentStatus>,
        recreated: usize,
        waited: Vec<u64>,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                extent: Extent::new(640, 480),
                ..Default::default()
            }
        }

        fn signal(&mut self, fence: u64) {
            self.signaled.insert(fence);
        }
    }

    impl FrameBackend for MockBackend {
        type Fence = u64;
        type Target = ();
        type Recorder = usize;

        fn extent(&self) -> Extent {
            self.extent
        }

        fn wait_fence(&mut self, fence: &u64, timeout: Duration) -> Result<(), FrameError> {
            self.waited.push(*fence);
            if self.signaled.contains(fence) {
                Ok(())
            } else {
                Err(FrameError::Timeout(timeout))
            }
        }

        fn acquire(&mut self) -> Result<AcquireStatus<()>, FrameError> {
            Ok(self.acquire_script.pop_front().unwrap_or(AcquireStatus::Ready(())))
        }

        fn begin_recording(&mut self, slot: usize) -> usize {
            slot
        }

        fn submit(&mut self, _recorder: usize) -> u64 {
            let fence = self.next_fence;
            self.next_fence += 1;
            fence
        }

        fn present(&mut self, _target: ()) -> PresentStatus {
            self.present_script.pop_front().unwrap_or(PresentStatus::Optimal)
        }

        fn recreate(&mut self) -> Result<(), FrameError> {
            self.recreated += 1;
            Ok(())
        }

        fn wait_idle(&mut self) -> Result<(), FrameError> {
            let all: Vec<u64> = (0..self.next_fence).collect();
            self.signaled.extend(all);
            Ok(())
        }
    }

    const TIMEOUT: Duration = Duration::from_millis(10);

    fn ready(outcome: BeginOutcome<MockBackend>) -> Frame<MockBackend> {
        match outcome {
            BeginOutcome::Ready(frame) => frame,
            BeginOutcome::Skipped(reason) => panic!("frame skipped: {reason:?}"),
        }
    }

    fn skipped(outcome: BeginOutcome<MockBackend>) -> SkipReason {
        match outcome {
            BeginOutcome::Ready(frame) => panic!("expected skip, got frame {}", frame.number()),
            BeginOutcome::Skipped(reason) => reason,
        }
    }

    // ── slot rotation ─────────────────────────────────────────────────────

    #[test]
    fn slots_rotate_modulo_n() {
        let mut backend = MockBackend::new();
        let mut sched = FrameScheduler::new(2, TIMEOUT);

        let mut seen = Vec::new();
        for fence in 0..5u64 {
            let frame = ready(sched.begin_frame(&mut backend).unwrap());
            seen.push((frame.slot(), frame.number()));
            sched.end_frame(&mut backend, frame).unwrap();
            backend.signal(fence);
        }
        assert_eq!(seen, vec![(0, 1), (1, 2), (0, 3), (1, 4), (0, 5)]);
        assert_eq!(sched.slot_state(0), Some(SlotState::Idle));
    }

    #[test]
    fn reused_slot_waits_on_its_own_fence() {
        let mut backend = MockBackend::new();
        let mut sched = FrameScheduler::new(2, TIMEOUT);

        for _ in 0..2 {
            let frame = ready(sched.begin_frame(&mut backend).unwrap());
            sched.end_frame(&mut backend, frame).unwrap();
        }
        backend.signal(0);
        let frame = ready(sched.begin_frame(&mut backend).unwrap());
        assert_eq!(frame.slot(), 0);
        assert_eq!(backend.waited, vec![0]);
    }

    // ── back-pressure ─────────────────────────────────────────────────────

    #[test]
    fn n_plus_one_frame_blocks_until_fence_signals() {
        let mut backend = MockBackend::new();
        let mut sched = FrameScheduler::new(2, TIMEOUT);

        for _ in 0..2 {
            let frame = ready(sched.begin_frame(&mut backend).unwrap());
            sched.end_frame(&mut backend, frame).unwrap();
        }

        // Fence 0 never signaled: the third frame cannot start.
        assert_eq!(
            sched.begin_frame(&mut backend).err(),
            Some(FrameError::Timeout(TIMEOUT))
        );
        assert_eq!(sched.slot_state(0), Some(SlotState::Idle));
        assert_eq!(sched.frame_number(), 2);

        backend.signal(0);
        let frame = ready(sched.begin_frame(&mut backend).unwrap());
        assert_eq!((frame.slot(), frame.number()), (0, 3));
    }

    // ── skipped frames ────────────────────────────────────────────────────

    #[test]
    fn zero_area_skips_without_touching_slots() {
        let mut backend = MockBackend::new();
        backend.extent = Extent::new(0, 480);
        let mut sched = FrameScheduler::new(2, TIMEOUT);

        assert_eq!(skipped(sched.begin_frame(&mut backend).unwrap()), SkipReason::ZeroArea);
        assert_eq!(sched.slot_state(0), Some(SlotState::Idle));
        assert!(backend.waited.is_empty());
        assert_eq!(sched.frame_number(), 0);
    }

    #[test]
    fn stale_acquire_recreates_and_skips() {
        let mut backend = MockBackend::new();
        backend.acquire_script.push_back(AcquireStatus::Stale);
        let mut sched = FrameScheduler::new(2, TIMEOUT);

        assert_eq!(skipped(sched.begin_frame(&mut backend).unwrap()), SkipReason::Recreated);
        assert_eq!(backend.recreated, 1);
        assert_eq!(sched.current_slot(), 0);

        let frame = ready(sched.begin_frame(&mut backend).unwrap());
        assert_eq!(frame.slot(), 0);
    }

    #[test]
    fn acquire_timeout_skips_without_recreating() {
        let mut backend = MockBackend::new();
        backend.acquire_script.push_back(AcquireStatus::Timeout);
        let mut sched = FrameScheduler::new(3, TIMEOUT);

        assert_eq!(
            skipped(sched.begin_frame(&mut backend).unwrap()),
            SkipReason::AcquireTimeout
        );
        assert_eq!(backend.recreated, 0);
    }

    // ── end of frame ──────────────────────────────────────────────────────

    #[test]
    fn suboptimal_present_recreates() {
        let mut backend = MockBackend::new();
        backend.present_script.push_back(PresentStatus::Suboptimal);
        let mut sched = FrameScheduler::new(2, TIMEOUT);

        let frame = ready(sched.begin_frame(&mut backend).unwrap());
        assert_eq!(sched.end_frame(&mut backend, frame).unwrap(), EndOutcome::Recreated);
        assert_eq!(backend.recreated, 1);
        assert_eq!(sched.current_slot(), 1);
    }

    #[test]
    fn resize_flag_recreates_once() {
        let mut backend = MockBackend::new();
        let mut sched = FrameScheduler::new(2, TIMEOUT);
        sched.notify_resized();

        let frame = ready(sched.begin_frame(&mut backend).unwrap());
        assert_eq!(sched.end_frame(&mut backend, frame).unwrap(), EndOutcome::Recreated);
        let frame = ready(sched.begin_frame(&mut backend).unwrap());
        assert_eq!(sched.end_frame(&mut backend, frame).unwrap(), EndOutcome::Presented);
        assert_eq!(backend.recreated, 1);
    }

    #[test]
    fn begin_twice_without_end_is_rejected() {
        let mut backend = MockBackend::new();
        let mut sched = FrameScheduler::new(2, TIMEOUT);

        let _frame = ready(sched.begin_frame(&mut backend).unwrap());
        assert!(matches!(
            sched.begin_frame(&mut backend),
            Err(FrameError::InvalidTransition {
                slot: 0,
                from: SlotState::Recording,
                to: SlotState::Acquiring,
            })
        ));
    }

    #[test]
    fn cancelled_frame_keeps_slot_and_fence() {
        let mut backend = MockBackend::new();
        let mut sched = FrameScheduler::new(2, TIMEOUT);

        let frame = ready(sched.begin_frame(&mut backend).unwrap());
        sched.cancel_frame(frame).unwrap();
        let frame = ready(sched.begin_frame(&mut backend).unwrap());
        assert_eq!(frame.slot(), 0);
        assert_eq!(backend.next_fence, 0);
    }

    #[test]
    fn wait_idle_clears_outstanding_fences() {
        let mut backend = MockBackend::new();
        let mut sched = FrameScheduler::new(2, TIMEOUT);

        for _ in 0..2 {
            let frame = ready(sched.begin_frame(&mut backend).unwrap());
            sched.end_frame(&mut backend, frame).unwrap();
        }
        sched.wait_idle(&mut backend).unwrap();
        backend.waited.clear();

        ready(sched.begin_frame(&mut backend).unwrap());
        assert!(backend.waited.is_empty());
    }
}
