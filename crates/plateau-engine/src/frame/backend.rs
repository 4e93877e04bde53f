use std::time::Duration;

use super::FrameError;

/// Size of the presentable surface in physical pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

/// Result of asking the presentation engine for the next image.
#[derive(Debug)]
pub enum AcquireStatus<T> {
    Ready(T),
    /// The swap resources no longer match the surface.
    Stale,
    /// No image became available in time.
    Timeout,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PresentStatus {
    Optimal,
    /// Presented, but the swap resources should be rebuilt.
    Suboptimal,
}

/// GPU side of the frame loop.
///
/// The scheduler only sees opaque fences, targets and recorders. wgpu backends
/// use submission indices and command encoders; tests use plain counters.
pub trait FrameBackend {
    /// Completion signal of one submission.
    type Fence;
    /// The image a frame renders into and presents.
    type Target;
    /// Command recording state for one frame.
    type Recorder;

    fn extent(&self) -> Extent;

    /// Blocks until `fence` signals, at most `timeout`.
    fn wait_fence(&mut self, fence: &Self::Fence, timeout: Duration) -> Result<(), FrameError>;

    fn acquire(&mut self) -> Result<AcquireStatus<Self::Target>, FrameError>;

    fn begin_recording(&mut self, slot: usize) -> Self::Recorder;

    fn submit(&mut self, recorder: Self::Recorder) -> Self::Fence;

    fn present(&mut self, target: Self::Target) -> PresentStatus;

    /// Rebuilds swap resources after waiting for the device to go idle.
    fn recreate(&mut self) -> Result<(), FrameError>;

    /// Blocks until all submitted work has completed.
    fn wait_idle(&mut self) -> Result<(), FrameError>;
}
