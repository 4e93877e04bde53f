use std::time::Duration;

use crate::frame::FrameError;

/// Blocks until `index` (or all work, for `None`) has completed.
///
/// A `None` timeout waits indefinitely.
pub(crate) fn wait_for_submission(
    device: &wgpu::Device,
    index: Option<wgpu::SubmissionIndex>,
    timeout: Option<Duration>,
) -> Result<(), FrameError> {
    device
        .poll(wgpu::PollType::Wait {
            submission_index: index,
            timeout,
        })
        .map(|_| ())
        .map_err(|e| match e {
            wgpu::PollError::Timeout => FrameError::Timeout(timeout.unwrap_or_default()),
            other => FrameError::DeviceLost(other.to_string()),
        })
}

/// Processes finished work (map callbacks) without blocking.
pub(crate) fn poll_nonblocking(device: &wgpu::Device) -> Result<(), FrameError> {
    device
        .poll(wgpu::PollType::Poll)
        .map(|_| ())
        .map_err(|e| FrameError::DeviceLost(e.to_string()))
}
