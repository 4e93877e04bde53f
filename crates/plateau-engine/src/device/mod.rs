//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - implementing the frame backend for a window and for headless rendering

mod backend;
mod gpu;
mod init;
mod offscreen;
mod poll;
mod surface;

pub use backend::{ColorTarget, GpuBackend, OffscreenTarget, SurfaceFrame};
pub use gpu::Gpu;
pub use init::GpuInit;
pub use offscreen::OffscreenGpu;

pub(crate) use poll::poll_nonblocking;
