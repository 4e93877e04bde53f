use crate::frame::FrameBackend;

/// Something a frame can render its color output into.
pub trait ColorTarget {
    fn color_view(&self) -> &wgpu::TextureView;
}

/// A frame backend driven by a wgpu device.
pub trait GpuBackend:
    FrameBackend<Fence = wgpu::SubmissionIndex, Recorder = wgpu::CommandEncoder, Target: ColorTarget>
{
    fn device(&self) -> &wgpu::Device;
    fn queue(&self) -> &wgpu::Queue;
    fn color_format(&self) -> wgpu::TextureFormat;
}

/// An acquired swapchain image.
pub struct SurfaceFrame {
    pub texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl ColorTarget for SurfaceFrame {
    fn color_view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

/// The color texture of a headless backend.
pub struct OffscreenTarget {
    pub view: wgpu::TextureView,
}

impl ColorTarget for OffscreenTarget {
    fn color_view(&self) -> &wgpu::TextureView {
        &self.view
    }
}
