use std::time::Duration;

use anyhow::Result;

use super::backend::{GpuBackend, OffscreenTarget};
use super::init::{create_instance, open_device, GpuInit};
use super::poll::wait_for_submission;
use crate::frame::{AcquireStatus, Extent, FrameBackend, FrameError, PresentStatus};

/// Headless frame backend rendering into a plain color texture.
///
/// Used by tests and tools that need the full frame loop without a window.
pub struct OffscreenGpu {
    _instance: wgpu::Instance,
    _adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    extent: Extent,
    color: wgpu::Texture,
}

impl OffscreenGpu {
    pub async fn new(extent: Extent, format: wgpu::TextureFormat, init: GpuInit) -> Result<Self> {
        anyhow::ensure!(!extent.is_zero_area(), "offscreen target has zero size");

        let instance = create_instance();
        let (adapter, device, queue) = open_device(&instance, None, &init).await?;
        let color = create_color_texture(&device, extent, format);

        Ok(Self {
            _instance: instance,
            _adapter: adapter,
            device,
            queue,
            format,
            extent,
            color,
        })
    }

    /// The texture frames render into.
    pub fn color_texture(&self) -> &wgpu::Texture {
        &self.color
    }

    /// Replaces the color texture with one of the new size.
    pub fn resize(&mut self, extent: Extent) {
        self.extent = extent;
        if !extent.is_zero_area() {
            self.color = create_color_texture(&self.device, extent, self.format);
        }
    }
}

fn create_color_texture(
    device: &wgpu::Device,
    extent: Extent,
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("plateau offscreen color"),
        size: extent.to_wgpu(),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

impl FrameBackend for OffscreenGpu {
    type Fence = wgpu::SubmissionIndex;
    type Target = OffscreenTarget;
    type Recorder = wgpu::CommandEncoder;

    fn extent(&self) -> Extent {
        self.extent
    }

    fn wait_fence(
        &mut self,
        fence: &wgpu::SubmissionIndex,
        timeout: Duration,
    ) -> Result<(), FrameError> {
        wait_for_submission(&self.device, Some(fence.clone()), Some(timeout))
    }

    fn acquire(&mut self) -> Result<AcquireStatus<OffscreenTarget>, FrameError> {
        let view = self
            .color
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(AcquireStatus::Ready(OffscreenTarget { view }))
    }

    fn begin_recording(&mut self, slot: usize) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(&format!("plateau offscreen encoder (slot {slot})")),
            })
    }

    fn submit(&mut self, recorder: wgpu::CommandEncoder) -> wgpu::SubmissionIndex {
        self.queue.submit(std::iter::once(recorder.finish()))
    }

    fn present(&mut self, _target: OffscreenTarget) -> PresentStatus {
        PresentStatus::Optimal
    }

    fn recreate(&mut self) -> Result<(), FrameError> {
        self.wait_idle()
    }

    fn wait_idle(&mut self) -> Result<(), FrameError> {
        wait_for_submission(&self.device, None, None)
    }
}

impl GpuBackend for OffscreenGpu {
    fn device(&self) -> &wgpu::Device {
        &self.device
    }

    fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    fn color_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
