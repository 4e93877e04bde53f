use std::time::Duration;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::backend::{GpuBackend, SurfaceFrame};
use super::init::{create_instance, open_device, GpuInit};
use super::poll::wait_for_submission;
use super::surface::{choose_alpha_mode, choose_surface_format};
use crate::frame::{AcquireStatus, Extent, FrameBackend, FrameError, PresentStatus};

/// Owns wgpu core objects and the surface configuration.
///
/// This type is the low-level rendering context:
/// - creates and stores Instance/Adapter/Device/Queue
/// - creates and configures the Surface (swapchain)
/// - acts as the frame backend for a window
pub struct Gpu<'w> {
    /// Kept alive for the surface.
    _instance: wgpu::Instance,

    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; architecture must ensure the window
    /// outlives the `Gpu` instance.
    surface: wgpu::Surface<'w>,

    _adapter: wgpu::Adapter,

    device: wgpu::Device,

    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = create_instance();

        // Surface lifetime is tied to `window` via `'w`.
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let (adapter, device, queue) = open_device(&instance, Some(&surface), &init).await?;

        let caps = surface.get_capabilities(&adapter);
        let format =
            choose_surface_format(&caps, init.prefer_srgb).context("no supported surface formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode: choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);
        log::info!("surface configured: {format:?} {}x{}", size.width, size.height);

        Ok(Gpu {
            _instance: instance,
            surface,
            _adapter: adapter,
            device,
            queue,
            config,
            size,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Records a new drawable size and reconfigures the surface.
    ///
    /// wgpu does not support configuring a surface with a 0x0 size; in that case,
    /// only internal state is updated and frames are skipped until a real size
    /// arrives.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }
}

impl FrameBackend for Gpu<'_> {
    type Fence = wgpu::SubmissionIndex;
    type Target = SurfaceFrame;
    type Recorder = wgpu::CommandEncoder;

    /// The configured extent, or zero while the window is minimized.
    fn extent(&self) -> Extent {
        if self.size.width == 0 || self.size.height == 0 {
            return Extent::default();
        }
        Extent::new(self.config.width, self.config.height)
    }

    fn wait_fence(
        &mut self,
        fence: &wgpu::SubmissionIndex,
        timeout: Duration,
    ) -> Result<(), FrameError> {
        wait_for_submission(&self.device, Some(fence.clone()), Some(timeout))
    }

    fn acquire(&mut self) -> Result<AcquireStatus<SurfaceFrame>, FrameError> {
        match self.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(AcquireStatus::Ready(SurfaceFrame { texture, view }))
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                Ok(AcquireStatus::Stale)
            }
            Err(wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other) => {
                Ok(AcquireStatus::Timeout)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(FrameError::OutOfMemory),
        }
    }

    fn begin_recording(&mut self, slot: usize) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(&format!("plateau frame encoder (slot {slot})")),
            })
    }

    fn submit(&mut self, recorder: wgpu::CommandEncoder) -> wgpu::SubmissionIndex {
        self.queue.submit(std::iter::once(recorder.finish()))
    }

    fn present(&mut self, target: SurfaceFrame) -> PresentStatus {
        let suboptimal = target.texture.suboptimal;
        drop(target.view);
        target.texture.present();
        if suboptimal {
            PresentStatus::Suboptimal
        } else {
            PresentStatus::Optimal
        }
    }

    fn recreate(&mut self) -> Result<(), FrameError> {
        self.wait_idle()?;
        if self.size.width > 0 && self.size.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
        Ok(())
    }

    fn wait_idle(&mut self) -> Result<(), FrameError> {
        wait_for_submission(&self.device, None, None)
    }
}

impl GpuBackend for Gpu<'_> {
    fn device(&self) -> &wgpu::Device {
        &self.device
    }

    fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }
}
