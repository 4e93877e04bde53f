use crate::frame::Extent;
use crate::image::{attachment_requirements, DepthTarget, ImageLayout, LayoutError, LayoutTracker, DEPTH_FORMAT};
use crate::memory::{plan_placements, MemoryError, Placement};

/// A channel written as `k / 255` reads back as exactly `k`.
pub const PICK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Color + depth images the picking pass renders into.
pub struct PickingTarget {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    color_layout: LayoutTracker,
    depth: DepthTarget,
    extent: Extent,
}

impl PickingTarget {
    pub fn new(device: &wgpu::Device, extent: Extent) -> Self {
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("plateau picking color"),
            size: extent.to_wgpu(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PICK_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let target = Self {
            color,
            color_view,
            color_layout: LayoutTracker::new("plateau picking color"),
            depth: DepthTarget::new(device, extent, "plateau picking depth"),
            extent,
        };
        if let Ok(fp) = target.footprint() {
            log::debug!(
                "picking target {}x{}: {} bytes across color + depth",
                extent.width,
                extent.height,
                fp.total
            );
        }
        target
    }

    #[inline]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    #[inline]
    pub fn color_texture(&self) -> &wgpu::Texture {
        &self.color
    }

    #[inline]
    pub fn color_layout(&self) -> ImageLayout {
        self.color_layout.current()
    }

    /// Packed footprint of color and depth.
    pub fn footprint(&self) -> Result<Placement, MemoryError> {
        plan_placements(&[
            attachment_requirements(PICK_FORMAT, self.extent),
            attachment_requirements(DEPTH_FORMAT, self.extent),
        ])
    }

    /// Views for the picking pass; both images become attachments.
    pub fn attach(&mut self) -> Result<(&wgpu::TextureView, &wgpu::TextureView), LayoutError> {
        self.color_layout.transition_to(ImageLayout::ColorAttachment)?;
        let depth = self.depth.attach()?;
        Ok((&self.color_view, depth))
    }

    /// Marks the color image as the source of the readback copy.
    pub fn begin_transfer(&mut self) -> Result<&wgpu::Texture, LayoutError> {
        self.color_layout
            .transition(ImageLayout::ColorAttachment, ImageLayout::TransferSrc)?;
        Ok(&self.color)
    }
}
