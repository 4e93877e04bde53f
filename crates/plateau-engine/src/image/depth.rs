use super::{ImageLayout, LayoutError, LayoutTracker};
use crate::frame::Extent;
use crate::memory::MemoryRequirements;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Byte footprint of a single-sampled attachment, for packing reports.
///
/// wgpu does not expose real allocation sizes; this uses the texel block size
/// and the copy row alignment.
pub fn attachment_requirements(format: wgpu::TextureFormat, extent: Extent) -> MemoryRequirements {
    let block = format.block_copy_size(None).unwrap_or(4) as u64;
    let row = crate::memory::align_up(
        extent.width as u64 * block,
        wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64,
    );
    MemoryRequirements::new(row * extent.height as u64, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64)
}

/// Depth attachment of one pass, sized to the frame extent.
pub struct DepthTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    layout: LayoutTracker,
}

impl DepthTarget {
    pub fn new(device: &wgpu::Device, extent: Extent, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent.to_wgpu(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            layout: LayoutTracker::new(label),
        }
    }

    #[inline]
    pub fn extent(&self) -> Extent {
        Extent::new(self.texture.width(), self.texture.height())
    }

    /// The view to attach, after marking the image as a depth attachment.
    pub fn attach(&mut self) -> Result<&wgpu::TextureView, LayoutError> {
        self.layout.transition_to(ImageLayout::DepthAttachment)?;
        Ok(&self.view)
    }
}
