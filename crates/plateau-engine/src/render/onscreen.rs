use super::draw::{draw_mesh, set_viewport, DrawItem, FrameBindings};
use crate::frame::Extent;
use crate::image::{DepthTarget, LayoutError};

/// The visible pass: clears color and depth, then draws every renderable
/// with its material.
pub struct OnScreenPass {
    depth: DepthTarget,
    clear_color: wgpu::Color,
}

impl OnScreenPass {
    pub fn new(device: &wgpu::Device, extent: Extent, clear_color: wgpu::Color) -> Self {
        Self {
            depth: DepthTarget::new(device, extent, "plateau on-screen depth"),
            clear_color,
        }
    }

    #[inline]
    pub fn extent(&self) -> Extent {
        self.depth.extent()
    }

    /// Rebuilds the depth buffer if `extent` changed.
    pub fn resize(&mut self, device: &wgpu::Device, extent: Extent) {
        if self.depth.extent() != extent {
            self.depth = DepthTarget::new(device, extent, "plateau on-screen depth");
        }
    }

    pub fn record(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        bindings: &FrameBindings<'_>,
        items: &[DrawItem<'_>],
    ) -> Result<(), LayoutError> {
        let extent = self.depth.extent();
        let depth_view = self.depth.attach()?;

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("plateau on-screen pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        set_viewport(&mut rpass, extent);
        for item in items {
            rpass.set_pipeline(item.material.pipeline());
            rpass.set_bind_group(2, item.material.bind_group(), &[]);
            draw_mesh(&mut rpass, bindings, item, 0..1);
        }
        Ok(())
    }
}
