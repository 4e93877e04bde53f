use super::draw::{depth_state, draw_mesh, primitive_state, set_viewport, DrawItem, FrameBindings};
use super::{SceneLayouts, Vertex};
use crate::picking::{encode_id, PickError, PickingTarget, PICK_FORMAT};

/// The offscreen pass writing object ids into the picking target.
///
/// The target is cleared to white, which decodes to the "no object" value.
pub struct PickingPass {
    pipeline: wgpu::RenderPipeline,
}

impl PickingPass {
    pub fn new(device: &wgpu::Device, layouts: &SceneLayouts) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("plateau picking shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/pick.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("plateau picking pipeline layout"),
            bind_group_layouts: &[&layouts.camera, &layouts.object],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("plateau picking pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::position_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: PICK_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(),
            depth_stencil: Some(depth_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self { pipeline }
    }

    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &mut PickingTarget,
        bindings: &FrameBindings<'_>,
        items: &[DrawItem<'_>],
    ) -> Result<(), PickError> {
        for item in items {
            encode_id(item.id.get())?;
        }

        let extent = target.extent();
        let (color_view, depth_view) = target.attach()?;

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("plateau picking pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
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
        rpass.set_pipeline(&self.pipeline);
        for item in items {
            let id = item.id.get();
            draw_mesh(&mut rpass, bindings, item, id..id + 1);
        }
        Ok(())
    }
}
