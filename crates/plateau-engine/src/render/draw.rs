use crate::arena::{MeshAllocation, ObjectId};
use crate::frame::Extent;

use super::Material;

/// Bindings common to every draw of a frame.
///
/// `mesh_buffer` is `None` while no mesh is loaded; draws are then skipped.
pub struct FrameBindings<'a> {
    pub mesh_buffer: Option<&'a wgpu::Buffer>,
    pub camera: &'a wgpu::BindGroup,
    pub camera_offset: u32,
    pub objects: &'a wgpu::BindGroup,
}

/// One renderable object, with its uniform block already written.
pub struct DrawItem<'a> {
    pub id: ObjectId,
    pub mesh: &'a MeshAllocation,
    pub material: &'a Material,
    pub object_offset: u32,
}

pub(super) fn set_viewport(rpass: &mut wgpu::RenderPass<'_>, extent: Extent) {
    rpass.set_viewport(0.0, 0.0, extent.width as f32, extent.height as f32, 0.0, 1.0);
    rpass.set_scissor_rect(0, 0, extent.width, extent.height);
}

/// Binds mesh ranges and the camera/object groups, then draws `instances`.
pub(super) fn draw_mesh(
    rpass: &mut wgpu::RenderPass<'_>,
    bindings: &FrameBindings<'_>,
    item: &DrawItem<'_>,
    instances: std::ops::Range<u32>,
) {
    let Some(mesh_buffer) = bindings.mesh_buffer else { return };
    rpass.set_vertex_buffer(0, mesh_buffer.slice(item.mesh.vertices()));
    rpass.set_index_buffer(
        mesh_buffer.slice(item.mesh.indices()),
        wgpu::IndexFormat::Uint16,
    );
    rpass.set_bind_group(0, bindings.camera, &[bindings.camera_offset]);
    rpass.set_bind_group(1, bindings.objects, &[item.object_offset]);
    rpass.draw_indexed(0..item.mesh.index_count(), 0, instances);
}

pub(super) fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: crate::image::DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

pub(super) fn primitive_state() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: Some(wgpu::Face::Back),
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}
