//! CPU mirrors of GPU-visible data.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

// ── uniform blocks ────────────────────────────────────────────────────────

/// Camera matrices, written once per frame slot.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraBlock {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

/// Per-object transform, written into the object's region for each frame slot.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ObjectBlock {
    pub model: [[f32; 4]; 4],
}

impl ObjectBlock {
    pub fn from_model(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }
}

const _: () = assert!(size_of::<CameraBlock>() % 16 == 0);
const _: () = assert!(size_of::<ObjectBlock>() % 16 == 0);

// ── vertex ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];
    const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }

    /// Same stride, position only. The picking shader reads nothing else.
    pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::POSITION_ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_sizes_match_shader_structs() {
        assert_eq!(size_of::<CameraBlock>(), 128);
        assert_eq!(size_of::<ObjectBlock>(), 64);
        assert_eq!(size_of::<Vertex>(), 32);
    }

    #[test]
    fn object_block_is_column_major() {
        let block = ObjectBlock::from_model(Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(block.model[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
