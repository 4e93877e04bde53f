use super::draw::{depth_state, primitive_state};
use super::{SceneLayouts, Vertex};
use crate::image::SampledTexture;

/// The textured, lit pipeline every material instantiates.
#[derive(Clone)]
pub struct ShadedPipeline {
    pipeline: wgpu::RenderPipeline,
}

impl ShadedPipeline {
    pub fn new(device: &wgpu::Device, layouts: &SceneLayouts, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("plateau shaded shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shaded.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("plateau shaded pipeline layout"),
            bind_group_layouts: &[&layouts.camera, &layouts.object, &layouts.material],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("plateau shaded pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
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
}

/// A shaded pipeline instance with its own texture.
///
/// Materials differ only in what group 2 binds.
pub struct Material {
    name: String,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        layouts: &SceneLayouts,
        shaded: &ShadedPipeline,
        texture: &SampledTexture,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("plateau material '{}'", texture.name)),
            layout: &layouts.material,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            name: texture.name.clone(),
            pipeline: shaded.pipeline.clone(),
            bind_group,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
