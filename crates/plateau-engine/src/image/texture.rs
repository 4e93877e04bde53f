use thiserror::Error;

use super::{ImageLayout, LayoutError, LayoutTracker};
use crate::io::ImageData;
use crate::memory::{
    align_up, create_buffer, plan_placements, BufferSpec, MemoryError, MemoryFlags,
    MemoryProperties, MemoryRequirements,
};

/// Format of every sampled material texture.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextureError {
    #[error("texture '{0}' has no texels")]
    EmptyImage(String),

    #[error("texture '{name}' holds {found} bytes, {expected} expected")]
    PixelCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// A texture ready for sampling.
pub struct SampledTexture {
    pub name: String,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    layout: LayoutTracker,
}

impl SampledTexture {
    #[inline]
    pub fn layout(&self) -> ImageLayout {
        self.layout.current()
    }
}

/// A batch of textures uploaded together.
///
/// Every image's rows go into one staging allocation: the sizes are measured
/// first, then each image is written at its planned offset.
pub struct TextureSet {
    textures: Vec<SampledTexture>,
    sampler: wgpu::Sampler,
    staging_bytes: u64,
}

/// Rejects images whose pixel buffer does not match their dimensions.
fn check_image(image: &ImageData) -> Result<(), TextureError> {
    if image.width == 0 || image.height == 0 {
        return Err(TextureError::EmptyImage(image.name.clone()));
    }
    let expected = image.width as usize * image.height as usize * 4;
    if image.pixels.len() != expected {
        return Err(TextureError::PixelCount {
            name: image.name.clone(),
            expected,
            found: image.pixels.len(),
        });
    }
    Ok(())
}

/// Upload footprint of one image: rows padded for buffer-to-texture copies.
fn upload_requirements(image: &ImageData) -> (u32, MemoryRequirements) {
    let padded_row = align_up(image.width as u64 * 4, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64);
    let req = MemoryRequirements::new(
        padded_row * image.height as u64,
        wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64,
    );
    (padded_row as u32, req)
}

impl TextureSet {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        properties: &MemoryProperties,
        images: &[ImageData],
    ) -> Result<Self, TextureError> {
        for image in images {
            check_image(image)?;
        }

        // Measure.
        let measured: Vec<(u32, MemoryRequirements)> = images.iter().map(upload_requirements).collect();
        let reqs: Vec<MemoryRequirements> = measured.iter().map(|(_, r)| *r).collect();
        let placement = plan_placements(&reqs)?;
        let staging_bytes = align_up(placement.total, wgpu::COPY_BUFFER_ALIGNMENT);

        let mut textures = Vec::with_capacity(images.len());
        for image in images {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(image.name.as_str()),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TEXTURE_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            textures.push(SampledTexture {
                name: image.name.clone(),
                texture,
                view,
                layout: LayoutTracker::new(image.name.clone()),
            });
        }

        if staging_bytes > 0 {
            let staging = create_buffer(
                device,
                properties,
                &BufferSpec {
                    label: "plateau texture staging",
                    size: staging_bytes,
                    usages: wgpu::BufferUsages::COPY_SRC,
                    memory: MemoryFlags::HOST_VISIBLE | MemoryFlags::HOST_COHERENT,
                    mapped_at_creation: true,
                },
            )?;

            // Place.
            {
                let mut mapped = staging.slice(..).get_mapped_range_mut();
                for (i, image) in images.iter().enumerate() {
                    let (padded_row, req) = measured[i];
                    let range = placement.range(i, &req);
                    let region = &mut mapped[range.start as usize..range.end as usize];
                    let tight_row = image.width as usize * 4;
                    for (dst, row) in region
                        .chunks_exact_mut(padded_row as usize)
                        .zip(image.pixels.chunks_exact(tight_row))
                    {
                        dst[..tight_row].copy_from_slice(row);
                    }
                }
            }
            staging.unmap();

            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("plateau texture upload"),
            });
            for (i, (image, tex)) in images.iter().zip(textures.iter_mut()).enumerate() {
                tex.layout
                    .transition(ImageLayout::Undefined, ImageLayout::TransferDst)?;
                encoder.copy_buffer_to_texture(
                    wgpu::TexelCopyBufferInfo {
                        buffer: &staging,
                        layout: wgpu::TexelCopyBufferLayout {
                            offset: placement.offsets[i],
                            bytes_per_row: Some(measured[i].0),
                            rows_per_image: Some(image.height),
                        },
                    },
                    wgpu::TexelCopyTextureInfo {
                        texture: &tex.texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    wgpu::Extent3d {
                        width: image.width,
                        height: image.height,
                        depth_or_array_layers: 1,
                    },
                );
                tex.layout
                    .transition(ImageLayout::TransferDst, ImageLayout::ShaderReadOnly)?;
            }
            queue.submit(std::iter::once(encoder.finish()));
        }

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("plateau material sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::debug!(
            "uploaded {} textures through {staging_bytes} staging bytes",
            textures.len()
        );

        Ok(Self {
            textures,
            sampler,
            staging_bytes,
        })
    }

    #[inline]
    pub fn textures(&self) -> &[SampledTexture] {
        &self.textures
    }

    #[inline]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Size of the shared staging allocation used for the upload.
    #[inline]
    pub fn staging_bytes(&self) -> u64 {
        self.staging_bytes
    }
}
