use std::num::NonZeroU64;

use super::{ArenaError, ObjectId};
use crate::memory::{align_up, create_buffer, BufferSpec, MemoryFlags, MemoryProperties};

/// Addressing of per-(object, frame) uniform regions inside one buffer.
///
/// `offset = (id * frames_in_flight + frame) * stride`, so a frame slot never
/// writes a region the GPU may still be reading for another slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UniformLayout {
    block_size: u64,
    stride: u64,
    frames_in_flight: usize,
    max_objects: u32,
}

impl UniformLayout {
    /// `min_offset_alignment` is the device's `min_uniform_buffer_offset_alignment`.
    pub fn new(
        block_size: u64,
        min_offset_alignment: u64,
        frames_in_flight: usize,
        max_objects: u32,
    ) -> Self {
        Self {
            block_size,
            stride: align_up(block_size, min_offset_alignment),
            frames_in_flight,
            max_objects,
        }
    }

    #[inline]
    pub fn stride(&self) -> u64 {
        self.stride
    }

    #[inline]
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Total bytes covered by every region.
    pub fn total_size(&self) -> u64 {
        self.max_objects as u64 * self.frames_in_flight as u64 * self.stride
    }

    pub fn region_offset(&self, id: ObjectId, frame: usize) -> Result<u64, ArenaError> {
        if id.get() >= self.max_objects || frame >= self.frames_in_flight {
            return Err(ArenaError::RegionOutOfRange { id, frame });
        }
        let region = id.get() as u64 * self.frames_in_flight as u64 + frame as u64;
        Ok(region * self.stride)
    }
}

/// Buffer + bind group over a `UniformLayout`.
struct RegionBuffer {
    layout: UniformLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl RegionBuffer {
    fn new(
        device: &wgpu::Device,
        properties: &MemoryProperties,
        bind_group_layout: &wgpu::BindGroupLayout,
        layout: UniformLayout,
        label: &str,
    ) -> Result<Self, ArenaError> {
        let buffer = create_buffer(
            device,
            properties,
            &BufferSpec {
                label,
                size: layout.total_size(),
                usages: wgpu::BufferUsages::UNIFORM,
                memory: MemoryFlags::HOST_VISIBLE | MemoryFlags::HOST_COHERENT,
                mapped_at_creation: false,
            },
        )?;

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(layout.block_size()),
                }),
            }],
        });

        Ok(Self {
            layout,
            buffer,
            bind_group,
        })
    }

    fn write<T: bytemuck::Pod>(
        &self,
        queue: &wgpu::Queue,
        id: ObjectId,
        frame: usize,
        block: &T,
    ) -> Result<u32, ArenaError> {
        debug_assert_eq!(size_of::<T>() as u64, self.layout.block_size());
        let offset = self.layout.region_offset(id, frame)?;
        queue.write_buffer(&self.buffer, offset, bytemuck::bytes_of(block));
        Ok(offset as u32)
    }
}

/// Per-object uniform blocks, one region per (object, frame slot).
pub struct ObjectUniformPool {
    inner: RegionBuffer,
}

impl ObjectUniformPool {
    pub fn new(
        device: &wgpu::Device,
        properties: &MemoryProperties,
        bind_group_layout: &wgpu::BindGroupLayout,
        layout: UniformLayout,
    ) -> Result<Self, ArenaError> {
        let inner = RegionBuffer::new(
            device,
            properties,
            bind_group_layout,
            layout,
            "plateau object uniforms",
        )?;
        log::debug!(
            "object uniform pool: stride {} bytes, {} bytes total",
            layout.stride(),
            layout.total_size()
        );
        Ok(Self { inner })
    }

    #[inline]
    pub fn layout(&self) -> &UniformLayout {
        &self.inner.layout
    }

    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.inner.bind_group
    }

    /// Writes `block` into the (id, frame) region and returns its dynamic offset.
    pub fn write<T: bytemuck::Pod>(
        &self,
        queue: &wgpu::Queue,
        id: ObjectId,
        frame: usize,
        block: &T,
    ) -> Result<u32, ArenaError> {
        self.inner.write(queue, id, frame, block)
    }
}

/// Camera uniform block, one region per frame slot.
pub struct CameraUniforms {
    inner: RegionBuffer,
}

impl CameraUniforms {
    pub fn new(
        device: &wgpu::Device,
        properties: &MemoryProperties,
        bind_group_layout: &wgpu::BindGroupLayout,
        block_size: u64,
        min_offset_alignment: u64,
        frames_in_flight: usize,
    ) -> Result<Self, ArenaError> {
        let layout = UniformLayout::new(block_size, min_offset_alignment, frames_in_flight, 1);
        let inner = RegionBuffer::new(
            device,
            properties,
            bind_group_layout,
            layout,
            "plateau camera uniforms",
        )?;
        Ok(Self { inner })
    }

    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.inner.bind_group
    }

    /// Writes the camera block for `frame` and returns its dynamic offset.
    pub fn write<T: bytemuck::Pod>(
        &self,
        queue: &wgpu::Queue,
        frame: usize,
        block: &T,
    ) -> Result<u32, ArenaError> {
        self.inner.write(queue, ObjectId::new(0), frame, block)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn stride_is_rounded_to_device_alignment() {
        assert_eq!(UniformLayout::new(64, 256, 2, 100).stride(), 256);
        assert_eq!(UniformLayout::new(64, 64, 2, 100).stride(), 64);
        assert_eq!(UniformLayout::new(80, 32, 2, 100).stride(), 96);
    }

    #[test]
    fn offsets_follow_object_major_order() {
        let layout = UniformLayout::new(64, 256, 2, 100);
        assert_eq!(layout.region_offset(ObjectId::new(0), 0).unwrap(), 0);
        assert_eq!(layout.region_offset(ObjectId::new(0), 1).unwrap(), 256);
        assert_eq!(layout.region_offset(ObjectId::new(1), 0).unwrap(), 512);
        assert_eq!(layout.region_offset(ObjectId::new(3), 1).unwrap(), 7 * 256);
    }

    #[test]
    fn regions_are_injective_and_inside_the_buffer() {
        let layout = UniformLayout::new(64, 256, 3, 100);
        let mut seen = HashSet::new();
        for id in 0..100 {
            for frame in 0..3 {
                let off = layout.region_offset(ObjectId::new(id), frame).unwrap();
                assert_eq!(off % 256, 0);
                assert!(off + layout.block_size() <= layout.total_size());
                assert!(seen.insert(off), "duplicate region at {off}");
            }
        }
        assert_eq!(seen.len(), 300);
    }

    #[test]
    fn out_of_range_regions_are_rejected() {
        let layout = UniformLayout::new(64, 256, 2, 100);
        assert!(layout.region_offset(ObjectId::new(100), 0).is_err());
        assert_eq!(
            layout.region_offset(ObjectId::new(5), 2),
            Err(ArenaError::RegionOutOfRange {
                id: ObjectId::new(5),
                frame: 2,
            })
        );
    }
}
