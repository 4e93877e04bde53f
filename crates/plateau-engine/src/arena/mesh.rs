use std::ops::Range;

use super::{ArenaError, BumpAllocator};
use crate::memory::{
    align_up, create_buffer, upload_via_staging, BufferSpec, MemoryFlags, MemoryProperties,
    StagedWrite,
};

/// Where one mesh lives inside the arena buffer.
///
/// Allocations are immutable; a mesh is never resized in place.
#[derive(Debug, PartialEq, Eq)]
pub struct MeshAllocation {
    vertices: Range<u64>,
    indices: Range<u64>,
    index_count: u32,
}

impl MeshAllocation {
    /// Byte range of the vertex data.
    #[inline]
    pub fn vertices(&self) -> Range<u64> {
        self.vertices.clone()
    }

    /// Byte range of the `u16` index data.
    #[inline]
    pub fn indices(&self) -> Range<u64> {
        self.indices.clone()
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Runs `write` against the buffer in `slot`, creating it first when absent.
/// A buffer created for a failed write is dropped, not kept.
fn write_into<T>(
    slot: &mut Option<T>,
    create: impl FnOnce() -> Result<T, ArenaError>,
    write: impl FnOnce(&T) -> Result<(), ArenaError>,
) -> Result<(), ArenaError> {
    if let Some(buffer) = slot.as_ref() {
        return write(buffer);
    }
    let buffer = create()?;
    write(&buffer)?;
    *slot = Some(buffer);
    Ok(())
}

/// One device-local buffer shared by every loaded mesh.
///
/// The buffer is created with the first mesh and dropped with the last one,
/// which also rewinds the allocator.
pub struct MeshArena {
    bump: BumpAllocator,
    buffer: Option<wgpu::Buffer>,
    live: usize,
}

impl MeshArena {
    pub fn new(capacity: u64) -> Self {
        Self {
            bump: BumpAllocator::new(capacity),
            buffer: None,
            live: 0,
        }
    }

    /// The arena buffer, if any mesh is loaded.
    #[inline]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    #[inline]
    pub fn live_meshes(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn used_bytes(&self) -> u64 {
        self.bump.cursor()
    }

    /// Copies a mesh into the arena.
    ///
    /// Vertex and index parts are each padded to `COPY_BUFFER_ALIGNMENT`. When
    /// the mesh does not fit, nothing is allocated and the error reports the
    /// current cursor.
    pub fn allocate_mesh<V: bytemuck::Pod>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        properties: &MemoryProperties,
        vertices: &[V],
        indices: &[u16],
    ) -> Result<MeshAllocation, ArenaError> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(ArenaError::EmptyMesh);
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(indices);
        let vertex_span = align_up(vertex_bytes.len() as u64, wgpu::COPY_BUFFER_ALIGNMENT);
        let index_span = align_up(index_bytes.len() as u64, wgpu::COPY_BUFFER_ALIGNMENT);

        let range = self
            .bump
            .reserve(vertex_span + index_span, wgpu::COPY_BUFFER_ALIGNMENT)?;

        let capacity = self.bump.capacity();
        let vertex_start = range.start;
        let index_start = range.start + vertex_span;
        write_into(
            &mut self.buffer,
            || {
                let buffer = create_buffer(
                    device,
                    properties,
                    &BufferSpec {
                        label: "plateau mesh arena",
                        size: capacity,
                        usages: wgpu::BufferUsages::VERTEX
                            | wgpu::BufferUsages::INDEX
                            | wgpu::BufferUsages::COPY_DST,
                        memory: MemoryFlags::DEVICE_LOCAL,
                        mapped_at_creation: false,
                    },
                )?;
                log::info!("mesh arena created ({capacity} bytes)");
                Ok(buffer)
            },
            |buffer| {
                upload_via_staging(
                    device,
                    queue,
                    properties,
                    buffer,
                    &[
                        StagedWrite {
                            dst_offset: vertex_start,
                            bytes: vertex_bytes,
                        },
                        StagedWrite {
                            dst_offset: index_start,
                            bytes: index_bytes,
                        },
                    ],
                )?;
                Ok(())
            },
        )?;

        self.bump.allocate(vertex_span + index_span, wgpu::COPY_BUFFER_ALIGNMENT)?;
        self.live += 1;

        Ok(MeshAllocation {
            vertices: vertex_start..vertex_start + vertex_bytes.len() as u64,
            indices: index_start..index_start + index_bytes.len() as u64,
            index_count: indices.len() as u32,
        })
    }

    /// Gives a mesh back. The arena buffer goes away with the last mesh.
    pub fn release_mesh(&mut self, allocation: MeshAllocation) -> Result<(), ArenaError> {
        if self.live == 0 {
            return Err(ArenaError::NoLiveMeshes);
        }
        drop(allocation);

        self.live -= 1;
        if self.live == 0 {
            self.buffer = None;
            self.bump.reset();
            log::info!("mesh arena released");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryError;

    fn failing_write(_: &u32) -> Result<(), ArenaError> {
        Err(ArenaError::Memory(MemoryError::InvalidAlignment(3)))
    }

    #[test]
    fn buffer_created_for_a_failed_write_is_not_kept() {
        let mut slot: Option<u32> = None;
        assert!(write_into(&mut slot, || Ok(7), failing_write).is_err());
        assert_eq!(slot, None);
    }

    #[test]
    fn buffer_is_kept_after_a_successful_write() {
        let mut slot: Option<u32> = None;
        write_into(&mut slot, || Ok(7), |_| Ok(())).unwrap();
        assert_eq!(slot, Some(7));
    }

    #[test]
    fn existing_buffer_survives_a_failed_write() {
        let mut slot = Some(7u32);
        let mut created = false;
        let result = write_into(
            &mut slot,
            || {
                created = true;
                Ok(9)
            },
            failing_write,
        );
        assert!(result.is_err());
        assert!(!created);
        assert_eq!(slot, Some(7));
    }

    #[test]
    fn creation_failure_leaves_the_slot_empty() {
        let mut slot: Option<u32> = None;
        let result = write_into(
            &mut slot,
            || Err(ArenaError::Memory(MemoryError::InvalidAlignment(3))),
            |_| Ok(()),
        );
        assert!(result.is_err());
        assert_eq!(slot, None);
    }
}
