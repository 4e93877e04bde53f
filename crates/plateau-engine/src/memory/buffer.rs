use super::{
    align_up, find_memory_type, plan_placements, MemoryError, MemoryFlags, MemoryProperties,
    MemoryRequirements,
};

/// Description of a buffer to create in a particular memory class.
#[derive(Debug, Clone)]
pub struct BufferSpec<'a> {
    /// Debug label, visible in graphics debuggers.
    pub label: &'a str,
    pub size: u64,
    pub usages: wgpu::BufferUsages,
    /// Flags the chosen memory type must provide.
    pub memory: MemoryFlags,
    pub mapped_at_creation: bool,
}

/// Creates a buffer in the first memory type compatible with `spec`.
///
/// The memory type's realizing usages are added to the requested ones, so a
/// host-visible request becomes a mappable buffer.
pub fn create_buffer(
    device: &wgpu::Device,
    properties: &MemoryProperties,
    spec: &BufferSpec<'_>,
) -> Result<wgpu::Buffer, MemoryError> {
    let bits = properties.requirement_bits(spec.usages);
    let index = find_memory_type(bits, spec.memory, properties)?;
    let ty = properties.types()[index as usize];

    log::debug!(
        "buffer '{}': {} bytes in memory type {index} ({:?})",
        spec.label,
        spec.size,
        ty.flags
    );

    Ok(device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(spec.label),
        size: spec.size,
        usage: spec.usages | ty.realized_usages,
        mapped_at_creation: spec.mapped_at_creation,
    }))
}

/// One region to fill inside a destination buffer.
#[derive(Debug, Copy, Clone)]
pub struct StagedWrite<'a> {
    /// Must be a multiple of `wgpu::COPY_BUFFER_ALIGNMENT`.
    pub dst_offset: u64,
    pub bytes: &'a [u8],
}

impl StagedWrite<'_> {
    /// Copy size, padded so the copy is legal.
    fn padded_len(&self) -> u64 {
        align_up(self.bytes.len() as u64, wgpu::COPY_BUFFER_ALIGNMENT)
    }
}

/// Uploads `writes` into `dst` through one short-lived host-visible staging buffer.
///
/// All regions share the staging allocation; each is copied device-side with
/// its own `copy_buffer_to_buffer`. The returned index can be waited on.
/// Padding bytes written past each region are zero; `dst` must have room for them.
pub fn upload_via_staging(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    properties: &MemoryProperties,
    dst: &wgpu::Buffer,
    writes: &[StagedWrite<'_>],
) -> Result<wgpu::SubmissionIndex, MemoryError> {
    for w in writes {
        if w.dst_offset % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
            return Err(MemoryError::UnalignedCopy(w.dst_offset));
        }
    }

    let reqs: Vec<MemoryRequirements> = writes
        .iter()
        .map(|w| MemoryRequirements::new(w.padded_len(), wgpu::COPY_BUFFER_ALIGNMENT))
        .collect();
    let placement = plan_placements(&reqs)?;

    if placement.total == 0 {
        return Ok(queue.submit(std::iter::empty::<wgpu::CommandBuffer>()));
    }

    let staging = create_buffer(
        device,
        properties,
        &BufferSpec {
            label: "plateau staging",
            size: placement.total,
            usages: wgpu::BufferUsages::COPY_SRC,
            memory: MemoryFlags::HOST_VISIBLE | MemoryFlags::HOST_COHERENT,
            mapped_at_creation: true,
        },
    )?;

    {
        let mut mapped = staging.slice(..).get_mapped_range_mut();
        for (i, w) in writes.iter().enumerate() {
            let start = placement.offsets[i] as usize;
            mapped[start..start + w.bytes.len()].copy_from_slice(w.bytes);
        }
    }
    staging.unmap();

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("plateau staging upload"),
    });
    for (i, (w, req)) in writes.iter().zip(&reqs).enumerate() {
        if req.size == 0 {
            continue;
        }
        encoder.copy_buffer_to_buffer(&staging, placement.offsets[i], dst, w.dst_offset, req.size);
    }

    // The staging buffer is dropped here; wgpu keeps it alive until the copy retires.
    Ok(queue.submit(std::iter::once(encoder.finish())))
}
