use std::sync::mpsc;
use std::time::Duration;

use super::tracker::{ReadbackPhase, ReadbackTracker};
use super::{decode_at, decode_at_stride, strip_row_padding, Cursor, PickError, PickSample, PickingTarget};
use crate::frame::Extent;
use crate::memory::{align_up, create_buffer, BufferSpec, MemoryFlags, MemoryProperties};

type MapResult = Result<(), wgpu::BufferAsyncError>;

/// Byte shape of one readback buffer: rows padded for texture-to-buffer copies.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReadbackShape {
    pub extent: Extent,
    pub padded_row: u32,
}

impl ReadbackShape {
    pub fn for_extent(extent: Extent) -> Self {
        let padded_row = align_up(extent.width as u64 * 4, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64);
        Self {
            extent,
            padded_row: padded_row as u32,
        }
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.padded_row as u64 * self.extent.height as u64
    }
}

/// Tightly packed copy of a decoded picking image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickingImage {
    /// Frame the ids were drawn in.
    pub frame: u64,
    pub extent: Extent,
    /// `width * height` RGBA8 texels.
    pub pixels: Vec<u8>,
}

impl PickingImage {
    /// Raw value at `cursor`, `None` outside the image.
    pub fn value_at(&self, cursor: Cursor) -> Option<u32> {
        decode_at(&self.pixels, self.extent.width, self.extent.height, cursor.x, cursor.y)
    }
}

struct Mapping {
    submission: Option<wgpu::SubmissionIndex>,
    rx: mpsc::Receiver<MapResult>,
}

struct ReadbackSlot {
    buffer: wgpu::Buffer,
    shape: ReadbackShape,
    mapping: Option<Mapping>,
}

impl ReadbackSlot {
    fn new(
        device: &wgpu::Device,
        properties: &MemoryProperties,
        slot: usize,
        shape: ReadbackShape,
    ) -> Result<Self, PickError> {
        let buffer = create_buffer(
            device,
            properties,
            &BufferSpec {
                label: &format!("plateau picking readback (slot {slot})"),
                size: shape.size(),
                usages: wgpu::BufferUsages::COPY_DST,
                memory: MemoryFlags::HOST_VISIBLE | MemoryFlags::HOST_CACHED,
                mapped_at_creation: false,
            },
        )?;
        Ok(Self {
            buffer,
            shape,
            mapping: None,
        })
    }
}

/// Per-frame-slot readback of the picking target.
///
/// Buffers are created on first use and rebuilt when the target size changes.
pub struct PickingReadback {
    slots: Vec<Option<ReadbackSlot>>,
    tracker: ReadbackTracker,
    fence_timeout: Duration,
}

impl PickingReadback {
    pub fn new(frames_in_flight: usize, fence_timeout: Duration) -> Self {
        Self {
            slots: (0..frames_in_flight).map(|_| None).collect(),
            tracker: ReadbackTracker::new(frames_in_flight),
            fence_timeout,
        }
    }

    /// Newest sample decoded so far.
    #[inline]
    pub fn latest(&self) -> Option<PickSample> {
        self.tracker.latest()
    }

    /// Whether any readback is recorded or in flight.
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.tracker.has_pending()
    }

    /// Drops the newest sample and every readback recorded so far. Used when
    /// ids change meaning or the cursor goes away.
    pub fn invalidate(&mut self) {
        self.tracker.invalidate();
    }

    /// Records the copy of the picking target into `slot`'s buffer.
    ///
    /// A readback still in flight on this slot is resolved first; the slot's
    /// fence has already been waited on, so this does not stall the GPU.
    #[allow(clippy::too_many_arguments)]
    pub fn schedule_transfer(
        &mut self,
        device: &wgpu::Device,
        properties: &MemoryProperties,
        encoder: &mut wgpu::CommandEncoder,
        target: &mut PickingTarget,
        slot: usize,
        frame: u64,
        cursor: Cursor,
    ) -> Result<(), PickError> {
        self.resolve(device, slot)?;

        let was_mapped = self.tracker.recycle(slot)?;
        let entry = self.slots.get_mut(slot).ok_or(PickError::NoSuchSlot(slot))?;
        if was_mapped {
            if let Some(rb) = entry.as_ref() {
                rb.buffer.unmap();
            }
        }

        let shape = ReadbackShape::for_extent(target.extent());
        if entry.as_ref().is_none_or(|rb| rb.shape != shape) {
            *entry = Some(ReadbackSlot::new(device, properties, slot, shape)?);
        }
        let Some(rb) = entry.as_ref() else {
            return Err(PickError::NoSuchSlot(slot));
        };

        let texture = target.begin_transfer()?;
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &rb.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(shape.padded_row),
                    rows_per_image: Some(shape.extent.height),
                },
            },
            shape.extent.to_wgpu(),
        );

        self.tracker.record(slot, frame, cursor)
    }

    /// Drops a recorded copy that will never be submitted.
    pub fn cancel(&mut self, slot: usize) {
        self.tracker.cancel(slot);
    }

    /// Starts mapping `slot`'s buffer. Call after the frame has been submitted.
    pub fn after_submit(&mut self, slot: usize, submission: Option<wgpu::SubmissionIndex>) {
        let Some(Some(rb)) = self.slots.get_mut(slot) else {
            return;
        };
        if !self.tracker.submitted(slot) {
            return;
        }

        let (tx, rx) = mpsc::channel();
        rb.buffer.slice(..).map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        rb.mapping = Some(Mapping { submission, rx });
    }

    /// Collects every readback whose mapping has completed, without blocking.
    ///
    /// The caller is expected to have polled the device.
    pub fn collect(&mut self) -> Result<Option<PickSample>, PickError> {
        for slot in 0..self.slots.len() {
            self.try_finish(slot)?;
        }
        Ok(self.tracker.latest())
    }

    /// Blocks until `slot`'s in-flight readback (if any) is decoded.
    pub fn resolve(&mut self, device: &wgpu::Device, slot: usize) -> Result<(), PickError> {
        if self.try_finish(slot)? {
            return Ok(());
        }

        let submission = self
            .slots
            .get(slot)
            .and_then(Option::as_ref)
            .and_then(|rb| rb.mapping.as_ref())
            .and_then(|m| m.submission.clone());
        device
            .poll(wgpu::PollType::Wait {
                submission_index: submission,
                timeout: Some(self.fence_timeout),
            })
            .map_err(|e| PickError::MapFailed {
                slot,
                reason: e.to_string(),
            })?;

        if !self.try_finish(slot)? {
            return Err(PickError::MapFailed {
                slot,
                reason: "mapping incomplete after its submission finished".into(),
            });
        }
        Ok(())
    }

    /// Blocks until every in-flight readback is decoded.
    pub fn resolve_all(&mut self, device: &wgpu::Device) -> Result<Option<PickSample>, PickError> {
        for slot in 0..self.slots.len() {
            self.resolve(device, slot)?;
        }
        Ok(self.tracker.latest())
    }

    /// Tight copy of `slot`'s mapped image, row padding removed.
    pub fn get_image(&self, slot: usize) -> Option<Vec<u8>> {
        if self.tracker.phase(slot) != Some(ReadbackPhase::Mapped) {
            return None;
        }
        let rb = self.slots.get(slot)?.as_ref()?;
        let data = rb.buffer.slice(..).get_mapped_range();
        Some(strip_row_padding(
            &data,
            rb.shape.padded_row as usize,
            rb.shape.extent.width,
            rb.shape.extent.height,
        ))
    }

    /// The image behind [`Self::latest`], while its slot has not been reused.
    pub fn latest_image(&self) -> Option<PickingImage> {
        let sample = self.tracker.latest()?;
        let slot = self.tracker.latest_slot()?;
        let extent = self.slots.get(slot)?.as_ref()?.shape.extent;
        Some(PickingImage {
            frame: sample.frame,
            extent,
            pixels: self.get_image(slot)?,
        })
    }

    /// Drops all buffers, e.g. before the device goes away.
    pub fn clear(&mut self) {
        for slot in 0..self.slots.len() {
            if let Some(rb) = self.slots[slot].take() {
                if self.tracker.phase(slot) == Some(ReadbackPhase::Mapped) {
                    rb.buffer.unmap();
                }
            }
        }
        self.tracker.clear();
    }

    /// Checks one slot for a finished mapping and decodes it. Returns whether
    /// the slot no longer has a readback in flight.
    fn try_finish(&mut self, slot: usize) -> Result<bool, PickError> {
        let Some(Some(rb)) = self.slots.get_mut(slot) else {
            return Ok(true);
        };
        let Some(mapping) = rb.mapping.as_ref() else {
            return Ok(true);
        };

        let result = match mapping.rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return Ok(false),
            Err(mpsc::TryRecvError::Disconnected) => Err(wgpu::BufferAsyncError),
        };
        rb.mapping = None;

        if let Err(e) = result {
            self.tracker.failed(slot);
            return Err(PickError::MapFailed {
                slot,
                reason: e.to_string(),
            });
        }

        let shape = rb.shape;
        let buffer = &rb.buffer;
        self.tracker.finished(slot, |cursor| {
            let data = buffer.slice(..).get_mapped_range();
            decode_at_stride(
                &data,
                shape.padded_row as usize,
                shape.extent.width,
                shape.extent.height,
                cursor.x,
                cursor.y,
            )
        })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readback_rows_are_padded_to_copy_alignment() {
        let shape = ReadbackShape::for_extent(Extent::new(1, 3));
        assert_eq!(shape.padded_row, 256);
        assert_eq!(shape.size(), 256 * 3);

        assert_eq!(ReadbackShape::for_extent(Extent::new(64, 2)).padded_row, 256);
        assert_eq!(ReadbackShape::for_extent(Extent::new(65, 2)).padded_row, 512);
    }

    #[test]
    fn shape_changes_with_either_dimension() {
        let base = ReadbackShape::for_extent(Extent::new(64, 64));
        assert_eq!(base, ReadbackShape::for_extent(Extent::new(64, 64)));
        assert_ne!(base, ReadbackShape::for_extent(Extent::new(64, 32)));
        assert_ne!(base, ReadbackShape::for_extent(Extent::new(60, 64)));
    }

    #[test]
    fn picking_image_reads_values_under_a_cursor() {
        let mut pixels = Vec::new();
        for id in [0u32, 1, 2, 3] {
            pixels.extend_from_slice(&crate::picking::encode_id(id).unwrap());
        }
        let image = PickingImage {
            frame: 9,
            extent: Extent::new(2, 2),
            pixels,
        };
        assert_eq!(image.value_at(Cursor::new(1.0, 0.0)), Some(1));
        assert_eq!(image.value_at(Cursor::new(0.0, 1.0)), Some(2));
        assert_eq!(image.value_at(Cursor::new(2.0, 0.0)), None);
    }
}
