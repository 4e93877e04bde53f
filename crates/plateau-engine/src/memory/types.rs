use bitflags::bitflags;

use super::MemoryError;

bitflags! {
    /// Property flags of a memory class.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct MemoryFlags: u32 {
        /// Fastest for device access; not necessarily mappable.
        const DEVICE_LOCAL  = 1 << 0;
        /// The host can write or read the memory.
        const HOST_VISIBLE  = 1 << 1;
        /// Host writes become visible without explicit flushes.
        const HOST_COHERENT = 1 << 2;
        /// Host reads are cached (readback).
        const HOST_CACHED   = 1 << 3;
    }
}

/// One memory class a buffer can be placed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryType {
    pub flags: MemoryFlags,

    /// Usages added to a buffer so that it actually lands in this class.
    pub realized_usages: wgpu::BufferUsages,

    /// Usages that may coexist with this class.
    pub compatible_usages: wgpu::BufferUsages,
}

/// The table of memory classes available on a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryProperties {
    types: Vec<MemoryType>,
}

impl MemoryProperties {
    pub fn new(types: Vec<MemoryType>) -> Self {
        Self { types }
    }

    /// Memory classes reachable through wgpu buffer usages.
    ///
    /// Index order matters: the search picks the first match, so device-local
    /// comes before the host-visible classes.
    pub fn wgpu() -> Self {
        use wgpu::BufferUsages as U;

        let non_mapping = U::all().difference(U::MAP_READ | U::MAP_WRITE);

        Self::new(vec![
            MemoryType {
                flags: MemoryFlags::DEVICE_LOCAL,
                realized_usages: U::empty(),
                compatible_usages: non_mapping,
            },
            MemoryType {
                flags: MemoryFlags::HOST_VISIBLE | MemoryFlags::HOST_COHERENT,
                realized_usages: U::MAP_WRITE | U::COPY_SRC,
                compatible_usages: U::COPY_SRC,
            },
            MemoryType {
                flags: MemoryFlags::HOST_VISIBLE
                    | MemoryFlags::HOST_COHERENT
                    | MemoryFlags::HOST_CACHED,
                realized_usages: U::MAP_READ | U::COPY_DST,
                compatible_usages: U::COPY_DST,
            },
            // Queue-written memory: host writes go through `Queue::write_buffer`.
            MemoryType {
                flags: MemoryFlags::DEVICE_LOCAL
                    | MemoryFlags::HOST_VISIBLE
                    | MemoryFlags::HOST_COHERENT,
                realized_usages: U::COPY_DST,
                compatible_usages: non_mapping,
            },
        ])
    }

    #[inline]
    pub fn types(&self) -> &[MemoryType] {
        &self.types
    }

    /// Returns the requirement mask for a buffer with `usages`.
    ///
    /// Bit `i` is set when memory type `i` can back such a buffer. wgpu only
    /// allows `MAP_READ` next to `COPY_DST` and `MAP_WRITE` next to `COPY_SRC`,
    /// which is what excludes the mappable classes for most resources.
    pub fn requirement_bits(&self, usages: wgpu::BufferUsages) -> u32 {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, t)| t.compatible_usages.contains(usages))
            .fold(0u32, |bits, (i, _)| bits | (1 << i))
    }
}

/// Picks the first memory type allowed by `type_bits` whose flags contain `required`.
pub fn find_memory_type(
    type_bits: u32,
    required: MemoryFlags,
    properties: &MemoryProperties,
) -> Result<u32, MemoryError> {
    properties
        .types()
        .iter()
        .enumerate()
        .find(|(i, t)| type_bits & (1 << i) != 0 && t.flags.contains(required))
        .map(|(i, _)| i as u32)
        .ok_or(MemoryError::NoSuitableMemoryType { type_bits, required })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::BufferUsages as U;

    fn props() -> MemoryProperties {
        MemoryProperties::wgpu()
    }

    // ── find_memory_type ──────────────────────────────────────────────────

    #[test]
    fn picks_first_type_with_superset_flags() {
        let i = find_memory_type(0b1111, MemoryFlags::HOST_VISIBLE, &props()).unwrap();
        assert_eq!(i, 1);
    }

    #[test]
    fn respects_requirement_mask() {
        // Type 1 is masked out, so the next host-visible type wins.
        let i = find_memory_type(0b1101, MemoryFlags::HOST_VISIBLE, &props()).unwrap();
        assert_eq!(i, 2);
    }

    #[test]
    fn no_match_is_an_error() {
        let err = find_memory_type(0b0001, MemoryFlags::HOST_VISIBLE, &props()).unwrap_err();
        assert_eq!(
            err,
            MemoryError::NoSuitableMemoryType {
                type_bits: 0b0001,
                required: MemoryFlags::HOST_VISIBLE,
            }
        );
    }

    #[test]
    fn empty_required_flags_take_first_allowed_type() {
        assert_eq!(find_memory_type(0b0100, MemoryFlags::empty(), &props()).unwrap(), 2);
    }

    // ── requirement_bits ──────────────────────────────────────────────────

    #[test]
    fn vertex_buffers_cannot_be_mapped() {
        assert_eq!(props().requirement_bits(U::VERTEX | U::INDEX | U::COPY_DST), 0b1001);
    }

    #[test]
    fn readback_copy_target_may_use_cached_memory() {
        assert_eq!(props().requirement_bits(U::COPY_DST), 0b1101);
    }

    #[test]
    fn uniform_pool_lands_in_queue_written_memory() {
        let p = props();
        let bits = p.requirement_bits(U::UNIFORM);
        let i = find_memory_type(bits, MemoryFlags::HOST_VISIBLE | MemoryFlags::HOST_COHERENT, &p)
            .unwrap();
        assert_eq!(i, 3);
        assert!(p.types()[i as usize].realized_usages.contains(U::COPY_DST));
    }

    #[test]
    fn cached_uniform_memory_does_not_exist() {
        let p = props();
        let bits = p.requirement_bits(U::UNIFORM);
        assert!(find_memory_type(bits, MemoryFlags::HOST_CACHED, &p).is_err());
    }
}
