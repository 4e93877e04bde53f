//! Measure-then-place layout of several resources inside one allocation.

use super::MemoryError;

/// Size and alignment of one resource that shares an allocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryRequirements {
    pub size: u64,
    pub alignment: u64,
}

impl MemoryRequirements {
    pub const fn new(size: u64, alignment: u64) -> Self {
        Self { size, alignment }
    }
}

/// Result of the measure pass: one offset per resource plus the total size.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Placement {
    pub offsets: Vec<u64>,
    pub total: u64,
}

impl Placement {
    /// Byte range of resource `i` given its requirements.
    pub fn range(&self, i: usize, req: &MemoryRequirements) -> std::ops::Range<u64> {
        let start = self.offsets[i];
        start..start + req.size
    }
}

/// Rounds `value` up to the next multiple of `alignment`.
///
/// `alignment` must be a power of two; zero is treated as one.
#[inline]
pub const fn align_up(value: u64, alignment: u64) -> u64 {
    if alignment <= 1 {
        return value;
    }
    (value + alignment - 1) & !(alignment - 1)
}

/// Measures where each resource goes when packed back to back.
///
/// Every offset is aligned to that resource's alignment. The total is the end
/// of the last resource; it is not padded further.
pub fn plan_placements(reqs: &[MemoryRequirements]) -> Result<Placement, MemoryError> {
    let mut offsets = Vec::with_capacity(reqs.len());
    let mut cursor = 0u64;

    for req in reqs {
        if req.alignment != 0 && !req.alignment.is_power_of_two() {
            return Err(MemoryError::InvalidAlignment(req.alignment));
        }
        let offset = align_up(cursor, req.alignment);
        offsets.push(offset);
        cursor = offset + req.size;
    }

    Ok(Placement {
        offsets,
        total: cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── align_up ──────────────────────────────────────────────────────────

    #[test]
    fn align_up_rounds_to_multiple() {
        assert_eq!(align_up(0, 256), 0);
        assert_eq!(align_up(1, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(257, 4), 260);
    }

    #[test]
    fn align_up_of_one_is_identity() {
        assert_eq!(align_up(13, 1), 13);
        assert_eq!(align_up(13, 0), 13);
    }

    // ── plan_placements ───────────────────────────────────────────────────

    #[test]
    fn empty_input_has_zero_total() {
        assert_eq!(plan_placements(&[]).unwrap(), Placement::default());
    }

    #[test]
    fn offsets_are_aligned_and_disjoint() {
        let reqs = [
            MemoryRequirements::new(100, 256),
            MemoryRequirements::new(3, 4),
            MemoryRequirements::new(4096, 256),
            MemoryRequirements::new(10, 16),
        ];
        let p = plan_placements(&reqs).unwrap();

        for (i, req) in reqs.iter().enumerate() {
            assert_eq!(p.offsets[i] % req.alignment, 0, "resource {i} misaligned");
        }
        for i in 1..reqs.len() {
            assert!(p.range(i - 1, &reqs[i - 1]).end <= p.offsets[i]);
        }
        let last = reqs.len() - 1;
        assert_eq!(p.total, p.offsets[last] + reqs[last].size);
    }

    #[test]
    fn concrete_layout() {
        let reqs = [
            MemoryRequirements::new(100, 256),
            MemoryRequirements::new(3, 4),
            MemoryRequirements::new(8, 256),
        ];
        let p = plan_placements(&reqs).unwrap();
        assert_eq!(p.offsets, vec![0, 100, 256]);
        assert_eq!(p.total, 264);
    }

    #[test]
    fn non_power_of_two_alignment_is_rejected() {
        let err = plan_placements(&[MemoryRequirements::new(8, 12)]).unwrap_err();
        assert_eq!(err, MemoryError::InvalidAlignment(12));
    }
}
