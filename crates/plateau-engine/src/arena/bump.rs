use std::ops::Range;

use super::ArenaError;
use crate::memory::align_up;

/// Linear allocator over `[0, capacity)`.
///
/// Allocations are never freed individually; the whole range is recycled with
/// [`BumpAllocator::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpAllocator {
    capacity: u64,
    cursor: u64,
}

impl BumpAllocator {
    pub const fn new(capacity: u64) -> Self {
        Self {
            capacity,
            cursor: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.capacity - self.cursor
    }

    /// Computes the range the next allocation would get, without taking it.
    pub fn reserve(&self, size: u64, alignment: u64) -> Result<Range<u64>, ArenaError> {
        let overflow = ArenaError::OutOfArenaSpace {
            requested: size,
            cursor: self.cursor,
            capacity: self.capacity,
        };

        let start = align_up(self.cursor, alignment);
        let end = start.checked_add(size).ok_or(overflow.clone())?;
        if end > self.capacity {
            return Err(overflow);
        }
        Ok(start..end)
    }

    /// Takes `size` bytes at the next `alignment` boundary.
    ///
    /// On failure the cursor does not move.
    pub fn allocate(&mut self, size: u64, alignment: u64) -> Result<Range<u64>, ArenaError> {
        let range = self.reserve(size, alignment)?;
        self.cursor = range.end;
        Ok(range)
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
