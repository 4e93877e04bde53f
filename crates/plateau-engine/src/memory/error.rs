use thiserror::Error;

use super::MemoryFlags;

/// Failures of the memory primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("memory type search: no type in mask {type_bits:#06b} provides {required:?}")]
    NoSuitableMemoryType { type_bits: u32, required: MemoryFlags },

    #[error("memory placement: alignment {0} is not a power of two")]
    InvalidAlignment(u64),

    #[error("staging copy: destination offset {0} is not 4-byte aligned")]
    UnalignedCopy(u64),
}
