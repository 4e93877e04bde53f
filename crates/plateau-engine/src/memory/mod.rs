//! Device memory primitives.
//!
//! wgpu owns the actual device allocations. This module decides:
//! - which memory class a buffer lives in (memory-type search)
//! - where sub-allocations go inside one shared block (measure, then place)
//! - how bytes reach device-local buffers (short-lived staging copies)

mod buffer;
mod error;
mod packing;
mod types;

pub use buffer::{create_buffer, upload_via_staging, BufferSpec, StagedWrite};
pub use error::MemoryError;
pub use packing::{align_up, plan_placements, MemoryRequirements, Placement};
pub use types::{find_memory_type, MemoryFlags, MemoryProperties, MemoryType};
