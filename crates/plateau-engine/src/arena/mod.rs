//! GPU memory arena.
//!
//! - `BumpAllocator`: linear byte allocator over a fixed capacity
//! - `MeshArena`: one device-local buffer holding every mesh's vertices and indices
//! - `ObjectIdPool`: recyclable object ids, lowest free first
//! - `UniformLayout` / `ObjectUniformPool` / `CameraUniforms`: per-(object, frame)
//!   uniform regions addressed by dynamic offsets into one buffer

mod bump;
mod error;
mod ids;
mod mesh;
mod uniforms;

pub use bump::BumpAllocator;
pub use error::ArenaError;
pub use ids::{ObjectId, ObjectIdPool};
pub use mesh::{MeshAllocation, MeshArena};
pub use uniforms::{CameraUniforms, ObjectUniformPool, UniformLayout};
