//! Scene objects: plain data with a tagged kind.
//!
//! The renderer owns the GPU side (uniform regions, meshes, materials); the
//! scene only records what exists and where it is.

mod object;

pub use object::{MaterialHandle, MeshHandle, ObjectHandle, ObjectKind, Scene, SceneObject};
