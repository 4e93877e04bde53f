//! Asset glue: mesh and image data handed to the renderer.
//!
//! File-format parsing for meshes is out of scope; procedural generators
//! stand in for imported geometry.

mod error;
mod image;
mod mesh;

pub use error::IoError;
pub use image::{load_image, ImageData};
pub use mesh::MeshData;
