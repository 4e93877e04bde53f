//! Images: layout bookkeeping, sampled textures and attachments.

mod depth;
mod layout;
mod texture;

pub use depth::{attachment_requirements, DepthTarget, DEPTH_FORMAT};
pub use layout::{ImageLayout, LayoutError, LayoutTracker};
pub use texture::{SampledTexture, TextureError, TextureSet, TEXTURE_FORMAT};
