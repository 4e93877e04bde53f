//! Render pass graph.
//!
//! Two passes share one draw shape: the on-screen pass shades every
//! renderable with its material, the picking pass writes each object's id into
//! an offscreen target.
//!
//! Convention:
//! - right-handed world space, depth range [0, 1]
//! - group 0 camera, group 1 object, group 2 material

mod blocks;
mod camera;
mod draw;
mod layouts;
mod material;
mod onscreen;
mod pick_pass;

pub use blocks::{CameraBlock, ObjectBlock, Vertex};
pub use camera::Camera;
pub use draw::{DrawItem, FrameBindings};
pub use layouts::SceneLayouts;
pub use material::{Material, ShadedPipeline};
pub use onscreen::OnScreenPass;
pub use pick_pass::PickingPass;
