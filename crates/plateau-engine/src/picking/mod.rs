//! GPU object picking.
//!
//! The picking pass renders each object's id as an RGB color into an
//! offscreen target. The target is copied into a per-slot host-visible buffer
//! and decoded under the cursor once the copy has completed, a frame or more
//! later. Every result names the frame and cursor it was taken with.

mod codec;
mod decode;
mod error;
mod readback;
mod target;
mod tracker;

pub use codec::{decode_rgb, encode_id, NO_OBJECT, PICKABLE_IDS};
pub use decode::{decode_at, decode_at_stride, strip_row_padding};
pub use error::PickError;
pub use readback::{PickingImage, PickingReadback, ReadbackShape};
pub use target::{PickingTarget, PICK_FORMAT};
pub use tracker::{PickSample, ReadbackPhase, ReadbackTracker};

/// Cursor position in physical pixels, origin top-left.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
}

impl Cursor {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
