//! Input subsystem.
//!
//! The public API does not expose winit types; the runtime translates
//! platform events through `translate_window_event`.

mod frame;
mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use platform::translate_window_event;
pub use state::InputState;
pub use types::{ElementState, InputEvent, Key, MouseButton, PointerButtonEvent, PointerMoveEvent};
