//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window, and wires them to the device and
//! the renderer.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
