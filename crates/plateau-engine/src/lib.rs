//! plateau engine crate.
//!
//! A mesh renderer built on wgpu: a bump-allocated mesh arena, per-object
//! uniform regions addressed by a recyclable id pool, a frames-in-flight
//! scheduler, and GPU object picking through an id-encoding render target.
//!
//! Layering, bottom-up: `memory` → `arena` → `frame` → `render` → `picking`,
//! tied together by `renderer`. `device`, `window`, `input`, `core`, `time` and
//! `logging` are the platform glue.

pub mod arena;
pub mod core;
pub mod device;
pub mod frame;
pub mod image;
pub mod input;
pub mod io;
pub mod logging;
pub mod memory;
pub mod picking;
pub mod render;
pub mod renderer;
pub mod scene;
pub mod time;
pub mod window;
