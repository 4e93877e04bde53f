//! The renderer: owns every GPU-side structure and runs one frame per call.

mod config;
mod error;
mod report;
mod state;

pub use config::RendererConfig;
pub use error::RenderError;
pub use report::{FrameOutcome, FrameReport, PickResult, PickedObject};
pub use state::Renderer;
