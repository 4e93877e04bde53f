use winit::window::Window;

use crate::device::Gpu;
use crate::input::{InputFrame, InputState};
use crate::render::Camera;
use crate::renderer::{FrameReport, RenderError, Renderer};
use crate::time::FrameTime;

/// Context handed to `App::on_start`.
///
/// `'w` is the window-borrow lifetime carried by `Gpu<'w>`.
pub struct StartCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a Gpu<'w>,
    pub renderer: &'a mut Renderer<Gpu<'w>>,
}

/// Per-frame context passed to `App::on_frame`.
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub renderer: &'a mut Renderer<Gpu<'w>>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
}

impl FrameCtx<'_, '_> {
    /// Width over height of the drawable, 1.0 while minimized.
    pub fn aspect_ratio(&self) -> f32 {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return 1.0;
        }
        size.width as f32 / size.height as f32
    }

    /// Picks under the current pointer, renders and presents one frame.
    pub fn render(&mut self, camera: &Camera) -> Result<FrameReport, RenderError> {
        self.renderer.set_cursor(self.input.cursor());
        self.window.pre_present_notify();
        self.renderer.run_frame(self.gpu, camera)
    }
}
