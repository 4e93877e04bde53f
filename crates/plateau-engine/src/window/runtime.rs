use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, StartCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::{translate_window_event, InputFrame, InputState};
use crate::renderer::{Renderer, RendererConfig};
use crate::time::FrameClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "plateau".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window, runs `app` until it exits or the window closes, then
    /// shuts the renderer down. Startup errors are returned.
    pub fn run<A>(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        renderer_config: RendererConfig,
        app: A,
    ) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            gpu_init,
            renderer_config,
            app,
            entry: None,
            error: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,

    // Filled right after the build; `None` only during startup and shutdown.
    #[borrows(window)]
    #[not_covariant]
    renderer: Option<Renderer<Gpu<'this>>>,
}

struct AppState<A: App + 'static> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    renderer_config: RendererConfig,
    app: A,

    entry: Option<WindowEntry>,
    error: Option<anyhow::Error>,
}

impl<A: App + 'static> AppState<A> {
    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let mut entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
            renderer_builder: |_| Ok(None),
        }
        .try_build()
        .context("GPU initialization failed for window")?;

        let renderer_config = self.renderer_config.clone();
        let app = &mut self.app;
        entry.with_mut(|f| -> Result<()> {
            let mut renderer =
                Renderer::new(&*f.gpu, renderer_config).context("failed to create renderer")?;
            app.on_start(&mut StartCtx {
                window: f.window,
                gpu: &*f.gpu,
                renderer: &mut renderer,
            })?;
            *f.renderer = Some(renderer);
            Ok(())
        })?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    /// Shuts the renderer down and drops the window.
    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut entry) = self.entry.take() {
            let app = &mut self.app;
            entry.with_mut(|f| {
                app.on_close();
                if let Some(renderer) = f.renderer.take() {
                    if let Err(e) = renderer.shutdown(f.gpu) {
                        log::error!("renderer shutdown failed: {e:#}");
                    }
                }
            });
        }
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: anyhow::Error) {
        log::error!("{e:#}");
        self.error = Some(e);
        self.close(event_loop);
    }

    fn redraw(&mut self) -> AppControl {
        let Some(entry) = self.entry.as_mut() else {
            return AppControl::Continue;
        };
        let app = &mut self.app;
        let mut control = AppControl::Continue;

        entry.with_mut(|f| {
            let time = f.clock.tick();
            if let Some(renderer) = f.renderer.as_mut() {
                let mut ctx = FrameCtx {
                    window: f.window,
                    gpu: f.gpu,
                    renderer,
                    input: f.input_state,
                    input_frame: f.input_frame,
                    time,
                };
                control = app.on_frame(&mut ctx);
            }
            f.input_frame.clear();
        });
        control
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        let Some(entry) = self.entry.as_mut() else { return };
        entry.with_mut(|f| {
            f.gpu.resize(size);
            if let Some(renderer) = f.renderer.as_mut() {
                renderer.notify_resized();
            }
            f.window.request_redraw();
        });
    }
}

impl<A: App + 'static> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }
        if let Err(e) = self.open_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw keeps the picking readback flowing.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        if let Some(ev) = translate_window_event(&event) {
            entry.with_mut(|f| f.input_state.apply_event(f.input_frame, ev));
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.close(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.close(event_loop),

            WindowEvent::Resized(size) => self.resize(size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.entry.as_ref().map(|e| e.with_window(|w| w.inner_size())) {
                    self.resize(size);
                }
            }

            WindowEvent::RedrawRequested => {
                if self.redraw() == AppControl::Exit {
                    self.close(event_loop);
                }
            }

            _ => {}
        }
    }
}
