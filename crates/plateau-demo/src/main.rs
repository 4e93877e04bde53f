use anyhow::{Context, Result};
use glam::Vec3;

use plateau_engine::core::{App, AppControl, FrameCtx, StartCtx};
use plateau_engine::device::GpuInit;
use plateau_engine::input::{Key, MouseButton};
use plateau_engine::io::{load_image, ImageData, MeshData};
use plateau_engine::logging::{init_logging, LoggingConfig};
use plateau_engine::render::Camera;
use plateau_engine::frame::FrameError;
use plateau_engine::renderer::{FrameOutcome, RenderError, RendererConfig};
use plateau_engine::scene::ObjectHandle;
use plateau_engine::window::{Runtime, RuntimeConfig};

const MATERIAL_NAMES: [&str; 3] = ["brick", "black brick", "floor"];

/// A fence timeout costs one frame; everything else ends the demo.
fn is_fatal(err: &RenderError) -> bool {
    !matches!(err, RenderError::Frame(FrameError::Timeout(_)))
}

/// Three textured objects; hovering logs the picked object.
struct Demo {
    /// Optional image files replacing the generated textures, in material order.
    texture_paths: Vec<String>,
    objects: Vec<ObjectHandle>,
    hovered: Option<String>,
    fps_logged_at: u64,
}

impl Demo {
    fn new(texture_paths: Vec<String>) -> Self {
        Self {
            texture_paths,
            objects: Vec::new(),
            hovered: None,
            fps_logged_at: 0,
        }
    }

    fn textures(&self) -> Result<Vec<ImageData>> {
        if !self.texture_paths.is_empty() {
            return self
                .texture_paths
                .iter()
                .map(|p| load_image(p).with_context(|| format!("failed to load texture '{p}'")))
                .collect();
        }
        Ok(vec![
            ImageData::checkerboard(MATERIAL_NAMES[0], 256, 32, [178, 76, 52, 255], [120, 48, 36, 255]),
            ImageData::checkerboard(MATERIAL_NAMES[1], 256, 32, [40, 40, 40, 255], [12, 12, 12, 255]),
            ImageData::checkerboard(MATERIAL_NAMES[2], 256, 64, [200, 200, 190, 255], [150, 150, 140, 255]),
        ])
    }

    fn camera(aspect: f32) -> Camera {
        Camera::look_at_perspective(
            Vec3::splat(5.0),
            Vec3::ZERO,
            Vec3::Z,
            45f32.to_radians(),
            aspect,
            0.1,
            // Far enough to keep the object at (0, 4, 0) inside the frustum.
            20.0,
        )
    }
}

impl App for Demo {
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> Result<()> {
        let renderer = &mut *ctx.renderer;

        let pyramid = renderer.load_mesh(ctx.gpu, &MeshData::pyramid("pyramid", 0.5))?;
        let cube = renderer.load_mesh(ctx.gpu, &MeshData::cube("cube", 0.5))?;

        let textures = self.textures()?;
        let materials = renderer.create_materials(ctx.gpu, &textures)?;
        anyhow::ensure!(!materials.is_empty(), "at least one texture is required");
        let material = |i: usize| materials[i % materials.len()];

        let placements = [
            ("pyramid", pyramid, material(0), Vec3::new(1.0, 0.0, 0.0)),
            ("cube", cube, material(1), Vec3::new(-1.0, 0.0, 0.0)),
            ("far pyramid", pyramid, material(2), Vec3::new(0.0, 4.0, 0.0)),
        ];
        for (name, mesh, material, position) in placements {
            let handle = renderer.create_renderable(name, mesh, material)?;
            renderer.set_position(handle, position)?;
            self.objects.push(handle);
        }

        log::info!(
            "scene ready: {} objects, {} bytes of mesh data",
            renderer.scene().len(),
            renderer.mesh_arena_used()
        );
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }

        let camera = Self::camera(ctx.aspect_ratio());
        let report = match ctx.render(&camera) {
            Ok(report) => report,
            Err(e) if !is_fatal(&e) => {
                log::warn!("frame dropped: {e}");
                return AppControl::Continue;
            }
            Err(e) => {
                log::error!("{e:#}");
                return AppControl::Exit;
            }
        };

        if let FrameOutcome::Skipped(reason) = report.outcome {
            log::trace!("frame skipped: {reason:?}");
        }

        if let Some(pick) = &report.pick {
            let name = pick.object.as_ref().map(|o| o.name.clone());
            if name != self.hovered {
                match &name {
                    Some(n) => log::info!("hovering '{n}' (frame {})", pick.frame),
                    None => log::info!("hovering nothing"),
                }
                self.hovered = name;
            }
        }

        if ctx.input_frame.button_pressed(MouseButton::Left) {
            match &self.hovered {
                Some(n) => log::info!("clicked '{n}'"),
                None => log::info!("clicked empty space"),
            }
        }

        if ctx.time.tick >= self.fps_logged_at + 600 {
            log::debug!("{:.1} fps", ctx.time.fps);
            self.fps_logged_at = ctx.time.tick;
        }

        AppControl::Continue
    }

    fn on_close(&mut self) {
        log::info!("closing with {} objects", self.objects.len());
    }
}

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(e) = run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let texture_paths: Vec<String> = std::env::args().skip(1).collect();

    let config = RuntimeConfig {
        title: "plateau picking demo".to_string(),
        ..RuntimeConfig::default()
    };

    Runtime::run(
        config,
        GpuInit::default(),
        RendererConfig::default(),
        Demo::new(texture_paths),
    )
}
