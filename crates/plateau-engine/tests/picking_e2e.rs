//! Headless end-to-end picking: two quads, three cursor probes.
//!
//! Skips when the machine exposes no wgpu adapter.

use glam::Vec3;

use plateau_engine::device::{GpuInit, OffscreenGpu};
use plateau_engine::frame::Extent;
use plateau_engine::io::{ImageData, MeshData};
use plateau_engine::picking::{Cursor, NO_OBJECT};
use plateau_engine::render::Camera;
use plateau_engine::renderer::{RenderError, Renderer, RendererConfig};
use plateau_engine::scene::ObjectHandle;

const SIZE: u32 = 64;

fn offscreen() -> Option<OffscreenGpu> {
    let extent = Extent::new(SIZE, SIZE);
    match pollster::block_on(OffscreenGpu::new(
        extent,
        wgpu::TextureFormat::Rgba8UnormSrgb,
        GpuInit::default(),
    )) {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            eprintln!("skipping: no GPU adapter available ({e:#})");
            None
        }
    }
}

struct TwoQuads {
    gpu: OffscreenGpu,
    renderer: Renderer<OffscreenGpu>,
    left: ObjectHandle,
    right: ObjectHandle,
}

/// Identity camera, so object positions are NDC positions.
fn two_quads() -> Option<TwoQuads> {
    let gpu = offscreen()?;
    let mut renderer = Renderer::new(&gpu, RendererConfig::default()).expect("renderer");

    let quad = renderer
        .load_mesh(&gpu, &MeshData::quad("quad", 0.4))
        .expect("mesh");
    let materials = renderer
        .create_materials(
            &gpu,
            &[ImageData::checkerboard("check", 8, 2, [255, 0, 0, 255], [0, 0, 255, 255])],
        )
        .expect("materials");

    let left = renderer
        .create_renderable("left", quad, materials[0])
        .expect("left");
    renderer
        .set_position(left, Vec3::new(-0.5, 0.0, 0.5))
        .expect("position");

    let right = renderer
        .create_renderable("right", quad, materials[0])
        .expect("right");
    renderer
        .set_position(right, Vec3::new(0.5, 0.0, 0.5))
        .expect("position");

    Some(TwoQuads {
        gpu,
        renderer,
        left,
        right,
    })
}

fn pick_at(scene: &mut TwoQuads, x: f32, y: f32) -> Option<String> {
    scene.renderer.set_cursor(Some(Cursor::new(x, y)));
    let report = scene
        .renderer
        .run_frame(&mut scene.gpu, &Camera::default())
        .expect("frame");
    assert!(report.presented(), "{:?}", report.outcome);

    let pick = scene
        .renderer
        .wait_for_pick(&scene.gpu)
        .expect("readback")
        .expect("a pick was scheduled");
    assert_eq!(Some(pick.frame), report.frame);
    assert_eq!(pick.cursor, Cursor::new(x, y));
    pick.object.map(|o| o.name)
}

#[test]
fn picks_the_object_under_the_cursor() {
    let Some(mut scene) = two_quads() else { return };

    assert_eq!(scene.left.id().get(), 0);
    assert_eq!(scene.right.id().get(), 1);

    assert_eq!(pick_at(&mut scene, 16.0, 32.0).as_deref(), Some("left"));
    assert_eq!(pick_at(&mut scene, 48.0, 32.0).as_deref(), Some("right"));
    assert_eq!(pick_at(&mut scene, 32.0, 5.0), None);

    // Cycles every slot at least twice.
    assert_eq!(pick_at(&mut scene, 16.0, 32.0).as_deref(), Some("left"));

    scene.renderer.shutdown(&mut scene.gpu).expect("shutdown");
}

#[test]
fn destroyed_objects_are_no_longer_picked() {
    let Some(mut scene) = two_quads() else { return };

    scene.renderer.destroy(scene.right).expect("destroy");
    assert_eq!(pick_at(&mut scene, 48.0, 32.0), None);

    // The freed id is handed out again, to an anchor that never draws.
    let anchor = scene.renderer.create_anchor("anchor").expect("anchor");
    assert_eq!(anchor.id().get(), 1);
    assert_eq!(pick_at(&mut scene, 48.0, 32.0), None);
    assert_eq!(pick_at(&mut scene, 16.0, 32.0).as_deref(), Some("left"));

    scene.renderer.shutdown(&mut scene.gpu).expect("shutdown");
}

#[test]
fn no_pick_without_cursor_and_mesh_in_use_is_kept() {
    let Some(mut scene) = two_quads() else { return };

    let report = scene
        .renderer
        .run_frame(&mut scene.gpu, &Camera::default())
        .expect("frame");
    assert_eq!(report.frame, Some(1));
    assert!(report.pick.is_none());
    assert!(scene.renderer.wait_for_pick(&scene.gpu).expect("readback").is_none());

    let mesh = match scene.renderer.object(scene.left).map(|o| o.kind) {
        Some(plateau_engine::scene::ObjectKind::Renderable { mesh, .. }) => mesh,
        other => panic!("unexpected kind {other:?}"),
    };
    assert!(matches!(
        scene.renderer.release_mesh(mesh),
        Err(RenderError::MeshInUse(_))
    ));

    scene.renderer.destroy(scene.left).expect("destroy");
    scene.renderer.destroy(scene.right).expect("destroy");
    scene.renderer.release_mesh(mesh).expect("release");
    assert_eq!(scene.renderer.mesh_arena_used(), 0);

    scene.renderer.shutdown(&mut scene.gpu).expect("shutdown");
}

#[test]
fn resized_backend_rebuilds_targets() {
    let Some(mut scene) = two_quads() else { return };

    scene.gpu.resize(Extent::new(32, 32));
    scene.renderer.notify_resized();

    // Same NDC layout at half the resolution.
    assert_eq!(pick_at(&mut scene, 8.0, 16.0).as_deref(), Some("left"));
    assert_eq!(pick_at(&mut scene, 24.0, 16.0).as_deref(), Some("right"));

    scene.renderer.shutdown(&mut scene.gpu).expect("shutdown");
}

#[test]
fn reused_id_does_not_inherit_an_old_pick() {
    let Some(mut scene) = two_quads() else { return };
    let quad = match scene.renderer.object(scene.left).map(|o| o.kind) {
        Some(plateau_engine::scene::ObjectKind::Renderable { mesh, material }) => (mesh, material),
        other => panic!("unexpected kind {other:?}"),
    };

    assert_eq!(pick_at(&mut scene, 16.0, 32.0).as_deref(), Some("left"));

    // Pointer leaves, the picked object goes away and its id is reused.
    scene.renderer.set_cursor(None);
    scene.renderer.destroy(scene.left).expect("destroy");
    let newcomer = scene
        .renderer
        .create_renderable("newcomer", quad.0, quad.1)
        .expect("newcomer");
    assert_eq!(newcomer.id(), scene.left.id());

    let report = scene
        .renderer
        .run_frame(&mut scene.gpu, &Camera::default())
        .expect("frame");
    assert!(report.pick.is_none());
    assert!(scene.renderer.wait_for_pick(&scene.gpu).expect("readback").is_none());

    scene.renderer.shutdown(&mut scene.gpu).expect("shutdown");
}

#[test]
fn pick_still_in_flight_is_dropped_on_destroy() {
    let Some(mut scene) = two_quads() else { return };

    scene.renderer.set_cursor(Some(Cursor::new(16.0, 32.0)));
    scene
        .renderer
        .run_frame(&mut scene.gpu, &Camera::default())
        .expect("frame");
    scene.renderer.destroy(scene.left).expect("destroy");
    scene.renderer.create_anchor("anchor").expect("anchor");

    assert!(scene.renderer.wait_for_pick(&scene.gpu).expect("readback").is_none());

    scene.renderer.shutdown(&mut scene.gpu).expect("shutdown");
}

#[test]
fn picking_image_holds_the_ids_of_the_newest_pick() {
    let Some(mut scene) = two_quads() else { return };
    assert!(scene.renderer.picking_image().is_none());

    assert_eq!(pick_at(&mut scene, 48.0, 32.0).as_deref(), Some("right"));
    let image = scene.renderer.picking_image().expect("image");

    assert_eq!(image.extent, Extent::new(SIZE, SIZE));
    assert_eq!(image.pixels.len(), (SIZE * SIZE * 4) as usize);
    assert_eq!(image.value_at(Cursor::new(16.0, 32.0)), Some(scene.left.id().get()));
    assert_eq!(image.value_at(Cursor::new(48.0, 32.0)), Some(scene.right.id().get()));
    assert_eq!(image.value_at(Cursor::new(32.0, 5.0)), Some(NO_OBJECT));

    scene.renderer.shutdown(&mut scene.gpu).expect("shutdown");
}
