use glam::{Quat, Vec3};

use super::{FrameOutcome, FrameReport, PickResult, PickedObject, RenderError, RendererConfig};
use crate::arena::{CameraUniforms, MeshAllocation, MeshArena, ObjectIdPool, ObjectUniformPool, UniformLayout};
use crate::device::{poll_nonblocking, ColorTarget, GpuBackend};
use crate::frame::{BeginOutcome, EndOutcome, Extent, Frame, FrameScheduler};
use crate::image::TextureSet;
use crate::io::{ImageData, MeshData};
use crate::memory::MemoryProperties;
use crate::picking::{Cursor, PickSample, PickingImage, PickingReadback, PickingTarget, NO_OBJECT};
use crate::render::{
    Camera, CameraBlock, DrawItem, FrameBindings, Material, ObjectBlock, OnScreenPass,
    PickingPass, SceneLayouts, ShadedPipeline,
};
use crate::scene::{MaterialHandle, MeshHandle, ObjectHandle, ObjectKind, Scene, SceneObject};

struct LoadedMesh {
    name: String,
    allocation: MeshAllocation,
}

/// Owns the mesh arena, object ids, uniform pools, materials, passes and
/// picking resources, and drives one frame per [`Renderer::run_frame`] call.
///
/// Per frame: begin (fence wait) → write uniforms → on-screen pass → picking
/// pass → readback copy → submit/present → decode finished readbacks.
pub struct Renderer<B: GpuBackend> {
    config: RendererConfig,
    properties: MemoryProperties,
    layouts: SceneLayouts,
    shaded: ShadedPipeline,
    scheduler: FrameScheduler<B>,

    mesh_arena: MeshArena,
    meshes: Vec<Option<LoadedMesh>>,
    textures: Vec<TextureSet>,
    materials: Vec<Material>,

    ids: ObjectIdPool,
    object_uniforms: ObjectUniformPool,
    camera_uniforms: CameraUniforms,
    scene: Scene,

    on_screen: OnScreenPass,
    picking_pass: PickingPass,
    picking_target: PickingTarget,
    readback: PickingReadback,

    cursor: Option<Cursor>,
}

impl<B: GpuBackend> Renderer<B> {
    pub fn new(backend: &B, config: RendererConfig) -> Result<Self, RenderError> {
        if config.frames_in_flight == 0 {
            return Err(RenderError::InvalidConfig("frames_in_flight must be at least 1".into()));
        }
        if config.max_objects == 0 || config.max_objects >= NO_OBJECT {
            return Err(RenderError::InvalidConfig(format!(
                "max_objects must be in 1..{NO_OBJECT}, got {}",
                config.max_objects
            )));
        }

        let device = backend.device();
        let properties = MemoryProperties::wgpu();
        let layouts = SceneLayouts::new(device);
        let shaded = ShadedPipeline::new(device, &layouts, backend.color_format());

        let align = device.limits().min_uniform_buffer_offset_alignment as u64;
        let frames = config.frames_in_flight;
        let object_uniforms = ObjectUniformPool::new(
            device,
            &properties,
            &layouts.object,
            UniformLayout::new(size_of::<ObjectBlock>() as u64, align, frames, config.max_objects),
        )?;
        let camera_uniforms = CameraUniforms::new(
            device,
            &properties,
            &layouts.camera,
            size_of::<CameraBlock>() as u64,
            align,
            frames,
        )?;

        let extent = backend.extent();
        let extent = Extent::new(extent.width.max(1), extent.height.max(1));

        log::info!(
            "renderer initialized: {frames} frames in flight, {} objects, {} byte mesh arena",
            config.max_objects,
            config.mesh_arena_capacity
        );

        Ok(Self {
            properties,
            scheduler: FrameScheduler::new(frames, config.fence_timeout),
            mesh_arena: MeshArena::new(config.mesh_arena_capacity),
            meshes: Vec::new(),
            textures: Vec::new(),
            materials: Vec::new(),
            ids: ObjectIdPool::new(config.max_objects),
            object_uniforms,
            camera_uniforms,
            scene: Scene::new(),
            on_screen: OnScreenPass::new(device, extent, config.clear_color),
            picking_pass: PickingPass::new(device, &layouts),
            picking_target: PickingTarget::new(device, extent),
            readback: PickingReadback::new(frames, config.fence_timeout),
            cursor: None,
            layouts,
            shaded,
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn object(&self, handle: ObjectHandle) -> Option<&SceneObject> {
        self.scene.get(handle.id())
    }

    /// Bytes of the mesh arena currently handed out.
    #[inline]
    pub fn mesh_arena_used(&self) -> u64 {
        self.mesh_arena.used_bytes()
    }

    // ── meshes & materials ────────────────────────────────────────────────

    pub fn load_mesh(&mut self, backend: &B, mesh: &MeshData) -> Result<MeshHandle, RenderError> {
        let vertices = mesh.to_vertices()?;
        let allocation = self.mesh_arena.allocate_mesh(
            backend.device(),
            backend.queue(),
            &self.properties,
            &vertices,
            &mesh.indices,
        )?;

        log::debug!(
            "mesh '{}': {} vertices at {:?}, {} indices at {:?}",
            mesh.name,
            vertices.len(),
            allocation.vertices(),
            allocation.index_count(),
            allocation.indices()
        );

        self.meshes.push(Some(LoadedMesh {
            name: mesh.name.clone(),
            allocation,
        }));
        Ok(MeshHandle(self.meshes.len() - 1))
    }

    /// Releases a mesh no renderable uses any more.
    pub fn release_mesh(&mut self, handle: MeshHandle) -> Result<(), RenderError> {
        let Some(slot) = self.meshes.get_mut(handle.0) else {
            return Err(RenderError::UnknownMesh(handle));
        };
        let Some(loaded) = slot.as_ref() else {
            return Err(RenderError::UnknownMesh(handle));
        };
        if self.scene.uses_mesh(handle) {
            return Err(RenderError::MeshInUse(loaded.name.clone()));
        }

        if let Some(loaded) = slot.take() {
            log::debug!("mesh '{}' released", loaded.name);
            self.mesh_arena.release_mesh(loaded.allocation)?;
        }
        Ok(())
    }

    /// Uploads `images` in one batch and creates one material per image.
    pub fn create_materials(
        &mut self,
        backend: &B,
        images: &[ImageData],
    ) -> Result<Vec<MaterialHandle>, RenderError> {
        let device = backend.device();
        let set = TextureSet::upload(device, backend.queue(), &self.properties, images)?;

        let mut handles = Vec::with_capacity(images.len());
        for texture in set.textures() {
            let material = Material::new(device, &self.layouts, &self.shaded, texture, set.sampler());
            log::debug!("material '{}' created", material.name());
            self.materials.push(material);
            handles.push(MaterialHandle(self.materials.len() - 1));
        }
        self.textures.push(set);
        Ok(handles)
    }

    // ── objects ───────────────────────────────────────────────────────────

    pub fn create_renderable(
        &mut self,
        name: impl Into<String>,
        mesh: MeshHandle,
        material: MaterialHandle,
    ) -> Result<ObjectHandle, RenderError> {
        if !matches!(self.meshes.get(mesh.0), Some(Some(_))) {
            return Err(RenderError::UnknownMesh(mesh));
        }
        if material.0 >= self.materials.len() {
            return Err(RenderError::UnknownMaterial(material));
        }
        self.spawn(name.into(), ObjectKind::Renderable { mesh, material })
    }

    /// Creates an object that has an id and a transform but draws nothing.
    pub fn create_anchor(&mut self, name: impl Into<String>) -> Result<ObjectHandle, RenderError> {
        self.spawn(name.into(), ObjectKind::Anchor)
    }

    fn spawn(&mut self, name: String, kind: ObjectKind) -> Result<ObjectHandle, RenderError> {
        let id = self.ids.acquire()?;
        log::debug!("{id} '{name}' created");
        self.scene.insert(SceneObject::new(id, name, kind));
        Ok(ObjectHandle(id))
    }

    pub fn set_position(&mut self, handle: ObjectHandle, position: Vec3) -> Result<(), RenderError> {
        let object = self
            .scene
            .get_mut(handle.id())
            .ok_or(RenderError::UnknownObject(handle))?;
        object.position = position;
        Ok(())
    }

    pub fn set_orientation(
        &mut self,
        handle: ObjectHandle,
        orientation: Quat,
    ) -> Result<(), RenderError> {
        let object = self
            .scene
            .get_mut(handle.id())
            .ok_or(RenderError::UnknownObject(handle))?;
        object.orientation = orientation;
        Ok(())
    }

    /// Removes the object and returns its id to the pool.
    ///
    /// Picks drawn before this call are discarded, since the id may be handed
    /// to a new object.
    pub fn destroy(&mut self, handle: ObjectHandle) -> Result<(), RenderError> {
        let object = self
            .scene
            .remove(handle.id())
            .ok_or(RenderError::UnknownObject(handle))?;
        self.ids.release(object.id)?;
        self.readback.invalidate();
        log::debug!("{} '{}' destroyed", object.id, object.name);
        Ok(())
    }

    // ── frame loop ────────────────────────────────────────────────────────

    /// Cursor used by the next frames' picking pass. `None` disables picking
    /// and drops the last pick along with any still in flight.
    pub fn set_cursor(&mut self, cursor: Option<Cursor>) {
        if cursor.is_none() {
            self.readback.invalidate();
        }
        self.cursor = cursor;
    }

    /// Requests swap-resource recreation at the end of the next frame.
    pub fn notify_resized(&mut self) {
        self.scheduler.notify_resized();
    }

    pub fn run_frame(&mut self, backend: &mut B, camera: &Camera) -> Result<FrameReport, RenderError> {
        let mut frame = match self.scheduler.begin_frame(backend)? {
            BeginOutcome::Ready(frame) => frame,
            BeginOutcome::Skipped(reason) => {
                let pick = self.collect_picks(backend)?;
                return Ok(FrameReport {
                    frame: None,
                    outcome: FrameOutcome::Skipped(reason),
                    pick,
                });
            }
        };
        let slot = frame.slot();
        let number = frame.number();

        if let Err(e) = self.record(backend, &mut frame, camera) {
            self.readback.cancel(slot);
            self.scheduler.cancel_frame(frame)?;
            return Err(e);
        }

        let outcome = match self.scheduler.end_frame(backend, frame) {
            Ok(EndOutcome::Presented) => FrameOutcome::Presented,
            Ok(EndOutcome::Recreated) => FrameOutcome::Recreated,
            Err(e) => {
                self.readback.cancel(slot);
                return Err(e.into());
            }
        };
        self.readback
            .after_submit(slot, self.scheduler.fence(slot).cloned());

        let pick = self.collect_picks(backend)?;
        Ok(FrameReport {
            frame: Some(number),
            outcome,
            pick,
        })
    }

    /// Blocks until every scheduled readback is decoded; returns the newest pick.
    pub fn wait_for_pick(&mut self, backend: &B) -> Result<Option<PickResult>, RenderError> {
        let sample = self.readback.resolve_all(backend.device())?;
        Ok(sample.map(|s| self.resolve_sample(s)))
    }

    /// The id image behind the newest pick, until its readback slot is reused.
    pub fn picking_image(&self) -> Option<PickingImage> {
        self.readback.latest_image()
    }

    fn record(&mut self, backend: &B, frame: &mut Frame<B>, camera: &Camera) -> Result<(), RenderError> {
        let device = backend.device();
        let queue = backend.queue();
        let slot = frame.slot();
        let number = frame.number();
        self.fit_to_extent(device, frame.extent());

        let camera_offset = self.camera_uniforms.write(queue, slot, &camera.block())?;

        let mut items = Vec::with_capacity(self.scene.len());
        for (object, mesh, material) in self.scene.renderables() {
            let loaded = self
                .meshes
                .get(mesh.0)
                .and_then(Option::as_ref)
                .ok_or(RenderError::UnknownMesh(mesh))?;
            let material = self
                .materials
                .get(material.0)
                .ok_or(RenderError::UnknownMaterial(material))?;
            let object_offset = self.object_uniforms.write(
                queue,
                object.id,
                slot,
                &ObjectBlock::from_model(object.model()),
            )?;
            items.push(DrawItem {
                id: object.id,
                mesh: &loaded.allocation,
                material,
                object_offset,
            });
        }

        let bindings = FrameBindings {
            mesh_buffer: self.mesh_arena.buffer(),
            camera: self.camera_uniforms.bind_group(),
            camera_offset,
            objects: self.object_uniforms.bind_group(),
        };

        let color_view = frame.target.color_view();
        let encoder = &mut frame.recorder;
        self.on_screen.record(encoder, color_view, &bindings, &items)?;

        if let Some(cursor) = self.cursor {
            self.picking_pass
                .record(encoder, &mut self.picking_target, &bindings, &items)?;
            self.readback.schedule_transfer(
                device,
                &self.properties,
                encoder,
                &mut self.picking_target,
                slot,
                number,
                cursor,
            )?;
        }
        Ok(())
    }

    /// Rebuilds depth and picking targets when the frame extent changed.
    fn fit_to_extent(&mut self, device: &wgpu::Device, extent: Extent) {
        if self.picking_target.extent() == extent && self.on_screen.extent() == extent {
            return;
        }
        log::info!("render targets resized to {}x{}", extent.width, extent.height);
        self.on_screen.resize(device, extent);
        self.picking_target = PickingTarget::new(device, extent);
    }

    fn collect_picks(&mut self, backend: &B) -> Result<Option<PickResult>, RenderError> {
        if self.readback.has_pending() {
            poll_nonblocking(backend.device())?;
        }
        let sample = self.readback.collect()?;
        Ok(sample.map(|s| self.resolve_sample(s)))
    }

    fn resolve_sample(&self, sample: PickSample) -> PickResult {
        let object = sample
            .value
            .filter(|&v| v != NO_OBJECT)
            .and_then(|v| self.scene.find_renderable(v))
            .map(|o| PickedObject {
                id: o.id,
                name: o.name.clone(),
            });
        PickResult {
            frame: sample.frame,
            cursor: sample.cursor,
            object,
        }
    }

    // ── shutdown ──────────────────────────────────────────────────────────

    /// Waits for the device to go idle, then releases everything in
    /// dependency order.
    pub fn shutdown(self, backend: &mut B) -> Result<(), RenderError> {
        let Self {
            mut scheduler,
            mut readback,
            picking_target,
            picking_pass,
            on_screen,
            materials,
            textures,
            shaded,
            object_uniforms,
            camera_uniforms,
            mut scene,
            mut ids,
            meshes,
            mut mesh_arena,
            layouts,
            ..
        } = self;

        scheduler.wait_idle(backend)?;
        drop(scheduler);

        readback.clear();
        drop(readback);
        drop(picking_target);
        drop(picking_pass);
        drop(on_screen);

        drop(materials);
        drop(textures);
        drop(shaded);

        for object in scene.drain() {
            ids.release(object.id)?;
        }
        drop(object_uniforms);
        drop(camera_uniforms);

        for loaded in meshes.into_iter().flatten() {
            mesh_arena.release_mesh(loaded.allocation)?;
        }
        drop(layouts);

        log::info!("renderer shut down");
        Ok(())
    }
}
