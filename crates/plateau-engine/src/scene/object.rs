use glam::{Mat4, Quat, Vec3};

use crate::arena::ObjectId;

/// Index of a mesh loaded into the renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub(crate) usize);

/// Index of a material created by the renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub(crate) usize);

/// A live scene object. Valid until passed to `Renderer::destroy`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub(crate) ObjectId);

impl ObjectHandle {
    #[inline]
    pub fn id(self) -> ObjectId {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    /// Drawn in both passes.
    Renderable {
        mesh: MeshHandle,
        material: MaterialHandle,
    },
    /// Occupies an id and a transform, draws nothing.
    Anchor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub position: Vec3,
    pub orientation: Quat,
    pub kind: ObjectKind,
}

impl SceneObject {
    pub fn new(id: ObjectId, name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            id,
            name: name.into(),
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            kind,
        }
    }

    /// `translate(position) * rotate(orientation)`.
    pub fn model(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }
}

/// Every live object, in creation order.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn insert(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let i = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(i))
    }

    /// Linear scan; the scene is small.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// Renderable objects only, with their mesh and material.
    pub fn renderables(&self) -> impl Iterator<Item = (&SceneObject, MeshHandle, MaterialHandle)> {
        self.objects.iter().filter_map(|o| match o.kind {
            ObjectKind::Renderable { mesh, material } => Some((o, mesh, material)),
            ObjectKind::Anchor => None,
        })
    }

    /// The renderable carrying `id`, if any. Anchors never match a pick.
    pub fn find_renderable(&self, id: u32) -> Option<&SceneObject> {
        self.renderables()
            .map(|(o, _, _)| o)
            .find(|o| o.id.get() == id)
    }

    pub fn uses_mesh(&self, mesh: MeshHandle) -> bool {
        self.renderables().any(|(_, m, _)| m == mesh)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = SceneObject> + '_ {
        self.objects.drain(..)
    }
}
