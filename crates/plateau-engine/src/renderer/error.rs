use thiserror::Error;

use crate::arena::ArenaError;
use crate::frame::FrameError;
use crate::image::{LayoutError, TextureError};
use crate::io::IoError;
use crate::memory::MemoryError;
use crate::picking::PickError;
use crate::scene::{MaterialHandle, MeshHandle, ObjectHandle};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer: invalid configuration ({0})")]
    InvalidConfig(String),

    #[error("renderer: unknown mesh {0:?}")]
    UnknownMesh(MeshHandle),

    #[error("renderer: unknown material {0:?}")]
    UnknownMaterial(MaterialHandle),

    #[error("renderer: unknown object {0:?}")]
    UnknownObject(ObjectHandle),

    #[error("renderer: mesh '{0}' is still used by a renderable")]
    MeshInUse(String),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Arena(#[from] ArenaError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error(transparent)]
    Pick(#[from] PickError),

    #[error(transparent)]
    Io(#[from] IoError),
}
