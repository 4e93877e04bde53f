use thiserror::Error;

use super::ObjectId;
use crate::memory::MemoryError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("mesh arena: {requested} bytes requested at cursor {cursor}, capacity is {capacity}")]
    OutOfArenaSpace {
        requested: u64,
        cursor: u64,
        capacity: u64,
    },

    #[error("mesh arena: mesh has no vertices or no indices")]
    EmptyMesh,

    #[error("mesh arena: release without any live mesh")]
    NoLiveMeshes,

    #[error("object pool: all {max} object slots are in use")]
    ObjectSlotsExhausted { max: u32 },

    #[error("object pool: {0} is not currently held")]
    SlotNotHeld(ObjectId),

    #[error("uniform pool: region ({id}, frame {frame}) is out of range")]
    RegionOutOfRange { id: ObjectId, frame: usize },

    #[error(transparent)]
    Memory(#[from] MemoryError),
}
