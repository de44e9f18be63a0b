//! Best-effort world notifications

use crate::core::types::{Cell, SessionId, SpawnId};

/// Something observable happened to the spawn table
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    Spawned { id: SpawnId, cell: Cell, species: String },
    Despawned { id: SpawnId, cell: Cell, species: String },
    Captured { id: SpawnId, cell: Cell, species: String, by: SessionId },
    /// Taken out of the world by a session whose bag was full; lost
    Dropped { id: SpawnId, cell: Cell, species: String, by: SessionId },
}

impl WorldEvent {
    pub fn id(&self) -> SpawnId {
        match self {
            WorldEvent::Spawned { id, .. }
            | WorldEvent::Despawned { id, .. }
            | WorldEvent::Captured { id, .. }
            | WorldEvent::Dropped { id, .. } => *id,
        }
    }
}
