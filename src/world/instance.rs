//! Spawn instances

use std::time::Duration;

use tokio::time::Instant;

use crate::catalog::Species;
use crate::core::types::{Cell, SpawnId};

/// A time-bounded, capturable occurrence of a species at a cell
///
/// Holds its own copy of the species, so values handed to sessions
/// share nothing with the world.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnInstance {
    pub id: SpawnId,
    pub species: Species,
    pub cell: Cell,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl SpawnInstance {
    pub fn new(species: Species, cell: Cell, created_at: Instant, lifetime: Duration) -> Self {
        Self {
            id: SpawnId::new(),
            species,
            cell,
            created_at,
            expires_at: created_at + lifetime,
        }
    }

    pub fn name(&self) -> &str {
        &self.species.name
    }

    /// Capturable during `[created_at, expires_at)`
    #[inline]
    pub fn is_live_at(&self, now: Instant) -> bool {
        self.created_at <= now && now < self.expires_at
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
