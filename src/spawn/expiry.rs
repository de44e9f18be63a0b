//! Expiry timers
//!
//! One short-lived task per placed instance. Timers are never cancelled:
//! when the instance was captured first, the identity check in
//! `remove_if_present` turns the firing into a no-op.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::world::{SpawnInstance, WorldEvent, WorldState};

/// Spawn a timer that removes `instance` from the world at its expiry
/// time. The handle resolves to whether this timer did the removal.
pub fn schedule_expiry(world: Arc<WorldState>, instance: &SpawnInstance) -> JoinHandle<bool> {
    let id = instance.id;
    let cell = instance.cell;
    let deadline = instance.expires_at;
    let species = instance.name().to_string();

    tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;

        if world.remove_if_present(cell, id) {
            tracing::info!("{} at {} disappeared", species, cell);
            world.publish(WorldEvent::Despawned { id, cell, species });
            true
        } else {
            tracing::trace!(%cell, "Expiry found {} already gone", species);
            false
        }
    })
}
