//! World State: the single source of truth for cell occupancy
//!
//! Every operation takes the same mutex for a short, non-blocking
//! critical section, so all operations are linearized in one global
//! order. Nothing here awaits or performs I/O while the lock is held.
//!
//! `try_capture` is the only capture path. Two sessions racing for the
//! same cell are ordered by the mutex: the first removes the instance,
//! the second finds the cell empty.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::catalog::{Catalog, Species};
use crate::core::config::GameConfig;
use crate::core::types::{Cell, SpawnId};
use crate::world::events::WorldEvent;
use crate::world::instance::SpawnInstance;

struct WorldInner {
    spawns: AHashMap<Cell, SpawnInstance>,
    /// Species not yet drawn in the current generation
    pool: Vec<Species>,
    /// Number of times the pool has been refilled from the catalog
    generation: u64,
    rng: ChaCha8Rng,
}

/// Shared world, constructed once and handed around behind an `Arc`
pub struct WorldState {
    grid_size: u32,
    lifetime: Duration,
    catalog: Catalog,
    inner: Mutex<WorldInner>,
    events: broadcast::Sender<WorldEvent>,
}

impl WorldState {
    pub fn new(catalog: Catalog, config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let (events, _) = broadcast::channel(config.event_buffer.max(1));

        Self {
            grid_size: config.grid_size,
            lifetime: config.spawn_lifetime(),
            inner: Mutex::new(WorldInner {
                spawns: AHashMap::new(),
                pool: catalog.all().to_vec(),
                generation: 0,
                rng,
            }),
            catalog,
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, WorldInner> {
        // Critical sections never panic midway, so a poisoned lock
        // still guards consistent data.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.grid_size && cell.y < self.grid_size
    }

    /// Pop a random species from the draw pool, refilling it from the
    /// full catalog first when it is empty
    pub fn draw_species(&self) -> Species {
        let mut inner = self.lock();
        if inner.pool.is_empty() {
            inner.pool = self.catalog.all().to_vec();
            inner.generation += 1;
            tracing::debug!(generation = inner.generation, "Draw pool refilled");
        }
        let remaining = inner.pool.len();
        let index = inner.rng.gen_range(0..remaining);
        inner.pool.swap_remove(index)
    }

    /// Create an instance of `species` at `cell`, born now, expiring
    /// after the configured lifetime. Does not place it.
    pub fn new_instance(&self, species: Species, cell: Cell) -> SpawnInstance {
        SpawnInstance::new(species, cell, Instant::now(), self.lifetime)
    }

    /// Insert `instance` at its cell iff the cell is empty
    ///
    /// A cell whose occupant has already expired counts as empty.
    pub fn try_place(&self, instance: SpawnInstance) -> bool {
        if !self.contains(instance.cell) {
            return false;
        }
        let now = Instant::now();
        let mut inner = self.lock();
        if let Some(existing) = inner.spawns.get(&instance.cell) {
            if !existing.is_expired_at(now) {
                return false;
            }
            tracing::debug!(
                cell = %instance.cell,
                stale = %existing.name(),
                "Overwriting expired spawn"
            );
        }
        inner.spawns.insert(instance.cell, instance);
        true
    }

    /// Atomically remove and return the live instance at `cell`
    pub fn try_capture(&self, cell: Cell) -> Option<SpawnInstance> {
        let now = Instant::now();
        let mut inner = self.lock();
        let live = inner.spawns.get(&cell).is_some_and(|e| e.is_live_at(now));
        if live {
            inner.spawns.remove(&cell)
        } else {
            None
        }
    }

    /// Remove the instance at `cell` only if it is still the one named
    /// by `id`; a stale expiry timer leaves newer occupants alone
    pub fn remove_if_present(&self, cell: Cell, id: SpawnId) -> bool {
        let mut inner = self.lock();
        let matches = inner.spawns.get(&cell).is_some_and(|e| e.id == id);
        matches && inner.spawns.remove(&cell).is_some()
    }

    /// Read-only lookup of the live instance at `cell`
    pub fn peek(&self, cell: Cell) -> Option<SpawnInstance> {
        let now = Instant::now();
        self.lock()
            .spawns
            .get(&cell)
            .filter(|existing| existing.is_live_at(now))
            .cloned()
    }

    /// Number of occupied cells, including not-yet-collected expired ones
    pub fn occupied_count(&self) -> usize {
        self.lock().spawns.len()
    }

    /// How many times the draw pool has been refilled
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn pool_remaining(&self) -> usize {
        self.lock().pool.len()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorldEvent> {
        self.events.subscribe()
    }

    /// Publish a notification; dropped silently when nobody listens
    pub fn publish(&self, event: WorldEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{catalog_of, species};
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};

    fn world(names: &[&str], grid_size: u32, lifetime_secs: u64) -> WorldState {
        let config = GameConfig {
            grid_size,
            spawn_lifetime_secs: lifetime_secs,
            seed: Some(7),
            ..GameConfig::default()
        };
        WorldState::new(catalog_of(names), &config)
    }

    fn place(world: &WorldState, name: &str, cell: Cell) -> SpawnInstance {
        let inst = world.new_instance(species(name, 1), cell);
        assert!(world.try_place(inst.clone()));
        inst
    }

    #[test]
    fn test_draws_without_replacement_within_generation() {
        let w = world(&["Pidgey", "Rattata", "Zubat", "Geodude"], 5, 2);
        let drawn: HashSet<String> = (0..4).map(|_| w.draw_species().name).collect();
        assert_eq!(drawn.len(), 4);
        assert_eq!(w.generation(), 0);
        assert_eq!(w.pool_remaining(), 0);
    }

    #[test]
    fn test_refill_on_exhaustion() {
        // Pool seeded with 2 species; the third draw forces a refill
        let w = world(&["Pidgey", "Rattata"], 5, 2);
        w.draw_species();
        w.draw_species();
        assert_eq!(w.generation(), 0);

        let third = w.draw_species();
        assert_eq!(w.generation(), 1);
        assert!(third.name == "Pidgey" || third.name == "Rattata");
        assert_eq!(w.pool_remaining(), 1);
    }

    #[test]
    fn test_place_only_into_empty_cell() {
        let w = world(&["Pidgey"], 5, 60);
        let cell = Cell::new(2, 2);
        place(&w, "Pidgey", cell);

        let second = w.new_instance(species("Rattata", 19), cell);
        assert!(!w.try_place(second));
        assert_eq!(w.peek(cell).unwrap().name(), "Pidgey");
        assert_eq!(w.occupied_count(), 1);
    }

    #[test]
    fn test_place_rejects_out_of_grid() {
        let w = world(&["Pidgey"], 5, 60);
        let inst = w.new_instance(species("Pidgey", 16), Cell::new(5, 0));
        assert!(!w.try_place(inst));
        assert_eq!(w.occupied_count(), 0);
    }

    #[test]
    fn test_capture_removes_once() {
        let w = world(&["Pidgey"], 5, 60);
        let cell = Cell::new(1, 3);
        let inst = place(&w, "Pidgey", cell);

        let caught = w.try_capture(cell).unwrap();
        assert_eq!(caught.id, inst.id);
        assert!(w.try_capture(cell).is_none());
        assert!(w.peek(cell).is_none());
    }

    #[test]
    fn test_remove_if_present_checks_identity() {
        let w = world(&["Pidgey"], 5, 60);
        let cell = Cell::new(0, 4);
        let old = place(&w, "Pidgey", cell);
        assert!(w.try_capture(cell).is_some());

        // A newer instance takes the cell before the old timer fires
        let new = place(&w, "Rattata", cell);
        assert!(!w.remove_if_present(cell, old.id));
        assert_eq!(w.peek(cell).unwrap().id, new.id);

        assert!(w.remove_if_present(cell, new.id));
        assert!(!w.remove_if_present(cell, new.id));
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let w = world(&["Pidgey"], 5, 60);
        let cell = Cell::new(4, 4);
        place(&w, "Pidgey", cell);
        assert!(w.peek(cell).is_some());
        assert!(w.peek(cell).is_some());
        assert_eq!(w.occupied_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_instance_is_invisible() {
        let w = world(&["Pidgey", "Rattata", "Zubat"], 5, 2);
        let cell = Cell::new(2, 2);
        place(&w, "Pidgey", cell);

        tokio::time::advance(Duration::from_millis(1999)).await;
        assert!(w.peek(cell).is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(w.peek(cell).is_none());
        assert!(w.try_capture(cell).is_none());
        // No timer armed here, so the expired entry still holds the cell
        assert_eq!(w.occupied_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_visible_before_creation() {
        let w = world(&["Pidgey"], 5, 2);
        let cell = Cell::new(3, 1);
        let future = SpawnInstance::new(
            species("Pidgey", 16),
            cell,
            Instant::now() + Duration::from_secs(1),
            Duration::from_secs(2),
        );
        assert!(w.try_place(future));

        assert!(w.peek(cell).is_none());
        assert!(w.try_capture(cell).is_none());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(w.try_capture(cell).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_cell_can_be_reused() {
        let w = world(&["Pidgey"], 5, 2);
        let cell = Cell::new(0, 0);
        let old = place(&w, "Pidgey", cell);

        tokio::time::advance(Duration::from_secs(2)).await;
        let new = place(&w, "Rattata", cell);

        assert!(!w.remove_if_present(cell, old.id));
        assert_eq!(w.peek(cell).unwrap().id, new.id);
    }

    #[test]
    fn test_concurrent_capture_has_one_winner() {
        let w = Arc::new(world(&["Pidgey"], 5, 60));
        let cell = Cell::new(2, 3);
        let inst = place(&w, "Pidgey", cell);

        let racers = 16;
        let barrier = Arc::new(Barrier::new(racers));
        let handles: Vec<_> = (0..racers)
            .map(|_| {
                let w = Arc::clone(&w);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    w.try_capture(cell)
                })
            })
            .collect();

        let winners: Vec<SpawnInstance> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].id, inst.id);
    }

    #[test]
    fn test_events_reach_subscribers() {
        let w = world(&["Pidgey"], 5, 60);
        let mut rx = w.subscribe();
        let inst = w.new_instance(species("Pidgey", 16), Cell::new(1, 1));
        w.publish(WorldEvent::Spawned {
            id: inst.id,
            cell: inst.cell,
            species: inst.name().to_string(),
        });
        assert_eq!(rx.try_recv().unwrap().id(), inst.id);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let w = world(&["Pidgey"], 5, 60);
        w.publish(WorldEvent::Despawned {
            id: SpawnId::new(),
            cell: Cell::new(0, 0),
            species: "Pidgey".into(),
        });
    }

    #[derive(Debug, Clone)]
    enum Op {
        Place(u32, u32),
        Capture(u32, u32),
        Expire(u32, u32),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..3, 0u32..3).prop_map(|(x, y)| Op::Place(x, y)),
            (0u32..3, 0u32..3).prop_map(|(x, y)| Op::Capture(x, y)),
            (0u32..3, 0u32..3).prop_map(|(x, y)| Op::Expire(x, y)),
        ]
    }

    proptest! {
        #[test]
        fn single_occupancy_under_any_interleaving(ops in proptest::collection::vec(arb_op(), 1..100)) {
            let w = world(&["Pidgey", "Rattata"], 3, 600);
            let mut model: AHashMap<Cell, SpawnId> = AHashMap::new();

            for op in ops {
                match op {
                    Op::Place(x, y) => {
                        let cell = Cell::new(x, y);
                        let inst = w.new_instance(w.draw_species(), cell);
                        let id = inst.id;
                        let placed = w.try_place(inst);
                        prop_assert_eq!(placed, !model.contains_key(&cell));
                        if placed {
                            model.insert(cell, id);
                        }
                    }
                    Op::Capture(x, y) => {
                        let cell = Cell::new(x, y);
                        let caught = w.try_capture(cell).map(|i| i.id);
                        prop_assert_eq!(caught, model.remove(&cell));
                    }
                    Op::Expire(x, y) => {
                        let cell = Cell::new(x, y);
                        if let Some(id) = model.get(&cell).copied() {
                            prop_assert!(w.remove_if_present(cell, id));
                            model.remove(&cell);
                        } else {
                            prop_assert!(!w.remove_if_present(cell, SpawnId::new()));
                        }
                    }
                }
                prop_assert_eq!(w.occupied_count(), model.len());
            }
        }
    }
}
