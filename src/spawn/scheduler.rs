//! Spawn Scheduler
//!
//! Singleton producer loop: draw a species, try a few random cells,
//! arm an expiry timer for whatever got placed, then sleep a random
//! interval. A crowded grid only costs a skipped cycle.

use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::GameConfig;
use crate::core::types::Cell;
use crate::spawn::expiry::schedule_expiry;
use crate::world::{SpawnInstance, WorldEvent, WorldState};

pub struct SpawnScheduler {
    world: Arc<WorldState>,
    rng: ChaCha8Rng,
    placement_attempts: u32,
    interval_min: Duration,
    interval_max: Duration,
}

impl SpawnScheduler {
    pub fn new(world: Arc<WorldState>, config: &GameConfig) -> Self {
        // Offset the seed so cell picks don't mirror the world's pool draws
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
            None => ChaCha8Rng::from_entropy(),
        };
        let (interval_min, interval_max) = config.spawn_interval();

        Self {
            world,
            rng,
            placement_attempts: config.placement_attempts.max(1),
            interval_min,
            interval_max,
        }
    }

    /// Run forever; spawn this with `tokio::spawn` and abort to stop
    pub async fn run(mut self) {
        tracing::info!(
            grid_size = self.world.grid_size(),
            lifetime_secs = self.world.lifetime().as_secs(),
            "Spawn scheduler started"
        );
        loop {
            self.spawn_once();
            let pause = self.next_interval();
            tokio::time::sleep(pause).await;
        }
    }

    /// One cycle: draw, place, arm expiry. Returns the placed instance,
    /// or `None` when every attempted cell was occupied.
    pub fn spawn_once(&mut self) -> Option<SpawnInstance> {
        let species = self.world.draw_species();
        let grid = self.world.grid_size();

        for _ in 0..self.placement_attempts {
            let cell = Cell::new(self.rng.gen_range(0..grid), self.rng.gen_range(0..grid));
            let instance = self.world.new_instance(species.clone(), cell);
            if !self.world.try_place(instance.clone()) {
                continue;
            }

            schedule_expiry(Arc::clone(&self.world), &instance);
            tracing::info!("A wild {} appeared at {}", instance.name(), cell);
            self.world.publish(WorldEvent::Spawned {
                id: instance.id,
                cell,
                species: instance.name().to_string(),
            });
            return Some(instance);
        }

        tracing::debug!(
            attempts = self.placement_attempts,
            "No free cell for {}, skipping this cycle",
            species.name
        );
        None
    }

    /// Uniform over `[interval_min, interval_max]`
    fn next_interval(&mut self) -> Duration {
        if self.interval_min >= self.interval_max {
            return self.interval_min;
        }
        self.rng.gen_range(self.interval_min..=self.interval_max)
    }
}
