//! Server configuration with documented constants
//!
//! Every tunable lives here. Values can be overridden from a TOML file
//! and then again from the command line.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::{PokecatError, Result};

/// Configuration for the world, the spawner and the sessions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === WORLD ===
    /// Side length of the square grid (cells)
    ///
    /// Valid coordinates are `0..grid_size` on both axes.
    pub grid_size: u32,

    /// How long a spawn stays capturable (seconds)
    ///
    /// An instance is live during `[created_at, created_at + lifetime)`.
    pub spawn_lifetime_secs: u64,

    // === SPAWNER ===
    /// Lower bound of the randomized sleep between spawn cycles (ms)
    pub spawn_interval_min_ms: u64,

    /// Upper bound of the randomized sleep between spawn cycles (ms, inclusive)
    pub spawn_interval_max_ms: u64,

    /// Random cells tried per cycle before the spawn is abandoned
    ///
    /// Keeps the spawner from spinning on a crowded grid.
    pub placement_attempts: u32,

    /// Optional RNG seed for a reproducible spawn stream
    pub seed: Option<u64>,

    // === SESSIONS ===
    /// Maximum number of creatures a session can hold
    pub inventory_capacity: usize,

    /// Capacity of the world event broadcast channel
    ///
    /// Slow subscribers lag and skip events; publishers never block.
    pub event_buffer: usize,

    // === IO ===
    /// Address the TCP listener binds to
    pub bind: SocketAddr,

    /// Species catalog (JSON)
    pub catalog_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 2000,
            spawn_lifetime_secs: 300,

            spawn_interval_min_ms: 1000,
            spawn_interval_max_ms: 3000,
            placement_attempts: 8,
            seed: None,

            inventory_capacity: 200,
            event_buffer: 64,

            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            catalog_path: PathBuf::from("pokedex.json"),
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn spawn_lifetime(&self) -> Duration {
        Duration::from_secs(self.spawn_lifetime_secs)
    }

    pub fn spawn_interval(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.spawn_interval_min_ms),
            Duration::from_millis(self.spawn_interval_max_ms),
        )
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.grid_size == 0 {
            return Err("grid_size must be at least 1".into());
        }

        if self.spawn_lifetime_secs == 0 {
            return Err("spawn_lifetime_secs must be positive".into());
        }

        if self.spawn_interval_min_ms > self.spawn_interval_max_ms {
            return Err(format!(
                "spawn_interval_min_ms ({}) should be <= spawn_interval_max_ms ({})",
                self.spawn_interval_min_ms, self.spawn_interval_max_ms
            ));
        }

        if self.placement_attempts == 0 {
            return Err("placement_attempts must be at least 1".into());
        }

        if self.inventory_capacity == 0 {
            return Err("inventory_capacity must be at least 1".into());
        }

        if self.event_buffer == 0 {
            return Err("event_buffer must be at least 1".into());
        }

        Ok(())
    }

    /// Validate, converting the failure into the crate error
    pub fn validated(self) -> Result<Self> {
        self.validate().map_err(PokecatError::InvalidConfig)?;
        Ok(self)
    }
}
