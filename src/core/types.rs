//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a spawn instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnId(pub Uuid);

impl SpawnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SpawnId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier handed to each accepted connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One grid coordinate pair, the unit of spatial occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Clamp both coordinates into `[0, grid_size - 1]`
    pub fn clamped(self, grid_size: u32) -> Self {
        let max = grid_size.saturating_sub(1);
        Self {
            x: self.x.min(max),
            y: self.y.min(max),
        }
    }

    /// Move one step in `direction`, never leaving the grid
    pub fn step(self, direction: Direction, grid_size: u32) -> Self {
        let max = grid_size.saturating_sub(1);
        let moved = match direction {
            Direction::North => Self::new(self.x, self.y.saturating_add(1).min(max)),
            Direction::South => Self::new(self.x, self.y.saturating_sub(1)),
            Direction::West => Self::new(self.x.saturating_sub(1), self.y),
            Direction::East => Self::new(self.x.saturating_add(1).min(max), self.y),
        };
        moved.clamped(grid_size)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Movement direction, one per key of the `w`/`a`/`s`/`d` cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `w`: y + 1
    North,
    /// `s`: y - 1
    South,
    /// `a`: x - 1
    West,
    /// `d`: x + 1
    East,
}
