//! Per-connection player state and command handling

use std::fmt;

use crate::core::types::{Cell, Direction, SessionId};
use crate::session::command::Command;
use crate::world::{SpawnInstance, WorldEvent, WorldState};

pub const PROMPT: &str = "Choose your step: [w][a][s][d] or 'check' to see your Pokémon";

/// A connected player
///
/// Owned by exactly one session task; other tasks never see it. The
/// inventory holds copies taken out of the world, not references into it.
#[derive(Debug)]
pub struct PlayerSession {
    pub id: SessionId,
    position: Cell,
    inventory: Vec<SpawnInstance>,
    capacity: usize,
    grid_size: u32,
}

impl PlayerSession {
    pub fn new(id: SessionId, start: Cell, capacity: usize, grid_size: u32) -> Self {
        Self {
            id,
            position: start.clamped(grid_size),
            inventory: Vec::new(),
            capacity,
            grid_size,
        }
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn inventory(&self) -> &[SpawnInstance] {
        &self.inventory
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.inventory.len() >= self.capacity
    }

    pub fn welcome(&self) -> String {
        format!("Welcome to PokeCat! You are at position {}", self.position)
    }

    /// Apply one command. Only movement touches the world, and only
    /// through `try_capture`.
    pub fn execute(&mut self, command: &Command, world: &WorldState) -> Reply {
        match command {
            Command::Move(direction) => self.step(*direction, world),
            Command::Check => Reply::Inventory(
                self.inventory
                    .iter()
                    .map(|i| (i.name().to_string(), i.species.number))
                    .collect(),
            ),
            Command::Unknown(token) => {
                tracing::debug!(session = %self.id, token = %token, "Unknown command");
                Reply::Invalid
            }
        }
    }

    fn step(&mut self, direction: Direction, world: &WorldState) -> Reply {
        self.position = self.position.step(direction, self.grid_size);
        let position = self.position;

        let Some(caught) = world.try_capture(position) else {
            return Reply::Moved { position };
        };

        let species = caught.name().to_string();

        // The instance is already out of the world; a full bag loses it
        if self.is_full() {
            tracing::info!(session = %self.id, "Bag full, {} at {} got away", species, position);
            world.publish(WorldEvent::Dropped {
                id: caught.id,
                cell: position,
                species: species.clone(),
                by: self.id,
            });
            return Reply::BagFull {
                species,
                held: self.inventory.len(),
                capacity: self.capacity,
                position,
            };
        }

        tracing::info!(session = %self.id, "Player caught {} at {}", species, position);
        world.publish(WorldEvent::Captured {
            id: caught.id,
            cell: position,
            species: species.clone(),
            by: self.id,
        });
        self.inventory.push(caught);
        Reply::Caught { species, position }
    }
}

/// Result of one command, rendered as newline-terminated lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Moved { position: Cell },
    Caught { species: String, position: Cell },
    BagFull { species: String, held: usize, capacity: usize, position: Cell },
    /// `(name, catalog number)` in capture order
    Inventory(Vec<(String, u32)>),
    Invalid,
}

impl Reply {
    pub fn is_catch(&self) -> bool {
        matches!(self, Reply::Caught { .. })
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Moved { position } => writeln!(f, "Updated position: {}", position),
            Reply::Caught { species, position } => {
                writeln!(f, "You caught Pokémon: {}", species)?;
                writeln!(f, "Updated position: {}", position)
            }
            Reply::BagFull { species, held, capacity, position } => {
                writeln!(f, "Your bag is full ({}/{}), {} got away", held, capacity, species)?;
                writeln!(f, "Updated position: {}", position)
            }
            Reply::Inventory(entries) => {
                writeln!(f, "Your Pokémon:")?;
                for (name, number) in entries {
                    writeln!(f, "- {} #{}", name, number)?;
                }
                writeln!(f, "End of Pokémon list")
            }
            Reply::Invalid => writeln!(f, "Invalid command. Try again."),
        }
    }
}
