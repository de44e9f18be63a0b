//! Client command parsing

use crate::core::types::Direction;

/// One line of client input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    /// List the inventory
    Check,
    /// Anything else, kept for the error reply
    Unknown(String),
}

impl Command {
    /// Parse a single trimmed token; never fails
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "w" => Command::Move(Direction::North),
            "a" => Command::Move(Direction::West),
            "s" => Command::Move(Direction::South),
            "d" => Command::Move(Direction::East),
            "check" => Command::Check,
            other => Command::Unknown(other.to_string()),
        }
    }
}
