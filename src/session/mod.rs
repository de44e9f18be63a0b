//! Player sessions: one task per connection owning a position and an
//! inventory, talking a line-oriented text protocol.

pub mod command;
pub mod connection;
pub mod player;

pub use command::Command;
pub use connection::run_session;
pub use player::{PlayerSession, Reply};
