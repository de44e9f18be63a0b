//! Shared world: the spawn table, the species draw pool and the
//! notifications published when either changes.

pub mod events;
pub mod instance;
pub mod state;

pub use events::WorldEvent;
pub use instance::SpawnInstance;
pub use state::WorldState;
