//! Background producers: the spawn loop and per-instance expiry timers

pub mod expiry;
pub mod scheduler;

pub use expiry::schedule_expiry;
pub use scheduler::SpawnScheduler;
