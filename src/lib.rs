//! PokeCat - real-time creature catching on a shared grid

pub mod catalog;
pub mod core;
pub mod server;
pub mod session;
pub mod spawn;
pub mod world;
