pub mod config;
pub mod error;
pub mod types;

pub use config::GameConfig;
pub use error::{PokecatError, Result};
