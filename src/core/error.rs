use thiserror::Error;

#[derive(Error, Debug)]
pub enum PokecatError {
    #[error("Catalog contains no species")]
    EmptyCatalog,

    #[error("Invalid species record #{index}: {reason}")]
    InvalidSpecies { index: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Catalog parse error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PokecatError>;
