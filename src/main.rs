//! PokeCat - Server entry point
//!
//! Loads the species catalog, starts the spawn scheduler and accepts
//! player connections until the process is stopped.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use pokecat::catalog::Catalog;
use pokecat::core::config::GameConfig;
use pokecat::core::error::Result;
use pokecat::server;

/// PokeCat server - catch creatures before they vanish
#[derive(Parser, Debug)]
#[command(name = "pokecat")]
#[command(about = "Run the PokeCat world server")]
struct Args {
    /// TOML config file; missing keys use defaults
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Species catalog (JSON)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Side length of the square grid
    #[arg(long)]
    grid_size: Option<u32>,

    /// Random seed for a reproducible spawn stream
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn into_config(self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(catalog) = self.catalog {
            config.catalog_path = catalog;
        }
        if let Some(grid_size) = self.grid_size {
            config.grid_size = grid_size;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validated()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pokecat=info")),
        )
        .init();

    let config = Args::parse().into_config()?;

    let catalog = Catalog::load(&config.catalog_path).map_err(|e| {
        tracing::error!("Failed to load catalog {}: {}", config.catalog_path.display(), e);
        e
    })?;
    tracing::info!(
        species = catalog.len(),
        grid_size = config.grid_size,
        "PokeCat starting..."
    );

    server::serve(catalog, config).await
}
