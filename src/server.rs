//! TCP front: accept loop, session tasks and the spawn scheduler

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::Rng;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::catalog::Catalog;
use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::{Cell, SessionId};
use crate::session::{run_session, PlayerSession};
use crate::spawn::SpawnScheduler;
use crate::world::WorldState;

pub struct Server {
    listener: TcpListener,
    world: Arc<WorldState>,
    config: GameConfig,
    next_session: AtomicU64,
}

impl Server {
    /// Build the world from `catalog` and bind the configured address
    pub async fn bind(catalog: Catalog, config: GameConfig) -> Result<Self> {
        let config = config.validated()?;
        let world = Arc::new(WorldState::new(catalog, &config));
        Self::with_world(world, config).await
    }

    /// Bind around an existing world
    ///
    /// Fails with `InvalidConfig` before binding if `config` doesn't validate.
    pub async fn with_world(world: Arc<WorldState>, config: GameConfig) -> Result<Self> {
        let config = config.validated()?;
        let listener = TcpListener::bind(config.bind).await?;
        Ok(Self {
            listener,
            world,
            config,
            next_session: AtomicU64::new(1),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn world(&self) -> Arc<WorldState> {
        Arc::clone(&self.world)
    }

    /// Start the spawn scheduler on the shared world
    pub fn start_spawner(&self) -> JoinHandle<()> {
        let scheduler = SpawnScheduler::new(self.world(), &self.config);
        tokio::spawn(scheduler.run())
    }

    /// Accept connections forever, one task per session
    pub async fn run(self) -> Result<()> {
        tracing::info!("Server listening on {}", self.local_addr()?);
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let id = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));
            let player = PlayerSession::new(
                id,
                self.random_cell(),
                self.config.inventory_capacity,
                self.config.grid_size,
            );
            tracing::info!(session = %id, %peer, "Player connected at {}", player.position());

            tokio::spawn(handle_connection(stream, player, self.world()));
        }
    }

    fn random_cell(&self) -> Cell {
        let mut rng = rand::thread_rng();
        let grid = self.config.grid_size;
        Cell::new(rng.gen_range(0..grid), rng.gen_range(0..grid))
    }
}

async fn handle_connection(stream: TcpStream, player: PlayerSession, world: Arc<WorldState>) {
    let id = player.id;
    let (read, write) = stream.into_split();

    match run_session(BufReader::new(read), write, player, world).await {
        Ok(player) => tracing::info!(
            session = %id,
            caught = player.inventory().len(),
            "Player disconnected"
        ),
        Err(e) => tracing::debug!(session = %id, "Session ended: {}", e),
    }
}

/// Bind, start the spawner and serve sessions until the process exits
pub async fn serve(catalog: Catalog, config: GameConfig) -> Result<()> {
    let server = Server::bind(catalog, config).await?;
    let _spawner = server.start_spawner();
    server.run().await
}
