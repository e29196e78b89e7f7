use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::config::DepotConfig;
use crate::depot::Depot;
use crate::error::DepotError;
use crate::error::handlers::SERVICE_UNAVAILABLE;
use crate::protocol::responses::format_response;
use crate::server::session::handle_session;

pub struct Server {
    listener: TcpListener,
    depot: Depot,
    config: Arc<DepotConfig>,
    sessions: Arc<Semaphore>,
}

impl Server {
    /// Binds the configured socket and opens the repository.
    ///
    /// Both failures are fatal to startup and returned to the caller.
    pub async fn new(config: DepotConfig) -> Result<Self, DepotError> {
        let socket = config.listen_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(DepotError::NetworkError(e));
            }
        };

        Self::with_listener(listener, config).await
    }

    /// Serves on an already bound listener
    pub async fn with_listener(
        listener: TcpListener,
        config: DepotConfig,
    ) -> Result<Self, DepotError> {
        let depot = Depot::open(&config.storage_settings(), config.upload_limits()).await?;

        Ok(Self {
            listener,
            depot,
            sessions: Arc::new(Semaphore::new(config.max_clients)),
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn start(&self) {
        info!(
            "Starting csv-depot on {} (max {} clients, uploads up to {} bytes)",
            self.local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| self.config.listen_socket()),
            self.config.max_clients,
            self.config.max_upload_size_bytes
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let depot = self.depot.clone();
                    let sessions = Arc::clone(&self.sessions);
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) = handle_new_client(stream, addr, depot, sessions, config).await
                        {
                            warn!("Failed to handle client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Admits a client if a session slot is free, then runs its session.
async fn handle_new_client(
    mut stream: TcpStream,
    client_addr: SocketAddr,
    depot: Depot,
    sessions: Arc<Semaphore>,
    config: Arc<DepotConfig>,
) -> Result<(), io::Error> {
    let permit = match sessions.try_acquire() {
        Ok(permit) => permit,
        Err(_) => {
            warn!("Refusing {}: {} sessions active", client_addr, config.max_clients);
            stream
                .write_all(
                    format_response(
                        SERVICE_UNAVAILABLE,
                        "Too many connections. Try again later.",
                    )
                    .as_bytes(),
                )
                .await?;
            return Ok(()); // Close connection
        }
    };

    info!(
        "Accepted client {} ({}/{} sessions)",
        client_addr,
        config.max_clients - sessions.available_permits(),
        config.max_clients
    );

    handle_session(stream, client_addr, depot, config.max_command_length).await;

    drop(permit);
    Ok(())
}
