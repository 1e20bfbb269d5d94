//! `NoughtsServer` builder and server loop.
//!
//! This is the entry point for running the coordinator. It ties together
//! all the layers: transport → session → protocol → room.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use noughts_protocol::JsonCodec;
use noughts_room::{RoomConfig, RoomRegistry, DEFAULT_COMMAND_CAPACITY};
use noughts_session::TokenVerifier;
use noughts_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::NoughtsError;

/// Default per-connection outbound queue capacity.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

/// Server settings. Every field has a usable default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Frames a connection may have queued before it is dropped.
    pub outbound_capacity: usize,
    /// Commands a room may have queued before senders wait.
    pub room_channel_capacity: usize,
    pub ping_interval: Duration,
    /// Silence after which a connection counts as gone. Also bounds how
    /// long a single write may wait on a peer that is not reading.
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            room_channel_capacity: DEFAULT_COMMAND_CAPACITY,
            ping_interval: Duration::from_secs(20),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<V: TokenVerifier> {
    pub(crate) verifier: V,
    pub(crate) registry: Arc<RoomRegistry>,
    pub(crate) config: ServerConfig,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Noughts server.
///
/// # Example
///
/// ```rust,no_run
/// use noughts::prelude::*;
///
/// # async fn run() -> Result<(), NoughtsError> {
/// let server = NoughtsServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(JwtVerifier::new(b"secret"))
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct NoughtsServerBuilder {
    config: ServerConfig,
}

impl NoughtsServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.config.outbound_capacity = capacity;
        self
    }

    pub fn room_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.room_channel_capacity = capacity;
        self
    }

    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.config.ping_interval = interval;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Replaces every setting at once.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and prepares the server.
    pub async fn build<V: TokenVerifier>(
        self,
        verifier: V,
    ) -> Result<NoughtsServer<V>, NoughtsError> {
        // A peer that stops reading counts as gone after the idle timeout.
        let transport = WebSocketTransport::bind(&self.config.bind_addr)
            .await?
            .with_write_timeout(self.config.idle_timeout);
        let registry = RoomRegistry::new(RoomConfig {
            command_capacity: self.config.room_channel_capacity,
        });

        let state = Arc::new(ServerState {
            verifier,
            registry: Arc::new(registry),
            config: self.config,
            codec: JsonCodec,
        });

        Ok(NoughtsServer { transport, state })
    }
}

impl Default for NoughtsServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Noughts server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct NoughtsServer<V: TokenVerifier> {
    transport: WebSocketTransport,
    state: Arc<ServerState<V>>,
}

impl<V: TokenVerifier> NoughtsServer<V> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// The server's room registry, for inspection.
    pub fn registry(&self) -> Arc<RoomRegistry> {
        Arc::clone(&self.state.registry)
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), NoughtsError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes, then stops
    /// listening and stops every room.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), NoughtsError> {
        tracing::info!(addr = ?self.local_addr().ok(), "noughts server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.transport.accept() => match accepted {
                    Ok(incoming) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(incoming, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                    }
                },
                () = &mut shutdown => break,
            }
        }

        tracing::info!("noughts server shutting down");
        self.transport.shutdown().await?;
        self.state.registry.shutdown_all().await;
        Ok(())
    }
}
