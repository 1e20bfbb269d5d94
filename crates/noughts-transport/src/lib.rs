//! Transport abstraction layer for Noughts.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the network protocol, plus the [`ConnectParams`] each connection carries
//! from its handshake request.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
mod params;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use params::ConnectParams;
#[cfg(feature = "websocket")]
pub use websocket::{
    IncomingWebSocket, WebSocketConnection, WebSocketTransport, DEFAULT_WRITE_TIMEOUT,
};

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Why the server is closing a connection.
///
/// Codes in the 4000 range are application-defined. Clients should not
/// retry a connection closed with [`CloseReason::UNAUTHORIZED`] without
/// obtaining a new token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReason {
    pub code: u16,
    pub reason: String,
}

impl CloseReason {
    /// Authentication failed at admission. Non-retryable.
    pub const UNAUTHORIZED: u16 = 4001;
    /// The outbound queue overflowed.
    pub const LAGGING: u16 = 4002;
    /// Nothing was heard from the peer within the idle timeout.
    pub const IDLE: u16 = 4003;

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self {
            code: Self::UNAUTHORIZED,
            reason: reason.into(),
        }
    }

    pub fn lagging() -> Self {
        Self {
            code: Self::LAGGING,
            reason: "outbound queue overflow".into(),
        }
    }

    pub fn idle() -> Self {
        Self {
            code: Self::IDLE,
            reason: "idle timeout".into(),
        }
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// A peer that has connected but not finished its handshake.
    type Incoming: Incoming<Connection = Self::Connection, Error = Self::Error>;
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer. Does not perform the handshake, so a slow
    /// peer never holds up the next `accept`.
    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error>;

    /// Gracefully shuts down the transport, stopping new connections.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// An accepted peer waiting to be upgraded into a [`Connection`].
///
/// Upgrading runs the protocol handshake and is bounded by a timeout.
pub trait Incoming: Send + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    fn peer_addr(&self) -> SocketAddr;

    /// Completes the handshake.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that carries text frames in both directions.
///
/// Sending and receiving may run concurrently: a pending [`recv`](Self::recv)
/// never blocks a [`send`](Self::send).
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends a text frame to the remote peer.
    ///
    /// Fails if the peer stops reading long enough for the write timeout
    /// to expire.
    async fn send(&self, text: &str) -> Result<(), Self::Error>;

    /// Receives the next data frame from the remote peer.
    ///
    /// Control frames are consumed internally and only refresh the
    /// activity clock. Returns `Ok(None)` when the connection is cleanly
    /// closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Sends a keepalive probe.
    async fn ping(&self) -> Result<(), Self::Error>;

    /// Closes the connection, optionally with a close code and reason,
    /// and waits briefly for the peer to acknowledge.
    async fn close(&self, reason: Option<CloseReason>) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Returns the parameters captured from the handshake request.
    fn params(&self) -> &ConnectParams;

    /// How long since any frame was last received from the peer.
    fn idle_for(&self) -> Duration;
}
