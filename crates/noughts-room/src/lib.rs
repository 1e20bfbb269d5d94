//! Rooms for Noughts.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its seats,
//! spectators, the active game, and the rematch negotiation. Everything a
//! room says goes out through per-connection bounded queues.
//!
//! # Key types
//!
//! - [`Game`] — the pure tic-tac-toe state machine
//! - [`RoomRegistry`] — creates rooms on first reference, evicts idle ones
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`ConnectionSink`] / [`OutboundQueue`] — the two ends of a
//!   connection's outbound queue
//! - [`RoomConfig`] — room settings

mod config;
mod error;
mod game;
mod registry;
mod room;
mod sink;

pub use config::{RoomConfig, DEFAULT_COMMAND_CAPACITY};
pub use error::{GameError, RoomError};
pub use game::Game;
pub use registry::RoomRegistry;
pub use room::{RoomHandle, RoomInfo};
pub use sink::{outbound_channel, ConnectionSink, Frame, OutboundQueue};
