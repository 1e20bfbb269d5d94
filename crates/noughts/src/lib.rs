//! # Noughts
//!
//! Real-time tic-tac-toe session coordinator.
//!
//! Browser clients open a WebSocket with `?token=…&roomId=…`, are admitted
//! once, and then exchange `{type, payload}` envelopes with their room.
//! Each room is an actor that seats two players, lets anyone else watch,
//! and runs games, forfeits, and rematches.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use noughts::prelude::*;
//!
//! # async fn run() -> Result<(), NoughtsError> {
//! let server = NoughtsServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(JwtVerifier::new(b"shared-secret"))
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod logging;
mod router;
mod server;

pub use error::NoughtsError;
pub use logging::setup_logging;
pub use server::{NoughtsServer, NoughtsServerBuilder, ServerConfig, DEFAULT_OUTBOUND_CAPACITY};

pub use noughts_protocol as protocol;
pub use noughts_room as room;
pub use noughts_session as session;
pub use noughts_transport as transport;

/// Everything needed to run a server.
pub mod prelude {
    pub use crate::{NoughtsError, NoughtsServer, NoughtsServerBuilder, ServerConfig};
    pub use noughts_protocol::{RoomId, UserId};
    pub use noughts_session::{AuthError, JwtVerifier, TokenVerifier};
}
