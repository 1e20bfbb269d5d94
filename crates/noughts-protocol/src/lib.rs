//! Wire protocol for Noughts.
//!
//! This crate defines the "language" that browser clients and the
//! coordinator speak:
//!
//! - **Types** ([`UserId`], [`RoomId`], [`Board`], [`GameSnapshot`], etc.) —
//!   the values carried inside messages.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]) — the fixed
//!   catalogue of `{type, payload}` envelopes, including inbound
//!   validation.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages become frame
//!   text.
//! - **Errors** ([`ProtocolError`], [`ErrorCode`]) — what can go wrong and
//!   how it is reported on the wire.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about connections or rooms; it only
//! turns frames into requests and events into frames.
//!
//! ```text
//! Transport (frames) → Protocol (ClientMessage) → Room (operations)
//! ```

mod codec;
mod error;
mod messages;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::{ErrorCode, ProtocolError};
pub use messages::{
    kind, ClientMessage, ErrorPayload, GameStarted, GameUpdate, Joined,
    MemberEvent, RematchPending, ServerMessage, SpectatorAction,
    SpectatorUpdate,
};
pub use types::{
    Board, Cell, GameSnapshot, GameStatus, MoveRecord, Players, Role, RoomId,
    SeatView, Seats, Symbol, UserId, Winner, BOARD_CELLS,
};
