//! The message catalogue: what clients may send and what the server
//! sends back.
//!
//! Every frame is an envelope `{ "type": <string>, "payload": <object> }`.
//!
//! Inbound frames are decoded in two stages so each failure class can be
//! told apart: first the envelope itself (malformed JSON, missing `type`),
//! then the payload for the specific message type. Outbound messages are a
//! single adjacently-tagged enum, so serde produces the envelope directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Board, Codec, ErrorCode, GameSnapshot, GameStatus, JsonCodec, MoveRecord,
    ProtocolError, Role, Seats, Symbol, UserId, Winner,
};

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Wire names of every inbound message type.
pub mod kind {
    pub const ROOM_JOIN: &str = "room:join";
    pub const ROOM_LEAVE: &str = "room:leave";
    pub const ROOM_START_GAME: &str = "room:start_game";
    pub const GAME_MOVE: &str = "game:move";
    pub const GAME_REMATCH_REQUEST: &str = "game:rematch_request";
    pub const GAME_REMATCH_ACCEPT: &str = "game:rematch_accept";
    pub const SPECTATOR_JOIN: &str = "spectator:join";
    pub const SPECTATOR_LEAVE: &str = "spectator:leave";
}

/// An envelope whose payload has not been validated yet.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

/// A validated client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Join,
    Leave,
    StartGame,
    /// `cell_index` is any JSON integer; range checks belong to the game.
    Move { cell_index: i64 },
    RematchRequest,
    RematchAccept,
    SpectatorJoin,
    SpectatorLeave,
}

impl ClientMessage {
    /// Decodes and validates one inbound frame.
    ///
    /// # Errors
    /// - [`ProtocolError::Decode`] — not JSON
    /// - [`ProtocolError::InvalidEnvelope`] — JSON without a string `type`
    /// - [`ProtocolError::UnknownType`] — `type` not in the dispatch table
    /// - [`ProtocolError::BadPayload`] — payload shape violation
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        let value: Value = JsonCodec.decode(data)?;
        let raw: RawEnvelope = serde_json::from_value(value)
            .map_err(|e| ProtocolError::InvalidEnvelope(e.to_string()))?;

        let msg = match raw.kind.as_str() {
            kind::ROOM_JOIN => Self::Join,
            kind::ROOM_LEAVE => Self::Leave,
            kind::ROOM_START_GAME => Self::StartGame,
            kind::GAME_MOVE => {
                let cell_index = parse_cell_index(&raw.payload)?;
                return Ok(Self::Move { cell_index });
            }
            kind::GAME_REMATCH_REQUEST => Self::RematchRequest,
            kind::GAME_REMATCH_ACCEPT => Self::RematchAccept,
            kind::SPECTATOR_JOIN => Self::SpectatorJoin,
            kind::SPECTATOR_LEAVE => Self::SpectatorLeave,
            _ => return Err(ProtocolError::UnknownType(raw.kind)),
        };
        expect_object(msg.kind(), &raw.payload)?;
        Ok(msg)
    }

    /// The wire name of this message's type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join => kind::ROOM_JOIN,
            Self::Leave => kind::ROOM_LEAVE,
            Self::StartGame => kind::ROOM_START_GAME,
            Self::Move { .. } => kind::GAME_MOVE,
            Self::RematchRequest => kind::GAME_REMATCH_REQUEST,
            Self::RematchAccept => kind::GAME_REMATCH_ACCEPT,
            Self::SpectatorJoin => kind::SPECTATOR_JOIN,
            Self::SpectatorLeave => kind::SPECTATOR_LEAVE,
        }
    }
}

/// Payloads are objects; an absent or `null` payload counts as `{}`.
fn expect_object(kind: &'static str, payload: &Value) -> Result<(), ProtocolError> {
    match payload {
        Value::Null | Value::Object(_) => Ok(()),
        _ => Err(ProtocolError::BadPayload {
            kind,
            reason: "payload must be an object".into(),
        }),
    }
}

fn parse_cell_index(payload: &Value) -> Result<i64, ProtocolError> {
    let bad = |reason: &str| ProtocolError::BadPayload {
        kind: kind::GAME_MOVE,
        reason: reason.into(),
    };
    expect_object(kind::GAME_MOVE, payload)?;
    match payload.get("cellIndex") {
        None | Some(Value::Null) => Err(bad("cellIndex is required")),
        // Integers too large for i64 are still integers: saturate and let
        // the range check reject them.
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .ok_or_else(|| bad("cellIndex must be an integer")),
        Some(_) => Err(bad("cellIndex must be an integer")),
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Sent to the connection that joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Joined {
    pub role: Role,
    pub seats: Seats,
    pub spectator_count: usize,
    /// The current (or most recent) game, if any.
    pub game: Option<GameSnapshot>,
}

/// A membership change, as seen by the rest of the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberEvent {
    pub user_id: UserId,
    pub role: Option<Role>,
    pub seats: Seats,
    pub spectator_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectatorAction {
    Joined,
    Left,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectatorUpdate {
    pub user_id: UserId,
    pub action: SpectatorAction,
    pub spectator_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStarted {
    pub game: GameSnapshot,
}

/// The state after a move or a forfeit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdate {
    pub board: Board,
    pub current_turn: Symbol,
    pub status: GameStatus,
    pub winner: Option<Winner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_move: Option<MoveRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forfeited_by: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RematchPending {
    pub requested_by: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

/// Every message the server sends.
///
/// `#[serde(tag = "type", content = "payload")]` yields the envelope shape
/// `{ "type": "game:update", "payload": { ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    #[serde(rename = "room:joined")]
    Joined(Joined),
    #[serde(rename = "room:player_joined")]
    PlayerJoined(MemberEvent),
    #[serde(rename = "room:spectator_joined")]
    SpectatorJoined(MemberEvent),
    #[serde(rename = "room:left")]
    Left(MemberEvent),
    #[serde(rename = "room:player_left")]
    PlayerLeft(MemberEvent),
    #[serde(rename = "room:spectator_update")]
    SpectatorUpdate(SpectatorUpdate),
    #[serde(rename = "room:game_started")]
    GameStarted(GameStarted),
    #[serde(rename = "game:update")]
    GameUpdate(GameUpdate),
    #[serde(rename = "game:rematch_pending")]
    RematchPending(RematchPending),
    #[serde(rename = "ERROR")]
    Error(ErrorPayload),
}

impl ServerMessage {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
            code: Some(code),
        })
    }

    /// The wire name of this message's type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Joined(_) => "room:joined",
            Self::PlayerJoined(_) => "room:player_joined",
            Self::SpectatorJoined(_) => "room:spectator_joined",
            Self::Left(_) => "room:left",
            Self::PlayerLeft(_) => "room:player_left",
            Self::SpectatorUpdate(_) => "room:spectator_update",
            Self::GameStarted(_) => "room:game_started",
            Self::GameUpdate(_) => "game:update",
            Self::RematchPending(_) => "game:rematch_pending",
            Self::Error(_) => "ERROR",
        }
    }
}
