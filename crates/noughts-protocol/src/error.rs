//! Error types for the protocol layer and the wire error codes.
//!
//! Each crate in Noughts defines its own error enum. A `ProtocolError`
//! always means the bytes a client sent could not be turned into a valid
//! request; Room state is never involved.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable machine-readable codes carried in `ERROR` envelopes.
///
/// Clients switch on these; the accompanying message is for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // -- admission --
    AuthFailed,

    // -- protocol --
    InvalidJson,
    UnknownType,
    BadPayload,

    // -- room / game state --
    NotEnoughPlayers,
    GameInProgress,
    InvalidMove,
    NotFinished,
    AlreadyPending,
    NoPendingRequest,
    NotOpponent,
    NotAPlayer,
    AlreadySeated,

    // -- server --
    InternalError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AuthFailed => "AUTH_FAILED",
            Self::InvalidJson => "INVALID_JSON",
            Self::UnknownType => "UNKNOWN_TYPE",
            Self::BadPayload => "BAD_PAYLOAD",
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::GameInProgress => "GAME_IN_PROGRESS",
            Self::InvalidMove => "INVALID_MOVE",
            Self::NotFinished => "NOT_FINISHED",
            Self::AlreadyPending => "ALREADY_PENDING",
            Self::NoPendingRequest => "NO_PENDING_REQUEST",
            Self::NotOpponent => "NOT_OPPONENT",
            Self::NotAPlayer => "NOT_A_PLAYER",
            Self::AlreadySeated => "ALREADY_SEATED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed. Only possible for server-built values, so it
    /// is reported to clients as an internal error.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The frame is not valid JSON (or not valid UTF-8).
    #[error("invalid JSON payload: {0}")]
    Decode(serde_json::Error),

    /// The frame is JSON but not a `{type, payload}` envelope.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// The envelope's `type` is not in the dispatch table.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// The payload does not have the shape the message type requires.
    #[error("bad payload for {kind}: {reason}")]
    BadPayload {
        kind: &'static str,
        reason: String,
    },
}

impl ProtocolError {
    /// The wire code reported to the client for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Encode(_) => ErrorCode::InternalError,
            Self::Decode(_) | Self::InvalidEnvelope(_) => ErrorCode::InvalidJson,
            Self::UnknownType(_) => ErrorCode::UnknownType,
            Self::BadPayload { .. } => ErrorCode::BadPayload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serde_matches_as_str() {
        for code in [
            ErrorCode::AuthFailed,
            ErrorCode::BadPayload,
            ErrorCode::NotAPlayer,
            ErrorCode::NoPendingRequest,
            ErrorCode::InternalError,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_protocol_error_codes() {
        let bad = ProtocolError::BadPayload {
            kind: "game:move",
            reason: "cellIndex must be an integer".into(),
        };
        assert_eq!(bad.code(), ErrorCode::BadPayload);
        assert!(bad.to_string().contains("game:move"));
        assert_eq!(
            ProtocolError::UnknownType("chat".into()).code(),
            ErrorCode::UnknownType
        );
    }
}
