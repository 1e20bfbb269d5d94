//! Error types for admission.

use noughts_protocol::ErrorCode;

/// Why a connection was refused at admission.
///
/// Every variant is terminal: the gateway reports it once and closes the
/// connection without touching any room.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `token` query parameter (or an empty one).
    #[error("token not found")]
    MissingToken,

    /// No `roomId` query parameter (or an empty one).
    #[error("roomId not found")]
    MissingRoomId,

    /// The token is malformed, has a bad signature, or lacks a user id.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The token's `exp` claim is in the past.
    #[error("token expired")]
    Expired,
}

impl AuthError {
    /// The wire code reported to the client.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::AuthFailed
    }
}
