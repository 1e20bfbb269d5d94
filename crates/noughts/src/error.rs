//! Unified error type for Noughts.

use noughts_protocol::ProtocolError;
use noughts_room::RoomError;
use noughts_session::AuthError;
use noughts_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum NoughtsError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A connection was refused at admission.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A room-level error (rejected operation, room gone).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The global log subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let noughts_err: NoughtsError = err.into();
        assert!(matches!(noughts_err, NoughtsError::Transport(_)));
        assert!(noughts_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::UnknownType("chat:send".into());
        let noughts_err: NoughtsError = err.into();
        assert!(matches!(noughts_err, NoughtsError::Protocol(_)));
    }

    #[test]
    fn test_from_auth_error() {
        let noughts_err: NoughtsError = AuthError::MissingToken.into();
        assert!(matches!(noughts_err, NoughtsError::Auth(_)));
        assert_eq!(noughts_err.to_string(), "token not found");
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::Unavailable(noughts_protocol::RoomId::from("r1"));
        let noughts_err: NoughtsError = err.into();
        assert!(matches!(noughts_err, NoughtsError::Room(_)));
    }
}
