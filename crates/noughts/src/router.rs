//! Inbound message dispatch.
//!
//! Turns one data frame into one room operation. Nothing here is fatal to
//! the connection: malformed input and rejected operations come back to
//! the sender as an `ERROR` envelope and the loop carries on.

use noughts_protocol::{ClientMessage, Codec, ErrorCode, JsonCodec, ServerMessage};
use noughts_room::{RoomError, RoomHandle};
use noughts_transport::{Connection, WebSocketConnection};

use crate::NoughtsError;

/// Parses `data` and runs it against the connection's room.
///
/// Only a failure to write the `ERROR` reply is returned as an error.
pub(crate) async fn route(
    conn: &WebSocketConnection,
    room: &RoomHandle,
    codec: &JsonCodec,
    data: &[u8],
) -> Result<(), NoughtsError> {
    let conn_id = conn.id();
    let msg = match ClientMessage::parse(data) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "rejected inbound frame");
            return send_error(conn, codec, e.code(), &e.to_string()).await;
        }
    };
    let kind = msg.kind();
    tracing::trace!(%conn_id, kind, "dispatching");

    match room.submit(conn_id, msg).await {
        Ok(()) => Ok(()),
        Err(e @ RoomError::Unavailable(_)) => {
            tracing::error!(%conn_id, kind, error = %e, "room operation failed");
            send_error(conn, codec, ErrorCode::InternalError, "internal error").await
        }
        Err(e) => send_error(conn, codec, e.code(), &e.to_string()).await,
    }
}

/// Writes one `ERROR` envelope straight to the transport.
pub(crate) async fn send_error(
    conn: &WebSocketConnection,
    codec: &JsonCodec,
    code: ErrorCode,
    message: &str,
) -> Result<(), NoughtsError> {
    let text = codec.encode(&ServerMessage::error(code, message))?;
    conn.send(&text).await?;
    Ok(())
}
