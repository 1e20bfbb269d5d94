//! Per-connection gateway: admission, subscription, liveness.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   0. Upgrade: finish the WebSocket handshake in this task
//!   1. Admit: verify the handshake's `token`, read its `roomId`
//!   2. Attach: subscribe to the room through a bounded outbound queue
//!   3. Loop: route inbound frames, flush the queue, ping on schedule
//!   4. Detach and release the room, however the loop ended

use std::sync::Arc;

use noughts_protocol::RoomId;
use noughts_room::{outbound_channel, RoomHandle, RoomRegistry};
use noughts_session::{admit, Admitted, TokenVerifier};
use noughts_transport::{CloseReason, Connection, ConnectionId, Incoming, IncomingWebSocket};
use tokio::time::MissedTickBehavior;

use crate::router::{route, send_error};
use crate::server::ServerState;
use crate::NoughtsError;

/// Drop guard that detaches a connection from its room when the handler
/// exits, then lets the registry evict the room if it was the last one.
///
/// Cleanup runs even if the handler returns early with an error. `Drop` is
/// synchronous, so it spawns a fire-and-forget task.
struct AttachGuard {
    conn_id: ConnectionId,
    room_id: RoomId,
    room: RoomHandle,
    registry: Arc<RoomRegistry>,
}

impl Drop for AttachGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let room_id = self.room_id.clone();
        let room = self.room.clone();
        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            let _ = room.detach(conn_id).await;
            registry.release_if_idle(&room_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<V: TokenVerifier>(
    incoming: IncomingWebSocket,
    state: Arc<ServerState<V>>,
) -> Result<(), NoughtsError> {
    let peer = incoming.peer_addr();
    let conn = match incoming.upgrade().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::debug!(%peer, error = %e, "upgrade failed");
            return Err(e.into());
        }
    };
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // --- Step 1: Admission ---
    let params = conn.params();
    let Admitted { user_id, room_id } =
        match admit(&state.verifier, params.token(), params.room_id()).await {
            Ok(admitted) => admitted,
            Err(e) => {
                tracing::info!(%conn_id, error = %e, "connection refused");
                let _ = send_error(&conn, &state.codec, e.code(), &e.to_string()).await;
                let _ = conn
                    .close(Some(CloseReason::unauthorized("authentication failed")))
                    .await;
                return Err(e.into());
            }
        };

    // --- Step 2: Attach ---
    let room = state.registry.get_or_create(&room_id);
    let _guard = AttachGuard {
        conn_id,
        room_id: room_id.clone(),
        room: room.clone(),
        registry: Arc::clone(&state.registry),
    };
    let (sink, mut outbox) = outbound_channel(conn_id, state.config.outbound_capacity);
    room.attach(user_id.clone(), sink).await?;
    tracing::info!(%conn_id, %user_id, %room_id, "connection attached");

    // --- Step 3: Message loop ---
    let mut ping = tokio::time::interval(state.config.ping_interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ping.tick().await;

    let close = loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(data)) => route(&conn, &room, &state.codec, &data).await?,
                Ok(None) => {
                    tracing::info!(%conn_id, %user_id, "connection closed by peer");
                    break None;
                }
                Err(e) => {
                    tracing::debug!(%conn_id, %user_id, error = %e, "recv error");
                    break None;
                }
            },
            outbound = outbox.recv() => match outbound {
                Some(frame) => {
                    if let Err(e) = conn.send(&frame).await {
                        tracing::warn!(%conn_id, %user_id, error = %e, "peer stopped reading");
                        break None;
                    }
                }
                None if outbox.lagged() => {
                    tracing::warn!(%conn_id, %user_id, "outbound queue overflowed");
                    break Some(CloseReason::lagging());
                }
                None => {
                    tracing::debug!(%conn_id, "room released the connection");
                    break None;
                }
            },
            _ = ping.tick() => {
                if conn.idle_for() > state.config.idle_timeout {
                    tracing::info!(%conn_id, %user_id, "connection idle, closing");
                    break Some(CloseReason::idle());
                }
                conn.ping().await?;
            }
        }
    };

    if let Some(reason) = close {
        let _ = conn.close(Some(reason)).await;
    }

    // _guard drops here → detach and release fire.
    Ok(())
}
