//! Per-connection outbound queues.
//!
//! The room never awaits a connection. Each subscriber gets a bounded
//! queue; the room pushes pre-encoded frames with `try_send`, and a full
//! queue gets the connection dropped instead of stalling the room.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use noughts_transport::ConnectionId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// An encoded frame, shared between every recipient of one broadcast.
pub type Frame = Arc<str>;

/// Creates the two ends of a connection's outbound queue.
pub fn outbound_channel(
    conn_id: ConnectionId,
    capacity: usize,
) -> (ConnectionSink, OutboundQueue) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let lagged = Arc::new(AtomicBool::new(false));
    (
        ConnectionSink {
            conn_id,
            tx,
            lagged: Arc::clone(&lagged),
        },
        OutboundQueue { rx, lagged },
    )
}

/// The room's end: where broadcasts for one connection are pushed.
#[derive(Debug, Clone)]
pub struct ConnectionSink {
    conn_id: ConnectionId,
    tx: mpsc::Sender<Frame>,
    lagged: Arc<AtomicBool>,
}

impl ConnectionSink {
    pub fn conn_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Queues a frame without waiting.
    ///
    /// Returns `false` if the queue is full or its reader is gone; the
    /// caller must then stop delivering to this sink.
    pub fn deliver(&self, frame: &Frame) -> bool {
        match self.tx.try_send(Arc::clone(frame)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.lagged.store(true, Ordering::Release);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// The gateway's end: frames waiting to be written to the transport.
#[derive(Debug)]
pub struct OutboundQueue {
    rx: mpsc::Receiver<Frame>,
    lagged: Arc<AtomicBool>,
}

impl OutboundQueue {
    /// Next queued frame, or `None` once the room has dropped its sink
    /// and everything already queued has been taken.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }

    /// Whether the room gave up on this connection because it fell
    /// behind.
    pub fn lagged(&self) -> bool {
        self.lagged.load(Ordering::Acquire)
    }
}
