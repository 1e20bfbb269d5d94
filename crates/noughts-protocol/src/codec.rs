//! Codec trait and the JSON implementation.
//!
//! A codec converts between Rust types and frame contents. Every frame in
//! Noughts is a text frame holding one JSON envelope, so encoding produces a
//! `String`. Decoding accepts raw bytes because clients may also send the
//! same JSON in binary frames.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to frame text and decode frames back.
///
/// `Send + Sync + 'static` so a single codec value can be shared by every
/// connection task and room actor for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into frame text.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes frame bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are not valid UTF-8
    /// JSON of the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use noughts_protocol::{Codec, ErrorCode, JsonCodec, ServerMessage};
///
/// let codec = JsonCodec;
/// let msg = ServerMessage::error(ErrorCode::UnknownType, "unknown message type: chat");
///
/// let text = codec.encode(&msg).unwrap();
/// assert!(text.starts_with(r#"{"type":"ERROR""#));
///
/// let decoded: ServerMessage = codec.decode(text.as_bytes()).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        // `from_slice` validates UTF-8 as part of parsing.
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
