//! Connection parameters captured from the handshake request.

use serde::Deserialize;

/// The query parameters a client supplies when opening a connection:
/// `?token=<bearer>&roomId=<room>`.
///
/// Unknown keys are ignored. Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectParams {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "roomId")]
    room_id: Option<String>,
}

impl ConnectParams {
    pub fn new(token: Option<String>, room_id: Option<String>) -> Self {
        Self { token, room_id }
    }

    /// Parses a raw (percent-encoded) query string.
    ///
    /// A query that cannot be decoded yields empty parameters, which the
    /// gateway then rejects as missing credentials.
    pub fn from_query(query: &str) -> Self {
        match serde_urlencoded::from_str(query) {
            Ok(params) => params,
            Err(e) => {
                tracing::debug!(error = %e, "undecodable connection query");
                Self::default()
            }
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref().filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_reads_token_and_room() {
        let params = ConnectParams::from_query("token=abc.def&roomId=lobby-1");
        assert_eq!(params.token(), Some("abc.def"));
        assert_eq!(params.room_id(), Some("lobby-1"));
    }

    #[test]
    fn test_from_query_percent_decodes() {
        let params = ConnectParams::from_query("roomId=my%20room&token=a%2Bb");
        assert_eq!(params.room_id(), Some("my room"));
        assert_eq!(params.token(), Some("a+b"));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let params = ConnectParams::from_query("token=&roomId=");
        assert_eq!(params.token(), None);
        assert_eq!(params.room_id(), None);
    }

    #[test]
    fn test_missing_and_unknown_keys() {
        let params = ConnectParams::from_query("foo=bar&roomId=r");
        assert_eq!(params.token(), None);
        assert_eq!(params.room_id(), Some("r"));
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(ConnectParams::from_query(""), ConnectParams::default());
    }
}
