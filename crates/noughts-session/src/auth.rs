//! Verification hook for bearer credentials.
//!
//! Noughts doesn't issue tokens — the account service does. The coordinator
//! only needs to turn a token back into a user identity, so that capability
//! is a trait: JWT validation in production ([`JwtVerifier`](crate::JwtVerifier)),
//! a lookup table in tests.

use noughts_protocol::UserId;

use crate::AuthError;

/// Validates a client's bearer token and returns their identity.
///
/// `Send + Sync + 'static` because one verifier is shared by every
/// connection task for the lifetime of the server.
///
/// # Example
///
/// ```rust
/// use noughts_protocol::UserId;
/// use noughts_session::{AuthError, TokenVerifier};
///
/// /// Treats the token itself as the user id. Development only.
/// struct DevVerifier;
///
/// impl TokenVerifier for DevVerifier {
///     async fn verify(&self, token: &str) -> Result<UserId, AuthError> {
///         if token.is_empty() {
///             return Err(AuthError::InvalidToken("empty token".into()));
///         }
///         Ok(UserId(token.to_owned()))
///     }
/// }
/// ```
pub trait TokenVerifier: Send + Sync + 'static {
    /// Validates the given token and returns the user's identity.
    ///
    /// # Returns
    /// - `Ok(UserId)` — the token is valid
    /// - `Err(AuthError::InvalidToken | AuthError::Expired)` — it is not
    fn verify(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<UserId, AuthError>> + Send;
}
