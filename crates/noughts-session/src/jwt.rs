//! HS256 JWT verification.
//!
//! Tokens are issued by the account service on sign-in and carry the user
//! id in a `userId` claim. `exp` is enforced when present but not required,
//! matching what that service issues.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use noughts_protocol::UserId;
use serde::Deserialize;

use crate::{AuthError, TokenVerifier};

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(rename = "userId")]
    user_id: String,
}

/// A [`TokenVerifier`] for HS256-signed JWTs sharing a secret with the
/// issuer.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    fn decode(&self, token: &str) -> Result<UserId, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;
        if data.claims.user_id.is_empty() {
            return Err(AuthError::InvalidToken("empty userId claim".into()));
        }
        Ok(UserId(data.claims.user_id))
    }
}

impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let result = self.decode(token);
        if let Err(e) = &result {
            tracing::debug!(error = %e, "token rejected");
        }
        result
    }
}
