use noughts_protocol::{RoomId, UserId};

use crate::{AuthError, TokenVerifier};

/// A connection that passed admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admitted {
    pub user_id: UserId,
    pub room_id: RoomId,
}

/// Admits a connection from its handshake parameters.
///
/// Both parameters must be present before the token is verified, so a
/// request without a room never costs a signature check.
pub async fn admit<V: TokenVerifier>(
    verifier: &V,
    token: Option<&str>,
    room_id: Option<&str>,
) -> Result<Admitted, AuthError> {
    let token = token.ok_or(AuthError::MissingToken)?;
    let room_id = room_id.ok_or(AuthError::MissingRoomId)?;
    let user_id = verifier.verify(token).await?;
    Ok(Admitted {
        user_id,
        room_id: RoomId::from(room_id),
    })
}
