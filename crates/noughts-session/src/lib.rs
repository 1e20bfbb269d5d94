//! Connection admission for Noughts.
//!
//! This crate decides whether a freshly opened connection may talk to a
//! room at all:
//!
//! 1. **Token verification** — who the user is ([`TokenVerifier`] trait,
//!    with a JWT implementation in [`JwtVerifier`])
//! 2. **Admission** — combining the verified identity with the requested
//!    room ([`admit`])
//!
//! Authentication happens exactly once per connection. Everything after
//! admission trusts the returned [`Admitted`] identity.
//!
//! # How it fits in the stack
//!
//! ```text
//! Gateway (above)  ← calls admit() with the handshake's token and roomId
//!     ↕
//! Session layer (this crate)  ← verifies credentials
//!     ↕
//! Protocol layer (below)  ← provides UserId, RoomId, ErrorCode
//! ```

#![allow(async_fn_in_trait)]

mod admission;
mod auth;
mod error;
mod jwt;

pub use admission::{admit, Admitted};
pub use auth::TokenVerifier;
pub use error::AuthError;
pub use jwt::JwtVerifier;
