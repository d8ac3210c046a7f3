//! HS256 bearer session tokens.
//!
//! A token is a compact JWS: `b64url(header).b64url(claims).b64url(mac)`,
//! where the MAC is HMAC-SHA256 over the first two segments. Verification is
//! purely local: no revocation list or external store is consulted.

mod authenticator;
mod bearer;
mod claims;
mod error;
mod jws;

pub use authenticator::*;
pub use bearer::*;
pub use claims::*;
pub use error::*;
pub use jws::*;
