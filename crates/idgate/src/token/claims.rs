use serde::{Deserialize, Serialize};

/// Issuer label stamped on every token.
pub const ISSUER: &str = "sport-user";

/// The identity facts carried by a token.
///
/// Timestamps are Unix seconds and use the registered JWT claim names.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claims {
    /// Numeric identity of the subject.
    pub user_id: u64,
    pub email: String,
    /// Issued at.
    pub iat: u64,
    /// Not before.
    pub nbf: u64,
    /// Expires at.
    pub exp: u64,
    /// Issuer.
    pub iss: String,
}

impl Claims {
    /// Claims valid from `now` for `ttl_seconds`.
    pub fn new(user_id: u64, email: impl Into<String>, ttl_seconds: u64, now: u64) -> Self {
        Self {
            user_id,
            email: email.into(),
            iat: now,
            nbf: now,
            exp: now.saturating_add(ttl_seconds),
            iss: ISSUER.to_owned(),
        }
    }
}
