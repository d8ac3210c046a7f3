use core::fmt;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::token::{Claims, TokenError, strip_bearer, verify_at};
use crate::time::unix_seconds;

/// Transport-neutral credential check.
///
/// Adapters extract the raw `Authorization` value from their request type
/// and hand it here. On success they attach [`Claims::user_id`] to the
/// request context; on any error they reply "unauthorized" (see
/// [`TokenError::public_message`]) without invoking the handler.
///
/// Cloning is cheap and shares the secret.
#[derive(Clone)]
pub struct Authenticator {
    secret: Arc<[u8]>,
}

impl Authenticator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
        }
    }

    /// Issues a token signed with this authenticator's secret.
    ///
    /// # Errors
    /// See [`issue`](crate::issue).
    pub fn issue(&self, user_id: u64, email: &str, ttl_seconds: u64) -> Result<String, TokenError> {
        crate::token::issue(user_id, email, ttl_seconds, &*self.secret)
    }

    /// Verifies a raw credential, with or without the `Bearer ` prefix.
    ///
    /// # Errors
    /// [`TokenError::MissingCredential`] for an empty credential, otherwise
    /// any verification error.
    pub fn authenticate(&self, raw_credential: &str) -> Result<Claims, TokenError> {
        self.authenticate_at(raw_credential, unix_seconds())
    }

    /// Like [`Authenticator::authenticate`] at an explicit time (Unix
    /// seconds).
    ///
    /// # Errors
    /// Same as [`Authenticator::authenticate`].
    pub fn authenticate_at(&self, raw_credential: &str, now: u64) -> Result<Claims, TokenError> {
        let credential = strip_bearer(raw_credential.trim_start()).trim_end();
        let result = if credential.is_empty() {
            Err(TokenError::MissingCredential)
        } else {
            verify_at(credential, &*self.secret, now)
        };

        #[cfg(feature = "tracing")]
        match &result {
            Ok(claims) => debug!(user_id = claims.user_id, "credential accepted"),
            Err(reason) => debug!(%reason, "credential rejected"),
        }

        result
    }

    /// Verifies a raw credential and returns only the subject identity.
    ///
    /// # Errors
    /// Same as [`Authenticator::authenticate`].
    pub fn authenticate_subject(&self, raw_credential: &str) -> Result<u64, TokenError> {
        self.authenticate(raw_credential).map(|claims| claims.user_id)
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("secret", &"<redacted>")
            .finish()
    }
}
