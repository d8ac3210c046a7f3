/// Reasons a token could not be issued or a credential was rejected.
///
/// The variants are detailed enough for logs. Anything returned to a client
/// should use [`TokenError::public_message`] so the specific reason does not
/// leak.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TokenError {
    /// The credential string is not a readable token.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The header names an algorithm other than HS256.
    #[error("unexpected signing algorithm {found:?}")]
    AlgorithmMismatch {
        /// The `alg` value found in the header.
        found: String,
    },

    /// The signature does not match the header and claims.
    #[error("invalid token signature")]
    BadSignature,

    /// The token expired before the verification time.
    #[error("token expired at {exp}, current time is {now}")]
    Expired {
        /// Expiry (Unix seconds).
        exp: u64,
        /// Verification time (Unix seconds).
        now: u64,
    },

    /// The token is not valid until a later time.
    #[error("token not valid before {nbf}, current time is {now}")]
    NotYetValid {
        /// Not-before (Unix seconds).
        nbf: u64,
        /// Verification time (Unix seconds).
        now: u64,
    },

    /// The signing primitive failed while issuing.
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// No credential was supplied.
    #[error("no credential provided")]
    MissingCredential,
}

impl TokenError {
    /// The uniform message to expose to clients for any rejection.
    pub const fn public_message(&self) -> &'static str {
        "unauthorized"
    }
}

impl From<base64::DecodeError> for TokenError {
    fn from(e: base64::DecodeError) -> Self {
        Self::Malformed(e.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::InvalidKeyFormat | ErrorKind::Crypto(_) => Self::Signing(e.to_string()),
            _ => Self::Malformed(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for TokenError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}
