use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    time::unix_seconds,
    token::{Claims, TokenError},
};

/// The only signing algorithm issued or accepted.
pub const ALGORITHM: &str = "HS256";

/// The `alg` member as written, including values `jsonwebtoken` has no
/// variant for (`none`, lowercase names).
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Checks the token shape and returns the header's `alg`. An undecodable
/// signature segment is malformed, not a bad signature.
fn peek_algorithm(token: &str) -> Result<String, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    let &[header, _, signature] = segments.as_slice() else {
        return Err(TokenError::Malformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };
    let header: RawHeader = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header)?)?;
    URL_SAFE_NO_PAD.decode(signature)?;
    Ok(header.alg)
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // the validity window is checked against the caller's `now`
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "nbf"]);
    validation
}

/// Issues a token for `user_id` valid from now for `ttl_seconds`.
///
/// # Example
/// ```
/// let token = idgate::issue(42, "ada@example.com", 3600, b"secret").unwrap();
/// let claims = idgate::verify(&token, b"secret").unwrap();
/// assert_eq!(claims.user_id, 42);
/// assert_eq!(claims.email, "ada@example.com");
/// ```
///
/// # Errors
/// Returns [`TokenError::Signing`] if the claims cannot be encoded.
pub fn issue(
    user_id: u64,
    email: &str,
    ttl_seconds: u64,
    secret: impl AsRef<[u8]>,
) -> Result<String, TokenError> {
    issue_at(user_id, email, ttl_seconds, secret, unix_seconds())
}

/// Issues a token as if the current time were `now` (Unix seconds).
///
/// # Errors
/// Same as [`issue`].
pub fn issue_at(
    user_id: u64,
    email: &str,
    ttl_seconds: u64,
    secret: impl AsRef<[u8]>,
    now: u64,
) -> Result<String, TokenError> {
    sign(&Claims::new(user_id, email, ttl_seconds, now), secret.as_ref())
}

/// Signs arbitrary claims with HS256.
///
/// # Errors
/// Returns [`TokenError::Signing`] if encoding fails.
pub fn sign(claims: &Claims, secret: &[u8]) -> Result<String, TokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Verifies `token` against `secret` at the current time.
///
/// # Errors
/// - [`TokenError::Malformed`] if the token cannot be decoded.
/// - [`TokenError::AlgorithmMismatch`] if the header is not HS256.
/// - [`TokenError::BadSignature`] if the MAC does not match.
/// - [`TokenError::Expired`] / [`TokenError::NotYetValid`] outside the
///   validity window.
pub fn verify(token: &str, secret: impl AsRef<[u8]>) -> Result<Claims, TokenError> {
    verify_at(token, secret, unix_seconds())
}

/// Verifies `token` as if the current time were `now` (Unix seconds).
///
/// The token is valid for `nbf <= now <= exp`. The header is checked before
/// the signature, and the claims are only trusted once the signature holds.
///
/// # Errors
/// Same as [`verify`].
#[cfg_attr(feature = "tracing", instrument(level = "trace", skip(token, secret)))]
pub fn verify_at(token: &str, secret: impl AsRef<[u8]>, now: u64) -> Result<Claims, TokenError> {
    let alg = peek_algorithm(token)?;
    if alg != ALGORITHM {
        return Err(TokenError::AlgorithmMismatch { found: alg });
    }

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation(),
    )?
    .claims;

    if now > claims.exp {
        return Err(TokenError::Expired {
            exp: claims.exp,
            now,
        });
    }
    if now < claims.nbf {
        return Err(TokenError::NotYetValid {
            nbf: claims.nbf,
            now,
        });
    }
    Ok(claims)
}
