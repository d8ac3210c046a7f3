/// Header that conventionally carries the credential. Transports compare it
/// case-insensitively.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Literal prefix of a bearer credential, including the single space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Removes the [`BEARER_PREFIX`] from a raw credential.
///
/// Strings without the prefix are returned unchanged. The prefix is removed
/// repeatedly, so `strip_bearer(strip_bearer(s)) == strip_bearer(s)`.
///
/// ```
/// use idgate::strip_bearer;
///
/// assert_eq!(strip_bearer("Bearer abc.def.ghi"), "abc.def.ghi");
/// assert_eq!(strip_bearer("abc.def.ghi"), "abc.def.ghi");
/// ```
pub fn strip_bearer(raw: &str) -> &str {
    let mut credential = raw;
    while let Some(rest) = credential.strip_prefix(BEARER_PREFIX) {
        credential = rest;
    }
    credential
}
