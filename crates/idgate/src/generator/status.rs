use crate::Identifier;

/// The outcome of a single, non-blocking generation attempt.
///
/// - [`IdGenStatus::Ready`] carries a freshly minted identifier.
/// - [`IdGenStatus::Pending`] means the attempt could not complete yet: the
///   sequence for the current millisecond is exhausted, or (for the lock-free
///   generator) another thread won the race. The caller retries after
///   roughly `yield_for` milliseconds; `0` means retry immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated identifier.
        id: Identifier,
    },
    /// No ID could be generated on this attempt.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}
