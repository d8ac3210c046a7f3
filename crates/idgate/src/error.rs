/// A result type defaulting to the generator [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants the identity generator can emit.
///
/// Every variant is recoverable: a generator that returned an error is still
/// usable and its state is unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The time source reported a timestamp older than the last one used.
    ///
    /// The generator rejects the request instead of waiting for the clock to
    /// catch up, so no identifier is ever issued out of order.
    #[error("clock moved backward: now {now}ms, last issued at {last}ms")]
    ClockRollback {
        /// Current reading of the time source.
        now: u64,
        /// Timestamp embedded in the most recently issued identifier.
        last: u64,
    },

    /// The timestamp no longer fits the 41-bit field of an identifier.
    #[error("timestamp {now}ms exceeds the identifier timestamp range")]
    TimestampOverflow {
        /// Current reading of the time source.
        now: u64,
    },

    /// A node id outside `0..=1023` was supplied.
    #[error("node id {value} is out of range (max {max})", max = crate::NodeId::MAX)]
    InvalidNodeId {
        /// The rejected value.
        value: u64,
    },

    /// A sequence value wider than the 12-bit field was supplied.
    #[error("sequence {value} is out of range (max {max})", max = crate::Identifier::max_sequence())]
    InvalidSequence {
        /// The rejected value.
        value: u64,
    },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the generator lock.
    /// When the `parking-lot` feature is enabled, mutexes do not poison and
    /// this variant is never produced.
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
