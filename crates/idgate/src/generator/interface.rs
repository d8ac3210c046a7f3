use crate::{Identifier, NodeId, Result, generator::IdGenStatus, time::TimeSource};

/// A minimal interface for generating identifiers.
///
/// Implementors provide one non-blocking attempt, [`IdGenerator::try_poll_id`];
/// the blocking helpers are built on top of it.
pub trait IdGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new generator for `node_id` reading time from `time`.
    fn new(node_id: NodeId, time: T) -> Self;

    /// Makes one attempt at minting an identifier.
    ///
    /// # Errors
    /// - [`Error::ClockRollback`] if the time source went backward.
    /// - [`Error::TimestampOverflow`] if the time no longer fits the layout.
    /// - [`Error::LockPoisoned`] if a lock-based generator was poisoned.
    ///
    /// [`Error::ClockRollback`]: crate::Error::ClockRollback
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    fn try_poll_id(&self) -> Result<IdGenStatus>;

    /// Mints the next identifier, spinning while the generator is pending.
    ///
    /// The only wait is for the clock to reach the next millisecond after the
    /// sequence is exhausted (or an immediate retry after a lost race), so
    /// this returns quickly as long as the time source keeps advancing.
    ///
    /// # Errors
    /// Propagates any error from [`IdGenerator::try_poll_id`]; a clock
    /// rollback is reported instead of waited out.
    fn generate(&self) -> Result<Identifier> {
        loop {
            match self.try_poll_id()? {
                IdGenStatus::Ready { id } => break Ok(id),
                IdGenStatus::Pending { yield_for: 0 } => core::hint::spin_loop(),
                IdGenStatus::Pending { .. } => std::thread::yield_now(),
            }
        }
    }

    /// Like [`IdGenerator::generate`], returning the signed 64-bit form.
    ///
    /// # Errors
    /// Same as [`IdGenerator::generate`].
    fn generate_i64(&self) -> Result<i64> {
        self.generate().map(|id| id.to_i64())
    }
}
