use core::cmp;

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, Identifier, NodeId, Result,
    generator::{IdGenStatus, IdGenerator, lock::cold_clock_behind},
    time::{SystemClock, TimeSource},
};

/// A lock-free identifier generator.
///
/// The packed identifier is stored in a single [`AtomicU64`] and advanced
/// with a compare-and-swap. A lost race reports
/// [`IdGenStatus::Pending`] with `yield_for: 0` so the caller retries at
/// once; [`IdGenerator::generate`] does this automatically.
///
/// ## Recommended When
/// - Contention is low to moderate and lock overhead matters
///
/// ## See Also
/// - [`LockIdGenerator`]
///
/// [`LockIdGenerator`]: crate::LockIdGenerator
pub struct AtomicIdGenerator<T = SystemClock>
where
    T: TimeSource,
{
    state: AtomicU64,
    node_id: NodeId,
    time: T,
}

impl AtomicIdGenerator<SystemClock> {
    /// Same startup as [`LockIdGenerator::from_host`].
    ///
    /// ```
    /// use idgate::{AtomicIdGenerator, IdGenerator};
    ///
    /// let generator = AtomicIdGenerator::from_host();
    /// assert!(generator.generate_i64().unwrap() > 0);
    /// ```
    ///
    /// [`LockIdGenerator::from_host`]: crate::LockIdGenerator::from_host
    pub fn from_host() -> Self {
        Self::new(NodeId::from_host(), SystemClock::default())
    }
}

impl<T> AtomicIdGenerator<T>
where
    T: TimeSource,
{
    pub fn new(node_id: NodeId, time: T) -> Self {
        Self::from_state(Identifier::from(0, node_id.into(), 0), node_id, time)
    }

    /// Creates a generator preloaded with explicit state.
    ///
    /// # Errors
    /// Returns [`Error::TimestampOverflow`] or [`Error::InvalidSequence`] if
    /// a component does not fit its field.
    pub fn from_components(
        timestamp: u64,
        node_id: NodeId,
        sequence: u64,
        time: T,
    ) -> Result<Self> {
        let initial = Identifier::try_from_components(timestamp, node_id.into(), sequence)?;
        Ok(Self::from_state(initial, node_id, time))
    }

    fn from_state(initial: Identifier, node_id: NodeId, time: T) -> Self {
        Self {
            state: AtomicU64::new(initial.to_raw()),
            node_id,
            time,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Attempts to mint the next identifier.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: a new ID is available
    /// - `Ok(IdGenStatus::Pending { yield_for: 1 })`: the sequence is
    ///   exhausted for this millisecond
    /// - `Ok(IdGenStatus::Pending { yield_for: 0 })`: another thread won the
    ///   compare-and-swap
    ///
    /// # Errors
    /// - [`Error::ClockRollback`] if the clock reads earlier than the last
    ///   issued timestamp.
    /// - [`Error::TimestampOverflow`] past the end of the 41-bit range.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        // Load before reading the clock so `now` is never older than the
        // stored timestamp.
        let current_raw = self.state.load(Ordering::Acquire);
        let current_id = Identifier::from_raw(current_raw);
        let current_ts = current_id.timestamp();

        let now = self.time.current_millis();
        if now > Identifier::max_timestamp() {
            return Err(Error::TimestampOverflow { now });
        }

        let next_id = match now.cmp(&current_ts) {
            cmp::Ordering::Equal => {
                if current_id.has_sequence_room() {
                    current_id.increment_sequence()
                } else {
                    return Ok(IdGenStatus::Pending { yield_for: 1 });
                }
            }
            cmp::Ordering::Greater => current_id.rollover_to_timestamp(now),
            cmp::Ordering::Less => return Err(cold_clock_behind(now, current_ts)),
        };

        if self
            .state
            .compare_exchange(
                current_raw,
                next_id.to_raw(),
                Ordering::AcqRel,
                Ordering::Relaxed,
            )
            .is_ok()
        {
            Ok(IdGenStatus::Ready { id: next_id })
        } else {
            Ok(IdGenStatus::Pending { yield_for: 0 })
        }
    }
}

impl<T> IdGenerator<T> for AtomicIdGenerator<T>
where
    T: TimeSource,
{
    fn new(node_id: NodeId, time: T) -> Self {
        Self::new(node_id, time)
    }

    fn try_poll_id(&self) -> Result<IdGenStatus> {
        self.try_poll_id()
    }
}
