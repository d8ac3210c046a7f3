use core::cmp::Ordering;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, Identifier, NodeId, Result,
    generator::{IdGenStatus, IdGenerator, Mutex},
    time::{SystemClock, TimeSource},
};

/// A lock-based identifier generator for multi-threaded use.
///
/// The last issued identifier (which doubles as the timestamp and sequence
/// state) lives behind an [`Arc<Mutex<_>>`]. Cloning the generator yields
/// another handle onto the same state, so clones never hand out duplicates.
///
/// ## Recommended When
/// - One generator is shared by every request handler in the process
/// - Fair access across threads is important
///
/// ## See Also
/// - [`AtomicIdGenerator`]
///
/// [`AtomicIdGenerator`]: crate::AtomicIdGenerator
pub struct LockIdGenerator<T = SystemClock>
where
    T: TimeSource,
{
    pub(crate) state: Arc<Mutex<Identifier>>,
    pub(crate) node_id: NodeId,
    pub(crate) time: T,
}

impl LockIdGenerator<SystemClock> {
    /// Builds the process generator: node id derived from the host's
    /// interfaces, wall clock at the default epoch.
    ///
    /// # Example
    /// ```
    /// use idgate::{IdGenerator, LockIdGenerator};
    ///
    /// let generator = LockIdGenerator::from_host();
    /// let a = generator.generate().unwrap();
    /// let b = generator.generate().unwrap();
    /// assert!(a < b);
    /// ```
    pub fn from_host() -> Self {
        Self::new(NodeId::from_host(), SystemClock::default())
    }
}

impl<T> LockIdGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator whose state starts at timestamp zero, sequence
    /// zero.
    pub fn new(node_id: NodeId, time: T) -> Self {
        Self::from_state(Identifier::from(0, node_id.into(), 0), node_id, time)
    }

    /// Creates a generator preloaded with explicit state, e.g. the last
    /// identifier issued before a restart.
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
        let id = Identifier::try_from_components(timestamp, node_id.into(), sequence)?;
        Ok(Self::from_state(id, node_id, time))
    }

    fn from_state(id: Identifier, node_id: NodeId, time: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(id)),
            node_id,
            time,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Attempts to mint the next identifier without blocking on the clock.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: a new ID is available
    /// - `Ok(IdGenStatus::Pending { yield_for })`: the sequence is exhausted
    ///   for this millisecond
    ///
    /// # Errors
    /// - [`Error::ClockRollback`] if the clock reads earlier than the last
    ///   issued timestamp. The state is left untouched.
    /// - [`Error::TimestampOverflow`] past the end of the 41-bit range.
    /// - [`Error::LockPoisoned`] if the lock was poisoned (std mutex only).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let mut id = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        // Clock is read under the lock so `now` is never older than a
        // timestamp stored by another thread.
        let now = self.time.current_millis();
        if now > Identifier::max_timestamp() {
            return Err(Error::TimestampOverflow { now });
        }

        let current_ts = id.timestamp();
        match now.cmp(&current_ts) {
            Ordering::Equal => {
                if id.has_sequence_room() {
                    *id = id.increment_sequence();
                    Ok(IdGenStatus::Ready { id: *id })
                } else {
                    Ok(IdGenStatus::Pending { yield_for: 1 })
                }
            }
            Ordering::Greater => {
                *id = id.rollover_to_timestamp(now);
                Ok(IdGenStatus::Ready { id: *id })
            }
            Ordering::Less => Err(cold_clock_behind(now, current_ts)),
        }
    }
}

#[cold]
#[inline(never)]
pub(crate) fn cold_clock_behind(now: u64, last: u64) -> Error {
    #[cfg(feature = "tracing")]
    tracing::warn!(now, last, "clock moved backward, refusing to mint");
    Error::ClockRollback { now, last }
}

impl<T> Clone for LockIdGenerator<T>
where
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            node_id: self.node_id,
            time: self.time.clone(),
        }
    }
}

impl<T> IdGenerator<T> for LockIdGenerator<T>
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
