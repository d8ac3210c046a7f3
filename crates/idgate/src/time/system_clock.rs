use std::time::{Duration, SystemTime};

use crate::time::{DEFAULT_EPOCH, TimeSource};

/// A wall-clock time source offset from a fixed epoch.
///
/// Each call reads `SystemTime::now()`, so adjustments to the host clock
/// (NTP steps, manual changes) are visible to the generator. A step backward
/// surfaces as [`Error::ClockRollback`] rather than being hidden.
///
/// Readings earlier than the epoch saturate to zero.
///
/// [`Error::ClockRollback`]: crate::Error::ClockRollback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemClock {
    epoch: Duration,
}

impl Default for SystemClock {
    /// Constructs a clock aligned to [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }
}

impl SystemClock {
    /// Constructs a clock using `epoch` (a [`Duration`] since 1970-01-01 UTC)
    /// as its origin.
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }

    pub const fn epoch(&self) -> Duration {
        self.epoch
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        let since_unix = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();
        since_unix.saturating_sub(self.epoch).as_millis() as u64
    }
}

/// Seconds since the Unix epoch according to the wall clock.
pub fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
