use core::time::Duration;

/// Default epoch: Thursday, November 4, 2010 1:42:54.657 UTC
///
/// Identifiers minted against this epoch stay within the 41-bit timestamp
/// field until the year 2080.
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Unix epoch: Thursday, January 1, 1970 00:00:00 UTC
pub const UNIX_EPOCH: Duration = Duration::from_millis(0);

/// A source of the current time in **milliseconds** relative to an origin.
///
/// This abstraction allows plugging in the real wall clock, or a mocked time
/// source in tests.
///
/// # Example
///
/// ```
/// use idgate::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
