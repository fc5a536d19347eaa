use core::time::Duration;

/// Tinyflake epoch: Friday, January 1, 2016 00:00:00 UTC
pub const TINYFLAKE_EPOCH: Duration = Duration::from_millis(1_451_606_400_000);

/// A trait for time sources that return a wall-clock timestamp.
///
/// This abstraction allows you to plug in the system clock or a mocked time
/// source in tests.
///
/// The unit is expected to be **milliseconds** relative to a configurable
/// origin. The allocator tolerates sources that move backward.
///
/// # Example
///
/// ```
/// use tinyflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource<u64> for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource<T> {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> T;
}
