use core::time::Duration;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

use crate::{TINYFLAKE_EPOCH, TimeSource};

/// A time source that reads the host wall clock on every call, offset from a
/// user-defined epoch.
///
/// Unlike a monotonic timer, this clock follows NTP steps and manual
/// adjustments, including backward ones. The allocator is what keeps issued
/// timestamps monotonic.
///
/// A host clock earlier than the epoch reads as `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClock {
    epoch_millis: u64,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`TINYFLAKE_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(TINYFLAKE_EPOCH)
    }
}

impl WallClock {
    /// Constructs a wall clock whose zero point is `epoch`, given as a
    /// [`Duration`] since 1970-01-01 UTC.
    ///
    /// # Example
    ///
    /// ```
    /// use core::time::Duration;
    /// use tinyflake::{TimeSource, WallClock};
    ///
    /// let unix = WallClock::with_epoch(Duration::ZERO);
    /// let custom = WallClock::default();
    /// assert!(unix.current_millis() > custom.current_millis());
    /// ```
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self {
            epoch_millis: epoch.as_millis() as u64,
        }
    }

    /// Returns the configured epoch.
    pub const fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch_millis)
    }
}

impl TimeSource<u64> for WallClock {
    fn current_millis(&self) -> u64 {
        let unix_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64);
        unix_millis.saturating_sub(self.epoch_millis)
    }
}
