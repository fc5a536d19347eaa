use core::{cmp::Ordering as CmpOrdering, hint::spin_loop};
use portable_atomic::{AtomicBool, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Error, IdGenStatus, Result, SpinLock, TimeSource, TinyflakeId};

/// Mutable generator state, only ever touched under the spin lock.
#[derive(Debug)]
struct State {
    last_timestamp: u64,
    worker_id: u64,
    sequence: u64,
    /// Set once the first ID is issued. Until then `last_timestamp` is not a
    /// real reading, so even a clock stuck at 0 starts at sequence 0.
    issued: bool,
}

impl State {
    const fn new() -> Self {
        Self {
            last_timestamp: 0,
            worker_id: 0,
            sequence: 0,
            issued: false,
        }
    }

    fn clock_ordering(&self, now: u64) -> CmpOrdering {
        if self.issued {
            now.cmp(&self.last_timestamp)
        } else {
            CmpOrdering::Greater
        }
    }

    fn has_sequence_room(&self) -> bool {
        self.sequence < TinyflakeId::max_sequence()
    }

    fn rollover_to(&mut self, timestamp: u64) {
        self.last_timestamp = timestamp;
        self.sequence = 0;
        self.issued = true;
    }

    fn compose(&self) -> TinyflakeId {
        TinyflakeId::from(self.last_timestamp, self.worker_id, self.sequence)
    }
}

/// A spin-locked Snowflake ID allocator for multi-threaded callers.
///
/// The allocator starts out uninitialized and moves to the initialized state
/// on the first successful [`Self::initialize`]; there is no way back. While
/// uninitialized, allocation fails with [`Error::Uninitialized`].
///
/// The `initialized` flag lives outside the lock so the "already
/// initialized?" check on the allocation path never contends with ID
/// composition. The read-timestamp, bump-sequence, compose sequence runs
/// under a [`SpinLock`], including the wait for the next millisecond when 64
/// IDs have already been issued in the current one. Other callers queue
/// behind that wait instead of racing ahead.
///
/// ## Clock behavior
/// - Clock advanced: the sequence resets to 0 at the new millisecond.
/// - Clock unchanged or moved backward: the allocator keeps the last issued
///   millisecond and continues its sequence, spinning until the clock passes
///   that millisecond once the sequence is exhausted. A regressed clock is
///   absorbed rather than reported.
///
/// ## See Also
/// - [`init`] and [`next_id`] for the process-wide instance.
///
/// [`init`]: crate::init
/// [`next_id`]: crate::next_id
#[derive(Debug)]
pub struct IdAllocator<T>
where
    T: TimeSource<u64>,
{
    initialized: AtomicBool,
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<SpinLock<State>>,
    #[cfg(not(feature = "cache-padded"))]
    state: SpinLock<State>,
    time: T,
}

impl<T> Default for IdAllocator<T>
where
    T: TimeSource<u64> + Default,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> IdAllocator<T>
where
    T: TimeSource<u64>,
{
    /// Creates an uninitialized allocator that reads time from `time`.
    ///
    /// This is a `const fn` so an allocator can live in a `static`.
    ///
    /// # Example
    /// ```
    /// use tinyflake::{Error, IdAllocator, WallClock};
    ///
    /// let allocator = IdAllocator::new(WallClock::default());
    /// assert_eq!(allocator.allocate_id(), Err(Error::Uninitialized));
    ///
    /// allocator.initialize(7).unwrap();
    /// let id = allocator.allocate_id().unwrap();
    /// assert_eq!(id.worker_id(), 7);
    /// assert_eq!(id.reserved(), 0);
    /// ```
    pub const fn new(time: T) -> Self {
        Self {
            initialized: AtomicBool::new(false),
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(SpinLock::new(State::new())),
            #[cfg(not(feature = "cache-padded"))]
            state: SpinLock::new(State::new()),
            time,
        }
    }

    /// Fixes the worker ID and marks the allocator initialized.
    ///
    /// Only the first successful call has an effect; later calls return
    /// `Ok(())` and leave the original worker ID in place. Concurrent calls
    /// are decided under the lock, so exactly one of them wins.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] if `worker_id` is outside `0..=255`. The
    ///   range is checked before anything else, even on an allocator that is
    ///   already initialized.
    pub fn initialize(&self, worker_id: i64) -> Result<()> {
        let Some(checked) = u64::try_from(worker_id)
            .ok()
            .filter(|&id| id <= TinyflakeId::max_worker_id())
        else {
            return Err(Error::InvalidArgument { worker_id });
        };

        if self.is_initialized() {
            return Ok(());
        }

        let mut state = self.state.lock();
        // Lost the race to a concurrent initializer.
        if self.initialized.load(Ordering::Relaxed) {
            return Ok(());
        }
        state.worker_id = checked;
        state.sequence = 0;
        self.initialized.store(true, Ordering::Release);

        #[cfg(feature = "tracing")]
        tracing::debug!(worker_id = checked, "id allocator initialized");
        Ok(())
    }

    /// Returns `true` once [`Self::initialize`] has succeeded.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Returns the worker ID, or `None` while uninitialized.
    pub fn worker_id(&self) -> Option<u64> {
        self.is_initialized().then(|| self.state.lock().worker_id)
    }

    /// Allocates the next ID, spinning across a millisecond boundary if the
    /// current millisecond's 64 sequence values are already used.
    ///
    /// The wait has no timeout. It is bounded only by real elapsed time:
    /// at most about a millisecond with a healthy clock, or however long a
    /// regressed clock takes to catch up with the last issued millisecond.
    ///
    /// # Errors
    /// - [`Error::Uninitialized`] if called before [`Self::initialize`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn allocate_id(&self) -> Result<TinyflakeId> {
        if !self.is_initialized() {
            return Err(Error::Uninitialized);
        }

        let mut state = self.state.lock();
        let now = self.time.current_millis();
        match state.clock_ordering(now) {
            CmpOrdering::Greater => state.rollover_to(now),
            ordering => {
                if ordering == CmpOrdering::Less {
                    Self::cold_clock_behind(now, state.last_timestamp);
                }
                if state.has_sequence_room() {
                    state.sequence += 1;
                } else {
                    self.wait_next_millis(&mut state);
                }
            }
        }
        Ok(state.compose())
    }

    /// Attempts to allocate the next ID without waiting.
    ///
    /// Behaves like [`Self::allocate_id`] except when the sequence is
    /// exhausted: instead of spinning, it leaves the state untouched and
    /// returns [`IdGenStatus::Pending`] with the number of milliseconds until
    /// an ID can be issued again.
    ///
    /// # Errors
    /// - [`Error::Uninitialized`] if called before [`Self::initialize`].
    ///
    /// # Example
    /// ```
    /// use tinyflake::{IdAllocator, IdGenStatus, WallClock};
    ///
    /// let allocator = IdAllocator::new(WallClock::default());
    /// allocator.initialize(1).unwrap();
    ///
    /// let id = loop {
    ///     match allocator.try_poll_id().unwrap() {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.worker_id(), 1);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        if !self.is_initialized() {
            return Err(Error::Uninitialized);
        }

        let mut state = self.state.lock();
        let now = self.time.current_millis();
        let status = match state.clock_ordering(now) {
            CmpOrdering::Greater => {
                state.rollover_to(now);
                IdGenStatus::Ready { id: state.compose() }
            }
            ordering => {
                if ordering == CmpOrdering::Less {
                    Self::cold_clock_behind(now, state.last_timestamp);
                }
                if state.has_sequence_room() {
                    state.sequence += 1;
                    IdGenStatus::Ready { id: state.compose() }
                } else {
                    let yield_for = (state.last_timestamp - now).saturating_add(1);
                    IdGenStatus::Pending { yield_for }
                }
            }
        };
        Ok(status)
    }

    /// Spins until the clock passes the last issued millisecond, then moves
    /// the state to it. Caller holds the lock.
    #[cold]
    #[inline(never)]
    fn wait_next_millis(&self, state: &mut State) {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            last_timestamp = state.last_timestamp,
            "sequence exhausted; waiting for next millisecond"
        );
        loop {
            let now = self.time.current_millis();
            if now > state.last_timestamp {
                state.rollover_to(now);
                return;
            }
            spin_loop();
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(_now: u64, _last_timestamp: u64) {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            now = _now,
            last_timestamp = _last_timestamp,
            "clock moved backward; continuing from last timestamp"
        );
    }
}
