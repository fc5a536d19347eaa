//! The process-wide allocator exposed to embedding hosts.
//!
//! A host (a scripting runtime, a plugin loader) calls [`init`] once with the
//! worker ID assigned to this process and then [`next_id`] from any thread.
//! The allocator is a `static` built with a `const fn`, so there is nothing
//! to allocate or tear down: it lives until the process exits.

use crate::{IdAllocator, Result, TINYFLAKE_EPOCH, TinyflakeId, WallClock};

/// Value returned by [`next_id`] when the allocator is not initialized.
///
/// All bits set. Real IDs always have their low ten bits cleared, so the
/// sentinel can never collide with an issued ID.
pub const NEXT_ID_SENTINEL: i64 = -1;

/// Worker ID used by [`init`] when the host does not pass one.
pub const DEFAULT_WORKER_ID: i64 = 0;

static ALLOCATOR: IdAllocator<WallClock> =
    IdAllocator::new(WallClock::with_epoch(TINYFLAKE_EPOCH));

/// Returns the process-wide allocator.
pub fn allocator() -> &'static IdAllocator<WallClock> {
    &ALLOCATOR
}

/// Initializes the process-wide allocator.
///
/// `worker_id` defaults to [`DEFAULT_WORKER_ID`]. Returns `Ok(true)` on
/// success, including when the allocator was already initialized (the first
/// worker ID stays in effect).
///
/// # Errors
/// - [`Error::InvalidArgument`] if `worker_id` is outside `0..=255`.
///
/// [`Error::InvalidArgument`]: crate::Error::InvalidArgument
pub fn init(worker_id: Option<i64>) -> Result<bool> {
    ALLOCATOR.initialize(worker_id.unwrap_or(DEFAULT_WORKER_ID))?;
    Ok(true)
}

/// Allocates the next ID from the process-wide allocator as a host integer.
///
/// Returns [`NEXT_ID_SENTINEL`] if [`init`] has not succeeded yet.
pub fn next_id() -> i64 {
    try_next_id().map_or(NEXT_ID_SENTINEL, |id| id.to_i64())
}

/// A fallible version of [`next_id`] that returns a [`Result`].
///
/// # Errors
/// - [`Error::Uninitialized`] if [`init`] has not succeeded yet.
///
/// [`Error::Uninitialized`]: crate::Error::Uninitialized
pub fn try_next_id() -> Result<TinyflakeId> {
    ALLOCATOR.allocate_id()
}
