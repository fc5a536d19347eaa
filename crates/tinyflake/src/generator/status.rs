use crate::TinyflakeId;

/// Represents the result of a non-blocking attempt to allocate an ID.
///
/// This type models the outcome of [`IdAllocator::try_poll_id`]:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was allocated.
/// - [`IdGenStatus::Pending`] means the current millisecond's 64 sequence
///   values are used up and nothing was allocated.
///
/// [`IdAllocator::try_poll_id`]: crate::IdAllocator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was allocated and is ready to use.
    Ready {
        /// The allocated ID.
        id: TinyflakeId,
    },
    /// No ID could be allocated because the sequence has been exhausted for
    /// the current millisecond.
    Pending {
        /// Milliseconds to wait before the next attempt can succeed.
        yield_for: u64,
    },
}
