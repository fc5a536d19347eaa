/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `tinyflake` can emit.
///
/// Every variant is reported synchronously to the immediate caller and none
/// of them is retried internally. A clock that moves backward is *not* an
/// error: the allocator absorbs it and keeps issuing IDs from the last
/// millisecond it observed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The worker ID passed to `initialize` does not fit in the 8-bit worker
    /// field (`0..=255`). No state was changed.
    #[error("worker id {worker_id} is out of range 0-255")]
    InvalidArgument {
        /// The rejected value, as the caller supplied it.
        worker_id: i64,
    },

    /// An ID was requested before the allocator was initialized.
    #[error("allocator has not been initialized")]
    Uninitialized,

    /// Generator state could not be allocated while initializing.
    ///
    /// Hosts that build allocator state fallibly report this; the
    /// statically-allocated process-wide allocator never does.
    #[error("not enough memory to initialize the allocator")]
    ResourceExhaustion,
}
