pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors raised while opening the system log.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The ident cannot be passed to `openlog(3)`.
    #[error("syslog ident contains an interior NUL byte: {0}")]
    InvalidIdent(#[from] std::ffi::NulError),
}
