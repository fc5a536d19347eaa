use crate::{LoggerConfig, Priority, Result, format_record};

/// Destination for formatted log records.
///
/// [`Syslog`] is the production sink; tests and alternative hosts can
/// provide their own.
pub trait RecordSink {
    /// Emits one message from `source`.
    fn emit(&self, source: u32, msg: &str);
}

/// A connection to the system logger.
///
/// `openlog(3)` state is process-global, so only one `Syslog` should be
/// alive at a time; opening a second one re-targets the first. The
/// connection is closed on drop.
#[derive(Debug)]
pub struct Syslog {
    #[cfg(unix)]
    ident: std::ffi::CString,
    #[cfg(not(unix))]
    ident: String,
    priority: Priority,
}

impl Syslog {
    /// Opens the system log with the ident, options and facility from
    /// `config`. Records are emitted at `config.priority`.
    ///
    /// # Errors
    /// - [`Error::InvalidIdent`] if the ident contains a NUL byte.
    ///
    /// [`Error::InvalidIdent`]: crate::Error::InvalidIdent
    #[cfg(unix)]
    pub fn open(config: &LoggerConfig) -> Result<Self> {
        let ident = std::ffi::CString::new(config.ident.as_str())?;
        // SAFETY: `ident` is owned by the returned value and outlives the
        // connection, which `Drop` closes.
        unsafe {
            libc::openlog(
                ident.as_ptr(),
                config.options.bits(),
                config.facility.as_raw(),
            );
        }
        Ok(Self {
            ident,
            priority: config.priority,
        })
    }

    /// Stand-in for targets without `syslog(3)`: records go to stderr.
    #[cfg(not(unix))]
    pub fn open(config: &LoggerConfig) -> Result<Self> {
        std::ffi::CString::new(config.ident.as_str())?;
        Ok(Self {
            ident: config.ident.clone(),
            priority: config.priority,
        })
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Writes one already formatted line.
    #[cfg(unix)]
    fn write_line(&self, line: &str) {
        let line = c_line(line);
        // SAFETY: both pointers are valid NUL-terminated strings and the
        // format consumes exactly one `%s` argument.
        unsafe {
            libc::syslog(self.priority.as_raw(), c"%s".as_ptr(), line.as_ptr());
        }
    }

    #[cfg(not(unix))]
    fn write_line(&self, line: &str) {
        eprintln!("{}: {line}", self.ident);
    }
}

/// Converts a record to a C string, dropping interior NUL bytes that
/// `syslog(3)` would otherwise truncate at.
#[cfg(unix)]
fn c_line(line: &str) -> std::ffi::CString {
    let bytes: Vec<u8> = line.bytes().filter(|&b| b != 0).collect();
    std::ffi::CString::new(bytes).unwrap_or_default()
}

impl RecordSink for Syslog {
    fn emit(&self, source: u32, msg: &str) {
        self.write_line(&format_record(source, msg));
    }
}

#[cfg(unix)]
impl Drop for Syslog {
    fn drop(&mut self) {
        // SAFETY: closes the connection opened in `open`; `ident` is
        // dropped only after this returns.
        unsafe { libc::closelog() };
    }
}
