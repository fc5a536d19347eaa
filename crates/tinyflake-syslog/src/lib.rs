//! Syslog transport for host log messages.
//!
//! The logger is configured with a single free-text parameter of the form
//! `ident[,OPTION,...]`, see [`LoggerConfig`]. Each message is tagged with a
//! numeric source address and re-emitted as a JSON-shaped line, see
//! [`format_record`].
//!
//! ```
//! use tinyflake_syslog::{Facility, LoggerConfig, OpenOptions, Priority};
//!
//! let config = LoggerConfig::parse(Some("shop.server.ci.1,PERROR,LOCAL2,DEBUG"));
//! assert_eq!(config.ident, "shop.server.ci.1");
//! assert_eq!(config.options, OpenOptions::PERROR);
//! assert_eq!(config.facility, Facility::Local2);
//! assert_eq!(config.priority, Priority::Debug);
//! ```

mod config;
mod error;
mod format;
mod syslog;
mod writer;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::format::*;
pub use crate::syslog::*;
pub use crate::writer::*;
