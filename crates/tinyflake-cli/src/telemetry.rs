//! Log output for the `tinyflake` binary.
//!
//! Events are filtered through `RUST_LOG` (default `info`) and written either
//! to stderr or, when a logger parameter is configured, to the system logger.
//! Stdout is reserved for command output.

use anyhow::Context;
use tinyflake_syslog::{LoggerConfig, Syslog, SyslogMakeWriter};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry(logger: Option<&LoggerConfig>) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    match logger {
        Some(config) => {
            let syslog = Syslog::open(config)
                .with_context(|| format!("failed to open syslog as `{}`", config.ident))?;
            // Syslog stamps its own time.
            registry
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .without_time()
                        .with_target(false)
                        .with_writer(SyslogMakeWriter::new(syslog)),
                )
                .try_init()?;
        }
        None => {
            registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_thread_ids(true)
                        .with_line_number(true)
                        .with_target(false)
                        .with_timer(fmt::time::ChronoLocal::rfc_3339())
                        .with_file(true),
                )
                .try_init()?;
        }
    }

    Ok(())
}
