use anyhow::bail;
use clap::{Parser, Subcommand};
use tinyflake::TinyflakeId;
use tinyflake_syslog::LoggerConfig;

/// Runtime configuration for the `tinyflake` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file in the working directory is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tinyflake",
    version,
    about = "Allocate and inspect 64-bit tinyflake IDs"
)]
pub struct CliArgs {
    /// Worker ID embedded in every allocated ID.
    ///
    /// Must be unique among all concurrently running allocators; assigning
    /// it is up to the deployment. Valid range is 0-255.
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, env = "WORKER_ID", default_value_t = 0, allow_negative_numbers = true)]
    pub worker_id: i64,

    /// Send logs to syslog, configured as `ident[,OPTION,...]`.
    ///
    /// Options are a priority (EMERG..DEBUG), open options (CONS, NDELAY,
    /// PERROR, PID) and a facility (USER, LOCAL0..LOCAL7). Without this flag
    /// logs go to stderr.
    ///
    /// Environment variable: `LOGGER`
    #[arg(long, env = "LOGGER")]
    pub logger: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Allocate IDs and print them, one per line, in ascending order.
    Generate {
        /// Number of IDs to allocate.
        ///
        /// Environment variable: `ID_COUNT`
        #[arg(short = 'n', long, env = "ID_COUNT", default_value_t = 1)]
        count: usize,

        /// Number of threads allocating concurrently.
        ///
        /// Environment variable: `NUM_THREADS`
        #[arg(long, env = "NUM_THREADS", default_value_t = 1)]
        threads: usize,
    },
    /// Print the fields packed into an ID.
    Decode {
        /// The ID, as printed by `generate` or as a signed host integer.
        #[arg(allow_negative_numbers = true)]
        id: i128,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub worker_id: i64,
    pub logger: Option<LoggerConfig>,
    pub command: Command,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let max_worker_id = TinyflakeId::max_worker_id() as i64;
        if !(0..=max_worker_id).contains(&args.worker_id) {
            bail!(
                "WORKER_ID ({}) is outside the worker ID space (0-{})",
                args.worker_id,
                max_worker_id
            );
        }

        match args.command {
            Command::Generate { threads: 0, .. } => {
                bail!("NUM_THREADS must be greater than 0");
            }
            Command::Decode { id } if id < i64::MIN as i128 || id > u64::MAX as i128 => {
                bail!("{id} does not fit in 64 bits");
            }
            _ => {}
        }

        Ok(Self {
            worker_id: args.worker_id,
            logger: args
                .logger
                .as_deref()
                .map(|param| LoggerConfig::parse(Some(param))),
            command: args.command,
        })
    }
}
