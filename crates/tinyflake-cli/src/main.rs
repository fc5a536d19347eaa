#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use anyhow::{Context, anyhow};
use clap::Parser;
use config::{CliArgs, Command, Config};
use std::io::{self, BufWriter, Write};
use std::thread::scope;
use telemetry::init_telemetry;
use tinyflake::{TINYFLAKE_EPOCH, TinyflakeId};

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = Config::try_from(args)?;

    init_telemetry(config.logger.as_ref())?;

    match config.command {
        Command::Generate { count, threads } => generate(config.worker_id, count, threads),
        Command::Decode { id } => decode(id),
    }
}

fn generate(worker_id: i64, count: usize, threads: usize) -> anyhow::Result<()> {
    tinyflake::init(Some(worker_id)).context("failed to initialize the id allocator")?;
    tracing::info!(worker_id, count, threads, "allocating ids");

    let threads = threads.min(count.max(1));
    let mut ids = scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                // Spread the remainder over the first threads.
                let share = count / threads + usize::from(i < count % threads);
                s.spawn(move || {
                    (0..share)
                        .map(|_| tinyflake::try_next_id())
                        .collect::<tinyflake::Result<Vec<_>>>()
                })
            })
            .collect();

        let mut ids = Vec::with_capacity(count);
        for handle in handles {
            let batch = handle
                .join()
                .map_err(|_| anyhow!("allocation thread panicked"))??;
            ids.extend(batch);
        }
        anyhow::Ok(ids)
    })?;
    ids.sort_unstable();

    let mut out = BufWriter::new(io::stdout().lock());
    for id in &ids {
        writeln!(out, "{id}")?;
    }
    out.flush()?;

    if let (Some(first), Some(last)) = (ids.first(), ids.last()) {
        tracing::debug!(
            first = %first,
            last = %last,
            elapsed_ms = last.timestamp() - first.timestamp(),
            "allocation finished"
        );
    }
    Ok(())
}

fn decode(raw: i128) -> anyhow::Result<()> {
    // Negative input is the signed host view of the same 64 bits.
    let raw = if raw < 0 { raw as i64 as u64 } else { raw as u64 };
    let id = TinyflakeId::from_raw(raw);
    if id.reserved() != 0 {
        tracing::warn!(reserved = id.reserved(), "reserved bits are set; not a tinyflake id");
    }

    let mut out = io::stdout().lock();
    writeln!(out, "id:        {id}")?;
    writeln!(out, "host:      {}", id.to_i64())?;
    writeln!(out, "timestamp: {}", id.timestamp())?;
    writeln!(out, "unix_ms:   {}", id.unix_millis(TINYFLAKE_EPOCH))?;
    writeln!(out, "worker_id: {}", id.worker_id())?;
    writeln!(out, "sequence:  {}", id.sequence())?;
    writeln!(out, "reserved:  {}", id.reserved())?;
    Ok(())
}
