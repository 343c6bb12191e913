// src/logging.rs

//! Tracing setup for the `taskdag` binary.
//!
//! The effective level is resolved in order: `--log-level` flag,
//! `TASKDAG_LOG` environment variable, then `info`. Logs go to stderr so
//! stdout carries nothing but the run report.

use std::str::FromStr;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Install the global subscriber. Call once, at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = cli_level
        .map(Level::from)
        .or_else(|| {
            std::env::var("TASKDAG_LOG")
                .ok()
                .and_then(|s| Level::from_str(s.trim()).ok())
        })
        .unwrap_or(Level::INFO);

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
