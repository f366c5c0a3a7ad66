// src/logging.rs

//! `tracing` subscriber for the `cmdpipe` binary.
//!
//! `--log-level` wins when given. Otherwise `CMDPIPE_LOG` is read as an
//! `EnvFilter` directive list (`debug`, `cmdpipe::exec=trace,warn`, ...).
//! Unset, blank or malformed values fall back to `info`.
//!
//! Events go to stderr; stdout belongs to the pipeline.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

const LOG_ENV: &str = "CMDPIPE_LOG";
const FALLBACK_DIRECTIVE: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_directives = std::env::var(LOG_ENV).ok();
    let filter = filter_for(cli_level, env_directives.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("initialising logging: {e}"))
}

fn filter_for(cli_level: Option<LogLevel>, env_directives: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level_directive(level));
    }

    env_directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_DIRECTIVE))
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
