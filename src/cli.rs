// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `cmdpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdpipe",
    version,
    about = "Run a pipeline of processes described in a TOML file, without a shell.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the pipeline file (TOML).
    ///
    /// Default: `Cmdpipe.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Cmdpipe.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the stages, but don't spawn anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["cmdpipe"]).unwrap();
        assert_eq!(args.config, "Cmdpipe.toml");
        assert!(args.log_level.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn flags() {
        let args = CliArgs::try_parse_from([
            "cmdpipe",
            "--config",
            "p.toml",
            "--log-level",
            "debug",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.config, "p.toml");
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.dry_run);
    }
}
