// src/errors.rs

//! Crate-wide error type and `Result` alias.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipeError {
    /// Malformed construction input (e.g. an empty command vector).
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// The tail process could not be started (not found, not executable, ...).
    #[error("failed to spawn {command:?}: {source}")]
    Spawn {
        command: Vec<String>,
        #[source]
        source: io::Error,
    },

    /// The tail process exited with a non-zero code.
    #[error("command {command:?} exited with code {code}")]
    Exit { command: Vec<String>, code: i32 },

    /// Opening, reading or writing a file endpoint failed.
    #[error("file error at {path:?}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl PipeError {
    /// Exit code of the failing tail process, if this is an exit error.
    pub fn code(&self) -> Option<i32> {
        match self {
            PipeError::Exit { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Command vector of the stage that failed, for exit and spawn errors.
    pub fn command(&self) -> Option<&[String]> {
        match self {
            PipeError::Exit { command, .. } | PipeError::Spawn { command, .. } => Some(command),
            _ => None,
        }
    }

    /// Underlying OS error kind for spawn, file and raw IO failures.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            PipeError::Spawn { source, .. } | PipeError::File { source, .. } => Some(source.kind()),
            PipeError::Io(e) => Some(e.kind()),
            _ => None,
        }
    }

    pub(crate) fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PipeError::File {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipeError>;
