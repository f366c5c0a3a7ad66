// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::command::CmdSpec;

/// Pipeline description as read from a TOML file.
///
/// ```toml
/// [source]
/// file = "input.txt"
///
/// [[stage]]
/// cmd = ["grep", "needle"]
///
/// [[stage]]
/// cmd = ["sort"]
/// env = { LC_ALL = "C" }
///
/// [output]
/// mode = "file"
/// path = "sorted.txt"
/// ```
///
/// Only `[[stage]]` is required.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPipelineConfig {
    /// Optional head feeding the first stage.
    #[serde(default)]
    pub source: SourceSection,

    /// Process stages, head first.
    #[serde(default)]
    pub stage: Vec<CmdSpec>,

    #[serde(default)]
    pub output: OutputSection,
}

/// `[source]` section. At most one field may be set.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SourceSection {
    #[serde(default)]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub text: Option<String>,

    /// Forward the binary's own stdin into the first stage.
    #[serde(default)]
    pub stdin: bool,
}

/// Which terminal operation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    Run,
    Silent,
    Get,
    GetAll,
    File,
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputSection {
    #[serde(default)]
    pub mode: OutputMode,

    /// Destination for `mode = "file"`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Where the head of the pipeline reads from, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    None,
    File(PathBuf),
    Text(String),
    Stdin,
}

/// Terminal operation, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Run,
    Silent,
    Get,
    GetAll,
    File(PathBuf),
}

/// Validated pipeline description. Build one with `TryFrom<RawPipelineConfig>`
/// or [`load_and_validate`](crate::config::load_and_validate).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub(crate) source: SourceKind,
    pub(crate) stages: Vec<CmdSpec>,
    pub(crate) terminal: Terminal,
}

impl PipelineConfig {
    pub(crate) fn new_unchecked(source: SourceKind, stages: Vec<CmdSpec>, terminal: Terminal) -> Self {
        Self {
            source,
            stages,
            terminal,
        }
    }

    pub fn source(&self) -> &SourceKind {
        &self.source
    }

    pub fn stages(&self) -> &[CmdSpec] {
        &self.stages
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }
}
