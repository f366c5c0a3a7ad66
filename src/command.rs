// src/command.rs

//! The two call shapes accepted wherever a stage is declared.
//!
//! A stage can be described either by a flat list of strings (executable
//! followed by its arguments) or by a configuration value carrying the
//! command vector plus an optional working directory and environment
//! overrides. Both collapse into [`CmdSpec`] via `Into<CmdSpec>`.
//!
//! ```toml
//! cmd = ["grep", "-n", "needle"]
//! cwd = "sub"
//! env = { LC_ALL = "C" }
//! ```

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

use serde::Deserialize;

use crate::errors::{PipeError, Result};

/// Command vector, working directory and environment overrides for one stage.
///
/// Arguments are passed to the OS verbatim; nothing here is ever handed to a
/// shell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CmdSpec {
    /// Executable followed by its arguments.
    pub cmd: Vec<String>,

    /// Working directory for this stage only. `None` means "inherit".
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Variables merged over the ambient environment for this stage only.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl CmdSpec {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cmd: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// The executable (first element of the command vector).
    pub fn program(&self) -> &str {
        self.cmd.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.cmd.get(1..).unwrap_or_default()
    }

    /// Reject shapes that cannot describe a process.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.cmd.is_empty() {
            return Err(PipeError::InvalidCommand(
                "command vector must contain at least the executable".to_string(),
            ));
        }
        Ok(())
    }

    /// Ambient environment with this stage's overrides applied on top.
    pub(crate) fn merged_env(
        &self,
        ambient: &BTreeMap<OsString, OsString>,
    ) -> BTreeMap<OsString, OsString> {
        let mut merged = ambient.clone();
        merged.extend(
            self.env
                .iter()
                .map(|(k, v)| (OsString::from(k), OsString::from(v))),
        );
        merged
    }
}

impl From<Vec<String>> for CmdSpec {
    fn from(args: Vec<String>) -> Self {
        CmdSpec::new(args)
    }
}

impl From<Vec<&str>> for CmdSpec {
    fn from(args: Vec<&str>) -> Self {
        CmdSpec::new(args)
    }
}

impl From<&[&str]> for CmdSpec {
    fn from(args: &[&str]) -> Self {
        CmdSpec::new(args.iter().copied())
    }
}

impl From<&[String]> for CmdSpec {
    fn from(args: &[String]) -> Self {
        CmdSpec::new(args.iter().cloned())
    }
}

impl<const N: usize> From<[&str; N]> for CmdSpec {
    fn from(args: [&str; N]) -> Self {
        CmdSpec::new(args)
    }
}

impl From<&CmdSpec> for CmdSpec {
    fn from(spec: &CmdSpec) -> Self {
        spec.clone()
    }
}
