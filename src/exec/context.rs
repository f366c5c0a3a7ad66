// src/exec/context.rs

//! Explicit ambient state for pipeline execution.
//!
//! The environment map, default working directory, the caller's standard
//! streams and the filesystem are all carried by [`ExecContext`] so the
//! execution code never reads process-wide globals. `ExecContext::from_env()`
//! snapshots the real process once; tests build their own.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use crate::fs::{FileSystem, RealFileSystem};

use super::stdio::{OutputPolicy, StdinPolicy};

/// What "inherit the caller's stream" means for a given context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbientStreams {
    /// The real stdin/stdout/stderr of this process.
    #[default]
    Inherit,
    /// Every inherited stream is replaced by the null device.
    Detached,
}

impl AmbientStreams {
    fn stdio(self) -> Stdio {
        match self {
            AmbientStreams::Inherit => Stdio::inherit(),
            AmbientStreams::Detached => Stdio::null(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecContext {
    env: BTreeMap<OsString, OsString>,
    cwd: Option<PathBuf>,
    streams: AmbientStreams,
    fs: Arc<dyn FileSystem>,
}

impl ExecContext {
    /// Context with an empty environment, the caller's cwd and streams, and
    /// the real filesystem.
    pub fn new() -> Self {
        Self {
            env: BTreeMap::new(),
            cwd: None,
            streams: AmbientStreams::Inherit,
            fs: Arc::new(RealFileSystem::default()),
        }
    }

    /// Snapshot of the current process environment, byte for byte.
    pub fn from_env() -> Self {
        Self::new().with_env(std::env::vars_os())
    }

    /// Replace the whole environment map.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.env = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    pub fn with_var(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn without_var(mut self, key: impl AsRef<OsStr>) -> Self {
        self.env.remove(key.as_ref());
        self
    }

    /// Default working directory for stages without their own `cwd`.
    /// Relative stage directories are resolved against it.
    pub fn with_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn with_streams(mut self, streams: AmbientStreams) -> Self {
        self.streams = streams;
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn env(&self) -> &BTreeMap<OsString, OsString> {
        &self.env
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn streams(&self) -> AmbientStreams {
        self.streams
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Working directory for a stage given its own optional override.
    pub(crate) fn stage_cwd(&self, stage: Option<&Path>) -> Option<PathBuf> {
        match (stage, self.cwd.as_deref()) {
            (Some(dir), Some(base)) if dir.is_relative() => Some(base.join(dir)),
            (Some(dir), _) => Some(dir.to_path_buf()),
            (None, base) => base.map(Path::to_path_buf),
        }
    }

    pub(crate) fn stdin_stdio(&self, policy: StdinPolicy) -> Stdio {
        match policy {
            StdinPolicy::Inherit => self.streams.stdio(),
            StdinPolicy::Ignore => Stdio::null(),
        }
    }

    pub(crate) fn output_stdio(&self, policy: OutputPolicy) -> Stdio {
        match policy {
            OutputPolicy::Inherit => self.streams.stdio(),
            OutputPolicy::Ignore => Stdio::null(),
            OutputPolicy::PipeToCaller | OutputPolicy::PipeToNext => Stdio::piped(),
        }
    }

    /// Stdin handle given to a stage reading from [`Node::Stdin`](crate::Node::Stdin).
    pub(crate) fn ambient_stdin(&self) -> Stdio {
        self.streams.stdio()
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_sees_process_variables() {
        let ctx = ExecContext::from_env();
        assert!(ctx.env().contains_key(OsStr::new("PATH")));
        assert_eq!(ctx.streams(), AmbientStreams::Inherit);
    }

    #[test]
    fn var_builders_edit_only_the_copy() {
        let base = ExecContext::new().with_var("A", "1").with_var("B", "2");
        let edited = base.clone().without_var("A").with_var("B", "3");

        let var = |ctx: &ExecContext, key: &str| ctx.env().get(OsStr::new(key)).cloned();
        assert_eq!(var(&base, "A"), Some("1".into()));
        assert_eq!(var(&base, "B"), Some("2".into()));
        assert_eq!(var(&edited, "A"), None);
        assert_eq!(var(&edited, "B"), Some("3".into()));
    }

    #[test]
    fn stage_cwd_resolution() {
        let plain = ExecContext::new();
        assert_eq!(plain.stage_cwd(None), None);
        assert_eq!(plain.stage_cwd(Some(Path::new("sub"))), Some(PathBuf::from("sub")));

        let rooted = ExecContext::new().with_cwd("/work");
        assert_eq!(rooted.stage_cwd(None), Some(PathBuf::from("/work")));
        assert_eq!(rooted.stage_cwd(Some(Path::new("sub"))), Some(PathBuf::from("/work/sub")));
        assert_eq!(rooted.stage_cwd(Some(Path::new("/abs"))), Some(PathBuf::from("/abs")));
    }
}
