// src/node/process.rs

//! The process stage (`Cmd`) and its terminal operations.

use std::path::Path;
use std::sync::Arc;

use crate::command::CmdSpec;
use crate::errors::Result;
use crate::exec::{ExecContext, Output};

use super::Node;

/// A process stage: command vector, optional cwd/env, optional upstream.
///
/// `Cmd` is immutable once built. [`Cmd::pipe`] returns a new stage that
/// shares `self` as its upstream, so one built chain can be executed any
/// number of times, concurrently if desired; every execution spawns its own
/// processes.
#[derive(Debug, Clone)]
pub struct Cmd {
    spec: CmdSpec,
    upstream: Option<Arc<Node>>,
}

impl Cmd {
    pub(crate) fn new(spec: CmdSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            upstream: None,
        })
    }

    pub(crate) fn with_upstream(spec: CmdSpec, upstream: Arc<Node>) -> Result<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            upstream: Some(upstream),
        })
    }

    /// Append a stage whose stdin is this stage's stdout.
    pub fn pipe(&self, spec: impl Into<CmdSpec>) -> Result<Cmd> {
        Cmd::with_upstream(spec.into(), Arc::new(Node::Process(self.clone())))
    }

    pub fn spec(&self) -> &CmdSpec {
        &self.spec
    }

    /// The command vector (executable + arguments).
    pub fn command(&self) -> &[String] {
        &self.spec.cmd
    }

    pub fn upstream(&self) -> Option<&Node> {
        self.upstream.as_deref()
    }

    /// All nodes of the chain, head first, ending with `self`.
    pub fn stages(&self) -> Vec<Node> {
        let mut stages = vec![Node::Process(self.clone())];
        let mut current = self.upstream.clone();
        while let Some(node) = current {
            current = match node.as_ref() {
                Node::Process(cmd) => cmd.upstream.clone(),
                _ => None,
            };
            stages.push(node.as_ref().clone());
        }
        stages.reverse();
        stages
    }

    /// Run with stdout/stderr inherited from the caller.
    pub async fn run(&self) -> Result<()> {
        ExecContext::from_env().run(self).await
    }

    /// Run with every standard stream discarded.
    pub async fn run_silent(&self) -> Result<()> {
        ExecContext::from_env().run_silent(self).await
    }

    /// Run and return the tail's stdout as text.
    pub async fn get(&self) -> Result<String> {
        ExecContext::from_env().get(self).await
    }

    /// Run and return both captured stdout and stderr.
    pub async fn get_all(&self) -> Result<Output> {
        ExecContext::from_env().get_all(self).await
    }

    /// Run and write the tail's stdout into the file at `path`.
    pub async fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        ExecContext::from_env().to_file(self, path).await
    }
}
