// src/exec/runner.rs

//! Terminal operations.
//!
//! Each operation picks a [`StreamRequest`], spawns the chain through
//! [`spawn_pipeline`], consumes the tail's output and awaits only the tail.
//! A non-zero tail exit always wins over captured output: callers get either
//! the complete result or a single error.

use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::errors::{PipeError, Result};
use crate::node::Cmd;

use super::context::ExecContext;
use super::resolve::{Execution, read_to_end, spawn_pipeline};
use super::stdio::StreamRequest;

/// How long `get_all` keeps collecting upstream stderr once the tail has
/// exited. Upstream stages are never awaited, so a stage that keeps its
/// stderr open only contributes what it wrote before this runs out.
const UPSTREAM_STDERR_GRACE: Duration = Duration::from_millis(100);

/// Captured output of [`ExecContext::get_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub stdout: String,
    pub stderr: String,
}

impl ExecContext {
    /// Run `cmd` with stdout/stderr bound to the ambient streams.
    pub async fn run(&self, cmd: &Cmd) -> Result<()> {
        self.run_to_exit(cmd, StreamRequest::RUN).await
    }

    /// Run `cmd` with every stream discarded.
    pub async fn run_silent(&self, cmd: &Cmd) -> Result<()> {
        self.run_to_exit(cmd, StreamRequest::RUN_SILENT).await
    }

    /// Run `cmd` and return its stdout decoded as UTF-8.
    pub async fn get(&self, cmd: &Cmd) -> Result<String> {
        let mut exec = spawn_pipeline(self, cmd, StreamRequest::GET).await?;
        let stdout = take_pipe(exec.child.stdout.take(), "stdout")?;

        let bytes = read_to_end(stdout).await?;
        let status = exec.child.wait().await?;
        finish(&exec, status)?;

        debug!(bytes = bytes.len(), "captured stdout");
        Ok(decode(bytes))
    }

    /// Run `cmd` and return stdout and stderr captured independently.
    ///
    /// Stderr of upstream stages is captured too and placed, head first,
    /// ahead of the tail's own stderr. Only the tail is awaited: upstream
    /// stderr is whatever those stages wrote by the time the tail settled.
    pub async fn get_all(&self, cmd: &Cmd) -> Result<Output> {
        let mut exec = spawn_pipeline(self, cmd, StreamRequest::GET_ALL).await?;
        let stdout = take_pipe(exec.child.stdout.take(), "stdout")?;
        let stderr = take_pipe(exec.child.stderr.take(), "stderr")?;

        let (out, err) = tokio::try_join!(read_to_end(stdout), read_to_end(stderr))?;
        let status = exec.child.wait().await?;
        finish(&exec, status)?;

        let deadline = Instant::now() + UPSTREAM_STDERR_GRACE;
        let mut all_err = Vec::new();
        for capture in exec.upstream_stderr.drain(..) {
            all_err.extend(capture.collect(deadline).await);
        }
        all_err.extend_from_slice(&err);

        Ok(Output {
            stdout: decode(out),
            stderr: decode(all_err),
        })
    }

    /// Run `cmd` and stream its stdout into `path`.
    ///
    /// The destination is created (or truncated) before anything is spawned.
    /// The writer is shut down and dropped on every path; a write failure is
    /// reported instead of the tail's exit status.
    pub async fn to_file(&self, cmd: &Cmd, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = self
            .fs()
            .create_write(path)
            .await
            .map_err(|e| PipeError::file(path, e))?;

        let mut exec = spawn_pipeline(self, cmd, StreamRequest::TO_FILE).await?;
        let mut stdout = take_pipe(exec.child.stdout.take(), "stdout")?;

        let written = match tokio::io::copy(&mut stdout, &mut writer).await {
            Ok(n) => n,
            Err(e) => return Err(PipeError::file(path, e)),
        };
        writer
            .shutdown()
            .await
            .map_err(|e| PipeError::file(path, e))?;
        drop(writer);

        let status = exec.child.wait().await?;
        finish(&exec, status)?;

        info!(path = %path.display(), bytes = written, "wrote pipeline output");
        Ok(())
    }

    async fn run_to_exit(&self, cmd: &Cmd, request: StreamRequest) -> Result<()> {
        let mut exec = spawn_pipeline(self, cmd, request).await?;
        let status = exec.child.wait().await?;
        finish(&exec, status)
    }
}

fn take_pipe<T>(pipe: Option<T>, name: &str) -> Result<T> {
    pipe.ok_or_else(|| PipeError::Io(io::Error::other(format!("tail {name} was not piped"))))
}

/// Map the tail's exit status to the pipeline result.
fn finish(exec: &Execution, status: ExitStatus) -> Result<()> {
    // Killed by a signal: no exit code.
    let code = status.code().unwrap_or(-1);
    info!(
        command = ?exec.command,
        exit_code = code,
        success = status.success(),
        "pipeline tail exited"
    );

    if status.success() {
        Ok(())
    } else {
        Err(PipeError::Exit {
            command: exec.command.clone(),
            code,
        })
    }
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
