// src/exec/resolve.rs

//! Recursive stream resolution and spawning.
//!
//! Starting from the tail, every stage first asks its upstream node for an
//! output stream, then spawns itself with that stream as stdin:
//!
//! ```text
//! spawn_stage(tail)
//!   -> resolve_output(upstream)      file / text / stdin / process
//!        -> spawn_stage(upstream)    (process nodes recurse)
//!   -> bind stdin, spawn tail, start stdin pump if needed
//! ```
//!
//! Only the tail's [`Child`] is returned to the caller. Upstream processes
//! are left running and reaped by a detached task; their exit status is
//! logged but never affects the result.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::command::CmdSpec;
use crate::errors::{PipeError, Result};
use crate::fs::FileReader;
use crate::node::{Cmd, Node};

use super::context::ExecContext;
use super::stdio::{StreamRequest, Upstream};

type StageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Stderr of one upstream stage, accumulated by a background reader.
///
/// The buffer is shared with the reader so a partial capture can be taken
/// while the stage is still running.
pub(crate) struct StderrCapture {
    command: Vec<String>,
    buf: Arc<Mutex<Vec<u8>>>,
    reader: JoinHandle<()>,
}

impl StderrCapture {
    fn start(mut stderr: ChildStderr, command: Vec<String>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let label = command.clone();
        let reader = tokio::spawn(async move {
            let mut chunk = [0u8; 8192];
            loop {
                match stderr.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => {
                        sink.lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .extend_from_slice(&chunk[..n]);
                    }
                    Err(e) => {
                        warn!(command = ?label, error = %e, "reading upstream stderr failed");
                        break;
                    }
                }
            }
        });

        Self {
            command,
            buf,
            reader,
        }
    }

    /// Bytes captured so far, waiting for the stage's stderr EOF no later
    /// than `deadline`. A stage still holding stderr open past the deadline
    /// keeps running; only its reader is stopped.
    pub(crate) async fn collect(mut self, deadline: Instant) -> Vec<u8> {
        if tokio::time::timeout_at(deadline, &mut self.reader).await.is_err() {
            debug!(command = ?self.command, "upstream stderr still open; keeping partial capture");
            self.reader.abort();
        }
        std::mem::take(&mut *self.buf.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// A spawned pipeline, seen from its tail.
pub(crate) struct Execution {
    pub child: Child,
    pub command: Vec<String>,
    /// Upstream stderr captures, head first. Empty unless the request
    /// piped stderr to the caller.
    pub upstream_stderr: Vec<StderrCapture>,
}

/// Spawn every stage of the chain ending at `tail`.
pub(crate) async fn spawn_pipeline(
    ctx: &ExecContext,
    tail: &Cmd,
    request: StreamRequest,
) -> Result<Execution> {
    info!(command = ?tail.command(), ?request, "starting pipeline");

    let mut upstream_stderr = Vec::new();
    let child = spawn_stage(ctx, tail, request, &mut upstream_stderr).await?;

    Ok(Execution {
        child,
        command: tail.command().to_vec(),
        upstream_stderr,
    })
}

/// Bytes to push into a stage's stdin pipe once it is running.
enum Feed {
    Text(String),
    Reader(FileReader),
}

fn spawn_stage<'a>(
    ctx: &'a ExecContext,
    cmd: &'a Cmd,
    request: StreamRequest,
    captures: &'a mut Vec<StderrCapture>,
) -> StageFuture<'a, Child> {
    Box::pin(async move {
        let upstream = match cmd.upstream() {
            Some(node) => Some(resolve_output(ctx, node, request.for_upstream(), captures).await?),
            None => None,
        };

        let (stdin, feed) = match upstream {
            None => (ctx.stdin_stdio(request.stdin), None),
            Some(up) => {
                debug!(command = ?cmd.command(), upstream = up.kind(), "binding stdin to upstream");
                match up {
                    Upstream::Descriptor(stdio) => (stdio, None),
                    Upstream::Closed => (Stdio::null(), None),
                    Upstream::Text(text) => (Stdio::piped(), Some(Feed::Text(text))),
                    Upstream::Reader(reader) => (Stdio::piped(), Some(Feed::Reader(reader))),
                }
            }
        };

        let mut command = build_command(ctx, cmd.spec());
        command
            .stdin(stdin)
            .stdout(ctx.output_stdio(request.stdout))
            .stderr(ctx.output_stdio(request.stderr));

        let mut child = command.spawn().map_err(|source| PipeError::Spawn {
            command: cmd.command().to_vec(),
            source,
        })?;
        debug!(command = ?cmd.command(), pid = ?child.id(), "spawned stage");

        if let Some(feed) = feed {
            match child.stdin.take() {
                Some(pipe) => pump_stdin(pipe, feed, cmd.command().to_vec()),
                None => warn!(command = ?cmd.command(), "stdin pipe missing after spawn"),
            }
        }

        Ok(child)
    })
}

/// Produce the output stream of `node` for a downstream stage.
fn resolve_output<'a>(
    ctx: &'a ExecContext,
    node: &'a Node,
    request: StreamRequest,
    captures: &'a mut Vec<StderrCapture>,
) -> StageFuture<'a, Upstream> {
    Box::pin(async move {
        match node {
            Node::File(path) => {
                let reader = ctx
                    .fs()
                    .open_read(path)
                    .await
                    .map_err(|e| PipeError::file(path, e))?;
                debug!(path = %path.display(), "opened file source");
                Ok(Upstream::Reader(reader))
            }
            Node::Text(text) => Ok(Upstream::Text(text.clone())),
            Node::Stdin => Ok(Upstream::Descriptor(ctx.ambient_stdin())),
            Node::Process(cmd) => {
                let mut child = match spawn_stage(ctx, cmd, request, captures).await {
                    Ok(child) => child,
                    Err(PipeError::Spawn { command, source }) => {
                        warn!(
                            command = ?command,
                            error = %source,
                            "upstream stage failed to spawn; downstream reads empty input"
                        );
                        return Ok(Upstream::Closed);
                    }
                    Err(e) => return Err(e),
                };

                if let Some(stderr) = child.stderr.take() {
                    captures.push(StderrCapture::start(stderr, cmd.command().to_vec()));
                }

                let stdout = child
                    .stdout
                    .take()
                    .ok_or_else(|| io::Error::other("upstream stdout was not piped"))?;
                let stdio: Stdio = stdout.try_into()?;

                reap_upstream(child, cmd.command().to_vec());
                Ok(Upstream::Descriptor(stdio))
            }
        }
    })
}

fn build_command(ctx: &ExecContext, spec: &CmdSpec) -> Command {
    let mut command = Command::new(spec.program());
    command
        .args(spec.args())
        .env_clear()
        .envs(spec.merged_env(ctx.env()));
    if let Some(dir) = ctx.stage_cwd(spec.cwd.as_deref()) {
        command.current_dir(dir);
    }
    command
}

/// Write `feed` into a child's stdin, then close it.
fn pump_stdin(mut pipe: ChildStdin, feed: Feed, command: Vec<String>) {
    tokio::spawn(async move {
        let res = match feed {
            Feed::Text(text) => pipe.write_all(text.as_bytes()).await.map(|_| text.len() as u64),
            Feed::Reader(mut reader) => tokio::io::copy(&mut reader, &mut pipe).await,
        };
        match res {
            Ok(bytes) => debug!(command = ?command, bytes, "stdin feed complete"),
            // The reader may exit before consuming everything (e.g. `head`).
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!(command = ?command, "stdin closed by reader before feed finished")
            }
            Err(e) => warn!(command = ?command, error = %e, "stdin feed failed"),
        }
        drop(pipe);
    });
}

/// Reap an upstream process in the background.
fn reap_upstream(mut child: Child, command: Vec<String>) {
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => debug!(
                command = ?command,
                exit_code = status.code().unwrap_or(-1),
                success = status.success(),
                "upstream stage exited"
            ),
            Err(e) => debug!(command = ?command, error = %e, "waiting for upstream stage failed"),
        }
    });
}

pub(crate) async fn read_to_end<R>(mut reader: R) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(buf)
}
