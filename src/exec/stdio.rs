// src/exec/stdio.rs

//! Stream-binding requests and resolved stage outputs.

use std::fmt;
use std::process::Stdio;

use crate::fs::FileReader;

/// How a stage's stdin is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdinPolicy {
    /// The caller's own stdin (see [`AmbientStreams`](super::AmbientStreams)).
    Inherit,
    /// `/dev/null`.
    Ignore,
}

/// How a stage's stdout or stderr is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPolicy {
    Inherit,
    Ignore,
    /// Piped back to the terminal operation for capture.
    PipeToCaller,
    /// Piped into the next stage's stdin. Only ever used for stdout.
    PipeToNext,
}

/// Requested treatment for all three standard streams of one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    pub stdin: StdinPolicy,
    pub stdout: OutputPolicy,
    pub stderr: OutputPolicy,
}

impl StreamRequest {
    pub const RUN: Self = Self::new(OutputPolicy::Inherit, OutputPolicy::Inherit);
    pub const RUN_SILENT: Self = Self::new(OutputPolicy::Ignore, OutputPolicy::Ignore);
    pub const GET: Self = Self::new(OutputPolicy::PipeToCaller, OutputPolicy::Ignore);
    pub const GET_ALL: Self = Self::new(OutputPolicy::PipeToCaller, OutputPolicy::PipeToCaller);
    pub const TO_FILE: Self = Self::new(OutputPolicy::PipeToCaller, OutputPolicy::Ignore);

    const fn new(stdout: OutputPolicy, stderr: OutputPolicy) -> Self {
        Self {
            stdin: StdinPolicy::Ignore,
            stdout,
            stderr,
        }
    }

    /// Sub-request issued to an upstream stage.
    ///
    /// stdout always feeds the next stage and stdin is passed through
    /// unchanged (only the head ever consumes it). Upstream stderr is
    /// discarded unless the terminal call captures stderr.
    pub fn for_upstream(&self) -> Self {
        let stderr = match self.stderr {
            OutputPolicy::PipeToCaller => OutputPolicy::PipeToCaller,
            _ => OutputPolicy::Ignore,
        };
        Self {
            stdin: self.stdin,
            stdout: OutputPolicy::PipeToNext,
            stderr,
        }
    }
}

/// What an upstream node hands to the stage reading from it.
pub enum Upstream {
    /// A real OS handle that can become the child's stdin as-is.
    Descriptor(Stdio),
    /// A file stream; copied into a stdin pipe after spawn.
    Reader(FileReader),
    /// Synthetic text; written into a stdin pipe after spawn.
    Text(String),
    /// Nothing will ever arrive (the upstream process failed to start).
    Closed,
}

impl Upstream {
    pub fn kind(&self) -> &'static str {
        match self {
            Upstream::Descriptor(_) => "descriptor",
            Upstream::Reader(_) => "reader",
            Upstream::Text(_) => "text",
            Upstream::Closed => "closed",
        }
    }
}

impl fmt::Debug for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Upstream").field(&self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_requests_ignore_head_stdin() {
        for req in [
            StreamRequest::RUN,
            StreamRequest::RUN_SILENT,
            StreamRequest::GET,
            StreamRequest::GET_ALL,
            StreamRequest::TO_FILE,
        ] {
            assert_eq!(req.stdin, StdinPolicy::Ignore);
        }
    }

    #[test]
    fn upstream_request_pipes_stdout_and_captures_stderr_only_for_get_all() {
        let up = StreamRequest::GET_ALL.for_upstream();
        assert_eq!(up.stdout, OutputPolicy::PipeToNext);
        assert_eq!(up.stderr, OutputPolicy::PipeToCaller);
        assert_eq!(up.stdin, StdinPolicy::Ignore);

        let up = StreamRequest::GET.for_upstream();
        assert_eq!(up.stderr, OutputPolicy::Ignore);

        let up = StreamRequest::RUN.for_upstream().for_upstream();
        assert_eq!(up.stdout, OutputPolicy::PipeToNext);
        assert_eq!(up.stderr, OutputPolicy::Ignore);

        for req in [StreamRequest::RUN_SILENT, StreamRequest::TO_FILE] {
            assert_eq!(req.for_upstream().stderr, OutputPolicy::Ignore);
        }
    }
}
