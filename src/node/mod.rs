// src/node/mod.rs

//! Immutable pipeline description graph.
//!
//! Building a pipeline never performs I/O: [`cmd`], [`file`], [`text`],
//! [`stdin`] and every `.pipe(...)` call only allocate description values.
//! Processes are spawned and files opened exclusively by the terminal
//! operations in [`crate::exec::runner`].
//!
//! - [`Node`] is the tagged sum of everything that can feed a stage.
//! - [`Cmd`] is the process stage; it owns its [`CmdSpec`] and an optional
//!   shared link to its upstream node.

pub mod process;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::command::CmdSpec;
use crate::errors::Result;

pub use process::Cmd;

/// Anything that can produce a byte stream for the next stage.
#[derive(Debug, Clone)]
pub enum Node {
    /// Contents of a file, opened lazily at execution time.
    File(PathBuf),
    /// Literal text, written into the downstream stdin pipe at runtime.
    Text(String),
    /// The calling process's standard input, passed through unmodified.
    Stdin,
    /// A process stage.
    Process(Cmd),
}

impl Node {
    /// Start (or extend) a chain with a new process stage reading from `self`.
    pub fn pipe(&self, spec: impl Into<CmdSpec>) -> Result<Cmd> {
        Cmd::with_upstream(spec.into(), Arc::new(self.clone()))
    }

    /// Short human-readable label used in logs and dry-run output.
    pub fn describe(&self) -> String {
        match self {
            Node::File(path) => format!("file {}", path.display()),
            Node::Text(text) => format!("text ({} bytes)", text.len()),
            Node::Stdin => "stdin".to_string(),
            Node::Process(cmd) => format!("{:?}", cmd.command()),
        }
    }
}

impl From<Cmd> for Node {
    fn from(cmd: Cmd) -> Self {
        Node::Process(cmd)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Construct a head process stage with no upstream.
///
/// ```no_run
/// # async fn demo() -> cmdpipe::Result<()> {
/// let listing = cmdpipe::cmd(["ls", "-1"])?.pipe(["sort", "-r"])?.get().await?;
/// # Ok(())
/// # }
/// ```
pub fn cmd(spec: impl Into<CmdSpec>) -> Result<Cmd> {
    Cmd::new(spec.into())
}

/// A source reading the file at `path`. The file is opened only when a
/// pipeline using it is executed.
pub fn file(path: impl AsRef<Path>) -> Node {
    Node::File(path.as_ref().to_path_buf())
}

/// A source feeding `text` verbatim to the next stage.
pub fn text(text: impl Into<String>) -> Node {
    Node::Text(text.into())
}

/// A source forwarding the caller's own standard input.
pub fn stdin() -> Node {
    Node::Stdin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipeError;

    #[test]
    fn sources_start_chains() {
        let c = text("bananas").pipe(["cat"]).unwrap();
        assert_eq!(c.command(), &["cat".to_string()]);
        assert!(matches!(c.upstream(), Some(Node::Text(t)) if t == "bananas"));

        let c = file("/etc/hosts").pipe(["wc", "-l"]).unwrap();
        assert!(matches!(c.upstream(), Some(Node::File(p)) if p == Path::new("/etc/hosts")));

        let c = stdin().pipe(["cat"]).unwrap();
        assert!(matches!(c.upstream(), Some(Node::Stdin)));
    }

    #[test]
    fn empty_pipe_is_rejected() {
        let err = text("x").pipe(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, PipeError::InvalidCommand(_)));
    }

    #[test]
    fn describe_labels_each_kind() {
        assert_eq!(text("abc").describe(), "text (3 bytes)");
        assert_eq!(stdin().to_string(), "stdin");
        assert_eq!(Node::from(cmd(["echo", "hi"]).unwrap()).describe(), r#"["echo", "hi"]"#);
    }
}
