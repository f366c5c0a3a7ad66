// src/exec/mod.rs

//! Pipeline execution layer.
//!
//! Nothing in here runs until a terminal operation is called on a built
//! chain.
//!
//! - [`stdio`] defines stream-binding requests and the enumerated kinds of
//!   resolved upstream output.
//! - [`context`] holds the injected ambient state ([`ExecContext`]).
//! - [`resolve`] walks the chain tail-to-head, spawning each stage with
//!   `tokio::process::Command` and wiring stdout into the next stdin.
//! - [`runner`] implements `run`, `run_silent`, `get`, `get_all` and
//!   `to_file` on top of it.

pub mod context;
pub mod resolve;
pub mod runner;
pub mod stdio;

pub use context::{AmbientStreams, ExecContext};
pub use runner::Output;
pub use stdio::{OutputPolicy, StdinPolicy, StreamRequest, Upstream};
