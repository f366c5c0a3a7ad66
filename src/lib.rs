// src/lib.rs

//! Shell-free process pipelines.
//!
//! ```no_run
//! # async fn demo() -> cmdpipe::Result<()> {
//! use cmdpipe::{cmd, text, CmdSpec};
//!
//! let shout = text("bananas").pipe(["tr", "a-z", "A-Z"])?.get().await?;
//! assert_eq!(shout, "BANANAS");
//!
//! cmd(CmdSpec::new(["make", "test"]).cwd("engine").env("CI", "1"))?
//!     .pipe(["tee", "build.log"])?
//!     .run()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod command;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod node;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

pub use command::CmdSpec;
pub use errors::{PipeError, Result};
pub use exec::{AmbientStreams, ExecContext, Output};
pub use node::{Cmd, Node, cmd, file, stdin, text};

use crate::cli::CliArgs;
use crate::config::{PipelineConfig, Terminal, load_and_validate};
use crate::fs::RealFileSystem;

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the pipeline file, builds the chain and runs the
/// configured terminal operation. Relative paths and stage directories are
/// resolved against the pipeline file's directory.
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading pipeline file {:?}", config_path))?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let tail = cfg.build()?;
    let root_dir = config_root_dir(&config_path);
    info!(root = %root_dir.display(), stages = cfg.stages().len(), "running pipeline");

    let ctx = ExecContext::from_env()
        .with_cwd(&root_dir)
        .with_fs(Arc::new(RealFileSystem::rooted_at(&root_dir)));

    match cfg.terminal() {
        Terminal::Run => ctx.run(&tail).await?,
        Terminal::Silent => ctx.run_silent(&tail).await?,
        Terminal::Get => print!("{}", ctx.get(&tail).await?),
        Terminal::GetAll => {
            let out = ctx.get_all(&tail).await?;
            print!("{}", out.stdout);
            eprint!("{}", out.stderr);
        }
        Terminal::File(path) => ctx.to_file(&tail, path).await?,
    }

    Ok(())
}

/// Directory the pipeline file lives in.
///
/// A bare filename like "Cmdpipe.toml" (parent = "") falls back to the
/// current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Simple dry-run output: print the source, stages and terminal operation.
fn print_dry_run(cfg: &PipelineConfig) {
    println!("cmdpipe dry-run");
    println!("  source: {:?}", cfg.source());
    println!();

    println!("stages ({}):", cfg.stages().len());
    for (idx, stage) in cfg.stages().iter().enumerate() {
        println!("  {}. {:?}", idx + 1, stage.cmd);
        if let Some(ref cwd) = stage.cwd {
            println!("      cwd: {}", cwd.display());
        }
        if !stage.env.is_empty() {
            println!("      env: {:?}", stage.env);
        }
    }
    println!();
    println!("output: {:?}", cfg.terminal());

    debug!("dry-run complete (nothing spawned)");
}
