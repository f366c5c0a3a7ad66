// src/config/mod.rs

//! Pipeline files for the `cmdpipe` binary.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a pipeline file from disk (`loader.rs`).
//! - Validate it into a `PipelineConfig` (`validate.rs`).
//! - Turn a validated config into a built [`Cmd`] chain.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    OutputMode, OutputSection, PipelineConfig, RawPipelineConfig, SourceKind, SourceSection,
    Terminal,
};

use crate::errors::{PipeError, Result};
use crate::node::{self, Cmd, Node};

impl PipelineConfig {
    /// Build the described chain. No process is spawned.
    pub fn build(&self) -> Result<Cmd> {
        let mut stages = self.stages.iter();
        let first = match stages.next() {
            Some(spec) => spec.clone(),
            None => {
                return Err(PipeError::ConfigError(
                    "pipeline has no stages".to_string(),
                ));
            }
        };

        let mut tail = match self.head() {
            Some(head) => head.pipe(first)?,
            None => node::cmd(first)?,
        };
        for spec in stages {
            tail = tail.pipe(spec)?;
        }
        Ok(tail)
    }

    fn head(&self) -> Option<Node> {
        match &self.source {
            SourceKind::None => None,
            SourceKind::File(path) => Some(node::file(path)),
            SourceKind::Text(text) => Some(node::text(text.clone())),
            SourceKind::Stdin => Some(node::stdin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CmdSpec;

    #[test]
    fn build_chains_source_and_stages_in_order() {
        let cfg = PipelineConfig::try_from(RawPipelineConfig {
            source: SourceSection {
                text: Some("hello".into()),
                ..Default::default()
            },
            stage: vec![
                CmdSpec::new(["cat"]),
                CmdSpec::new(["tr", "a-z", "A-Z"]).env("LC_ALL", "C"),
            ],
            output: OutputSection::default(),
        })
        .unwrap();

        let tail = cfg.build().unwrap();
        let labels: Vec<String> = tail.stages().iter().map(Node::describe).collect();
        assert_eq!(
            labels,
            vec![
                "text (5 bytes)".to_string(),
                r#"["cat"]"#.to_string(),
                r#"["tr", "a-z", "A-Z"]"#.to_string(),
            ]
        );
        assert_eq!(tail.spec().env.get("LC_ALL").map(String::as_str), Some("C"));
    }

    #[test]
    fn parses_full_toml_document() {
        let raw: RawPipelineConfig = toml::from_str(
            r#"
[source]
file = "input.txt"

[[stage]]
cmd = ["grep", "needle"]
cwd = "sub"

[[stage]]
cmd = ["sort"]

[output]
mode = "get_all"
"#,
        )
        .unwrap();

        let cfg = PipelineConfig::try_from(raw).unwrap();
        assert_eq!(cfg.source(), &SourceKind::File("input.txt".into()));
        assert_eq!(cfg.stages().len(), 2);
        assert_eq!(cfg.terminal(), &Terminal::GetAll);
    }
}
