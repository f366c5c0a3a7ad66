use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Builder for `Cmdpipe.toml` fixtures.
///
/// Produces TOML text rather than config structs so tests exercise the same
/// deserialization path as the binary.
#[derive(Debug, Default)]
pub struct PipelineFileBuilder {
    source: Option<String>,
    stages: Vec<String>,
    output: Option<String>,
}

impl PipelineFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_source(mut self, path: &str) -> Self {
        self.source = Some(format!("file = {path:?}"));
        self
    }

    pub fn text_source(mut self, text: &str) -> Self {
        self.source = Some(format!("text = {text:?}"));
        self
    }

    pub fn stage(mut self, cmd: &[&str]) -> Self {
        self.stages.push(format!("cmd = {cmd:?}"));
        self
    }

    pub fn stage_with_env(mut self, cmd: &[&str], key: &str, value: &str) -> Self {
        self.stages
            .push(format!("cmd = {cmd:?}\nenv = {{ {key} = {value:?} }}"));
        self
    }

    pub fn output_mode(mut self, mode: &str) -> Self {
        self.output = Some(format!("mode = {mode:?}"));
        self
    }

    pub fn output_file(mut self, path: &str) -> Self {
        self.output = Some(format!("mode = \"file\"\npath = {path:?}"));
        self
    }

    pub fn build(&self) -> String {
        let mut out = String::new();
        if let Some(ref source) = self.source {
            let _ = writeln!(out, "[source]\n{source}\n");
        }
        for stage in &self.stages {
            let _ = writeln!(out, "[[stage]]\n{stage}\n");
        }
        if let Some(ref output) = self.output {
            let _ = writeln!(out, "[output]\n{output}");
        }
        out
    }

    /// Write the document to `dir/Cmdpipe.toml` and return its path.
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join("Cmdpipe.toml");
        std::fs::write(&path, self.build()).expect("writing pipeline fixture");
        path
    }
}
