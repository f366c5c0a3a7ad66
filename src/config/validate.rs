// src/config/validate.rs

use crate::config::model::{
    OutputMode, OutputSection, PipelineConfig, RawPipelineConfig, SourceKind, SourceSection,
    Terminal,
};
use crate::errors::{PipeError, Result};

impl TryFrom<RawPipelineConfig> for PipelineConfig {
    type Error = PipeError;

    fn try_from(raw: RawPipelineConfig) -> std::result::Result<Self, Self::Error> {
        ensure_has_stages(&raw)?;
        validate_stage_commands(&raw)?;
        let source = validate_source(&raw.source)?;
        let terminal = validate_output(&raw.output)?;
        Ok(PipelineConfig::new_unchecked(source, raw.stage, terminal))
    }
}

fn ensure_has_stages(cfg: &RawPipelineConfig) -> Result<()> {
    if cfg.stage.is_empty() {
        return Err(PipeError::ConfigError(
            "pipeline must contain at least one [[stage]] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_stage_commands(cfg: &RawPipelineConfig) -> Result<()> {
    for (idx, stage) in cfg.stage.iter().enumerate() {
        if stage.cmd.is_empty() {
            return Err(PipeError::ConfigError(format!(
                "stage #{} has an empty `cmd`",
                idx + 1
            )));
        }
    }
    Ok(())
}

fn validate_source(source: &SourceSection) -> Result<SourceKind> {
    match (&source.file, &source.text, source.stdin) {
        (None, None, false) => Ok(SourceKind::None),
        (Some(path), None, false) => Ok(SourceKind::File(path.clone())),
        (None, Some(text), false) => Ok(SourceKind::Text(text.clone())),
        (None, None, true) => Ok(SourceKind::Stdin),
        _ => Err(PipeError::ConfigError(
            "[source] may set only one of `file`, `text` or `stdin`".to_string(),
        )),
    }
}

fn validate_output(output: &OutputSection) -> Result<Terminal> {
    match (output.mode, &output.path) {
        (OutputMode::File, Some(path)) => Ok(Terminal::File(path.clone())),
        (OutputMode::File, None) => Err(PipeError::ConfigError(
            "[output].path is required when mode = \"file\"".to_string(),
        )),
        (mode, Some(_)) => Err(PipeError::ConfigError(format!(
            "[output].path is only valid with mode = \"file\" (got {mode:?})"
        ))),
        (OutputMode::Run, None) => Ok(Terminal::Run),
        (OutputMode::Silent, None) => Ok(Terminal::Silent),
        (OutputMode::Get, None) => Ok(Terminal::Get),
        (OutputMode::GetAll, None) => Ok(Terminal::GetAll),
    }
}
