// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{PipelineConfig, RawPipelineConfig};
use crate::errors::{PipeError, Result};

/// Load a pipeline file from a given path and return the raw
/// `RawPipelineConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawPipelineConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| PipeError::file(path, e))?;

    let config: RawPipelineConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a pipeline file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - at least one stage, none with an empty `cmd`,
///   - at most one source kind,
///   - `[output].path` present exactly when `mode = "file"`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let raw_config = load_from_path(&path)?;
    let config = PipelineConfig::try_from(raw_config)?;
    Ok(config)
}
