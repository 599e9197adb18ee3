//! `.env` file parsing
//!
//! One `KEY=value` or `KEY: value` pair per line. The first `=` wins over
//! any `:`, so URLs in values survive.

use crate::error::{ArtifactError, ArtifactResult};
use indexmap::IndexMap;
use std::path::Path;

/// Parse `.env` text into an ordered mapping
///
/// # Errors
/// `ArtifactError::FileFormat` for any line with neither separator, blank
/// lines included.
pub fn parse_dot_env(path: &Path, text: &str) -> ArtifactResult<IndexMap<String, String>> {
    let mut variables = IndexMap::new();

    for (index, line) in text.lines().enumerate() {
        let (key, value) = line
            .split_once('=')
            .or_else(|| line.split_once(':'))
            .ok_or_else(|| {
                ArtifactError::format(path, format!(".env format error at line {}", index + 1))
            })?;

        variables.insert(key.trim().to_string(), value.trim().to_string());
    }

    Ok(variables)
}

/// Load a `.env` file; a missing file yields an empty mapping
///
/// When `export` is set, every parsed pair is also written into the process
/// environment.
///
/// # Errors
/// `ArtifactError::FileFormat` for malformed lines, `ArtifactError::Io` if
/// the file exists but cannot be read.
pub fn load_dot_env_file(
    path: impl AsRef<Path>,
    export: bool,
) -> ArtifactResult<IndexMap<String, String>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Ok(IndexMap::new());
    }

    tracing::info!("Loading environment variables from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|e| ArtifactError::io_error(path, e))?;
    let variables = parse_dot_env(path, &text)?;

    if export {
        for (key, value) in &variables {
            std::env::set_var(key, value);
        }
    }

    Ok(variables)
}
