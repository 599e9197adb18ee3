//! Artifact file reader
//!
//! Reads one file from disk, dispatches on its extension and validates the
//! top-level shape of structured content.

use crate::error::{ArtifactError, ArtifactResult};
use crate::parsers::{default_parsers, ArtifactFormat, ParserRegistry};
use crate::scan::load_folder_files;
use indexmap::IndexMap;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Parsed contents of one artifact file
#[derive(Debug, Clone, PartialEq)]
pub struct RawArtifact {
    /// Source file path
    pub path: PathBuf,
    /// Detected format, `None` for unsupported extensions
    pub format: Option<ArtifactFormat>,
    /// Parsed content (mapping or sequence)
    pub content: Value,
}

impl RawArtifact {
    /// Consume and return the parsed content
    #[inline]
    #[must_use]
    pub fn into_content(self) -> Value {
        self.content
    }

    /// True when the file had no supported format
    #[inline]
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        self.format.is_none()
    }
}

/// Reader that turns artifact files into [`RawArtifact`]s
#[derive(Debug, Default)]
pub struct ArtifactReader {
    parsers: ParserRegistry,
}

impl ArtifactReader {
    /// Create reader with the default parsers
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_parsers(default_parsers())
    }

    /// Create reader with a custom parser registry
    #[inline]
    #[must_use]
    pub fn with_parsers(parsers: ParserRegistry) -> Self {
        Self { parsers }
    }

    /// Load and parse a single file
    ///
    /// # Errors
    /// - `ArtifactError::FileNotFound` if `path` is not an existing file
    /// - `ArtifactError::FileFormat` if content cannot be decoded, or structured
    ///   content is empty or neither a mapping nor a sequence
    /// - `ArtifactError::Io` if the file cannot be read
    pub fn load_file(&self, path: impl AsRef<Path>) -> ArtifactResult<RawArtifact> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ArtifactError::not_found(format!(
                "{} does not exist.",
                path.display()
            )));
        }

        let Some(parser) = self.parsers.find_for_path(path) else {
            tracing::warn!("Unsupported file format: {}", path.display());
            return Ok(RawArtifact {
                path: path.to_path_buf(),
                format: None,
                content: Value::Array(Vec::new()),
            });
        };

        let text = std::fs::read_to_string(path).map_err(|e| ArtifactError::io_error(path, e))?;
        let text = text.trim_start_matches('\u{feff}');
        let content = parser.parse(path, text)?;

        let format = parser.format();
        if format.is_structured() {
            check_format(path, &content)?;
        }

        Ok(RawArtifact {
            path: path.to_path_buf(),
            format: Some(format),
            content,
        })
    }

    /// Load every artifact file found under `folder`, keyed by path
    ///
    /// # Errors
    /// Propagates the first scan or load failure.
    pub fn load_folder_content(
        &self,
        folder: impl AsRef<Path>,
    ) -> ArtifactResult<IndexMap<PathBuf, RawArtifact>> {
        let mut items = IndexMap::new();
        for path in load_folder_files(folder, true)? {
            let artifact = self.load_file(&path)?;
            items.insert(path, artifact);
        }
        Ok(items)
    }
}

/// Load a file with the default reader
///
/// # Errors
/// See [`ArtifactReader::load_file`].
pub fn load_file(path: impl AsRef<Path>) -> ArtifactResult<RawArtifact> {
    ArtifactReader::new().load_file(path)
}

/// Validate that structured content is a non-empty mapping or sequence
///
/// # Errors
/// `ArtifactError::FileFormat` when the check fails.
pub fn check_format(path: &Path, content: &Value) -> ArtifactResult<()> {
    if is_empty_value(content) {
        tracing::error!("Testcase file content is empty: {}", path.display());
        return Err(ArtifactError::format(path, "content is empty"));
    }

    if !(content.is_array() || content.is_object()) {
        tracing::error!("Testcase file content format invalid: {}", path.display());
        return Err(ArtifactError::format(path, "content format invalid"));
    }

    Ok(())
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
