//! YAML artifact parser
//!
//! Uses serde_yaml and deserializes straight into `serde_json::Value`, so both
//! structured formats share one value model. Mapping keys must be strings.

use crate::error::{ArtifactError, ArtifactResult};
use crate::parsers::{ArtifactFormat, ArtifactParser};
use serde_json::Value;
use std::path::Path;

/// YAML parser
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Create new YAML parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactParser for YamlParser {
    fn format(&self) -> ArtifactFormat {
        ArtifactFormat::Yaml
    }

    fn parse(&self, path: &Path, content: &str) -> ArtifactResult<Value> {
        // an empty stream is a null document, rejected later by the shape check
        if content.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_yaml::from_str(content)
            .map_err(|e| ArtifactError::format(path, format!("YAML parse error: {e}")))
    }

    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}
