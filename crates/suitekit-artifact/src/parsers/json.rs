//! JSON artifact parser

use crate::error::{ArtifactError, ArtifactResult};
use crate::parsers::{ArtifactFormat, ArtifactParser};
use serde_json::Value;
use std::path::Path;

/// JSON parser
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl JsonParser {
    /// Create new JSON parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactParser for JsonParser {
    fn format(&self) -> ArtifactFormat {
        ArtifactFormat::Json
    }

    fn parse(&self, path: &Path, content: &str) -> ArtifactResult<Value> {
        serde_json::from_str(content)
            .map_err(|e| ArtifactError::format(path, format!("JSON decode error: {e}")))
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn json_parser_valid() {
        let value = JsonParser
            .parse(Path::new("case.json"), r#"[{"config": {"name": "demo"}}]"#)
            .unwrap();
        assert_eq!(value, json!([{"config": {"name": "demo"}}]));
    }

    #[test]
    fn json_parser_keeps_key_order() {
        let value = JsonParser
            .parse(Path::new("case.json"), r#"{"zeta": 1, "alpha": 2, "mid": 3}"#)
            .unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn json_parser_invalid() {
        let err = JsonParser
            .parse(Path::new("broken.json"), r#"{"name": "test", "value":}"#)
            .unwrap_err();
        assert!(err.is_format_error());
        assert!(err.to_string().contains("broken.json"));
    }
}
