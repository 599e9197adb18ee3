//! Artifact parsers for the supported file formats
//!
//! Every parser turns file text into a generic [`serde_json::Value`]:
//! - Structured files (JSON, YAML) keep their own shape
//! - Tabular files (CSV) become a sequence of flat string mappings

use crate::error::ArtifactResult;
use serde_json::Value;
use std::fmt;
use std::path::Path;

mod tabular;
mod json;
mod yaml;

pub use self::tabular::CsvParser;
pub use self::json::JsonParser;
pub use self::yaml::YamlParser;

/// File formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.csv`
    Csv,
}

impl ArtifactFormat {
    /// Whether content of this format must pass the structural shape check
    #[inline]
    #[must_use]
    pub fn is_structured(self) -> bool {
        matches!(self, Self::Json | Self::Yaml)
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Csv => "csv",
        };
        f.write_str(name)
    }
}

/// Lowercased extension of `path`, if any
#[must_use]
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Parser trait for converting file text into a generic value
///
/// Implement this trait to add support for new file formats.
pub trait ArtifactParser: Send + Sync + 'static {
    /// Format produced by this parser
    fn format(&self) -> ArtifactFormat;

    /// Parse file text; `path` is only used for error reporting
    fn parse(&self, path: &Path, content: &str) -> ArtifactResult<Value>;

    /// Supported file extensions (lowercase, without dot)
    fn extensions(&self) -> &[&str];

    /// Check if this parser can handle the given path
    fn can_parse(&self, path: &Path) -> bool {
        extension_of(path)
            .map(|ext| self.extensions().contains(&ext.as_str()))
            .unwrap_or(false)
    }
}

/// Extension-dispatched set of parsers
pub struct ParserRegistry {
    parsers: Vec<Box<dyn ArtifactParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        default_parsers()
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("parser_count", &self.parsers.len())
            .field("extensions", &self.all_extensions())
            .finish()
    }
}

impl ParserRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Register a parser
    pub fn register<P: ArtifactParser>(&mut self, parser: P) {
        self.parsers.push(Box::new(parser));
    }

    /// Find parser for path
    #[must_use]
    pub fn find_for_path(&self, path: &Path) -> Option<&dyn ArtifactParser> {
        self.parsers.iter().find(|p| p.can_parse(path)).map(|p| &**p)
    }

    /// Get all registered extensions
    #[must_use]
    pub fn all_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|p| p.extensions())
            .copied()
            .collect()
    }
}

/// Create registry with the JSON, YAML and CSV parsers
#[inline]
#[must_use]
pub fn default_parsers() -> ParserRegistry {
    let mut registry = ParserRegistry::new();
    registry.register(JsonParser);
    registry.register(YamlParser);
    registry.register(CsvParser);
    registry
}
