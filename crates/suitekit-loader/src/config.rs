//! Loader configuration
//!
//! Defaults match the conventional project layout: an anchor file at the
//! project root, `.env` beside it and API definitions under `api/`.

use crate::error::{LoaderError, LoaderResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use suitekit_artifact::AnchorLocator;

/// Default anchor file marking the project root
pub const DEFAULT_ANCHOR_FILE: &str = "suitekit.toml";

/// Project loader settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// File whose directory is the project root
    pub anchor_file: String,
    /// Environment file name, relative to the project root
    pub dot_env_file: String,
    /// API definition folder, relative to the project root
    pub api_dir: String,
    /// Directory where the anchor search stops (working directory if unset)
    pub search_boundary: Option<PathBuf>,
    /// Maximum parent directories visited by the anchor search
    pub max_search_depth: usize,
    /// Scan test folders recursively
    pub recursive: bool,
    /// Export `.env` pairs into the process environment
    pub export_env: bool,
    /// Pre-allocated size of the nested-testcase memo cache; at least 1
    pub testcase_cache_capacity: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            anchor_file: DEFAULT_ANCHOR_FILE.to_string(),
            dot_env_file: ".env".to_string(),
            api_dir: "api".to_string(),
            search_boundary: None,
            max_search_depth: suitekit_artifact::locate::DEFAULT_MAX_DEPTH,
            recursive: true,
            export_env: true,
            testcase_cache_capacity: crate::cache::DEFAULT_CAPACITY,
        }
    }
}

impl LoaderConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text; missing keys keep their defaults
    ///
    /// # Errors
    /// `LoaderError::Config` on invalid TOML or field types.
    pub fn from_toml_str(text: &str) -> LoaderResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| LoaderError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot
    ///
    /// # Errors
    /// `LoaderError::Config` for an empty anchor name or a zero cache capacity.
    pub fn validate(&self) -> LoaderResult<()> {
        if self.anchor_file.trim().is_empty() {
            return Err(LoaderError::Config("anchor_file must not be empty".to_string()));
        }
        if self.testcase_cache_capacity == 0 {
            return Err(LoaderError::Config(
                "testcase_cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Read configuration from a TOML file
    ///
    /// # Errors
    /// `LoaderError::Config` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> LoaderResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// With anchor file name
    #[inline]
    #[must_use]
    pub fn with_anchor_file(mut self, name: impl Into<String>) -> Self {
        self.anchor_file = name.into();
        self
    }

    /// With anchor search boundary
    #[inline]
    #[must_use]
    pub fn with_search_boundary(mut self, boundary: impl Into<PathBuf>) -> Self {
        self.search_boundary = Some(boundary.into());
        self
    }

    /// With environment export switched on or off
    #[inline]
    #[must_use]
    pub fn with_export_env(mut self, export: bool) -> Self {
        self.export_env = export;
        self
    }

    /// With recursive folder scanning switched on or off
    #[inline]
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Anchor locator configured from these settings
    #[must_use]
    pub fn locator(&self) -> AnchorLocator {
        let locator = AnchorLocator::new(self.anchor_file.clone()).with_max_depth(self.max_search_depth);
        match &self.search_boundary {
            Some(boundary) => locator.with_boundary(boundary.clone()),
            None => locator,
        }
    }
}
