//! Error types for project loading
//!
//! Provides error handling for:
//! - Artifact reading (wrapped from the artifact layer)
//! - Malformed testcase and API blocks
//! - Unresolvable API and testcase references
//! - Project extension and template failures

use crate::functions::FunctionError;
use std::path::PathBuf;
use suitekit_artifact::ArtifactError;

/// Main loader error type
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// Error from the artifact layer
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Path to load does not exist
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Testcase or API block has the wrong shape
    #[error("file format error: {0}")]
    FileFormat(String),

    /// Referenced API id is not defined
    #[error("api not found: {0}")]
    ApiNotFound(String),

    /// A testcase references itself, directly or transitively
    #[error("circular testcase reference: {}", format_chain(.chain))]
    CircularReference {
        /// Testcase paths from the outermost file to the repeated one
        chain: Vec<PathBuf>,
    },

    /// Project extension functions could not be loaded
    #[error("extension load failed for {}: {message}", .anchor.display())]
    Extension {
        /// Anchor file whose extension unit failed
        anchor: PathBuf,
        /// Failure reason
        message: String,
    },

    /// A registered function failed
    #[error(transparent)]
    Function(#[from] FunctionError),

    /// Template resolution failed
    #[error("template error: {0}")]
    Template(String),

    /// Loader configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),
}

impl LoaderError {
    /// Create format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::FileFormat(message.into())
    }

    /// Check for a missing-path error from either layer
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::FileNotFound(_) => true,
            Self::Artifact(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Check for a content or block shape error from either layer
    #[inline]
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        match self {
            Self::FileFormat(_) => true,
            Self::Artifact(err) => err.is_format_error(),
            _ => false,
        }
    }

    /// Check for an unresolved API reference
    #[inline]
    #[must_use]
    pub fn is_api_not_found(&self) -> bool {
        matches!(self, Self::ApiNotFound(_))
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type alias for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;
