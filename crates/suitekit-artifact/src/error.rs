//! Error types for artifact loading
//!
//! Covers the failure modes of reading files from a project tree:
//! - Missing files and anchors
//! - Malformed structured or tabular content
//! - IO failures while reading or walking directories

use std::path::PathBuf;

/// Errors raised while locating or reading artifact files
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// Path does not exist, is not a file, or an anchor was not found
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Content could not be decoded or has the wrong shape
    #[error("file format error in {}: {message}", .path.display())]
    FileFormat {
        /// File being read
        path: PathBuf,
        /// What was wrong with the content
        message: String,
    },

    /// IO error during read or directory walk
    #[error("io error reading {}: {source}", .path.display())]
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },
}

impl ArtifactError {
    /// Create file-not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::FileNotFound(message.into())
    }

    /// Create format error for path
    pub fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this is a missing path / missing anchor error
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound(_))
    }

    /// Check if this is a content format error
    #[inline]
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::FileFormat { .. })
    }
}

/// Result type alias for artifact operations
pub type ArtifactResult<T> = Result<T, ArtifactError>;
