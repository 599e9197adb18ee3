//! Upward search for the project anchor file
//!
//! The directory holding the anchor file is the project root. The search
//! walks parent directories from the start path and stops at the boundary
//! directory (the working directory by default), at the filesystem root, or
//! after `max_depth` parent hops.

use crate::error::{ArtifactError, ArtifactResult};
use std::path::{Path, PathBuf};

/// Default limit on parent hops
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Locator for a named anchor file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorLocator {
    anchor_name: String,
    boundary: Option<PathBuf>,
    max_depth: usize,
}

impl AnchorLocator {
    /// Locator bounded by the process working directory
    #[must_use]
    pub fn new(anchor_name: impl Into<String>) -> Self {
        Self {
            anchor_name: anchor_name.into(),
            boundary: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Stop the search at `boundary` instead of the working directory
    #[inline]
    #[must_use]
    pub fn with_boundary(mut self, boundary: impl Into<PathBuf>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Limit the number of parent directories visited
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Anchor file name
    #[inline]
    #[must_use]
    pub fn anchor_name(&self) -> &str {
        &self.anchor_name
    }

    /// Find the anchor starting from a file or directory
    ///
    /// # Errors
    /// `ArtifactError::FileNotFound` if `start_path` does not exist or no
    /// anchor is found before the search stops.
    pub fn locate(&self, start_path: impl AsRef<Path>) -> ArtifactResult<PathBuf> {
        let start_path = start_path.as_ref();
        let start_dir = if start_path.is_file() {
            start_path.parent().unwrap_or(Path::new("."))
        } else if start_path.is_dir() {
            start_path
        } else {
            return Err(ArtifactError::not_found(format!(
                "invalid path: {}",
                start_path.display()
            )));
        };

        let mut current = canonical(start_dir)?;
        let boundary = match &self.boundary {
            Some(dir) => canonical(dir).unwrap_or_else(|_| dir.clone()),
            None => {
                let cwd = std::env::current_dir()
                    .map_err(|e| ArtifactError::io_error(".", e))?;
                canonical(&cwd).unwrap_or(cwd)
            }
        };

        for _ in 0..=self.max_depth {
            let candidate = current.join(&self.anchor_name);
            if candidate.is_file() {
                return Ok(candidate);
            }

            if current == boundary {
                break;
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Err(ArtifactError::not_found(format!(
            "{} not found in {}",
            self.anchor_name,
            start_path.display()
        )))
    }
}

/// Locate `anchor_name` upward from `start_path`, bounded by the working directory
///
/// # Errors
/// See [`AnchorLocator::locate`].
pub fn locate_file(start_path: impl AsRef<Path>, anchor_name: &str) -> ArtifactResult<PathBuf> {
    AnchorLocator::new(anchor_name).locate(start_path)
}

fn canonical(path: &Path) -> ArtifactResult<PathBuf> {
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };
    std::fs::canonicalize(path).map_err(|e| ArtifactError::io_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use suitekit_test_utils::ProjectFixture;

    const ANCHOR: &str = "suitekit.toml";

    #[test]
    fn finds_anchor_in_start_directory() {
        let fixture = ProjectFixture::new();
        let anchor = fixture.write(ANCHOR, "");

        let found = AnchorLocator::new(ANCHOR)
            .with_boundary(fixture.root())
            .locate(fixture.root())
            .unwrap();
        assert_eq!(found, std::fs::canonicalize(anchor).unwrap());
    }

    #[test]
    fn finds_anchor_from_nested_file() {
        let fixture = ProjectFixture::new();
        let anchor = fixture.write(ANCHOR, "");
        let case = fixture.write("testcases/smoke/login.yml", "- config: {}");

        let found = AnchorLocator::new(ANCHOR)
            .with_boundary(fixture.root())
            .locate(case)
            .unwrap();
        assert_eq!(found, std::fs::canonicalize(anchor).unwrap());
    }

    #[test]
    fn stops_at_boundary() {
        let fixture = ProjectFixture::new();
        fixture.write(ANCHOR, "");
        fixture.mkdir("project/testcases");

        // anchor sits above the boundary and must not be found
        let err = AnchorLocator::new(ANCHOR)
            .with_boundary(fixture.path("project"))
            .locate(fixture.path("project/testcases"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn missing_anchor_is_not_found() {
        let fixture = ProjectFixture::new();
        fixture.mkdir("a/b/c");

        let err = AnchorLocator::new(ANCHOR)
            .with_boundary(fixture.root())
            .locate(fixture.path("a/b/c"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn max_depth_limits_search() {
        let fixture = ProjectFixture::new();
        fixture.write(ANCHOR, "");
        fixture.mkdir("a/b/c");

        let locator = AnchorLocator::new(ANCHOR).with_boundary(fixture.root());
        assert!(locator.clone().with_max_depth(2).locate(fixture.path("a/b/c")).is_err());
        assert!(locator.with_max_depth(3).locate(fixture.path("a/b/c")).is_ok());
    }

    #[test]
    fn invalid_start_path_is_not_found() {
        let fixture = ProjectFixture::new();
        let err = locate_file(fixture.path("ghost"), ANCHOR).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("invalid path"));
    }

    #[test]
    fn default_boundary_is_working_directory() {
        // Test binaries run with the manifest directory as cwd.
        let dir = tempfile::Builder::new()
            .prefix("locate-cwd")
            .tempdir_in(env!("CARGO_MANIFEST_DIR"))
            .unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let err = locate_file(&nested, ANCHOR).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("not found"));

        std::fs::write(dir.path().join(ANCHOR), "").unwrap();
        let found = locate_file(&nested, ANCHOR).unwrap();
        assert_eq!(found, dir.path().canonicalize().unwrap().join(ANCHOR));
    }
}
