//! Testing utilities for suitekit workspace
//!
//! Temp-directory project trees for loader and artifact tests.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Anchor file name used by fixtures that represent a whole project
pub const ANCHOR_FILE: &str = "suitekit.toml";

/// A throwaway project directory, removed on drop
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Fixture with an anchor file at its root
    pub fn project() -> Self {
        let fixture = Self::new();
        fixture.write(ANCHOR_FILE, "");
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Root with symlinks resolved, as returned by the anchor locator
    pub fn canonical_root(&self) -> PathBuf {
        fs::canonicalize(self.root()).unwrap()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal API definition file with one `api` block per id
pub fn api_file(ids: &[&str]) -> String {
    ids.iter()
        .map(|id| {
            format!(
                "- api:\n    id: {id}\n    request:\n      url: /{id}\n      method: GET\n    validate:\n      - eq: [status_code, 200]\n"
            )
        })
        .collect()
}
