//! Per-load project state
//!
//! Built once by each `load_project` call and passed by reference to the
//! resolver, so separate loads in one process never share entries.

use crate::cache::TestcaseCache;
use crate::functions::FunctionRegistry;
use crate::model::ApiRegistry;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Project root, functions, environment and definition caches
#[derive(Debug)]
pub struct ProjectContext {
    root: PathBuf,
    anchor: Option<PathBuf>,
    functions: FunctionRegistry,
    env: IndexMap<String, String>,
    apis: ApiRegistry,
    testcases: TestcaseCache,
}

impl ProjectContext {
    /// Context rooted at `root` with empty tables
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            anchor: None,
            functions: FunctionRegistry::new(),
            env: IndexMap::new(),
            apis: ApiRegistry::new(),
            testcases: TestcaseCache::default(),
        }
    }

    /// With the anchor file that located the root
    #[inline]
    #[must_use]
    pub fn with_anchor(mut self, anchor: Option<PathBuf>) -> Self {
        self.anchor = anchor;
        self
    }

    /// With function table
    #[inline]
    #[must_use]
    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// With environment variables
    #[inline]
    #[must_use]
    pub fn with_env(mut self, env: IndexMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// With API definitions
    #[inline]
    #[must_use]
    pub fn with_apis(mut self, apis: ApiRegistry) -> Self {
        self.apis = apis;
        self
    }

    /// With a testcase cache of the given capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.testcases = TestcaseCache::new(capacity);
        self
    }

    /// Project root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Anchor file, `None` when the working directory was used as fallback
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Option<&Path> {
        self.anchor.as_deref()
    }

    /// Built-in and project functions
    #[inline]
    #[must_use]
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Variables parsed from the `.env` file
    #[inline]
    #[must_use]
    pub fn env(&self) -> &IndexMap<String, String> {
        &self.env
    }

    /// API definitions loaded from the API folder
    #[inline]
    #[must_use]
    pub fn apis(&self) -> &ApiRegistry {
        &self.apis
    }

    /// Memo cache of referenced testcases
    #[inline]
    #[must_use]
    pub fn testcases(&self) -> &TestcaseCache {
        &self.testcases
    }

    /// Resolve a project-relative path; absolute paths are returned as-is
    #[inline]
    #[must_use]
    pub fn resolve_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_is_root_relative() {
        let ctx = ProjectContext::new("/project");
        assert_eq!(
            ctx.resolve_path("testcases/login.yml"),
            PathBuf::from("/project/testcases/login.yml")
        );
        assert_eq!(ctx.resolve_path("/elsewhere/a.yml"), PathBuf::from("/elsewhere/a.yml"));
    }

    #[test]
    fn fresh_context_is_empty() {
        let ctx = ProjectContext::new("/project");
        assert!(ctx.anchor().is_none());
        assert!(ctx.functions().is_empty());
        assert!(ctx.env().is_empty());
        assert!(ctx.apis().is_empty());
        assert_eq!(ctx.testcases().stats().entry_count, 0);
    }
}
