//! Test step reference resolution
//!
//! A step block resolves in this order:
//! 1. `api`: copy of the named definition from the project's API registry
//! 2. `func`: passed through untouched
//! 3. `testcase`: nested testcase file, assembled once and memoized
//! 4. anything else: direct definition

use crate::assembler::TestcaseAssembler;
use crate::context::ProjectContext;
use crate::error::{LoaderError, LoaderResult};
use crate::model::{StepKind, TestCase, TestStep, API_KEY, FUNC_KEY, TESTCASE_KEY};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use suitekit_artifact::ArtifactReader;

/// Testcase files currently being assembled, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionScope {
    stack: Vec<PathBuf>,
}

impl ResolutionScope {
    /// Empty scope
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `path`, failing if it is already being assembled
    ///
    /// # Errors
    /// `LoaderError::CircularReference` with the full chain.
    pub fn enter(&mut self, path: &Path) -> LoaderResult<()> {
        if self.stack.iter().any(|p| p == path) {
            let mut chain = self.stack.clone();
            chain.push(path.to_path_buf());
            return Err(LoaderError::CircularReference { chain });
        }
        self.stack.push(path.to_path_buf());
        Ok(())
    }

    /// Pop the innermost path
    #[inline]
    pub fn exit(&mut self) {
        self.stack.pop();
    }

    /// Nesting depth
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Canonical form of `path` used for cycle checks and cache keys
pub(crate) fn canonical_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Resolves step references against one project context
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    ctx: &'a ProjectContext,
    reader: &'a ArtifactReader,
}

impl<'a> ReferenceResolver<'a> {
    /// Create resolver for `ctx`
    #[inline]
    #[must_use]
    pub fn new(ctx: &'a ProjectContext, reader: &'a ArtifactReader) -> Self {
        Self { ctx, reader }
    }

    /// Project context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &'a ProjectContext {
        self.ctx
    }

    /// Artifact reader
    #[inline]
    #[must_use]
    pub fn reader(&self) -> &'a ArtifactReader {
        self.reader
    }

    /// Resolve one step block
    ///
    /// # Errors
    /// - `LoaderError::ApiNotFound` for an unknown API id
    /// - `LoaderError::FileFormat` if a reference value is not a string
    /// - any error from loading a referenced testcase file
    pub fn load_teststep(
        &self,
        block: Map<String, Value>,
        scope: &mut ResolutionScope,
    ) -> LoaderResult<TestStep> {
        let kind = if let Some(reference) = block.get(API_KEY) {
            let id = reference_str(API_KEY, reference)?;
            StepKind::Api(self.ctx.apis().resolve(id)?)
        } else if block.contains_key(FUNC_KEY) {
            StepKind::Function
        } else if let Some(reference) = block.get(TESTCASE_KEY) {
            let relative = reference_str(TESTCASE_KEY, reference)?;
            let path = canonical_key(&self.ctx.resolve_path(relative));
            let testcase = self.load_referenced_testcase(&path, scope)?;
            StepKind::Testcase { path, testcase }
        } else {
            StepKind::Direct
        };

        Ok(TestStep { block, kind })
    }

    /// Nested testcase for `path`, from the memo cache or freshly assembled
    ///
    /// # Errors
    /// `LoaderError::CircularReference` if `path` is already being assembled,
    /// otherwise any load or assembly error for the file.
    pub fn load_referenced_testcase(
        &self,
        path: &Path,
        scope: &mut ResolutionScope,
    ) -> LoaderResult<Arc<TestCase>> {
        let cache = self.ctx.testcases();
        if let Some(cached) = cache.get(path) {
            tracing::debug!("Testcase cache hit: {}", path.display());
            return Ok(cached);
        }

        let testcase = Arc::new(TestcaseAssembler::new(*self).assemble_file(path, scope)?);
        cache.insert(path.to_path_buf(), Arc::clone(&testcase));
        Ok(testcase)
    }
}

fn reference_str<'v>(key: &str, value: &'v Value) -> LoaderResult<&'v str> {
    value.as_str().ok_or_else(|| {
        LoaderError::format(format!("{key} reference must be a string, got {value}"))
    })
}
