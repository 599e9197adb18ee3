//! Testcase assembly from labeled blocks
//!
//! A testcase file is a sequence of single-key mappings. `config` blocks are
//! merged left to right into one mapping; `test` blocks are resolved into
//! steps in file order. Other keys are logged and skipped.

use crate::error::{LoaderError, LoaderResult};
use crate::model::{single_entry, TestCase};
use crate::resolver::{canonical_key, ReferenceResolver, ResolutionScope};
use serde_json::{Map, Value};
use std::path::Path;

/// Block key for configuration
pub const CONFIG_BLOCK: &str = "config";
/// Block key for test steps
pub const TEST_BLOCK: &str = "test";

/// One labeled block of a testcase file
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Block<'v> {
    /// `config` mapping
    Config(&'v Map<String, Value>),
    /// `test` mapping
    Test(&'v Map<String, Value>),
    /// Any other key
    Unknown(&'v str),
}

/// Split raw file content into labeled blocks
///
/// # Errors
/// `LoaderError::FileFormat` if the content is not a sequence, or an item is
/// not a single-key mapping whose value is a mapping.
pub fn parse_blocks(raw: &Value) -> LoaderResult<Vec<Block<'_>>> {
    let items = raw
        .as_array()
        .ok_or_else(|| LoaderError::format(format!("Testcase format error: {raw}")))?;

    items
        .iter()
        .map(|item| {
            let (key, value) = single_entry(item)
                .ok_or_else(|| LoaderError::format(format!("Testcase format error: {item}")))?;
            let block = value
                .as_object()
                .ok_or_else(|| LoaderError::format(format!("Testcase format error: {item}")))?;

            Ok(match key.as_str() {
                CONFIG_BLOCK => Block::Config(block),
                TEST_BLOCK => Block::Test(block),
                other => Block::Unknown(other),
            })
        })
        .collect()
}

/// Log a skipped block key
pub(crate) fn warn_unknown_block(key: &str) {
    tracing::warn!(
        "unexpected block key: {}. block key should only be 'config' or 'test'.",
        key
    );
}

/// Builds [`TestCase`]s, resolving step references as it goes
#[derive(Debug, Clone, Copy)]
pub struct TestcaseAssembler<'a> {
    resolver: ReferenceResolver<'a>,
}

impl<'a> TestcaseAssembler<'a> {
    /// Create assembler around `resolver`
    #[inline]
    #[must_use]
    pub fn new(resolver: ReferenceResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Assemble already-parsed file content
    ///
    /// # Errors
    /// Block shape errors from [`parse_blocks`] and any step resolution error.
    pub fn assemble(&self, raw: &Value, scope: &mut ResolutionScope) -> LoaderResult<TestCase> {
        let mut testcase = TestCase::default();

        for block in parse_blocks(raw)? {
            match block {
                Block::Config(config) => {
                    testcase
                        .config
                        .extend(config.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                Block::Test(step) => {
                    let step = self.resolver.load_teststep(step.clone(), scope)?;
                    testcase.teststeps.push(step);
                }
                Block::Unknown(key) => warn_unknown_block(key),
            }
        }

        Ok(testcase)
    }

    /// Read, assemble and annotate one testcase file
    ///
    /// `config.path` records `path` as given; cycle detection uses its
    /// canonical form.
    ///
    /// # Errors
    /// `LoaderError::CircularReference` when the file is already being
    /// assembled, otherwise any read or assembly error.
    pub fn assemble_file(&self, path: &Path, scope: &mut ResolutionScope) -> LoaderResult<TestCase> {
        scope.enter(&canonical_key(path))?;
        let result = self.load_and_assemble(path, scope);
        scope.exit();
        result
    }

    fn load_and_assemble(&self, path: &Path, scope: &mut ResolutionScope) -> LoaderResult<TestCase> {
        let raw = self.resolver.reader().load_file(path)?;
        let mut testcase = self.assemble(&raw.content, scope)?;
        testcase.set_path(path);
        Ok(testcase)
    }
}
