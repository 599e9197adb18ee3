//! Assembled test model
//!
//! A [`TestCase`] is one merged config mapping plus ordered [`TestStep`]s.
//! Each step keeps its original block and, for reference steps, the resolved
//! API definition or nested testcase.

use crate::error::{LoaderError, LoaderResult};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Block key holding an API reference
pub const API_KEY: &str = "api";
/// Block key reserved for function-reference steps
pub const FUNC_KEY: &str = "func";
/// Block key holding a testcase reference
pub const TESTCASE_KEY: &str = "testcase";
/// Step field carrying the load-test replication factor
pub const WEIGHT_KEY: &str = "weight";

/// Reusable request template identified by `id`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiDefinition {
    /// Unique id
    pub id: String,
    /// Full definition block, `id` included
    pub body: Map<String, Value>,
}

impl ApiDefinition {
    /// Build from one `{ <key>: { id: ..., ... } }` block of an API file
    ///
    /// The block key itself is not interpreted.
    ///
    /// # Errors
    /// `LoaderError::FileFormat` if the block is not a single-key mapping of a
    /// mapping with a string `id`.
    pub fn from_block(block: &Value, source: &Path) -> LoaderResult<Self> {
        let body = single_entry(block)
            .and_then(|(_, value)| value.as_object())
            .ok_or_else(|| {
                LoaderError::format(format!(
                    "API definition format error in {}: {block}",
                    source.display()
                ))
            })?;

        let id = body.get("id").and_then(Value::as_str).ok_or_else(|| {
            LoaderError::format(format!(
                "API definition without string id in {}: {block}",
                source.display()
            ))
        })?;

        Ok(Self {
            id: id.to_string(),
            body: body.clone(),
        })
    }

    /// Request template, if present
    #[inline]
    #[must_use]
    pub fn request(&self) -> Option<&Value> {
        self.body.get("request")
    }
}

/// API definitions keyed by id
#[derive(Debug, Clone, Default)]
pub struct ApiRegistry {
    definitions: IndexMap<String, ApiDefinition>,
}

impl ApiRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, returning the one it replaced
    pub fn insert(&mut self, definition: ApiDefinition) -> Option<ApiDefinition> {
        self.definitions.insert(definition.id.clone(), definition)
    }

    /// Borrow the cached definition
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ApiDefinition> {
        self.definitions.get(id)
    }

    /// Independent copy of the definition for `id`
    ///
    /// # Errors
    /// `LoaderError::ApiNotFound` if `id` is not defined.
    pub fn resolve(&self, id: &str) -> LoaderResult<ApiDefinition> {
        self.get(id)
            .cloned()
            .ok_or_else(|| LoaderError::ApiNotFound(format!("{id} not found!")))
    }

    /// Ids in first-definition order
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    /// Number of definitions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// How a step was resolved
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    /// Request defined inline
    Direct,
    /// Reference to an API definition, deep-copied from the registry
    Api(ApiDefinition),
    /// Function-reference step, passed through untouched
    Function,
    /// Reference to another testcase file
    Testcase {
        /// Canonical path of the referenced file
        path: PathBuf,
        /// Assembled testcase, shared with the memo cache
        testcase: Arc<TestCase>,
    },
}

/// One executable unit of a testcase
#[derive(Debug, Clone, PartialEq)]
pub struct TestStep {
    /// Step block as written in the file
    pub block: Map<String, Value>,
    /// Resolution result
    pub kind: StepKind,
}

impl TestStep {
    /// Direct step
    #[inline]
    #[must_use]
    pub fn direct(block: Map<String, Value>) -> Self {
        Self {
            block,
            kind: StepKind::Direct,
        }
    }

    /// Step name, if given
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.block.get("name").and_then(Value::as_str)
    }

    /// Resolved API definition for API-reference steps
    #[must_use]
    pub fn api_def(&self) -> Option<&ApiDefinition> {
        match &self.kind {
            StepKind::Api(def) => Some(def),
            _ => None,
        }
    }

    /// Resolved testcase for testcase-reference steps
    #[must_use]
    pub fn testcase_def(&self) -> Option<&Arc<TestCase>> {
        match &self.kind {
            StepKind::Testcase { testcase, .. } => Some(testcase),
            _ => None,
        }
    }

    /// Load-test replication factor; 1 when absent
    ///
    /// # Errors
    /// `LoaderError::FileFormat` if the weight is not a non-negative integer.
    pub fn weight(&self) -> LoaderResult<usize> {
        match self.block.get(WEIGHT_KEY) {
            None => Ok(1),
            Some(value) => value
                .as_u64()
                .and_then(|w| usize::try_from(w).ok())
                .ok_or_else(|| {
                    LoaderError::format(format!(
                        "weight must be a non-negative integer, got {value}"
                    ))
                }),
        }
    }

    /// Block with the resolved definition attached as `api_def` or `testcase_def`
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut block = self.block.clone();
        match &self.kind {
            StepKind::Api(def) => {
                block.insert("api_def".to_string(), Value::Object(def.body.clone()));
            }
            StepKind::Testcase { testcase, .. } => {
                block.insert("testcase_def".to_string(), testcase.to_value());
            }
            StepKind::Direct | StepKind::Function => {}
        }
        Value::Object(block)
    }
}

impl Serialize for TestStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Merged config plus ordered steps of one testcase file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestCase {
    /// Config blocks merged in file order
    pub config: Map<String, Value>,
    /// Steps in file order
    pub teststeps: Vec<TestStep>,
}

impl TestCase {
    /// Config name, if given
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.config.get("name").and_then(Value::as_str)
    }

    /// Source path recorded in the config
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.config.get("path").and_then(Value::as_str)
    }

    /// Record the source file in `config.path`
    pub fn set_path(&mut self, path: &Path) {
        self.config.insert(
            "path".to_string(),
            Value::String(path.display().to_string()),
        );
    }

    /// `{config, teststeps}` value
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        out.insert("config".to_string(), Value::Object(self.config.clone()));
        out.insert(
            "teststeps".to_string(),
            Value::Array(self.teststeps.iter().map(TestStep::to_value).collect()),
        );
        Value::Object(out)
    }
}

impl Serialize for TestCase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Flattened model for weighted load generation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocustTests {
    /// Config with variables, name and request resolved
    pub config: Map<String, Value>,
    /// Steps, each repeated `weight` times
    pub tests: Vec<TestStep>,
}

/// The single `(key, value)` pair of a one-key mapping
pub(crate) fn single_entry(block: &Value) -> Option<(&String, &Value)> {
    match block.as_object() {
        Some(map) if map.len() == 1 => map.iter().next(),
        _ => None,
    }
}
