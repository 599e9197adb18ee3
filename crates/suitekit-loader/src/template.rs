//! Template resolution capability
//!
//! The loader never evaluates `${var}`-style expressions itself. The
//! weighted load-test entry point hands config values to a resolver supplied
//! by the embedding application.

use crate::error::LoaderResult;
use crate::functions::FunctionRegistry;
use serde_json::{Map, Value};

/// Resolves templated data against variables and functions
pub trait TemplateResolver: Send + Sync {
    /// Return `data` with every placeholder resolved
    ///
    /// # Errors
    /// `LoaderError::Template` (or a function error) when resolution fails.
    fn resolve(
        &self,
        data: &Value,
        variables: &Map<String, Value>,
        functions: &FunctionRegistry,
    ) -> LoaderResult<Value>;
}

/// Resolver that returns data unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

impl TemplateResolver for PassthroughResolver {
    fn resolve(
        &self,
        data: &Value,
        _variables: &Map<String, Value>,
        _functions: &FunctionRegistry,
    ) -> LoaderResult<Value> {
        Ok(data.clone())
    }
}
