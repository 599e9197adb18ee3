//! Function registry and extension loading
//!
//! Template expressions call functions by name. The table is built from two
//! units: the built-in module shipped with the loader and an optional project
//! extension module found next to the anchor file. A unit exposes named
//! items; only callable items make it into the registry.

use crate::error::LoaderResult;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Error returned by a registered function
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("function {name} failed: {message}")]
pub struct FunctionError {
    /// Function name
    pub name: String,
    /// Failure description
    pub message: String,
}

impl FunctionError {
    /// Create error for function `name`
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Callable exposed to template expressions
pub type Function = Arc<dyn Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync>;

/// Wrap a closure as a [`Function`]
pub fn function<F>(f: F) -> Function
where
    F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Ordered name-to-callable table
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: IndexMap<String, Function>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

impl FunctionRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` under `name`, replacing any earlier entry
    pub fn register(&mut self, name: impl Into<String>, function: Function) {
        self.functions.insert(name.into(), function);
    }

    /// Look up a function
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Check if a function is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Call function `name` with `args`
    ///
    /// # Errors
    /// `FunctionError` if the name is unknown or the function fails.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, FunctionError> {
        let function = self
            .get(name)
            .ok_or_else(|| FunctionError::new(name, "function is not registered"))?;
        function(args)
    }

    /// Registered names in registration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    /// Number of registered functions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Merge `other` into this registry; entries from `other` win
    pub fn extend(&mut self, other: FunctionRegistry) {
        self.functions.extend(other.functions);
    }
}

/// Item exposed by an extension module
#[derive(Clone)]
pub enum ModuleItem {
    /// Callable item
    Function(Function),
    /// Plain value; never registered
    Constant(Value),
}

impl fmt::Debug for ModuleItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Function(..)"),
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
        }
    }
}

/// A unit of named items, such as the built-in module or a project extension
pub trait ExtensionModule: Send + Sync {
    /// Module name, used in logs
    fn name(&self) -> &str;

    /// Every top-level item the module exposes
    fn items(&self) -> Vec<(String, ModuleItem)>;
}

/// Collect the callable items of a module
#[must_use]
pub fn load_module_functions(module: &dyn ExtensionModule) -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    for (name, item) in module.items() {
        if let ModuleItem::Function(function) = item {
            registry.register(name, function);
        }
    }
    registry
}

/// Loads the project extension functions once the anchor file is known
pub trait ExtensionLoader: Send + Sync {
    /// Load functions for the project whose anchor file is `anchor`
    ///
    /// # Errors
    /// `LoaderError::Extension` when the extension unit cannot be loaded.
    fn load(&self, anchor: &Path) -> LoaderResult<FunctionRegistry>;
}

/// Projects without extension functions
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtensions;

impl ExtensionLoader for NoExtensions {
    fn load(&self, _anchor: &Path) -> LoaderResult<FunctionRegistry> {
        Ok(FunctionRegistry::new())
    }
}

/// Extension functions registered up front by the embedding application
pub struct StaticExtensions {
    module: Arc<dyn ExtensionModule>,
}

impl StaticExtensions {
    /// Serve the callables of `module` for every project
    #[must_use]
    pub fn new(module: impl ExtensionModule + 'static) -> Self {
        Self {
            module: Arc::new(module),
        }
    }
}

impl fmt::Debug for StaticExtensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticExtensions")
            .field("module", &self.module.name())
            .finish()
    }
}

impl ExtensionLoader for StaticExtensions {
    fn load(&self, anchor: &Path) -> LoaderResult<FunctionRegistry> {
        let registry = load_module_functions(self.module.as_ref());
        tracing::debug!(
            "Loaded {} functions from {} for {}",
            registry.len(),
            self.module.name(),
            anchor.display()
        );
        Ok(registry)
    }
}

/// Extension module backed by a plain list of items
#[derive(Debug, Clone, Default)]
pub struct ItemModule {
    name: String,
    items: Vec<(String, ModuleItem)>,
}

impl ItemModule {
    /// Create empty module
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Add a callable item
    #[must_use]
    pub fn with_function<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        self.items.push((name.into(), ModuleItem::Function(function(f))));
        self
    }

    /// Add a non-callable item
    #[must_use]
    pub fn with_constant(mut self, name: impl Into<String>, value: Value) -> Self {
        self.items.push((name.into(), ModuleItem::Constant(value)));
        self
    }
}

impl ExtensionModule for ItemModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn items(&self) -> Vec<(String, ModuleItem)> {
        self.items.clone()
    }
}
