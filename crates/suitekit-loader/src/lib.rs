//! suitekit project loader
//!
//! Turns a test project on disk into an in-memory, fully-referenced test
//! model: testcases whose steps carry their API definitions and nested
//! testcases, ready for an execution engine.
//!
//! # Core Operations
//!
//! - **Locate**: find the project root by its anchor file
//! - **Project**: load functions, `.env` variables and API definitions
//! - **Resolve**: attach API and nested testcase definitions to steps
//! - **Assemble**: merge config blocks and collect steps per file
//! - **Locust**: flatten one file into weighted steps for load generation
//!
//! # Example
//!
//! ```rust,ignore
//! use suitekit_loader::{LoaderConfig, ProjectLoader};
//!
//! let loader = ProjectLoader::with_config(LoaderConfig::new().with_export_env(false));
//! let loaded = loader.load_tests("tests/smoke", None)?;
//! for testcase in &loaded.testcases {
//!     println!("{:?}: {} steps", testcase.name(), testcase.teststeps.len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod assembler;
pub mod builtin;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod functions;
pub mod model;
pub mod project;
pub mod resolver;
pub mod template;

pub use assembler::{parse_blocks, Block, TestcaseAssembler};
pub use builtin::BuiltinModule;
pub use cache::{CacheStats, TestcaseCache};
pub use config::LoaderConfig;
pub use context::ProjectContext;
pub use error::{LoaderError, LoaderResult};
pub use functions::{
    function, load_module_functions, ExtensionLoader, ExtensionModule, Function,
    FunctionError, FunctionRegistry, ItemModule, ModuleItem, NoExtensions, StaticExtensions,
};
pub use model::{ApiDefinition, ApiRegistry, LocustTests, StepKind, TestCase, TestStep};
pub use project::{
    load_locust_tests, load_project_tests, load_tests, variables_mapping, LoadedTests,
    ProjectLoader, ProjectLocation,
};
pub use resolver::{ReferenceResolver, ResolutionScope};
pub use template::{PassthroughResolver, TemplateResolver};
