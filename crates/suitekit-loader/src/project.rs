//! Project loader - main entry point
//!
//! Locates the project, builds a fresh [`ProjectContext`] and loads either a
//! single testcase file, a folder of testcase files, or the weighted
//! load-test variant of one file.

use crate::assembler::{parse_blocks, warn_unknown_block, Block, TestcaseAssembler};
use crate::builtin::BuiltinModule;
use crate::config::LoaderConfig;
use crate::context::ProjectContext;
use crate::error::{LoaderError, LoaderResult};
use crate::functions::{load_module_functions, ExtensionLoader, ExtensionModule, FunctionRegistry, NoExtensions};
use crate::model::{ApiDefinition, ApiRegistry, LocustTests, TestCase};
use crate::resolver::{canonical_key, ReferenceResolver, ResolutionScope};
use crate::template::{PassthroughResolver, TemplateResolver};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use suitekit_artifact::{load_dot_env_file, load_folder_files, ArtifactReader};

/// Result of [`ProjectLoader::load_tests`]
#[derive(Debug)]
pub struct LoadedTests {
    /// Project state used to resolve references
    pub project: ProjectContext,
    /// One testcase per loaded file, in discovery order
    pub testcases: Vec<TestCase>,
}

/// Root directory, anchor file and extension functions of a project
#[derive(Debug)]
pub struct ProjectLocation {
    /// Project root
    pub root: PathBuf,
    /// Anchor file, `None` when falling back to the working directory
    pub anchor: Option<PathBuf>,
    /// Project extension functions
    pub functions: FunctionRegistry,
}

/// Loads test projects from disk
pub struct ProjectLoader {
    config: LoaderConfig,
    reader: ArtifactReader,
    builtins: Arc<dyn ExtensionModule>,
    extensions: Arc<dyn ExtensionLoader>,
    templates: Arc<dyn TemplateResolver>,
}

impl fmt::Debug for ProjectLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectLoader")
            .field("config", &self.config)
            .field("reader", &self.reader)
            .field("builtins", &self.builtins.name())
            .finish_non_exhaustive()
    }
}

impl Default for ProjectLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectLoader {
    /// Loader with default configuration, built-ins and no project extensions
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    /// Loader with specific configuration
    #[must_use]
    pub fn with_config(config: LoaderConfig) -> Self {
        Self {
            config,
            reader: ArtifactReader::new(),
            builtins: Arc::new(BuiltinModule),
            extensions: Arc::new(NoExtensions),
            templates: Arc::new(PassthroughResolver),
        }
    }

    /// With project extension loader
    #[must_use]
    pub fn with_extensions(mut self, extensions: impl ExtensionLoader + 'static) -> Self {
        self.extensions = Arc::new(extensions);
        self
    }

    /// With replacement built-in module
    #[must_use]
    pub fn with_builtins(mut self, builtins: impl ExtensionModule + 'static) -> Self {
        self.builtins = Arc::new(builtins);
        self
    }

    /// With template resolver for the weighted variant
    #[must_use]
    pub fn with_template_resolver(mut self, templates: impl TemplateResolver + 'static) -> Self {
        self.templates = Arc::new(templates);
        self
    }

    /// Current configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Find the project root and load extension functions
    ///
    /// A missing anchor is not an error: the working directory becomes the
    /// root and no extension functions are loaded.
    ///
    /// # Errors
    /// `LoaderError::Extension` if the anchor exists but its extension unit
    /// fails to load; IO errors from the search.
    pub fn locate_project(&self, start_path: &Path) -> LoaderResult<ProjectLocation> {
        match self.config.locator().locate(start_path) {
            Ok(anchor) => {
                let root = anchor
                    .parent()
                    .map(Path::to_path_buf)
                    .ok_or_else(|| LoaderError::FileNotFound(anchor.display().to_string()))?;
                let functions = self.extensions.load(&anchor)?;
                Ok(ProjectLocation {
                    root,
                    anchor: Some(anchor),
                    functions,
                })
            }
            Err(err) if err.is_not_found() => {
                let cwd = std::env::current_dir()
                    .map_err(|e| suitekit_artifact::ArtifactError::io_error(".", e))?;
                tracing::info!(
                    "{} not found, using working directory {} as project root",
                    self.config.anchor_file,
                    cwd.display()
                );
                Ok(ProjectLocation {
                    root: canonical_key(&cwd),
                    anchor: None,
                    functions: FunctionRegistry::new(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Build the project context for tests at `test_path`
    ///
    /// Loads functions, `.env` variables (from `dot_env_path` or
    /// `<root>/.env`) and every API definition under `<root>/api`.
    ///
    /// # Errors
    /// Invalid configuration, extension, `.env` format and API definition
    /// errors.
    pub fn load_project(
        &self,
        test_path: &Path,
        dot_env_path: Option<&Path>,
    ) -> LoaderResult<ProjectContext> {
        self.config.validate()?;
        let location = self.locate_project(test_path)?;
        tracing::info!("Project root: {}", location.root.display());

        let mut functions = load_module_functions(self.builtins.as_ref());
        functions.extend(location.functions);

        let dot_env = dot_env_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| location.root.join(&self.config.dot_env_file));
        let env = load_dot_env_file(&dot_env, self.config.export_env)?;

        let apis = self.load_api_folder(&location.root.join(&self.config.api_dir))?;

        Ok(ProjectContext::new(location.root)
            .with_anchor(location.anchor)
            .with_functions(functions)
            .with_env(env)
            .with_apis(apis)
            .with_cache_capacity(self.config.testcase_cache_capacity))
    }

    /// Load every API definition file under `folder`
    ///
    /// Duplicate ids are logged; the later definition wins.
    ///
    /// # Errors
    /// File read errors and malformed API blocks.
    pub fn load_api_folder(&self, folder: &Path) -> LoaderResult<ApiRegistry> {
        let mut registry = ApiRegistry::new();

        for (path, artifact) in self.reader.load_folder_content(folder)? {
            let blocks = artifact.content.as_array().ok_or_else(|| {
                LoaderError::format(format!(
                    "API file must contain a sequence of api blocks: {}",
                    path.display()
                ))
            })?;

            for block in blocks {
                let definition = ApiDefinition::from_block(block, &path)?;
                let id = definition.id.clone();
                if registry.insert(definition).is_some() {
                    tracing::warn!("API definition duplicated: {}", id);
                }
            }
        }

        Ok(registry)
    }

    /// Load testcases from a file or folder
    ///
    /// When loading a folder, files whose content or blocks are malformed
    /// are skipped with a warning. A single malformed file is an error.
    ///
    /// # Errors
    /// - `LoaderError::FileNotFound` if `path` does not exist
    /// - format errors when `path` is a single malformed file
    /// - project loading errors, unresolvable references, circular references
    pub fn load_tests(
        &self,
        path: impl AsRef<Path>,
        dot_env_path: Option<&Path>,
    ) -> LoaderResult<LoadedTests> {
        let path = path.as_ref();
        if !path.exists() {
            let message = format!("path not exist: {}", path.display());
            tracing::error!("{}", message);
            return Err(LoaderError::FileNotFound(message));
        }

        let path = absolute(path)?;
        let project = self.load_project(&path, dot_env_path)?;

        let is_dir = path.is_dir();
        let files = if is_dir {
            load_folder_files(&path, self.config.recursive)?
        } else {
            vec![path]
        };

        let resolver = ReferenceResolver::new(&project, &self.reader);
        let assembler = TestcaseAssembler::new(resolver);
        let mut testcases = Vec::with_capacity(files.len());

        for file in files {
            match assembler.assemble_file(&file, &mut ResolutionScope::new()) {
                Ok(testcase) => testcases.push(testcase),
                Err(err) if is_dir && err.is_format_error() => {
                    tracing::warn!("Skipping {}: {}", file.display(), err);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(LoadedTests { project, testcases })
    }

    /// Load one file for weighted load generation
    ///
    /// Each `test` block is resolved once and repeated `weight` times. The
    /// config's `variables`, `name` and `request` are resolved through the
    /// template resolver.
    ///
    /// # Errors
    /// File, block shape, weight, reference and template errors.
    pub fn load_locust_tests(
        &self,
        path: impl AsRef<Path>,
        dot_env_path: Option<&Path>,
    ) -> LoaderResult<LocustTests> {
        let path = absolute(path.as_ref())?;
        let raw = self.reader.load_file(&path)?;
        let project = self.load_project(&path, dot_env_path)?;

        let resolver = ReferenceResolver::new(&project, &self.reader);
        let mut scope = ResolutionScope::new();
        scope.enter(&canonical_key(&path))?;

        let mut config = Map::new();
        let mut tests = Vec::new();
        for block in parse_blocks(&raw.content)? {
            match block {
                Block::Config(block) => {
                    config.extend(block.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                Block::Test(block) => {
                    let step = resolver.load_teststep(block.clone(), &mut scope)?;
                    let weight = step.weight()?;
                    tests.extend(std::iter::repeat(step).take(weight));
                }
                Block::Unknown(key) => warn_unknown_block(key),
            }
        }

        self.resolve_locust_config(&mut config, project.functions())?;
        Ok(LocustTests { config, tests })
    }

    fn resolve_locust_config(
        &self,
        config: &mut Map<String, Value>,
        functions: &FunctionRegistry,
    ) -> LoaderResult<()> {
        let raw_variables = config
            .get("variables")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let resolved = self.templates.resolve(&raw_variables, &Map::new(), functions)?;
        let variables = variables_mapping(&resolved)?;

        let name = config
            .get("name")
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
        let name = self.templates.resolve(&name, &variables, functions)?;

        let request = config
            .get("request")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let request = self.templates.resolve(&request, &variables, functions)?;

        config.insert("variables".to_string(), Value::Object(variables));
        config.insert("name".to_string(), name);
        config.insert("request".to_string(), request);
        Ok(())
    }
}

/// Normalize config variables into one mapping
///
/// Accepts a mapping, a sequence of single-key mappings (later keys win) or
/// null.
///
/// # Errors
/// `LoaderError::FileFormat` for any other shape.
pub fn variables_mapping(variables: &Value) -> LoaderResult<Map<String, Value>> {
    match variables {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map.clone()),
        Value::Array(items) => {
            let mut mapping = Map::new();
            for item in items {
                let map = item.as_object().ok_or_else(|| {
                    LoaderError::format(format!("variables item must be a mapping: {item}"))
                })?;
                mapping.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Ok(mapping)
        }
        other => Err(LoaderError::format(format!(
            "variables must be a mapping or a list of mappings: {other}"
        ))),
    }
}

fn absolute(path: &Path) -> LoaderResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| suitekit_artifact::ArtifactError::io_error(".", e))?;
    Ok(cwd.join(path))
}

/// Build the project context with the default loader
///
/// # Errors
/// See [`ProjectLoader::load_project`].
pub fn load_project_tests(
    test_path: impl AsRef<Path>,
    dot_env_path: Option<&Path>,
) -> LoaderResult<ProjectContext> {
    ProjectLoader::new().load_project(test_path.as_ref(), dot_env_path)
}

/// Load testcases with the default loader
///
/// # Errors
/// See [`ProjectLoader::load_tests`].
pub fn load_tests(path: impl AsRef<Path>, dot_env_path: Option<&Path>) -> LoaderResult<LoadedTests> {
    ProjectLoader::new().load_tests(path, dot_env_path)
}

/// Load the weighted variant with the default loader
///
/// # Errors
/// See [`ProjectLoader::load_locust_tests`].
pub fn load_locust_tests(
    path: impl AsRef<Path>,
    dot_env_path: Option<&Path>,
) -> LoaderResult<LocustTests> {
    ProjectLoader::new().load_locust_tests(path, dot_env_path)
}
