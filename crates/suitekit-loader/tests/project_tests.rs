use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use suitekit_loader::{
    ExtensionLoader, FunctionRegistry, ItemModule, LoaderConfig, LoaderError, LoaderResult,
    ProjectLoader, StaticExtensions, StepKind,
};
use suitekit_test_utils::{api_file, ProjectFixture};

/// Extension loader for a project whose extension unit cannot be loaded
struct FailingExtensions(&'static str);

impl ExtensionLoader for FailingExtensions {
    fn load(&self, anchor: &Path) -> LoaderResult<FunctionRegistry> {
        Err(LoaderError::Extension {
            anchor: anchor.to_path_buf(),
            message: self.0.to_string(),
        })
    }
}

fn loader(fixture: &ProjectFixture) -> ProjectLoader {
    ProjectLoader::with_config(
        LoaderConfig::new()
            .with_search_boundary(fixture.canonical_root())
            .with_export_env(false),
    )
}

fn project() -> ProjectFixture {
    let fixture = ProjectFixture::project();
    fixture.write("api/auth.yml", &api_file(&["get_token", "refresh_token"]));
    fixture.write("api/users.json", r#"[{"api": {"id": "list_users", "request": {"url": "/users"}}}]"#);
    fixture.write(".env", "USERNAME=alice\nPASSWORD=s3cret\n");
    fixture
}

#[test]
fn test_load_project_collects_env_apis_and_functions() {
    let fixture = project();
    let ctx = loader(&fixture)
        .load_project(&fixture.canonical_root(), None)
        .unwrap();

    assert_eq!(ctx.root(), fixture.canonical_root());
    assert_eq!(ctx.anchor(), Some(fixture.canonical_root().join("suitekit.toml").as_path()));
    assert_eq!(ctx.env()["USERNAME"], "alice");
    assert_eq!(ctx.env()["PASSWORD"], "s3cret");
    assert_eq!(ctx.apis().ids(), vec!["get_token", "refresh_token", "list_users"]);
    assert!(ctx.functions().contains("gen_random_string"));
    assert!(!ctx.functions().contains("VERSION"));
}

#[test]
fn test_explicit_dot_env_path_wins() {
    let fixture = project();
    let other = fixture.write("envs/staging.env", "USERNAME=bob\n");
    let ctx = loader(&fixture)
        .load_project(&fixture.canonical_root(), Some(other.as_path()))
        .unwrap();

    assert_eq!(ctx.env().len(), 1);
    assert_eq!(ctx.env()["USERNAME"], "bob");
}

#[test]
fn test_missing_dot_env_is_empty() {
    let fixture = ProjectFixture::project();
    let ctx = loader(&fixture)
        .load_project(&fixture.canonical_root(), None)
        .unwrap();
    assert!(ctx.env().is_empty());
    assert!(ctx.apis().is_empty());
}

#[test]
fn test_duplicate_api_id_keeps_later_definition() {
    let fixture = ProjectFixture::project();
    fixture.write("api/a.yml", &api_file(&["ping"]));
    fixture.write("api/b.yml", "- api:\n    id: ping\n    request:\n      url: /v2/ping\n");

    let ctx = loader(&fixture)
        .load_project(&fixture.canonical_root(), None)
        .unwrap();

    assert_eq!(ctx.apis().len(), 1);
    assert_eq!(
        ctx.apis().get("ping").unwrap().request(),
        Some(&json!({"url": "/v2/ping"}))
    );
}

#[test]
fn test_api_file_must_be_sequence() {
    let fixture = ProjectFixture::project();
    fixture.write("api/bad.yml", "api:\n  id: ping\n");

    let err = loader(&fixture)
        .load_project(&fixture.canonical_root(), None)
        .unwrap_err();
    assert!(err.is_format_error());
}

#[test]
fn test_extension_functions_override_builtins() {
    let fixture = ProjectFixture::project();
    let module = ItemModule::new("project")
        .with_function("multiply", |_args: &[Value]| Ok(json!("overridden")))
        .with_function("sign", |_args: &[Value]| Ok(json!("signed")))
        .with_constant("API_VERSION", json!("v2"));

    let ctx = loader(&fixture)
        .with_extensions(StaticExtensions::new(module))
        .load_project(&fixture.canonical_root(), None)
        .unwrap();

    let functions = ctx.functions();
    assert_eq!(functions.call("multiply", &[json!(2), json!(3)]).unwrap(), json!("overridden"));
    assert_eq!(functions.call("sign", &[]).unwrap(), json!("signed"));
    assert!(functions.contains("get_timestamp"));
    assert!(!functions.contains("API_VERSION"));
}

#[test]
fn test_failing_extension_propagates() {
    let fixture = ProjectFixture::project();
    let err = loader(&fixture)
        .with_extensions(FailingExtensions("syntax error in extension unit"))
        .load_tests(fixture.canonical_root(), None)
        .unwrap_err();
    assert!(matches!(err, LoaderError::Extension { .. }));
}

#[test]
fn test_no_anchor_falls_back_to_working_directory() {
    let fixture = ProjectFixture::new();
    fixture.write("case.yml", "- test:\n    name: ping\n");

    let loaded = loader(&fixture)
        .with_extensions(FailingExtensions("never consulted"))
        .load_tests(fixture.canonical_root(), None)
        .unwrap();

    let cwd = std::fs::canonicalize(std::env::current_dir().unwrap()).unwrap();
    assert_eq!(loaded.project.root(), cwd);
    assert!(loaded.project.anchor().is_none());
    assert_eq!(loaded.testcases.len(), 1);
}

#[test]
fn test_missing_path_is_not_found() {
    let fixture = ProjectFixture::project();
    let err = loader(&fixture)
        .load_tests(fixture.path("testcases/ghost.yml"), None)
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("path not exist"));
}

#[test]
fn test_directory_load_order_and_paths() {
    let fixture = project();
    let root = fixture.canonical_root();
    fixture.write("testcases/b.yml", "- config:\n    name: b\n- test:\n    name: step b\n");
    fixture.write("testcases/a.json", r#"[{"config": {"name": "a"}}, {"test": {"name": "step a"}}]"#);
    fixture.write("testcases/nested/c.yaml", "- config:\n    name: c\n");
    fixture.write("testcases/notes.txt", "not a testcase");
    fixture.write("testcases/data.csv", "user,pass\nalice,x\n");

    let loaded = loader(&fixture).load_tests(root.join("testcases"), None).unwrap();

    let names: Vec<_> = loaded.testcases.iter().filter_map(|t| t.name()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    let paths: Vec<PathBuf> = loaded
        .testcases
        .iter()
        .filter_map(|t| t.path())
        .map(PathBuf::from)
        .collect();
    assert_eq!(
        paths,
        vec![
            root.join("testcases/a.json"),
            root.join("testcases/b.yml"),
            root.join("testcases/nested/c.yaml"),
        ]
    );
}

#[test]
fn test_non_recursive_scan_skips_subfolders() {
    let fixture = ProjectFixture::project();
    let root = fixture.canonical_root();
    fixture.write("testcases/a.yml", "- config:\n    name: a\n");
    fixture.write("testcases/nested/b.yml", "- config:\n    name: b\n");

    let loaded = ProjectLoader::with_config(
        LoaderConfig::new()
            .with_search_boundary(root.clone())
            .with_export_env(false)
            .with_recursive(false),
    )
    .load_tests(root.join("testcases"), None)
    .unwrap();

    assert_eq!(loaded.testcases.len(), 1);
    assert_eq!(loaded.testcases[0].name(), Some("a"));
}

#[test]
fn test_single_file_mode() {
    let fixture = project();
    let path = fixture.write("testcases/login.yml", "- config:\n    name: login\n- test:\n    name: token\n    api: get_token\n");

    let loaded = loader(&fixture).load_tests(&path, None).unwrap();
    assert_eq!(loaded.testcases.len(), 1);

    let step = &loaded.testcases[0].teststeps[0];
    assert_eq!(step.api_def().unwrap().id, "get_token");
    assert_eq!(
        step.to_value()["api_def"]["request"],
        json!({"url": "/get_token", "method": "GET"})
    );
}

#[test]
fn test_malformed_files_are_skipped() {
    let fixture = ProjectFixture::project();
    let root = fixture.canonical_root();
    fixture.write("testcases/a_good.yml", "- config:\n    name: good\n");
    fixture.write("testcases/b_empty.yml", "");
    fixture.write("testcases/c_scalar.json", "42");
    fixture.write("testcases/d_mapping.yml", "config:\n  name: not a list\n");
    fixture.write("testcases/e_broken.json", "[{\"config\": ");
    fixture.write("testcases/f_two_keys.yml", "- config: {}\n  test: {}\n");

    let loaded = loader(&fixture).load_tests(root.join("testcases"), None).unwrap();
    let names: Vec<_> = loaded.testcases.iter().filter_map(|t| t.name()).collect();
    assert_eq!(names, vec!["good"]);

}

#[test]
fn test_single_malformed_file_is_error() {
    let fixture = ProjectFixture::project();
    let root = fixture.canonical_root();
    fixture.write("testcases/empty.json", "[]");
    fixture.write("testcases/scalar.json", "42");
    fixture.write("testcases/mapping.yml", "config:\n  name: not a list\n");

    for name in ["empty.json", "scalar.json", "mapping.yml"] {
        let err = loader(&fixture)
            .load_tests(root.join("testcases").join(name), None)
            .unwrap_err();
        assert!(err.is_format_error(), "{name}: {err}");
    }
}

#[test]
fn test_unknown_api_aborts_load() {
    let fixture = project();
    fixture.write("testcases/a.yml", "- test:\n    name: ghost\n    api: no_such_api\n");

    let err = loader(&fixture)
        .load_tests(fixture.canonical_root().join("testcases"), None)
        .unwrap_err();
    assert!(err.is_api_not_found());
}

#[test]
fn test_nested_testcase_is_memoized_and_tagged() {
    let fixture = project();
    let root = fixture.canonical_root();
    fixture.write("shared/login.yml", "- config:\n    name: login\n- test:\n    name: token\n    api: get_token\n");
    fixture.write(
        "testcases/a.yml",
        "- test:\n    name: login first\n    testcase: shared/login.yml\n",
    );
    fixture.write(
        "testcases/b.yml",
        "- test:\n    name: login again\n    testcase: shared/login.yml\n",
    );

    let loaded = loader(&fixture).load_tests(root.join("testcases"), None).unwrap();
    assert_eq!(loaded.testcases.len(), 2);

    let first = loaded.testcases[0].teststeps[0].testcase_def().unwrap();
    let second = loaded.testcases[1].teststeps[0].testcase_def().unwrap();
    assert!(std::sync::Arc::ptr_eq(first, second));
    assert_eq!(
        first.path().map(PathBuf::from),
        Some(root.join("shared/login.yml"))
    );
    assert_eq!(first.teststeps[0].api_def().unwrap().id, "get_token");

    let stats = loaded.project.testcases().stats();
    assert_eq!(stats.entry_count, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);

    match &loaded.testcases[0].teststeps[0].kind {
        StepKind::Testcase { path, .. } => assert_eq!(path, &root.join("shared/login.yml")),
        other => panic!("unexpected step kind: {other:?}"),
    }
}

#[test]
fn test_self_reference_is_circular() {
    let fixture = ProjectFixture::project();
    let path = fixture.write("testcases/loop.yml", "- test:\n    name: again\n    testcase: testcases/loop.yml\n");

    let err = loader(&fixture).load_tests(&path, None).unwrap_err();
    match err {
        LoaderError::CircularReference { chain } => {
            let looped = fixture.canonical_root().join("testcases/loop.yml");
            assert_eq!(chain, vec![looped.clone(), looped]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_transitive_reference_is_circular() {
    let fixture = ProjectFixture::project();
    let root = fixture.canonical_root();
    fixture.write("testcases/a.yml", "- test:\n    name: to b\n    testcase: testcases/b.yml\n");
    fixture.write("testcases/b.yml", "- test:\n    name: to a\n    testcase: testcases/a.yml\n");

    let err = loader(&fixture).load_tests(root.join("testcases/a.yml"), None).unwrap_err();
    match err {
        LoaderError::CircularReference { chain } => assert_eq!(
            chain,
            vec![
                root.join("testcases/a.yml"),
                root.join("testcases/b.yml"),
                root.join("testcases/a.yml"),
            ]
        ),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_separate_loads_do_not_share_caches() {
    let fixture = project();
    fixture.write("shared/login.yml", "- config:\n    name: v1\n");
    let case = fixture.write("testcases/a.yml", "- test:\n    name: nested\n    testcase: shared/login.yml\n");

    let first = loader(&fixture).load_tests(&case, None).unwrap();
    fixture.write("shared/login.yml", "- config:\n    name: v2\n");
    let second = loader(&fixture).load_tests(&case, None).unwrap();

    let name = |loaded: &suitekit_loader::LoadedTests| {
        loaded.testcases[0].teststeps[0]
            .testcase_def()
            .and_then(|t| t.name().map(str::to_string))
    };
    assert_eq!(name(&first).as_deref(), Some("v1"));
    assert_eq!(name(&second).as_deref(), Some("v2"));
}

#[test]
fn test_config_merge_and_serialized_shape() {
    let fixture = project();
    let path = fixture.write(
        "testcases/merge.yml",
        "- config:\n    name: x\n- test:\n    name: ping\n    request:\n      url: /ping\n- config:\n    name: y\n    variables: []\n",
    );

    let loaded = loader(&fixture).load_tests(&path, None).unwrap();
    let value = serde_json::to_value(&loaded.testcases[0]).unwrap();

    assert_eq!(
        value,
        json!({
            "config": {
                "name": "y",
                "variables": [],
                "path": path.display().to_string()
            },
            "teststeps": [{"name": "ping", "request": {"url": "/ping"}}]
        })
    );
}

#[test]
fn test_loader_config_from_file() {
    let fixture = ProjectFixture::new();
    fixture.write("project.toml", "");
    let config_path = fixture.write(
        "loader.toml",
        "anchor_file = \"project.toml\"\nexport_env = false\napi_dir = \"apis\"\n",
    );
    fixture.write("apis/x.yml", &api_file(&["x"]));

    let config = LoaderConfig::from_file(&config_path)
        .unwrap()
        .with_search_boundary(fixture.canonical_root());
    let ctx = ProjectLoader::with_config(config)
        .load_project(&fixture.canonical_root(), None)
        .unwrap();

    assert_eq!(ctx.apis().ids(), vec!["x"]);
}

#[test]
fn test_small_cache_capacity_still_memoizes() {
    let fixture = project();
    let root = fixture.canonical_root();
    fixture.write("shared/login.yml", "- config:\n    name: login\n");
    fixture.write("shared/logout.yml", "- config:\n    name: logout\n");
    let case = fixture.write(
        "testcases/a.yml",
        concat!(
            "- test:\n    name: in\n    testcase: shared/login.yml\n",
            "- test:\n    name: out\n    testcase: shared/logout.yml\n",
            "- test:\n    name: in again\n    testcase: shared/login.yml\n",
            "- test:\n    name: out again\n    testcase: shared/logout.yml\n",
        ),
    );

    let mut config = LoaderConfig::new()
        .with_search_boundary(root)
        .with_export_env(false);
    config.testcase_cache_capacity = 1;
    let loaded = ProjectLoader::with_config(config).load_tests(&case, None).unwrap();

    let stats = loaded.project.testcases().stats();
    assert_eq!(stats.entry_count, 2);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 2);
}

#[test]
fn test_zero_cache_capacity_is_config_error() {
    let fixture = project();
    let case = fixture.write("testcases/a.yml", "- test:\n    name: ping\n");

    let mut config = LoaderConfig::new()
        .with_search_boundary(fixture.canonical_root())
        .with_export_env(false);
    config.testcase_cache_capacity = 0;
    let err = ProjectLoader::with_config(config).load_tests(&case, None).unwrap_err();
    assert!(matches!(err, LoaderError::Config(_)));
}
