//! `suitekit` command line
//!
//! Loads a test project and prints the resolved model as JSON on stdout.
//! Logs go to stderr.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use suitekit_loader::{LoaderConfig, ProjectLoader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn path_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("path")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Testcase file or folder"),
        )
        .arg(
            Arg::new("dot-env")
                .long("dot-env")
                .value_parser(value_parser!(PathBuf))
                .help("Environment file (defaults to <project root>/.env)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("Loader configuration file (TOML)"),
        )
        .arg(
            Arg::new("no-export-env")
                .long("no-export-env")
                .action(ArgAction::SetTrue)
                .help("Do not export .env pairs into the process environment"),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .action(ArgAction::SetTrue)
                .help("Print JSON on a single line"),
        )
}

fn cli() -> Command {
    Command::new("suitekit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Load declarative API test projects")
        .subcommand_required(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(path_args(
            Command::new("load").about("Load testcases from a file or folder"),
        ))
        .subcommand(path_args(
            Command::new("locust").about("Load one testcase file as weighted load-test steps"),
        ))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn loader(args: &ArgMatches) -> Result<ProjectLoader> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => LoaderConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LoaderConfig::default(),
    };
    if args.get_flag("no-export-env") {
        config = config.with_export_env(false);
    }
    Ok(ProjectLoader::with_config(config))
}

fn print_json(value: &serde_json::Value, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("load", args)) => {
            let path = args.get_one::<PathBuf>("path").context("missing path")?;
            let dot_env = args.get_one::<PathBuf>("dot-env").map(PathBuf::as_path);

            let loaded = loader(args)?.load_tests(path, dot_env)?;
            tracing::info!(
                "Loaded {} testcases from {}",
                loaded.testcases.len(),
                path.display()
            );

            let value = serde_json::json!({
                "project_root": loaded.project.root().display().to_string(),
                "testcases": serde_json::to_value(&loaded.testcases)?,
            });
            print_json(&value, args.get_flag("compact"))
        }
        Some(("locust", args)) => {
            let path = args.get_one::<PathBuf>("path").context("missing path")?;
            let dot_env = args.get_one::<PathBuf>("dot-env").map(PathBuf::as_path);

            let locust = loader(args)?.load_locust_tests(path, dot_env)?;
            tracing::info!("Loaded {} weighted steps from {}", locust.tests.len(), path.display());

            let value = serde_json::to_value(&locust)?;
            print_json(&value, args.get_flag("compact"))
        }
        _ => anyhow::bail!("unknown subcommand"),
    }
}
