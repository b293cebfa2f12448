//! Command-line interface for unv
//! Transpiles, compiles and runs unv documents, and hosts the terminal playground.
//!
//! Usage:
//!   unv transpile `<path>`                          - Print the generated code
//!   unv compile `<path>`                            - Print the compiled unit
//!   unv run `<path>` [--format text|json|yaml]      - Run and print the log or the full report
//!   unv share `<path>` [--base `<url>`]               - Print the document as a URL fragment
//!   unv open `<fragment>`                           - Print the document stored in a fragment
//!   unv play [`<path>`] [--fragment `<fragment>`]     - Open the terminal playground
//!
//! Every command accepts `--config <file>`, layered over the built-in defaults.
//! Logging goes to stderr and is controlled by `UNV_LOG` (e.g. `UNV_LOG=debug`).
#[path = "unv/playground.rs"]
mod playground;

use clap::{Arg, ArgMatches, Command};
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use unv::unv::config::{Loader, UnvConfig};
use unv::unv::fragment;
use unv::unv::pipeline::{Compiler, NodeExecutor, SourceCompiler};
use unv::unv::session::Session;
use unv::unv::transpile_with;

fn main() {
    let path_arg = || {
        Arg::new("path")
            .help("Path to the unv file")
            .required(true)
            .index(1)
    };

    let matches = Command::new("unv")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Transpile and run unv, an indentation-based scripting syntax")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the defaults"),
        )
        .subcommand(
            Command::new("transpile")
                .about("Print the generated code")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("compile")
                .about("Print the compiled unit")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("run")
                .about("Run a document and print its log")
                .arg(path_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["text", "json", "yaml"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            Command::new("share")
                .about("Print the document as a URL fragment")
                .arg(path_arg())
                .arg(
                    Arg::new("base")
                        .long("base")
                        .help("Print a full URL with this base instead of the bare fragment"),
                ),
        )
        .subcommand(
            Command::new("open")
                .about("Print the document stored in a URL fragment")
                .arg(
                    Arg::new("fragment")
                        .help("Fragment, with or without the leading '#'")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("play")
                .about("Open the terminal playground")
                .arg(
                    Arg::new("path")
                        .help("File to edit; Ctrl+S writes it back")
                        .index(1),
                )
                .arg(
                    Arg::new("fragment")
                        .long("fragment")
                        .help("Start from the document stored in this fragment")
                        .conflicts_with("path"),
                ),
        )
        .get_matches();

    // the playground owns the terminal, so it only logs when asked to
    let default_level = match matches.subcommand_name() {
        Some("play") => "off",
        _ => "warn",
    };
    init_tracing(default_level);

    let config = load_config(matches.get_one::<String>("config"));

    match matches.subcommand() {
        Some(("transpile", sub)) => handle_transpile_command(&config, sub),
        Some(("compile", sub)) => handle_compile_command(&config, sub),
        Some(("run", sub)) => handle_run_command(&config, sub),
        Some(("share", sub)) => handle_share_command(sub),
        Some(("open", sub)) => handle_open_command(sub),
        Some(("play", sub)) => handle_play_command(config, sub),
        _ => unreachable!("a subcommand is required"),
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_env("UNV_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn load_config(path: Option<&String>) -> UnvConfig {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new(),
    };
    loader
        .build()
        .unwrap_or_else(|e| fail(format!("invalid configuration: {}", e)))
}

fn read_source(matches: &ArgMatches) -> String {
    let path = matches
        .get_one::<String>("path")
        .unwrap_or_else(|| fail("missing path"));
    fs::read_to_string(path).unwrap_or_else(|e| fail(format!("cannot read {}: {}", path, e)))
}

fn node_executor(config: &UnvConfig) -> NodeExecutor {
    NodeExecutor::locate(&config.runtime.node)
        .map(|executor| executor.with_timeout(Duration::from_millis(config.runtime.timeout_ms)))
        .unwrap_or_else(|e| fail(e))
}

/// Handle the transpile command
fn handle_transpile_command(config: &UnvConfig, matches: &ArgMatches) {
    let source = read_source(matches);
    print!("{}", transpile_with(&source, &config.transpile));
}

/// Handle the compile command
fn handle_compile_command(config: &UnvConfig, matches: &ArgMatches) {
    let source = read_source(matches);
    let generated = transpile_with(&source, &config.transpile);
    match SourceCompiler::new().compile(&generated, &config.compile) {
        Ok(unit) => print!("{}", unit.code),
        Err(e) => fail(format!("compile error: {}", e)),
    }
}

/// Handle the run command
fn handle_run_command(config: &UnvConfig, matches: &ArgMatches) {
    let source = read_source(matches);
    let session = Session::new(config, node_executor(config));
    let report = session.run(&source);

    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let output = match format {
        "json" => serde_json::to_string_pretty(&report)
            .map(|json| json + "\n")
            .unwrap_or_else(|e| fail(format!("cannot format report: {}", e))),
        "yaml" => serde_yaml::to_string(&report)
            .unwrap_or_else(|e| fail(format!("cannot format report: {}", e))),
        _ => report.log.iter().map(|entry| format!("{}\n", entry)).collect(),
    };
    print!("{}", output);

    if !report.succeeded() {
        std::process::exit(1);
    }
}

/// Handle the share command
fn handle_share_command(matches: &ArgMatches) {
    let source = read_source(matches);
    match matches.get_one::<String>("base") {
        Some(base) => println!("{}", fragment::share_url(base, &source)),
        None => println!("#{}", fragment::encode(&source)),
    }
}

/// Handle the open command
fn handle_open_command(matches: &ArgMatches) {
    let encoded = matches
        .get_one::<String>("fragment")
        .unwrap_or_else(|| fail("missing fragment"));
    match fragment::decode(encoded) {
        Ok(document) => print!("{}", document),
        Err(e) => fail(e),
    }
}

/// Handle the play command
fn handle_play_command(config: UnvConfig, matches: &ArgMatches) {
    let path = matches.get_one::<String>("path").map(PathBuf::from);
    let document = match &path {
        Some(path) if path.exists() => fs::read_to_string(path)
            .unwrap_or_else(|e| fail(format!("cannot read {}: {}", path.display(), e))),
        Some(_) => fragment::STARTER_DOCUMENT.to_string(),
        None => {
            fragment::restore_or_default(matches.get_one::<String>("fragment").map(String::as_str))
        }
    };

    let executor = node_executor(&config);
    if let Err(e) = playground::run_playground(config, executor, document, path) {
        fail(e);
    }
}
