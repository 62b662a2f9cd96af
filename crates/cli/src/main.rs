//! grepshim - answers Claude Code `Grep` calls with mgrep semantic search.

mod cli;
mod status;

use std::io::Read;
use std::process::ExitCode;

use grepshim_core::{Config, FileLog};
use grepshim_hook::pre_tool_use;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("GREPSHIM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    // stdout carries the hook response.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    // Bad arguments must not fail the host's tool call: defer instead.
    let Some(cli) = cli::Cli::try_parse_lenient(std::env::args_os()) else {
        return ExitCode::SUCCESS;
    };
    let config = cli.config();

    match cli.command {
        Some(cli::Command::Status) => run_status(&config),
        Some(cli::Command::Hook) | None => run_hook(&config),
    }
}

fn run_hook(config: &Config) -> ExitCode {
    // Fail-open: a panic must leave the original Grep call untouched.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_hook(info);
        std::process::exit(0);
    }));

    debug!("starting hook mode");
    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        warn!(%e, "failed to read stdin, deferring");
        return ExitCode::SUCCESS;
    }

    let log = FileLog::new(&config.log_path);
    let decision = pre_tool_use::process_raw(&input, config, &log);

    if let Some(output) = decision.into_output() {
        info!("denying Grep with semantic results");
        match serde_json::to_string(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => warn!(%e, "failed to serialize hook output"),
        }
    }

    ExitCode::SUCCESS // hooks always exit clean
}

fn run_status(config: &Config) -> ExitCode {
    let (text, ready) = status::report(config);
    print!("{text}");
    if ready {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
