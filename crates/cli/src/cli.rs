//! CLI argument parsing.
//!
//! Every tunable can also come from the environment the hook runs in. Parsing
//! is lenient: a bad value falls back to its default instead of failing the hook.
//! Paths are taken as strings so an empty variable is not a parse error.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser, Subcommand};
use grepshim_core::config::{self, Config, DEFAULT_LOG_PATH, DEFAULT_STORE};
use tracing::warn;

#[allow(clippy::unnecessary_wraps)] // clap value parsers must return Result
fn lenient_flag(s: &str) -> Result<bool, String> {
    Ok(config::parse_flag(s))
}

#[allow(clippy::unnecessary_wraps)]
fn lenient_timeout(s: &str) -> Result<Duration, String> {
    Ok(config::parse_timeout(s))
}

#[allow(clippy::unnecessary_wraps)]
fn lenient_max_results(s: &str) -> Result<usize, String> {
    Ok(config::parse_max_results(s))
}

#[derive(Parser)]
#[command(
    name = "grepshim",
    version,
    about = "Answer Claude Code Grep calls with mgrep semantic search"
)]
pub struct Cli {
    /// Diagnostic log file
    #[arg(long, env = "MGREP_HOOK_LOG", default_value = DEFAULT_LOG_PATH)]
    pub log_path: String,

    /// Result cap (reserved)
    #[arg(long, env = "MGREP_HOOK_MAX_RESULTS", default_value = "20",
          value_parser = lenient_max_results)]
    pub max_results: usize,

    /// Backend timeout in seconds
    #[arg(long, env = "MGREP_HOOK_CMD_TIMEOUT", default_value = "25",
          value_parser = lenient_timeout)]
    pub timeout: Duration,

    /// Backend command line, replacing discovery (e.g. "npx mgrep")
    #[arg(long, env = "MGREP_BIN")]
    pub backend: Option<String>,

    /// Never intercept (accepts 1/true/yes/on)
    #[arg(long, env = "MGREP_HOOK_DISABLE", default_value = "false",
          action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true",
          value_parser = lenient_flag)]
    pub disable: bool,

    /// Plugin install directory, used to find a bundled backend
    #[arg(long, env = "CLAUDE_PLUGIN_ROOT")]
    pub plugin_root: Option<String>,

    /// Store name
    #[arg(long, env = "MGREP_STORE", default_value = DEFAULT_STORE)]
    pub store: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Parse `args`, or `None` when clap rejects them (an unknown argument, a
    /// non-UTF-8 value). `--help` and `--version` still print and exit.
    #[must_use]
    pub fn try_parse_lenient<I, T>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Some(cli),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => {
                warn!(kind = %e.kind(), "unusable arguments, deferring");
                None
            }
        }
    }

    /// Build the runtime configuration. Called once at startup.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            log_path: PathBuf::from(&self.log_path),
            max_results: self.max_results,
            timeout: self.timeout,
            command_override: self.backend.clone(),
            disabled: self.disable,
            plugin_root: self
                .plugin_root
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            store: self.store.clone(),
            ..Config::default()
        }
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// `PreToolUse` hook mode (JSON stdin → JSON stdout), the default
    Hook,
    /// Show the resolved configuration and whether the hook would act
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("grepshim").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&[
            "--timeout",
            "2.5",
            "--max-results",
            "7",
            "--backend",
            "npx mgrep",
            "--plugin-root",
            "/opt/plugin",
            "--store",
            "docs",
            "--log-path",
            "/tmp/x.log",
            "status",
        ]);
        let config = cli.config();
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.max_results, 7);
        assert_eq!(config.command_override.as_deref(), Some("npx mgrep"));
        assert_eq!(config.plugin_root, Some(PathBuf::from("/opt/plugin")));
        assert_eq!(config.store, "docs");
        assert_eq!(config.log_path, PathBuf::from("/tmp/x.log"));
        assert_eq!(cli.command, Some(Command::Status));
    }

    #[test]
    fn bad_values_fall_back() {
        let cli = parse(&["--timeout", "soon", "--max-results", "many", "--disable", "maybe"]);
        let config = cli.config();
        assert_eq!(config.timeout, Duration::from_secs(25));
        assert_eq!(config.max_results, 20);
        assert!(!config.disabled);
    }

    #[test]
    fn disable_switch_and_value() {
        assert!(parse(&["--disable"]).config().disabled);
        assert!(parse(&["--disable", "YES"]).config().disabled);
        assert!(!parse(&["--disable", "0"]).config().disabled);
    }

    #[test]
    fn rejected_arguments_yield_none() {
        assert!(Cli::try_parse_lenient(["grepshim", "--no-such-flag"]).is_none());
        assert!(Cli::try_parse_lenient(["grepshim", "unknown-subcommand"]).is_none());
        assert!(Cli::try_parse_lenient(["grepshim", "hook"]).is_some());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_value_yields_none() {
        use std::os::unix::ffi::OsStringExt;

        let args = [
            OsString::from("grepshim"),
            OsString::from("--backend"),
            OsString::from_vec(vec![b'm', 0xff]),
        ];
        assert!(Cli::try_parse_lenient(args).is_none());
    }

    #[test]
    fn empty_plugin_root_is_ignored() {
        assert_eq!(parse(&["--plugin-root", ""]).config().plugin_root, None);
    }
}
