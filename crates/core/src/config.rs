//! Runtime configuration for the hook.
//!
//! Built once at process start and passed by reference into every stage.
//! Nothing downstream reads the environment directly.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Default diagnostic log location.
pub const DEFAULT_LOG_PATH: &str = "/tmp/mgrep-hook.log";
/// Default cap on backend results.
pub const DEFAULT_MAX_RESULTS: usize = 20;
/// Default wall-clock budget for one backend invocation, in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 25.0;
/// Default logical store name.
pub const DEFAULT_STORE: &str = "mgrep";

/// Values accepted as "true" by boolean-like flags (compared case-insensitively).
const TRUTHY: &[&str] = &["1", "true", "yes", "on"];

/// Runtime configuration for grepshim.
#[derive(Debug, Clone)]
pub struct Config {
    /// Append-only diagnostic log file.
    pub log_path: PathBuf,
    /// Result cap. Reserved: reported by `status`, not applied to backend output.
    pub max_results: usize,
    /// Hard timeout for the backend process.
    pub timeout: Duration,
    /// Shell-style command line replacing backend discovery.
    pub command_override: Option<String>,
    pub disabled: bool,
    /// Plugin install directory, used to find a bundled backend script.
    pub plugin_root: Option<PathBuf>,
    /// Logical store name handed to the glob coverage check.
    pub store: String,
    /// Credential marker; the hook only acts when this file exists.
    pub token_path: Option<PathBuf>,
    /// `PATH` value used to look up the backend executable.
    pub search_path: Option<OsString>,
}

impl Config {
    /// `true` if the credential marker file exists.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token_path.as_deref().is_some_and(std::path::Path::exists)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            max_results: DEFAULT_MAX_RESULTS,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            command_override: None,
            disabled: false,
            plugin_root: None,
            store: DEFAULT_STORE.to_string(),
            token_path: default_token_path(),
            search_path: std::env::var_os("PATH"),
        }
    }
}

/// `~/.mgrep/token.json`, or `None` when no home directory is known.
#[must_use]
pub fn default_token_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mgrep").join("token.json"))
}

/// Interpret a boolean-like flag value. Anything outside `1|true|yes|on` is false.
#[must_use]
pub fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    TRUTHY.iter().any(|t| value.eq_ignore_ascii_case(t))
}

/// Parse a timeout in (possibly fractional) seconds, falling back to the default
/// when the value is unparsable, negative or not finite.
#[must_use]
pub fn parse_timeout(value: &str) -> Duration {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .unwrap_or_else(|| Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
}

/// Parse the result cap, falling back to the default when unparsable.
#[must_use]
pub fn parse_max_results(value: &str) -> usize {
    value.trim().parse().unwrap_or(DEFAULT_MAX_RESULTS)
}
