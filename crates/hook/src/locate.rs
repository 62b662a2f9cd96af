//! Backend command discovery.

use std::path::{Path, PathBuf};

use grepshim_core::{Config, paths};
use tracing::{debug, trace};

/// Executable name looked up on `PATH`.
pub const BACKEND_BINARY: &str = "mgrep";

/// Interpreter for the bundled backend script.
const SCRIPT_INTERPRETER: &str = "node";

/// Command prefix for the backend, in priority order:
/// explicit override, `mgrep` on `PATH`, script bundled next to the plugin.
#[must_use]
pub fn resolve_command(config: &Config) -> Option<Vec<String>> {
    if let Some(line) = config.command_override.as_deref().filter(|l| !l.is_empty()) {
        // An override is authoritative even when it does not tokenize.
        let prefix = shlex::split(line).filter(|words| !words.is_empty());
        debug!(command = line, ?prefix, "using backend override");
        return prefix;
    }

    if let Some(binary) = find_on_path(config) {
        debug!(binary = %binary.display(), "found backend on PATH");
        return Some(vec![binary.to_string_lossy().into_owned()]);
    }

    let plugin_root = config.plugin_root.as_deref()?;
    let script = bundled_script(plugin_root)?;
    debug!(script = %script.display(), "using bundled backend script");
    Some(vec![
        SCRIPT_INTERPRETER.to_string(),
        script.to_string_lossy().into_owned(),
    ])
}

fn find_on_path(config: &Config) -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_default();
    which::which_in(BACKEND_BINARY, config.search_path.as_ref(), cwd)
        .inspect_err(|e| trace!(%e, "backend not on PATH"))
        .ok()
}

/// `<plugin_root>/../../dist/index.js`, if it exists.
fn bundled_script(plugin_root: &Path) -> Option<PathBuf> {
    let root = paths::resolve(plugin_root);
    let candidate = root.parent()?.parent()?.join("dist").join("index.js");
    candidate.exists().then_some(candidate)
}

/// Full backend command line: `<prefix> search <pattern> [<path>]`.
#[must_use]
pub fn build_invocation(prefix: Vec<String>, pattern: &str, path_arg: Option<String>) -> Vec<String> {
    let mut command = prefix;
    command.push("search".to_string());
    command.push(pattern.to_string());
    command.extend(path_arg);
    command
}
