//! Applicability checks run before any work is done.
//!
//! Each check either passes something along or names the reason to defer.

use std::path::Path;

use grepshim_core::{Config, DiagnosticLog};
use serde_json::Value;
use tracing::debug;

use crate::{DeferReason, GREP_TOOL, HookInput, OutputMode, ToolInput};

/// Accept only `Grep` calls with a non-blank pattern.
///
/// # Errors
///
/// Returns the reason to defer when the call is not a usable `Grep` request.
pub fn check_request(input: &HookInput) -> Result<ToolInput, DeferReason> {
    if input.tool_name.as_deref() != Some(GREP_TOOL) {
        return Err(DeferReason::NotGrep);
    }

    let Some(fields) = input.tool_input.as_object() else {
        return Err(DeferReason::NoPattern);
    };
    let pattern = fields
        .get("pattern")
        .and_then(Value::as_str)
        .filter(|p| !p.trim().is_empty())
        .ok_or(DeferReason::NoPattern)?;

    Ok(ToolInput {
        pattern: pattern.to_string(),
        path: fields.get("path").and_then(Value::as_str).map(str::to_string),
        globs: normalize_globs(fields.get("glob")),
        output_mode: OutputMode::from_value(fields.get("output_mode")),
    })
}

/// Process-level checks: not disabled, credential present, backend locatable.
/// Returns the backend command prefix.
///
/// # Errors
///
/// Returns the reason to defer when the hook cannot act in this environment.
pub fn check_environment(config: &Config) -> Result<Vec<String>, DeferReason> {
    if config.disabled {
        return Err(DeferReason::Disabled);
    }
    if !config.has_token() {
        debug!(token = ?config.token_path, "credential marker missing");
        return Err(DeferReason::NoToken);
    }
    crate::locate::resolve_command(config).ok_or(DeferReason::NoBackend)
}

/// Defer when the request carries globs the index is not known to cover.
///
/// # Errors
///
/// Returns [`DeferReason::GlobNotIndexed`] when the backend should not answer.
pub fn check_globs(
    globs: &[String],
    scope: &Path,
    workspace: &Path,
    config: &Config,
    log: &dyn DiagnosticLog,
) -> Result<(), DeferReason> {
    if should_use_backend_for_glob(globs, scope, workspace, &config.store, log) {
        Ok(())
    } else {
        Err(DeferReason::GlobNotIndexed)
    }
}

/// `glob` may be a string or a list of strings. Blank entries are dropped.
#[must_use]
pub fn normalize_globs(value: Option<&Value>) -> Vec<String> {
    let trimmed = |s: &str| Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string);
    match value {
        Some(Value::String(s)) => trimmed(s.as_str()).into_iter().collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(trimmed)
            .collect(),
        _ => Vec::new(),
    }
}

/// Whether files matching `globs` under `scope` are covered by the backend index.
///
/// Without globs the backend always applies. With globs there is no coverage
/// information yet, so the original tool keeps the request.
// TODO: query the store's file list for `store` and match it against `globs`.
#[must_use]
pub fn should_use_backend_for_glob(
    globs: &[String],
    scope: &Path,
    workspace: &Path,
    store: &str,
    log: &dyn DiagnosticLog,
) -> bool {
    if globs.is_empty() {
        return true;
    }
    debug!(?globs, scope = %scope.display(), workspace = %workspace.display(), store, "glob coverage unknown");
    log.append(&format!(
        "glob coverage unknown for {globs:?} in store {store}, leaving search to Grep"
    ));
    false
}
