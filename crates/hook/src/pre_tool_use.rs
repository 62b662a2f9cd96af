//! `PreToolUse` hook processing.
//!
//! `Received -> Deferred` or `Received -> Executing -> {Deferred | Intercepted}`.
//! There are no retries and no partial responses.

use grepshim_core::{Config, DiagnosticLog, paths};
use tracing::{debug, info, instrument};

use crate::{Decision, DeferReason, HookInput, PreToolUseOutput, gate, locate, response, runner};

/// Process raw hook stdin.
pub fn process_raw(raw: &str, config: &Config, log: &dyn DiagnosticLog) -> Decision {
    match HookInput::parse(raw) {
        Ok(Some(input)) => process(&input, config, log),
        Ok(None) => {
            debug!("empty hook input");
            Decision::Deferred(DeferReason::NoInput)
        }
        Err(e) => {
            debug!(%e, "undecodable hook input");
            log.append(&format!("Failed to decode JSON: {e:#}"));
            Decision::Deferred(DeferReason::NoInput)
        }
    }
}

/// Process a `PreToolUse` event. `Intercepted` denies `Grep` with the backend's
/// results as the reason; `Deferred` lets `Grep` run.
#[instrument(skip_all, fields(tool = input.tool_name.as_deref().unwrap_or("unknown")))]
pub fn process(input: &HookInput, config: &Config, log: &dyn DiagnosticLog) -> Decision {
    match intercept(input, config, log) {
        Ok(output) => {
            info!("Grep answered by semantic search");
            Decision::Intercepted(output)
        }
        Err(reason) => {
            debug!(reason = reason.as_str(), "deferring to Grep");
            Decision::Deferred(reason)
        }
    }
}

fn intercept(
    input: &HookInput,
    config: &Config,
    log: &dyn DiagnosticLog,
) -> Result<PreToolUseOutput, DeferReason> {
    let request = gate::check_request(input)?;
    let prefix = gate::check_environment(config)?;

    let workspace = paths::resolve_workspace(input.cwd.as_deref());
    let scope = paths::resolve_scope(request.path.as_deref(), &workspace);
    let path_arg = paths::cli_path_arg(&scope, &workspace);

    gate::check_globs(&request.globs, &scope, &workspace, config, log)?;

    let command = locate::build_invocation(prefix, &request.pattern, path_arg);
    debug!(?command, workspace = %workspace.display(), "running backend");
    let stdout = runner::run_logged(&command, &workspace, config.timeout, log)
        .ok_or(DeferReason::BackendFailed)?;

    let lines = response::result_lines(&stdout);
    if lines.is_empty() {
        return Err(DeferReason::EmptyResult);
    }

    let scope_label = paths::describe_scope(&scope, &workspace);
    let payload = response::build_payload(
        &lines,
        &request.pattern,
        &scope_label,
        request.output_mode,
        &workspace,
    );
    Ok(response::build_response(&payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{MemoryLog, isolated_config};
    use grepshim_core::NoopLog;

    fn grep_input(tool_input: serde_json::Value, cwd: &std::path::Path) -> HookInput {
        HookInput {
            tool_name: Some("Grep".to_string()),
            tool_input,
            cwd: Some(cwd.to_string_lossy().into_owned()),
        }
    }

    fn reason(decision: &Decision) -> Option<DeferReason> {
        match decision {
            Decision::Deferred(reason) => Some(*reason),
            Decision::Intercepted(_) => None,
        }
    }

    #[test]
    fn blank_and_malformed_stdin_defer() {
        let dir = tempfile::tempdir().unwrap();
        let config = isolated_config(dir.path());
        let log = MemoryLog::default();
        assert_eq!(
            reason(&process_raw("", &config, &log)),
            Some(DeferReason::NoInput)
        );
        assert_eq!(
            reason(&process_raw("{oops", &config, &log)),
            Some(DeferReason::NoInput)
        );
        assert!(log.contains("Failed to decode JSON"));
    }

    #[test]
    fn non_grep_tools_defer() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            command_override: Some("mgrep".to_string()),
            ..isolated_config(dir.path())
        };
        let raw = r#"{"tool_name":"Read","tool_input":{"pattern":"foo"}}"#;
        assert_eq!(
            reason(&process_raw(raw, &config, &NoopLog)),
            Some(DeferReason::NotGrep)
        );
    }

    #[test]
    fn no_credential_defers() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            token_path: Some(dir.path().join("missing-token.json")),
            command_override: Some("mgrep".to_string()),
            ..isolated_config(dir.path())
        };
        let raw = r#"{"tool_name":"Grep","tool_input":{"pattern":"foo","output_mode":"content"},"cwd":"/repo"}"#;
        assert_eq!(
            reason(&process_raw(raw, &config, &NoopLog)),
            Some(DeferReason::NoToken)
        );
    }

    #[cfg(unix)]
    #[test]
    fn globs_defer_even_with_working_backend() {
        use crate::test_util::with_script_backend;

        let dir = tempfile::tempdir().unwrap();
        let config = with_script_backend(
            isolated_config(dir.path()),
            dir.path(),
            "printf 'a.rs:1: foo\\n'\n",
        );
        let input = grep_input(
            serde_json::json!({ "pattern": "foo", "glob": "*.rs" }),
            dir.path(),
        );
        let decision = process(&input, &config, &NoopLog);
        assert_eq!(reason(&decision), Some(DeferReason::GlobNotIndexed));
    }

    #[cfg(unix)]
    #[test]
    fn content_results_become_denial() {
        use crate::test_util::with_script_backend;

        let dir = tempfile::tempdir().unwrap();
        let config = with_script_backend(
            isolated_config(dir.path()),
            dir.path(),
            "printf 'README.md:3: foo bar\\n'\n",
        );
        let input = grep_input(
            serde_json::json!({ "pattern": "foo", "output_mode": "content" }),
            dir.path(),
        );
        let output = process(&input, &config, &NoopLog)
            .into_output()
            .unwrap();
        assert_eq!(
            output.hook_specific_output.permission_decision_reason,
            "Semantic search completed by mgrep: MGrep semantic search for 'foo' in .\nREADME.md:3: foo bar"
        );
    }

    #[cfg(unix)]
    #[test]
    fn scope_is_passed_to_backend_and_labelled() {
        use crate::test_util::with_script_backend;

        let dir = tempfile::tempdir().unwrap();
        // Echo the arguments back so the invocation is visible in the result.
        let config = with_script_backend(
            isolated_config(dir.path()),
            dir.path(),
            "echo \"args:$*\"\n",
        );
        let input = grep_input(
            serde_json::json!({ "pattern": "needle", "path": "src/app" }),
            dir.path(),
        );
        let output = process(&input, &config, &NoopLog)
            .into_output()
            .unwrap();
        let reason = output.hook_specific_output.permission_decision_reason;
        assert!(reason.contains("for 'needle' in src/app"), "{reason}");
        assert!(reason.ends_with("args:search needle src/app"), "{reason}");
    }

    #[cfg(unix)]
    #[test]
    fn blank_output_defers() {
        use crate::test_util::with_script_backend;

        let dir = tempfile::tempdir().unwrap();
        let config = with_script_backend(
            isolated_config(dir.path()),
            dir.path(),
            "printf '\\n   \\n'\n",
        );
        let input = grep_input(serde_json::json!({ "pattern": "foo" }), dir.path());
        assert_eq!(
            reason(&process(&input, &config, &NoopLog)),
            Some(DeferReason::EmptyResult)
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_backend_defers_and_logs() {
        use crate::test_util::with_script_backend;

        let dir = tempfile::tempdir().unwrap();
        let config = with_script_backend(
            isolated_config(dir.path()),
            dir.path(),
            "echo 'not logged in' >&2\nexit 2\n",
        );
        let log = MemoryLog::default();
        let input = grep_input(serde_json::json!({ "pattern": "foo" }), dir.path());
        assert_eq!(
            reason(&process(&input, &config, &log)),
            Some(DeferReason::BackendFailed)
        );
        assert!(log.contains("not logged in"));
    }
}
