//! Claude Code `PreToolUse` hook that answers `Grep` calls with semantic search.
//!
//! When the hook applies, the original `Grep` call is denied and the backend's
//! results travel back as the denial reason. Every other outcome is a silent
//! deferral that lets `Grep` run unmodified.

pub mod gate;
pub mod locate;
pub mod pre_tool_use;
pub mod response;
pub mod runner;

use eyre::WrapErr;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Tool the hook intercepts.
pub const GREP_TOOL: &str = "Grep";

#[derive(Debug, Default, Deserialize)]
pub struct HookInput {
    #[serde(default, deserialize_with = "string_or_none")]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Value,
    #[serde(default, deserialize_with = "string_or_none")]
    pub cwd: Option<String>,
}

// Non-string values are treated as absent instead of failing the whole payload.
fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl HookInput {
    /// Parse raw stdin. Blank input is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid hook payload.
    pub fn parse(raw: &str) -> grepshim_core::Result<Option<Self>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(raw)
            .map(Some)
            .wrap_err("invalid hook JSON")
    }
}

/// How results are presented to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Backend lines verbatim.
    #[default]
    Content,
    /// Deduplicated file paths.
    Paths,
}

impl OutputMode {
    /// Missing or unrecognized values mean [`OutputMode::Content`].
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("paths") => Self::Paths,
            _ => Self::Content,
        }
    }
}

/// The parts of a `Grep` tool input the hook understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInput {
    /// Search pattern, passed to the backend as given.
    pub pattern: String,
    pub path: Option<String>,
    /// Trimmed, non-blank glob patterns.
    pub globs: Vec<String>,
    pub output_mode: OutputMode,
}

#[derive(Debug, Serialize)]
pub struct PreToolUseOutput {
    #[serde(rename = "hookSpecificOutput")]
    pub hook_specific_output: PreToolUseSpecificOutput,
}

#[derive(Debug, Serialize)]
pub struct PreToolUseSpecificOutput {
    #[serde(rename = "hookEventName")]
    pub hook_event_name: String,
    #[serde(rename = "permissionDecision")]
    pub permission_decision: String,
    #[serde(rename = "permissionDecisionReason")]
    pub permission_decision_reason: String,
}

impl PreToolUseOutput {
    #[must_use]
    pub fn deny(reason: &str) -> Self {
        Self {
            hook_specific_output: PreToolUseSpecificOutput {
                hook_event_name: "PreToolUse".to_string(),
                permission_decision: "deny".to_string(),
                permission_decision_reason: reason.to_string(),
            },
        }
    }
}

/// Why the hook let the original tool run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferReason {
    /// Blank or undecodable stdin.
    NoInput,
    NotGrep,
    /// `tool_input` is not an object or the pattern is blank.
    NoPattern,
    Disabled,
    /// Credential marker file missing.
    NoToken,
    /// No way to invoke the backend.
    NoBackend,
    /// Globs present and the index is not known to cover them.
    GlobNotIndexed,
    BackendFailed,
    /// Backend succeeded with nothing but blank lines.
    EmptyResult,
}

impl DeferReason {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoInput => "no input",
            Self::NotGrep => "not a Grep call",
            Self::NoPattern => "no pattern",
            Self::Disabled => "disabled",
            Self::NoToken => "no credential",
            Self::NoBackend => "backend unavailable",
            Self::GlobNotIndexed => "glob not indexed",
            Self::BackendFailed => "backend failed",
            Self::EmptyResult => "empty result",
        }
    }
}

/// Outcome of one hook invocation.
#[derive(Debug)]
pub enum Decision {
    /// Deny `Grep` and hand back these results.
    Intercepted(PreToolUseOutput),
    Deferred(DeferReason),
}

impl Decision {
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// The response to print, if any.
    #[must_use]
    pub fn into_output(self) -> Option<PreToolUseOutput> {
        match self {
            Self::Intercepted(output) => Some(output),
            Self::Deferred(_) => None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_none() {
        assert!(HookInput::parse("").unwrap().is_none());
        assert!(HookInput::parse("  \n").unwrap().is_none());
    }

    #[test]
    fn malformed_input_is_error() {
        assert!(HookInput::parse("{not json").is_err());
        assert!(HookInput::parse(r#""just a string""#).is_err());
    }

    #[test]
    fn parses_hook_payload() {
        let input = HookInput::parse(
            r#"{"tool_name":"Grep","tool_input":{"pattern":"foo"},"cwd":"/repo","session_id":"s"}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(input.tool_name.as_deref(), Some("Grep"));
        assert_eq!(input.cwd.as_deref(), Some("/repo"));
        assert_eq!(input.tool_input["pattern"], "foo");
    }

    #[test]
    fn non_string_fields_are_absent() {
        let input = HookInput::parse(r#"{"tool_name":7,"cwd":["x"]}"#)
            .unwrap()
            .unwrap();
        assert!(input.tool_name.is_none());
        assert!(input.cwd.is_none());
        assert!(input.tool_input.is_null());
    }

    #[test]
    fn output_mode_normalizes_unknown_values() {
        assert_eq!(OutputMode::from_value(None), OutputMode::Content);
        let paths = Value::from("paths");
        assert_eq!(OutputMode::from_value(Some(&paths)), OutputMode::Paths);
        let other = Value::from("files_with_matches");
        assert_eq!(OutputMode::from_value(Some(&other)), OutputMode::Content);
        assert_eq!(OutputMode::from_value(Some(&Value::Null)), OutputMode::Content);
    }

    #[test]
    fn deny_output_serializes_hook_schema() {
        let json = serde_json::to_value(PreToolUseOutput::deny("because")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "hookSpecificOutput": {
                    "hookEventName": "PreToolUse",
                    "permissionDecision": "deny",
                    "permissionDecisionReason": "because"
                }
            })
        );
    }

    #[test]
    fn decision_output() {
        assert!(Decision::Deferred(DeferReason::NotGrep).into_output().is_none());
        let decision = Decision::Intercepted(PreToolUseOutput::deny("x"));
        assert!(!decision.is_deferred());
        assert!(decision.into_output().is_some());
    }
}
