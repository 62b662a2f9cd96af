//! Turning backend output into the denial the host shows to the caller.

use std::fmt::Write;
use std::path::Path;

use grepshim_core::paths;

use crate::{OutputMode, PreToolUseOutput};

/// Precedes the payload in the denial reason.
pub const REASON_PREFIX: &str = "Semantic search completed by mgrep: ";

/// First line of every payload.
#[must_use]
pub fn header(pattern: &str, scope_label: &str) -> String {
    format!("MGrep semantic search for {} in {scope_label}", quote(pattern))
}

/// Non-blank lines of backend output. Besides `\n` and `\r\n`, a lone `\r`
/// and the other Unicode line boundaries (`\x0b`, `\x0c`, `\x1c`-`\x1e`,
/// `\u{85}`, `\u{2028}`, `\u{2029}`) end a line.
#[must_use]
pub fn result_lines(stdout: &str) -> Vec<&str> {
    stdout
        .split(is_line_break)
        .filter(|l| !l.trim().is_empty())
        .collect()
}

const fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Header plus either the backend lines verbatim or their distinct file paths
/// in first-seen order. Blank lines are skipped.
#[must_use]
pub fn build_payload(
    lines: &[&str],
    pattern: &str,
    scope_label: &str,
    mode: OutputMode,
    workspace: &Path,
) -> String {
    let lines = lines.iter().copied().filter(|l| !l.trim().is_empty());
    let body = match mode {
        OutputMode::Paths => {
            let mut seen: Vec<String> = Vec::new();
            for line in lines {
                let path = paths::extract_paths(line, workspace)
                    .map_or_else(|| line.to_string(), |p| p.display);
                if !seen.contains(&path) {
                    seen.push(path);
                }
            }
            seen.join("\n")
        }
        OutputMode::Content => lines.collect::<Vec<_>>().join("\n"),
    };
    format!("{}\n{body}", header(pattern, scope_label))
}

#[must_use]
pub fn build_response(payload: &str) -> PreToolUseOutput {
    PreToolUseOutput::deny(&format!("{REASON_PREFIX}{payload}"))
}

// Quote like a Python repr: single quotes unless only single quotes appear.
fn quote(text: &str) -> String {
    let delim = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(delim);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}
