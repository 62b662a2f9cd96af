//! Workspace, scope and result-line path handling.
//!
//! All labels handed to the backend or shown to the caller use `/` separators.
//! Relations between paths are lexical: a scope outside the workspace is not an
//! error, it is simply shown in absolute form.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Path token followed by `:<digit>` (the line-number separator).
static PATH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?):\d").expect("path token pattern should compile"));

/// Windows drive prefix such as `C:`.
static DRIVE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]:").expect("drive prefix pattern should compile"));

/// Paths derived from one line of backend output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePaths {
    /// What to show: the token as written when it started with `.`, else `relative`.
    pub display: String,
    /// Relative to the workspace, or absolute when outside it.
    pub relative: String,
    pub absolute: String,
}

/// Expand a leading `~` to the home directory.
#[must_use]
pub fn expand_home(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
    };
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

/// Make `path` absolute and resolve symlinks where possible.
///
/// Unlike [`std::fs::canonicalize`] this does not require the path to exist:
/// the longest existing ancestor is canonicalized and the remaining components
/// are appended after lexical normalization.
#[must_use]
pub fn resolve(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };
    if let Ok(real) = std::fs::canonicalize(&absolute) {
        return real;
    }

    let normalized = normalize(&absolute);
    for ancestor in normalized.ancestors().skip(1) {
        if let Ok(real) = std::fs::canonicalize(ancestor) {
            let rest = normalized.strip_prefix(ancestor).unwrap_or(normalized.as_path());
            return real.join(rest);
        }
    }
    normalized
}

// Drop `.` and fold `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Workspace for a request: `cwd` when it names an existing directory entry,
/// otherwise the process working directory. Always absolute.
#[must_use]
pub fn resolve_workspace(cwd: Option<&str>) -> PathBuf {
    if let Some(raw) = cwd.filter(|c| !c.trim().is_empty()) {
        let candidate = expand_home(raw);
        if candidate.exists() {
            return resolve(&candidate);
        }
    }
    resolve(Path::new("."))
}

/// Subtree the search is limited to. Relative paths are taken from the
/// workspace; absolute ones are kept as given. No existence check.
#[must_use]
pub fn resolve_scope(path: Option<&str>, workspace: &Path) -> PathBuf {
    let Some(raw) = path.filter(|p| !p.trim().is_empty()) else {
        return workspace.to_path_buf();
    };
    let candidate = expand_home(raw);
    if candidate.is_absolute() {
        candidate
    } else {
        resolve(&workspace.join(candidate))
    }
}

/// Human-readable scope label: `.` for the workspace itself, a relative path
/// below it, or the absolute path when the scope lies elsewhere.
#[must_use]
pub fn describe_scope(scope: &Path, workspace: &Path) -> String {
    relative_posix(scope, workspace).unwrap_or_else(|| posix(scope))
}

/// Path argument for the backend. `None` when searching the whole workspace.
#[must_use]
pub fn cli_path_arg(scope: &Path, workspace: &Path) -> Option<String> {
    match relative_posix(scope, workspace) {
        Some(rel) if rel == "." => None,
        Some(rel) => Some(rel),
        None => Some(posix(scope)),
    }
}

/// Pull the file path out of a `path:line: text` style line.
///
/// The token ends before the first `:` followed by a digit; failing that, before
/// the first `:`. Lines without any `:` carry no path.
#[must_use]
pub fn extract_paths(line: &str, workspace: &Path) -> Option<LinePaths> {
    let raw = PATH_TOKEN
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .or_else(|| line.find(':').map(|idx| &line[..idx]))
        .filter(|raw| !raw.is_empty())?;

    let cleaned = raw.trim();
    let rel = match cleaned.strip_prefix("./").or_else(|| cleaned.strip_prefix('.')) {
        Some("") => ".",
        Some(rest) => rest,
        None => cleaned,
    };

    let absolute = if Path::new(rel).is_absolute() || DRIVE_PREFIX.is_match(rel) {
        PathBuf::from(rel)
    } else {
        resolve(&workspace.join(rel))
    };

    let relative = relative_posix(&absolute, workspace).unwrap_or_else(|| posix(&absolute));
    let display = if cleaned.starts_with('.') {
        cleaned.to_string()
    } else {
        relative.clone()
    };

    Some(LinePaths {
        display,
        relative,
        absolute: posix(&absolute),
    })
}

/// `path` relative to `base` in `/` form, `.` when equal, `None` when not below `base`.
fn relative_posix(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        Some(".".to_string())
    } else {
        Some(parts.join("/"))
    }
}

fn posix(path: &Path) -> String {
    let text = path.components().collect::<PathBuf>().to_string_lossy().into_owned();
    if cfg!(windows) {
        text.replace('\\', "/")
    } else {
        text
    }
}
