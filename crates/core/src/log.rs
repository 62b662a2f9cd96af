//! Best-effort diagnostic side channel.
//!
//! Write failures are swallowed: the log is for humans debugging the hook and
//! must never change what the hook does.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::trace;

/// Sink for diagnostic messages.
pub trait DiagnosticLog {
    fn append(&self, message: &str);
}

/// Appends timestamped lines to a file, creating its directory on demand.
#[derive(Debug, Clone)]
pub struct FileLog {
    path: PathBuf,
}

impl FileLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_append(&self, message: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "[{stamp}] {message}")
    }
}

impl DiagnosticLog for FileLog {
    fn append(&self, message: &str) {
        if let Err(e) = self.try_append(message) {
            trace!(path = %self.path.display(), %e, "diagnostic log write failed");
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLog;

impl DiagnosticLog for NoopLog {
    fn append(&self, _message: &str) {}
}
