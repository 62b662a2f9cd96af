use std::time::Duration;

pub type Result<T> = eyre::Result<T>;

/// Why a backend invocation produced no usable output.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("backend executable not found: {0}")]
    NotFound(String),
    #[error("backend timed out after {0:?}")]
    TimedOut(Duration),
    #[error("backend exited with {}: {stderr}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    Exited { code: Option<i32>, stderr: String },
    #[error("backend failed to start: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("backend output is not valid UTF-8")]
    Decode,
    #[error("empty backend command")]
    EmptyCommand,
}
