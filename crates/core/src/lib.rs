//! Shared pieces of the grepshim hook: configuration, errors, path handling
//! and the diagnostic log. No process spawning, no JSON.

pub mod config;
pub mod error;
pub mod log;
pub mod paths;

pub use config::Config;
pub use error::{Result, RunError};
pub use log::{DiagnosticLog, FileLog, NoopLog};
