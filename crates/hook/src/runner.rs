//! Single bounded backend invocation.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use grepshim_core::{DiagnosticLog, RunError};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Run `command` in `cwd` and return its stdout if it exits 0 within `timeout`.
///
/// # Errors
///
/// Returns a [`RunError`] describing why no output is available. A timed-out
/// child is killed and its output discarded. The timeout also bounds reading
/// the pipes, which stay open while anything the child spawned still holds them.
#[instrument(skip(command), fields(program = command.first().map(String::as_str)))]
pub fn run(command: &[String], cwd: &Path, timeout: Duration) -> Result<String, RunError> {
    let (program, args) = command.split_first().ok_or(RunError::EmptyCommand)?;
    let deadline = Instant::now() + timeout;

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RunError::NotFound(program.clone()),
            _ => RunError::Spawn(e),
        })?;

    // Drain both pipes while waiting so a large result cannot stall the child.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let Some(status) = child.wait_timeout(timeout)? else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(RunError::TimedOut(timeout));
    };

    let (Some(stdout), Some(stderr)) = (collect(&stdout, deadline), collect(&stderr, deadline))
    else {
        debug!("backend exited but its output is still held open");
        return Err(RunError::TimedOut(timeout));
    };

    if !status.success() {
        return Err(RunError::Exited {
            code: status.code(),
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }

    debug!(bytes = stdout.len(), "backend finished");
    String::from_utf8(stdout).map_err(|_| RunError::Decode)
}

/// [`run`], with failures written to `log` and collapsed to `None`.
pub fn run_logged(
    command: &[String],
    cwd: &Path,
    timeout: Duration,
    log: &dyn DiagnosticLog,
) -> Option<String> {
    match run(command, cwd, timeout) {
        Ok(stdout) => Some(stdout),
        Err(e) => {
            warn!(%e, "backend run failed");
            log.append(&format!("backend run failed: {e}"));
            None
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

// `None` when the pipe is still open at `deadline`.
fn collect(rx: &Receiver<Vec<u8>>, deadline: Instant) -> Option<Vec<u8>> {
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(buf) => Some(buf),
        Err(RecvTimeoutError::Disconnected) => Some(Vec::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}
