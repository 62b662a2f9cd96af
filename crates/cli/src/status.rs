//! `status` subcommand: explain what the hook would do in this environment.

use std::fmt::Write;

use grepshim_core::Config;
use grepshim_hook::gate;

/// Human-readable report. The flag is `true` when the hook would act on a
/// plain `Grep` call (no globs).
#[must_use]
pub fn report(config: &Config) -> (String, bool) {
    let mut out = String::new();
    let token = config.token_path.as_ref().map_or_else(
        || "unknown (no home directory)".to_string(),
        |p| {
            let state = if p.exists() { "present" } else { "missing" };
            format!("{} ({state})", p.display())
        },
    );
    let readiness = gate::check_environment(config);

    let _ = writeln!(out, "disabled:    {}", config.disabled);
    let _ = writeln!(out, "credential:  {token}");
    match &readiness {
        Ok(prefix) => {
            let _ = writeln!(out, "backend:     {}", prefix.join(" "));
        }
        Err(_) if config.disabled || !config.has_token() => {
            let _ = writeln!(out, "backend:     not checked");
        }
        Err(_) => {
            let _ = writeln!(out, "backend:     not found");
        }
    }
    let _ = writeln!(out, "timeout:     {:?}", config.timeout);
    let _ = writeln!(out, "max results: {}", config.max_results);
    let _ = writeln!(out, "store:       {}", config.store);
    let _ = writeln!(out, "log:         {}", config.log_path.display());
    match &readiness {
        Ok(_) => {
            let _ = writeln!(out, "intercepts:  yes");
        }
        Err(reason) => {
            let _ = writeln!(out, "intercepts:  no ({})", reason.as_str());
        }
    }

    (out, readiness.is_ok())
}
