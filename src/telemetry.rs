//! Structured logging via `tracing`.
//!
//! A stderr `fmt` subscriber is installed only when asked for: `AUTOBOUNDS_LOG`
//! (or `RUST_LOG`) holds a filter directive, or `--verbose` enables debug
//! output for this crate. Otherwise tracing events are dropped and the
//! output channel (plain stderr lines) is the only log.

use std::env;

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

const VERBOSE_FILTER: &str = "autobounds_launcher=debug,autobounds=debug";

/// Filter directive to use, if logging should be enabled at all.
pub fn log_filter(verbose: bool) -> Option<String> {
    for var in ["AUTOBOUNDS_LOG", "RUST_LOG"] {
        if let Ok(v) = env::var(var) {
            if !v.trim().is_empty() {
                return Some(v.trim().to_string());
            }
        }
    }
    verbose.then(|| VERBOSE_FILTER.to_string())
}

/// Install the global subscriber once. Returns true when logging is active.
pub fn telemetry_init(verbose: bool) -> bool {
    if INIT.get().is_some() {
        return true;
    }
    let Some(filter) = log_filter(verbose) else {
        return false;
    };
    let env_filter = match EnvFilter::try_new(&filter) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("autobounds: ignoring invalid log filter '{filter}': {e}");
            EnvFilter::new(VERBOSE_FILTER)
        }
    };
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        let _ = INIT.set(());
    }
    installed
}
