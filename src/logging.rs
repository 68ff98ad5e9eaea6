//! Logging bootstrap.
//!
//! # Invariants
//! - Logging init is idempotent for the same level.
//! - Re-initialization with a different level is rejected.
//! - Initialization never panics.

use std::sync::OnceLock;

use flexi_logger::{Logger, LoggerHandle};
use log::debug;

use crate::{Error, Result};

static LOGGING_STATE: OnceLock<LoggingState> = OnceLock::new();

struct LoggingState {
    level: &'static str,
    _logger: LoggerHandle,
}

/// Start logging to stderr at `level` (`trace|debug|info|warn|error`).
///
/// # Errors
/// - Returns an error when `level` is unsupported.
/// - Returns an error when logging is already running at another level.
/// - Returns an error when the logger backend cannot start.
pub fn init_logging(level: &str) -> Result<()> {
    let level = normalize_level(level)?;

    if let Some(state) = LOGGING_STATE.get() {
        if state.level != level {
            return Err(Error::Logging(format!(
                "logging already initialized with level `{}`; refusing to switch to `{level}`",
                state.level
            )));
        }
        return Ok(());
    }

    let logger = Logger::try_with_str(level)
        .map_err(|err| Error::Logging(format!("invalid log level `{level}`: {err}")))?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
        .map_err(|err| Error::Logging(format!("failed to start logger: {err}")))?;

    let _ = LOGGING_STATE.set(LoggingState {
        level,
        _logger: logger,
    });
    debug!("logging initialized at level {level}");
    Ok(())
}

/// `warn` unless told otherwise.
pub fn default_log_level() -> &'static str {
    "warn"
}

fn normalize_level(level: &str) -> Result<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(Error::Logging(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
    }

    #[test]
    fn normalize_level_rejects_unknown_values() {
        let error = normalize_level("loud").unwrap_err();
        assert!(error.to_string().contains("unsupported log level `loud`"));
    }
}
