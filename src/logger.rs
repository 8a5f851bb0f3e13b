//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after config and CLI flags are resolved.

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Install the global fmt subscriber, writing to stderr.
///
/// With `force_level` unset, `RUST_LOG` wins and `level` is the fallback.
/// With `force_level` set (a `-v` flag was given), `level` wins and
/// `RUST_LOG` is only consulted when `level` does not parse.
pub fn init(level: &str, force_level: bool) -> Result<(), AppError> {
    let filter = if force_level {
        match EnvFilter::try_new(level) {
            Ok(filter) => filter,
            Err(level_err) => EnvFilter::try_from_default_env().map_err(|env_err| {
                AppError::Logger(format!(
                    "invalid log level '{level}': {level_err}; RUST_LOG parse failed: {env_err}"
                ))
            })?,
        }
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// Map a count of `-v` flags to a level:
/// `-v` warn, `-vv` info, `-vvv` debug, `-vvvv` and up trace.
pub fn level_for_verbosity(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    }
}
