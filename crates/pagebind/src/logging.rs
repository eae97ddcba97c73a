//! Tracing subscriber setup for hosts and test binaries.
//!
//! The filter is read from `PAGEBIND_LOG`, falling back to `RUST_LOG`, and
//! defaults to `warn`. Use `PAGEBIND_LOG=pagebind=debug` to see every action,
//! hook and element lookup.

use crate::result::{AutomationError, AutomationResult};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable checked before `RUST_LOG`
pub const LOG_ENV_VAR: &str = "PAGEBIND_LOG";

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line human readable output
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

fn env_filter() -> EnvFilter {
    let var = if std::env::var_os(LOG_ENV_VAR).is_some() {
        LOG_ENV_VAR
    } else {
        EnvFilter::DEFAULT_ENV
    };
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(var)
        .from_env_lossy()
}

/// Install a compact global subscriber.
///
/// # Errors
///
/// [`AutomationError::Config`] if a global subscriber is already installed.
pub fn init_tracing() -> AutomationResult<()> {
    init_tracing_with(LogFormat::Compact)
}

/// Install a global subscriber in `format`
pub fn init_tracing_with(format: LogFormat) -> AutomationResult<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false);
    let installed = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| AutomationError::config(format!("tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_an_error() {
        let _ = init_tracing();
        let err = init_tracing_with(LogFormat::Json);
        assert!(matches!(err, Err(AutomationError::Config { .. })));
    }

    #[test]
    fn test_default_format_is_compact() {
        assert_eq!(LogFormat::default(), LogFormat::Compact);
    }
}
