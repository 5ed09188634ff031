//! # Logging
//!
//! The library only emits `tracing` events. Binaries and test harnesses that
//! want them printed call [`init_tracing`] once at startup; it is never
//! called implicitly.

use tracing_subscriber::EnvFilter;

use crate::errors::LoggingError;

/// Directive applied when `RUST_LOG` is unset
pub const DEFAULT_LOG_DIRECTIVE: &str = "breaker_core=info";

/// Output format for the global subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Build the filter from `RUST_LOG`, falling back to the default directive
pub fn env_filter(default_directive: &str) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(default_directive)?),
    }
}

/// Install a global fmt subscriber writing to stderr.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<(), LoggingError> {
    let filter = env_filter(DEFAULT_LOG_DIRECTIVE)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| LoggingError::Install(e.to_string()))?;

    tracing::info!(?format, "breaker tracing initialized");
    Ok(())
}
