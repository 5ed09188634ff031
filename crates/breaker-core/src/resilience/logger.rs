//! # Breaker Logger
//!
//! Sink for the facade's non-fatal degradation reports. Fire-and-forget: the
//! facade never inspects anything a logger does.

use std::fmt::Debug;

use crate::errors::StoreError;

/// Receives reports about store failures and degraded decisions
pub trait BreakerLogger: Send + Sync + Debug {
    /// A store call failed and the facade absorbed it
    fn error(&self, service: &str, message: &str, error: &StoreError);

    /// A decision was made on a fallback or suspicious configuration
    fn warn(&self, service: &str, message: &str);

    /// Lifecycle information
    fn info(&self, service: &str, message: &str);
}

/// Default logger forwarding to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl BreakerLogger for TracingLogger {
    fn error(&self, service: &str, message: &str, error: &StoreError) {
        tracing::error!(service = service, error = %error, "{}", message);
    }

    fn warn(&self, service: &str, message: &str) {
        tracing::warn!(service = service, "{}", message);
    }

    fn info(&self, service: &str, message: &str) {
        tracing::info!(service = service, "{}", message);
    }
}
