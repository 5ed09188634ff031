//! # Circuit Breaker File Configuration
//!
//! TOML configuration with a `[defaults]` section and per-service overrides,
//! converted into [`BreakerOptions`] for a named service.
//!
//! ```toml
//! [defaults]
//! failure_threshold = 50
//! success_threshold = 10
//! open_window_seconds = 60
//! half_open_window_seconds = 30
//! fallback_state = "closed"
//! storage_prefix = "circuitBreaker"
//! command_timeout_ms = 250
//!
//! [services.payments]
//! failure_threshold = 5
//! ```
//!
//! Environment variables prefixed with `BREAKER__` override file values
//! (`BREAKER__DEFAULTS__FAILURE_THRESHOLD=5`).

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::options::{
    BreakerOptions, DEFAULT_FAILURE_THRESHOLD, DEFAULT_HALF_OPEN_WINDOW, DEFAULT_OPEN_WINDOW,
    DEFAULT_STORAGE_PREFIX, DEFAULT_SUCCESS_THRESHOLD,
};
use crate::errors::ConfigError;
use crate::resilience::CircuitState;

const ENV_PREFIX: &str = "BREAKER";
const ENV_SEPARATOR: &str = "__";

/// Settings shared by every breaker unless a service overrides them
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_windows"))]
pub struct BreakerDefaults {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    #[validate(range(min = 1))]
    pub open_window_seconds: u64,
    pub half_open_window_seconds: u64,
    pub fallback_state: CircuitState,
    #[validate(length(min = 1))]
    pub storage_prefix: String,
    pub command_timeout_ms: Option<u64>,
}

impl Default for BreakerDefaults {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            open_window_seconds: DEFAULT_OPEN_WINDOW.as_secs(),
            half_open_window_seconds: DEFAULT_HALF_OPEN_WINDOW.as_secs(),
            fallback_state: CircuitState::Closed,
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            command_timeout_ms: None,
        }
    }
}

/// Per-service overrides; unset fields fall back to [`BreakerDefaults`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceBreakerConfig {
    pub failure_threshold: Option<u32>,
    pub success_threshold: Option<u32>,
    pub open_window_seconds: Option<u64>,
    pub half_open_window_seconds: Option<u64>,
    pub fallback_state: Option<CircuitState>,
}

/// Top-level breaker configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_service_overrides"))]
pub struct BreakerConfig {
    #[validate(nested)]
    pub defaults: BreakerDefaults,
    pub services: HashMap<String, ServiceBreakerConfig>,
}

impl BreakerConfig {
    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?;
        Self::from_settings(settings)
    }

    /// Load configuration from a TOML file, applying `BREAKER__` environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;
        let config = Self::from_settings(settings)?;
        tracing::debug!(?path, services = config.services.len(), "Loaded breaker config");
        Ok(config)
    }

    fn from_settings(settings: config::Config) -> Result<Self, ConfigError> {
        let config: BreakerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the settings for a service (unknown services get the defaults)
    pub fn config_for_service(&self, service: &str) -> BreakerDefaults {
        let mut resolved = self.defaults.clone();
        if let Some(overrides) = self.services.get(service) {
            overrides.apply_to(&mut resolved);
        }
        resolved
    }

    /// Build runtime options for a service
    pub fn to_options(&self, service: &str) -> BreakerOptions {
        self.config_for_service(service).to_options(service)
    }
}

impl BreakerDefaults {
    /// Convert to runtime options for a service
    pub fn to_options(&self, service: &str) -> BreakerOptions {
        BreakerOptions::builder()
            .service(service)
            .storage_prefix(self.storage_prefix.clone())
            .fallback_state(self.fallback_state)
            .failure_threshold(self.failure_threshold)
            .success_threshold(self.success_threshold)
            .open_window(Duration::from_secs(self.open_window_seconds))
            .half_open_window(Duration::from_secs(self.half_open_window_seconds))
            .maybe_command_timeout(self.command_timeout_ms.map(Duration::from_millis))
            .build()
    }
}

impl ServiceBreakerConfig {
    fn apply_to(&self, target: &mut BreakerDefaults) {
        if let Some(v) = self.failure_threshold {
            target.failure_threshold = v;
        }
        if let Some(v) = self.success_threshold {
            target.success_threshold = v;
        }
        if let Some(v) = self.open_window_seconds {
            target.open_window_seconds = v;
        }
        if let Some(v) = self.half_open_window_seconds {
            target.half_open_window_seconds = v;
        }
        if let Some(v) = self.fallback_state {
            target.fallback_state = v;
        }
    }
}

fn validate_windows(defaults: &BreakerDefaults) -> Result<(), ValidationError> {
    check_windows(
        defaults.open_window_seconds,
        defaults.half_open_window_seconds,
    )
}

fn validate_service_overrides(config: &BreakerConfig) -> Result<(), ValidationError> {
    for service in config.services.keys() {
        let resolved = config.config_for_service(service);
        if resolved.open_window_seconds == 0 {
            return Err(ValidationError::new("open_window")
                .with_message(format!("service '{service}' has a zero open window").into()));
        }
        check_windows(
            resolved.open_window_seconds,
            resolved.half_open_window_seconds,
        )
        .map_err(|e| {
            e.with_message(
                format!("service '{service}': half-open window exceeds open window").into(),
            )
        })?;
    }
    Ok(())
}

fn check_windows(open_window_seconds: u64, half_open_window_seconds: u64) -> Result<(), ValidationError> {
    if half_open_window_seconds > open_window_seconds {
        return Err(ValidationError::new("half_open_window")
            .with_message("half-open window must not exceed the open window".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = BreakerConfig::from_toml_str("").unwrap();
        assert_eq!(config, BreakerConfig::default());

        let options = config.to_options("anything");
        assert_eq!(options.failure_threshold, 50);
        assert_eq!(options.success_threshold, 10);
        assert_eq!(options.open_window, Duration::from_secs(60));
        assert_eq!(options.half_open_window, Duration::from_secs(30));
    }

    #[test]
    fn test_service_overrides_apply_on_top_of_defaults() {
        let config = BreakerConfig::from_toml_str(
            r#"
[defaults]
failure_threshold = 4
success_threshold = 2
open_window_seconds = 20
half_open_window_seconds = 10
fallback_state = "open"
storage_prefix = "edge"
command_timeout_ms = 250

[services.payments]
failure_threshold = 3
half_open_window_seconds = 5
"#,
        )
        .unwrap();

        let payments = config.to_options("payments");
        assert_eq!(payments.service, "payments");
        assert_eq!(payments.failure_threshold, 3);
        assert_eq!(payments.success_threshold, 2);
        assert_eq!(payments.open_window, Duration::from_secs(20));
        assert_eq!(payments.half_open_window, Duration::from_secs(5));
        assert_eq!(payments.fallback_state, CircuitState::Open);
        assert_eq!(payments.storage_key(), "edge:payments");
        assert_eq!(payments.command_timeout, Some(Duration::from_millis(250)));

        // Unknown services fall back to default config
        let unknown = config.to_options("unknown_service");
        assert_eq!(unknown.failure_threshold, 4);
        assert_eq!(unknown.half_open_window, Duration::from_secs(10));
    }

    #[test]
    fn test_half_open_window_longer_than_open_window_is_rejected() {
        let result = BreakerConfig::from_toml_str(
            r#"
[defaults]
open_window_seconds = 10
half_open_window_seconds = 30
"#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_service_override_with_bad_windows_is_rejected() {
        let result = BreakerConfig::from_toml_str(
            r#"
[services.search]
open_window_seconds = 5
"#,
        );
        // default half-open window (30s) exceeds the overridden open window
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_storage_prefix_is_rejected() {
        let result = BreakerConfig::from_toml_str(
            r#"
[defaults]
storage_prefix = ""
"#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let result = BreakerConfig::load("/nonexistent/breaker.toml");
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_config_serializes_back_to_toml() {
        let mut config = BreakerConfig::default();
        config.services.insert(
            "payments".to_string(),
            ServiceBreakerConfig {
                failure_threshold: Some(5),
                ..Default::default()
            },
        );

        let rendered = toml::to_string(&config).unwrap();
        let parsed: BreakerConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.config_for_service("payments").failure_threshold, 5);
    }
}
