//! Helpers shared by the integration test targets.
//
// Not every target uses every helper.
#![allow(dead_code)]

use std::time::Duration;

use breaker::BreakerOptions;

/// Redis used by `test-services` targets
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

pub fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string())
}

/// Options from the canonical scenario: open after 5 failures, close after
/// 10 successes, 60s open window with a 30s half-open tail
pub fn scenario_options(service: &str) -> BreakerOptions {
    BreakerOptions::builder()
        .service(service)
        .storage_prefix("breakerTest")
        .failure_threshold(5)
        .success_threshold(10)
        .open_window(Duration::from_secs(60))
        .half_open_window(Duration::from_secs(30))
        .build()
}

/// Service name unique to one test run so parallel runs never share keys
pub fn unique_service(label: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    format!("{label}-{}-{nanos}", std::process::id())
}
