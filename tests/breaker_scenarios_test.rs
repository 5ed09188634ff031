//! End-to-end breaker scenarios against both in-process stores.
//!
//! The memory store and the distributed store over `LocalHashBackend` must
//! tell the same story for the same event sequence; each scenario runs
//! against both.

mod common;

use std::sync::Arc;
use std::time::Duration;

use breaker::{
    BreakerConfig, BreakerError, CircuitBreaker, CircuitBreakerBehavior, CircuitState,
    DistributedStateStore, LocalHashBackend, ManualClock, MemoryStateStore, StateStore,
};

use common::scenario_options;

fn stores(service: &str) -> Vec<(&'static str, Arc<dyn StateStore>, Arc<ManualClock>)> {
    let memory_clock = Arc::new(ManualClock::new());
    let memory: Arc<dyn StateStore> = Arc::new(MemoryStateStore::with_clock(
        scenario_options(service),
        memory_clock.clone(),
    ));

    let local_clock = Arc::new(ManualClock::new());
    let distributed: Arc<dyn StateStore> = Arc::new(DistributedStateStore::new(
        LocalHashBackend::with_clock(local_clock.clone()),
        scenario_options(service),
    ));

    vec![
        ("memory", memory, memory_clock),
        ("distributed", distributed, local_clock),
    ]
}

#[tokio::test]
async fn test_open_half_open_closed_through_the_facade() -> anyhow::Result<()> {
    for (backend, store, clock) in stores("checkout") {
        let breaker = CircuitBreaker::new(scenario_options("checkout"), store.clone());

        for _ in 0..5 {
            let outcome = breaker.call(|| async { Err::<(), _>("timeout") }).await;
            assert!(outcome.is_err(), "{backend}");
        }
        assert_eq!(breaker.state().await, CircuitState::Open, "{backend}");

        let rejected = breaker.call(|| async { Ok::<_, &str>(()) }).await;
        assert!(
            matches!(rejected, Err(BreakerError::CircuitOpen { ref service }) if service == "checkout"),
            "{backend}"
        );

        clock.advance(Duration::from_secs(31));
        assert_eq!(breaker.state().await, CircuitState::HalfOpen, "{backend}");
        assert!(breaker.is_available().await, "{backend}");

        for _ in 0..10 {
            let outcome = breaker.call(|| async { Ok::<_, &str>(()) }).await;
            assert!(outcome.is_ok(), "{backend}");
        }
        assert_eq!(breaker.state().await, CircuitState::Closed, "{backend}");

        let stat = breaker.stat().await;
        assert_eq!(stat.failure_count, 5, "{backend}");
        assert_eq!(stat.success_count, 10, "{backend}");
        assert!(stat.is_healthy(), "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn test_idle_open_circuit_recovers_by_time_alone() -> anyhow::Result<()> {
    for (backend, store, clock) in stores("search") {
        for _ in 0..5 {
            store.failure(1).await?;
        }
        assert_eq!(store.get_state().await?, CircuitState::Open, "{backend}");

        clock.advance(Duration::from_secs(60));

        assert_eq!(store.get_state().await?, CircuitState::Closed, "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn test_failure_during_half_open_reopens() -> anyhow::Result<()> {
    for (backend, store, clock) in stores("inventory") {
        store.failure(5).await?;
        clock.advance(Duration::from_secs(45));
        assert_eq!(store.get_state().await?, CircuitState::HalfOpen, "{backend}");

        store.failure(1).await?;

        assert_eq!(store.get_state().await?, CircuitState::Open, "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn test_failures_below_threshold_never_open() -> anyhow::Result<()> {
    for (backend, store, _clock) in stores("email") {
        for _ in 0..4 {
            store.failure(1).await?;
            assert_eq!(store.get_state().await?, CircuitState::Closed, "{backend}");
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_reset_twice_matches_reset_once() -> anyhow::Result<()> {
    for (backend, store, _clock) in stores("ledger") {
        store.failure(7).await?;

        store.reset().await?;
        let once = store.get_state().await?;
        store.reset().await?;
        let twice = store.get_state().await?;

        assert_eq!(once, CircuitState::Closed, "{backend}");
        assert_eq!(once, twice, "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn test_breakers_built_from_config_are_independent() -> anyhow::Result<()> {
    let config = BreakerConfig::from_toml_str(
        r#"
        [defaults]
        failure_threshold = 3
        open_window_seconds = 60
        half_open_window_seconds = 30

        [services.payments]
        failure_threshold = 1
        "#,
    )?;

    let payments = CircuitBreaker::in_memory(config.to_options("payments"));
    let search = CircuitBreaker::in_memory(config.to_options("search"));

    payments.record_failure().await;
    search.record_failure().await;

    assert!(!payments.is_available().await);
    assert!(search.is_available().await);

    let breakers: Vec<&dyn CircuitBreakerBehavior> = vec![&payments, &search];
    let unhealthy: Vec<&str> = {
        let mut names = Vec::new();
        for breaker in breakers {
            if !breaker.stat().await.is_healthy() {
                names.push(breaker.name());
            }
        }
        names
    };
    assert_eq!(unhealthy, vec!["payments"]);
    Ok(())
}
