//! Integration tests for engine configuration
//!
//! No GPU required.
//!
//! Run with: cargo test --test config_integration_tests

use aurora_engine::aurora::log::LogSeverity;
use aurora_engine::aurora::{Config, Error};
use aurora_engine::aurora::frame::FenceWaitPolicy;
use std::time::Duration;

#[test]
fn test_integration_default_config_is_valid() {
    let config = Config::default();

    assert!(config.validate().is_ok());
    assert_eq!(config.max_frames_in_flight, 2);
    assert_eq!(config.fence_timeout, Duration::from_secs(1));
    assert_eq!(config.max_fence_stalls, 10);
    assert_eq!(config.debug_severity, LogSeverity::Warn);
    assert_eq!(config.clear_depth, 1.0);
}

#[test]
fn test_integration_zero_frames_in_flight_rejected() {
    let config = Config {
        max_frames_in_flight: 0,
        ..Config::default()
    };

    assert!(matches!(config.validate(), Err(Error::InitializationFailed(_))));
}

#[test]
fn test_integration_zero_fence_timeout_rejected() {
    let config = Config {
        fence_timeout: Duration::ZERO,
        ..Config::default()
    };

    assert!(matches!(config.validate(), Err(Error::InitializationFailed(_))));
}

#[test]
fn test_integration_clear_depth_out_of_range_rejected() {
    let config = Config {
        clear_depth: 1.5,
        ..Config::default()
    };

    assert!(matches!(config.validate(), Err(Error::InitializationFailed(_))));
}

#[test]
fn test_integration_fence_policy_follows_config() {
    let config = Config {
        fence_timeout: Duration::from_millis(250),
        max_fence_stalls: 4,
        ..Config::default()
    };

    let policy = FenceWaitPolicy::from_config(&config);

    assert_eq!(policy.timeout, Duration::from_millis(250));
    assert_eq!(policy.max_stalls, 4);
}
