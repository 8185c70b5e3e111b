//! Tests for Config validation

use std::time::Duration;

use relayq::config::Config;
use relayq::RelayError;

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.reply_timeout(), Duration::from_secs(10));
}

#[test]
fn test_zero_workers_rejected() {
    let config = Config::builder().worker_count(0).build();
    assert!(matches!(config.validate(), Err(RelayError::Config(_))));
}

#[test]
fn test_inverted_latency_rejected() {
    let config = Config::builder().latency_ms(400, 100).build();
    assert!(matches!(config.validate(), Err(RelayError::Config(_))));
}

#[test]
fn test_huge_reply_timeout_is_accepted() {
    let config = Config::builder().reply_timeout_ms(u64::MAX).build();
    assert!(config.validate().is_ok());
    assert_eq!(config.reply_timeout(), Duration::from_millis(u64::MAX));
}
