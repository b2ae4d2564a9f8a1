//! Integration tests for environment-based configuration

use aethero_core::config::{ConfigError, RuntimeConfigBuilder};
use serial_test::serial;
use std::env;
use std::time::Duration;

const ALL_VARS: [&str; 9] = [
    "AETHERO_PIPELINE_ID",
    "AETHERO_LOG_LEVEL",
    "AETHERO_LOG_JSON",
    "AETHERO_MONITOR_INTERVAL",
    "AETHERO_MONITOR_ERROR_BACKOFF",
    "AETHERO_ALERT_CPU_PERCENT",
    "AETHERO_ALERT_MEMORY_PERCENT",
    "AETHERO_ALERT_DISK_PERCENT",
    "AETHERO_BUS_HISTORY_LIMIT",
];

fn set_env(key: &str, value: &str) {
    unsafe {
        env::set_var(key, value);
    }
}

fn clear_all_aethero_env_vars() {
    for key in ALL_VARS {
        unsafe {
            env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_env_config_default_when_no_vars_set() {
    clear_all_aethero_env_vars();

    let config = RuntimeConfigBuilder::from_env()
        .expect("should load defaults when no env vars set")
        .build()
        .expect("should build valid config");

    assert_eq!(config.pipeline_id.as_str(), "default");
    assert_eq!(config.monitor.interval, Duration::from_secs(60));
    assert_eq!(config.monitor.thresholds.cpu_percent, 80.0);
    assert!(!config.logging.json);
}

#[test]
#[serial]
fn test_env_config_overrides() {
    clear_all_aethero_env_vars();
    set_env("AETHERO_PIPELINE_ID", "pipeline-7");
    set_env("AETHERO_LOG_LEVEL", "debug");
    set_env("AETHERO_LOG_JSON", "yes");
    set_env("AETHERO_MONITOR_INTERVAL", "10s");
    set_env("AETHERO_MONITOR_ERROR_BACKOFF", "500ms");
    set_env("AETHERO_ALERT_CPU_PERCENT", "65.5");
    set_env("AETHERO_ALERT_DISK_PERCENT", "95");
    set_env("AETHERO_BUS_HISTORY_LIMIT", "250");

    let config = RuntimeConfigBuilder::from_env()
        .expect("should load config")
        .build()
        .expect("should build valid config");

    assert_eq!(config.pipeline_id.as_str(), "pipeline-7");
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
    assert_eq!(config.monitor.interval, Duration::from_secs(10));
    assert_eq!(config.monitor.error_backoff, Duration::from_millis(500));
    assert_eq!(config.monitor.thresholds.cpu_percent, 65.5);
    assert_eq!(config.monitor.thresholds.memory_percent, 80.0);
    assert_eq!(config.monitor.thresholds.disk_percent, 95.0);
    assert_eq!(config.bus.history_limit, Some(250));

    clear_all_aethero_env_vars();
}

#[test]
#[serial]
fn test_env_zero_history_limit_means_unbounded() {
    clear_all_aethero_env_vars();
    set_env("AETHERO_BUS_HISTORY_LIMIT", "0");

    let config = RuntimeConfigBuilder::from_env().unwrap().build().unwrap();
    assert_eq!(config.bus.history_limit, None);

    clear_all_aethero_env_vars();
}

#[test]
#[serial]
fn test_env_overrides_toml_values() {
    clear_all_aethero_env_vars();
    set_env("AETHERO_ALERT_MEMORY_PERCENT", "70");

    let config = RuntimeConfigBuilder::from_toml_str(
        "pipeline_id = \"from-file\"\n[monitor.thresholds]\nmemory_percent = 50.0\n",
    )
    .unwrap()
    .with_env_overrides()
    .unwrap()
    .build()
    .unwrap();

    assert_eq!(config.pipeline_id.as_str(), "from-file");
    assert_eq!(config.monitor.thresholds.memory_percent, 70.0);

    clear_all_aethero_env_vars();
}

#[test]
#[serial]
fn test_env_invalid_values() {
    clear_all_aethero_env_vars();

    set_env("AETHERO_LOG_JSON", "maybe");
    let err = RuntimeConfigBuilder::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref key, .. } if key == "AETHERO_LOG_JSON"));
    clear_all_aethero_env_vars();

    set_env("AETHERO_MONITOR_INTERVAL", "fast");
    let err = RuntimeConfigBuilder::from_env().unwrap_err();
    assert!(err.to_string().contains("AETHERO_MONITOR_INTERVAL"));
    clear_all_aethero_env_vars();

    set_env("AETHERO_ALERT_CPU_PERCENT", "lots");
    assert!(RuntimeConfigBuilder::from_env().is_err());
    clear_all_aethero_env_vars();

    set_env("AETHERO_PIPELINE_ID", "   ");
    assert!(RuntimeConfigBuilder::from_env().is_err());
    clear_all_aethero_env_vars();
}

#[test]
#[serial]
fn test_env_threshold_out_of_range_fails_validation() {
    clear_all_aethero_env_vars();
    set_env("AETHERO_ALERT_DISK_PERCENT", "150");

    let result = RuntimeConfigBuilder::from_env().unwrap().build();
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));

    clear_all_aethero_env_vars();
}
