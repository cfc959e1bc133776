//! Integration tests for logging functionality
//!
//! The global subscriber can only be installed once per process, so the
//! initialization checks live in a single test.

use sluice::config::LoggingConfig;
use sluice::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "./logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_is_rejected_before_install() {
    let err = init_logging("verbose", &LoggingConfig::console_only()).unwrap_err();
    assert!(err.to_string().contains("Invalid log level"));
}

#[test]
fn test_file_logging_initialization() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("info", &config).unwrap();
    assert!(guard.has_file_output());
    assert!(log_path.is_dir());
    assert!(log_path.join("sluice.log").exists());

    tracing::info!(rows = 42, "Slice written");

    // A second global subscriber is refused
    let err = init_logging("info", &LoggingConfig::console_only()).unwrap_err();
    assert!(err.to_string().contains("Failed to install logger"));

    drop(guard);
}
