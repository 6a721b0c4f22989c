//! Integration tests for logging functionality
//!
//! The global subscriber can be installed once per process, so everything
//! that needs it lives in a single test.

use confluence_dump::config::LoggingConfig;
use confluence_dump::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.level, "info");
    assert_eq!(config.local_rotation, "daily");
    assert_eq!(config.local_path, "logs");
}

#[test]
fn test_file_logging_writes_json_lines() {
    std::env::remove_var("RUST_LOG");

    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        level: "debug".to_string(),
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    assert!(log_path.is_dir());

    // A second subscriber is refused
    assert!(init_logging("info", &LoggingConfig::default()).is_err());

    // Flush the non-blocking writer
    drop(guard);

    let contents = std::fs::read_to_string(log_path.join("confluence-dump.log")).unwrap();
    let first = contents.lines().next().unwrap();
    let line: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(line["fields"]["message"], "Logging initialized");
    assert_eq!(line["fields"]["local_enabled"], true);
    assert_eq!(line["level"], "DEBUG");
}

#[test]
fn test_invalid_level_is_rejected() {
    let err = init_logging("verbose", &LoggingConfig::default()).err().unwrap();
    assert!(err.to_string().contains("Invalid log level"));
}
