//! Integration tests for logging functionality

use chrono::NaiveDate;
use cubex::config::LoggingConfig;
use cubex::core::state::{Checkpoint, CheckpointStore};
use cubex::domain::CubeName;
use cubex::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "logs");
    assert_eq!(config.local_rotation, "daily");
}

#[tokio::test]
async fn test_file_logging_writes_json_lines() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("info", &config).unwrap();
    assert!(log_path.exists());

    let store = CheckpointStore::with_fallback_str(temp_dir.path(), "2025-02-26T16:25:00").unwrap();
    let timestamp = NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    store
        .save(&Checkpoint::new(CubeName::new("Orders").unwrap(), timestamp))
        .await
        .unwrap();

    // Flushes the non-blocking writer
    drop(guard);

    let contents = std::fs::read_to_string(log_path.join("cubex.log")).unwrap();
    let line = contents
        .lines()
        .find(|line| line.contains("Checkpoint saved"))
        .unwrap();
    let entry: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(entry["fields"]["checkpoint"], "2025-03-01T10:00:00");
}
