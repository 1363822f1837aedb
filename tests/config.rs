//! Configuration system tests
//!
//! Tests for config paths and outline config loading/saving.

use json_outline::config::OutlineConfig;
use json_outline::config_paths;
use json_outline::outline::{DEFAULT_PARSE_BUDGET, DEFAULT_PREVIEW_LEN};
use tempfile::TempDir;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_contains_app_name() {
    let dir = config_paths::config_dir().unwrap();
    assert!(dir.to_string_lossy().contains("json-outline"));
}

#[test]
fn test_config_file_ends_with_yaml() {
    let path = config_paths::config_file().unwrap();
    assert!(path.to_string_lossy().ends_with("config.yaml"));
}

#[test]
fn test_logs_dir_is_under_config_dir() {
    let logs = config_paths::logs_dir().unwrap();
    let config = config_paths::config_dir().unwrap();
    assert!(logs.starts_with(&config));
}

// ========================================================================
// OutlineConfig Tests
// ========================================================================

#[test]
fn test_defaults() {
    let config = OutlineConfig::default();
    assert_eq!(config.preview_len, DEFAULT_PREVIEW_LEN);
    assert_eq!(config.parse_budget, DEFAULT_PARSE_BUDGET);
    assert_eq!(config.debounce_ms, 50);
    assert!(config.preserve_focus);
}

#[test]
fn test_save_and_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let config = OutlineConfig {
        preview_len: 12,
        parse_budget: 8,
        debounce_ms: 200,
        preserve_focus: false,
    };
    config.save_to(&path).unwrap();

    assert_eq!(OutlineConfig::load_from(&path), config);
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = OutlineConfig::load_from(&dir.path().join("absent.yaml"));
    assert_eq!(config, OutlineConfig::default());
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "preview_len: 80\n").unwrap();

    let config = OutlineConfig::load_from(&path);
    assert_eq!(config.preview_len, 80);
    assert_eq!(config.parse_budget, DEFAULT_PARSE_BUDGET);
    assert!(config.preserve_focus);
}

#[test]
fn test_invalid_yaml_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "preview_len: [not a number\n").unwrap();

    assert_eq!(OutlineConfig::load_from(&path), OutlineConfig::default());
}
