//! Integration test: Configuration loading
//!
//! Tests the bin_common path lookup and ChatConfig file loading.

use chat_client::bin_common::{load_config_from_env, ConfigType};
use chat_client::chat::{ChatConfig, ConfigError};
use std::env;
use std::io::Write;

#[test]
fn test_chat_config_default_path() {
    // Clear env var to test default
    env::remove_var("CHAT_CONFIG_PATH");

    let config_path = load_config_from_env(ConfigType::Chat);
    assert_eq!(config_path.to_str().unwrap(), "config/chat_config.yaml");
}

#[test]
fn test_custom_config() {
    let custom = ConfigType::Custom("custom/path.yaml".to_string());
    let config_path = load_config_from_env(custom);

    assert_eq!(config_path.to_str().unwrap(), "custom/path.yaml");
}

#[test]
fn test_load_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "server:\n  host: chat.internal\n  ws_port: 9001\nreconnect:\n  max_attempts: 2"
    )
    .unwrap();

    let config = ChatConfig::load(file.path()).unwrap();
    assert_eq!(config.server.ws_port, 9001);
    assert_eq!(config.reconnect.max_attempts, 2);
    assert!(config.ws_url().ends_with(":9001/ws/chat/"));
}

#[test]
fn test_load_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "reconnect:\n  auth_close_code: 1000").unwrap();

    let result = ChatConfig::load(file.path());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_missing_file_is_file_error() {
    let result = ChatConfig::load("does/not/exist.yaml");
    assert!(matches!(result, Err(ConfigError::FileError(_))));
}

#[test]
fn test_shipped_config_parses() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/chat_config.yaml");
    let yaml = std::fs::read_to_string(path).unwrap();
    let config = ChatConfig::from_yaml_str(&yaml).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.ws_url(), "ws://localhost:8001/ws/chat/");
}
