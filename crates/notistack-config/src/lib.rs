//! Configuration parsing and validation for notistack
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Platform selection and store location
//! - The notification channel to register
//! - Stack eviction rules
//! - Validation with clear error messages

mod policy;
mod schema;
mod validation;

pub use policy::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Like [`load_config`], but a missing file yields the built-in defaults
pub fn load_config_or_default(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(path = %path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }
    load_config(path)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Config::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notistack_api::{Importance, Platform};

    #[test]
    fn parse_minimal_config() {
        let config = parse_config("config_version = 1").unwrap();
        assert_eq!(config.service.platform, Platform::Android);
        assert_eq!(config.service.store_key, DEFAULT_STORE_KEY);
        assert_eq!(config.stack, StackPolicy::default());
    }

    #[test]
    fn parse_full_config() {
        let config = r#"
            config_version = 1

            [service]
            platform = "ios"
            data_dir = "/tmp/notistack-test"
            store_key = "my_stack"

            [channel]
            id = "channel_id"
            name = "Default Channel"
            description = "Generic notifications"
            importance = "high"

            [stack]
            same_id_replaces_overdue_repeating = false
            cancel_withdraws_staged = false
        "#;

        let config = parse_config(config).unwrap();
        assert_eq!(config.service.platform, Platform::Ios);
        assert_eq!(config.service.data_dir.to_str(), Some("/tmp/notistack-test"));
        assert_eq!(config.service.store_key, "my_stack");
        assert_eq!(config.channel.id.as_str(), "channel_id");
        assert_eq!(config.channel.importance, Importance::High);
        assert_eq!(config.stack, StackPolicy::legacy());
    }

    #[test]
    fn example_config_matches_defaults() {
        let config = parse_config(include_str!("../../../config.example.toml")).unwrap();
        let defaults = Config::default();

        assert_eq!(config.service.platform, defaults.service.platform);
        assert_eq!(config.service.store_key, defaults.service.store_key);
        assert_eq!(config.channel, defaults.channel);
        assert_eq!(config.stack, defaults.stack);
    }

    #[test]
    fn reject_wrong_version() {
        let result = parse_config("config_version = 99");
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_invalid_values() {
        let config = r#"
            config_version = 1

            [service]
            platform = "palm"

            [channel]
            id = ""
        "#;

        match parse_config(config) {
            Err(ConfigError::ValidationFailed { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.service.store_key, DEFAULT_STORE_KEY);

        assert!(matches!(
            load_config(dir.path().join("absent.toml")),
            Err(ConfigError::ReadError(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "config_version = 1\n[service]\nplatform = \"ios\"\n").unwrap();

        let config = load_config_or_default(&path).unwrap();
        assert_eq!(config.service.platform, Platform::Ios);
    }
}
