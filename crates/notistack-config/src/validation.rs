//! Configuration validation

use crate::schema::RawConfig;
use notistack_api::{Importance, Platform};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Unknown platform '{0}' (expected \"android\" or \"ios\")")]
    UnknownPlatform(String),

    #[error("Unknown channel importance '{0}'")]
    UnknownImportance(String),

    #[error("[{section}] {field} cannot be empty")]
    EmptyField {
        section: &'static str,
        field: &'static str,
    },

    #[error("Global config error: {0}")]
    GlobalError(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(platform) = &config.service.platform {
        if let Err(e) = parse_platform(platform) {
            errors.push(e);
        }
    }

    if config
        .service
        .store_key
        .as_deref()
        .is_some_and(|k| k.trim().is_empty())
    {
        errors.push(ValidationError::EmptyField {
            section: "service",
            field: "store_key",
        });
    }

    if config
        .service
        .data_dir
        .as_ref()
        .is_some_and(|d| d.as_os_str().is_empty())
    {
        errors.push(ValidationError::EmptyField {
            section: "service",
            field: "data_dir",
        });
    }

    if config
        .channel
        .id
        .as_deref()
        .is_some_and(|id| id.trim().is_empty())
    {
        errors.push(ValidationError::EmptyField {
            section: "channel",
            field: "id",
        });
    }

    if let Some(importance) = &config.channel.importance {
        if let Err(e) = parse_importance(importance) {
            errors.push(e);
        }
    }

    errors
}

/// Parse a platform name
pub fn parse_platform(s: &str) -> Result<Platform, ValidationError> {
    match s.trim().to_lowercase().as_str() {
        "android" => Ok(Platform::Android),
        "ios" => Ok(Platform::Ios),
        _ => Err(ValidationError::UnknownPlatform(s.to_string())),
    }
}

/// Parse a channel importance level
pub fn parse_importance(s: &str) -> Result<Importance, ValidationError> {
    match s.trim().to_lowercase().as_str() {
        "none" => Ok(Importance::None),
        "min" => Ok(Importance::Min),
        "low" => Ok(Importance::Low),
        "default" => Ok(Importance::Default),
        "high" => Ok(Importance::High),
        _ => Err(ValidationError::UnknownImportance(s.to_string())),
    }
}
