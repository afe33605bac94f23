//! Validated configuration structures

use crate::schema::{RawChannelConfig, RawConfig, RawServiceConfig, RawStackConfig};
use crate::validation::{parse_importance, parse_platform};
use notistack_api::{ChannelSpec, Platform};
use notistack_util::default_data_dir;
use std::path::PathBuf;

/// Default key the stack is persisted under
pub const DEFAULT_STORE_KEY: &str = "notification_stack";

/// Validated configuration ready for use by the core
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub service: ServiceConfig,
    pub channel: ChannelSpec,
    pub stack: StackPolicy,
}

impl Config {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            channel: channel_from_raw(raw.channel),
            stack: StackPolicy::from_raw(raw.stack),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub platform: Platform,
    pub data_dir: PathBuf,
    pub store_key: String,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            // Already validated
            platform: raw
                .platform
                .as_deref()
                .and_then(|p| parse_platform(p).ok())
                .unwrap_or_default(),
            data_dir: raw.data_dir.unwrap_or_else(default_data_dir),
            store_key: raw
                .store_key
                .unwrap_or_else(|| DEFAULT_STORE_KEY.to_string()),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            data_dir: default_data_dir(),
            store_key: DEFAULT_STORE_KEY.to_string(),
        }
    }
}

fn channel_from_raw(raw: RawChannelConfig) -> ChannelSpec {
    let defaults = ChannelSpec::default();

    ChannelSpec {
        id: raw.id.map(Into::into).unwrap_or(defaults.id),
        name: raw.name.unwrap_or(defaults.name),
        description: raw.description.unwrap_or(defaults.description),
        importance: raw
            .importance
            .as_deref()
            .and_then(|i| parse_importance(i).ok())
            .unwrap_or(defaults.importance),
    }
}

/// Rules the stack applies when staging and cancelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackPolicy {
    /// Staging an id evicts every earlier entry with that id, even one that
    /// is overdue and repeating. When false such an entry survives.
    pub same_id_replaces_overdue_repeating: bool,

    /// Cancelling an id also removes it from the stack, not only from the
    /// OS scheduler
    pub cancel_withdraws_staged: bool,
}

impl StackPolicy {
    fn from_raw(raw: RawStackConfig) -> Self {
        let defaults = Self::default();
        Self {
            same_id_replaces_overdue_repeating: raw
                .same_id_replaces_overdue_repeating
                .unwrap_or(defaults.same_id_replaces_overdue_repeating),
            cancel_withdraws_staged: raw
                .cancel_withdraws_staged
                .unwrap_or(defaults.cancel_withdraws_staged),
        }
    }

    /// Keep an overdue repeating entry when its id is staged again, and
    /// cancel OS registrations only
    pub fn legacy() -> Self {
        Self {
            same_id_replaces_overdue_repeating: false,
            cancel_withdraws_staged: false,
        }
    }
}

impl Default for StackPolicy {
    fn default() -> Self {
        Self {
            same_id_replaces_overdue_repeating: true,
            cancel_withdraws_staged: true,
        }
    }
}
