//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Channel every staged notification is presented on
    #[serde(default)]
    pub channel: RawChannelConfig,

    /// Stack eviction rules
    #[serde(default)]
    pub stack: RawStackConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// "android" or "ios"
    pub platform: Option<String>,

    /// Data directory for the store
    pub data_dir: Option<PathBuf>,

    /// Key the stack is persisted under
    pub store_key: Option<String>,
}

/// Notification channel definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawChannelConfig {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,

    /// "none", "min", "low", "default" or "high"
    pub importance: Option<String>,
}

/// Stack eviction rules
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawStackConfig {
    /// Staging an id replaces an earlier entry with that id even when the
    /// earlier entry is overdue and repeating (default: true)
    pub same_id_replaces_overdue_repeating: Option<bool>,

    /// Cancelling an id also withdraws it from the stack (default: true)
    pub cancel_withdraws_staged: Option<bool>,
}
