//! Default paths for notistack components
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/notistack/config.toml` or `~/.config/notistack/config.toml`
//! - Data: `$XDG_DATA_HOME/notistack` or `~/.local/share/notistack`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const NOTISTACK_DATA_DIR_ENV: &str = "NOTISTACK_DATA_DIR";

/// Database filename within the data directory
pub const STORE_FILENAME: &str = "notistack.db";

/// Application subdirectory name
const APP_DIR: &str = "notistack";

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$NOTISTACK_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/notistack` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/notistack` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(NOTISTACK_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking NOTISTACK_DATA_DIR.
fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/notistack/config.toml`
/// 2. `~/.config/notistack/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/tmp").join(APP_DIR).join("config.toml")
}
