//! Shared utilities for notistack
//!
//! This crate provides:
//! - ID types (NotificationId, ChannelId)
//! - Wall-clock helpers (epoch encoding, mock time for development)
//! - Default paths for config and data directories

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
