//! Scheduler capabilities model

use notistack_api::Platform;
use serde::{Deserialize, Serialize};

/// Describes what a platform notification service does on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerCapabilities {
    /// Platform this scheduler drives
    pub platform: Platform,

    /// Scheduling an existing id replaces it without an explicit cancel
    pub replaces_on_schedule: bool,

    /// The OS may wipe every registration behind our back (e.g. on resume or
    /// reboot), so registrations must be rebuilt from a local stack
    pub may_clear_registrations: bool,

    /// Can register a repeating series natively
    pub supports_repeating: bool,
}

impl SchedulerCapabilities {
    /// Integer-keyed alarm table that the OS clears wholesale
    pub fn alarm_table() -> Self {
        Self {
            platform: Platform::Android,
            replaces_on_schedule: true,
            may_clear_registrations: true,
            supports_repeating: true,
        }
    }

    /// Identifier-keyed pending list that survives backgrounding
    pub fn calendar() -> Self {
        Self {
            platform: Platform::Ios,
            replaces_on_schedule: false,
            may_clear_registrations: false,
            supports_repeating: true,
        }
    }

    /// Capabilities typical for `platform`
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Android => Self::alarm_table(),
            Platform::Ios => Self::calendar(),
        }
    }

    /// Whether the caller must keep its own stack and replay it
    pub fn needs_local_stack(&self) -> bool {
        self.may_clear_registrations
    }
}

impl Default for SchedulerCapabilities {
    fn default() -> Self {
        Self::alarm_table()
    }
}
