//! Emulated platform schedulers for notistack
//!
//! Provides:
//! - `AlarmTableScheduler`: integer-keyed alarm table with channels, wiped
//!   wholesale by the platform
//! - `CalendarScheduler`: identifier-keyed pending-request list that must be
//!   told to cancel before re-adding an identifier
//! - `deliver_due(now)` on both, to emulate the OS firing notifications
//! - `for_platform()` to pick one from configuration

mod alarm;
mod calendar;
mod delivery;

pub use alarm::*;
pub use calendar::*;
pub use delivery::*;

use notistack_api::Platform;
use notistack_host_api::NotificationScheduler;
use std::sync::Arc;

/// An emulated scheduler that can also be driven forward in time
pub trait EmulatedScheduler: NotificationScheduler {
    /// Fire everything due at or before `now`
    fn deliver_due(&self, now: chrono::DateTime<chrono::Utc>) -> Vec<Delivery>;

    /// The same scheduler, seen only through the OS boundary
    fn as_scheduler(self: Arc<Self>) -> Arc<dyn NotificationScheduler>;
}

/// Build the emulated scheduler for `platform`
pub fn for_platform(platform: Platform) -> Arc<dyn EmulatedScheduler> {
    match platform {
        Platform::Android => Arc::new(AlarmTableScheduler::new()),
        Platform::Ios => Arc::new(CalendarScheduler::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_platform_matches_capabilities() {
        for platform in [Platform::Android, Platform::Ios] {
            let scheduler = for_platform(platform).as_scheduler();
            assert_eq!(scheduler.capabilities().platform, platform);
        }
    }
}
