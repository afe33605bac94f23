//! iOS-style pending-request list
//!
//! Requests are keyed by identifier strings. Adding a request whose
//! identifier is already pending does not replace it: both stay pending.
//! The capabilities say so, and `schedule_replacing` cancels first. Status
//! is answered by scanning the pending and delivered lists, as the platform
//! offers no direct lookup.

use chrono::{DateTime, Utc};
use notistack_api::{ChannelSpec, OsNotification, ScheduleStatus};
use notistack_host_api::{HostError, HostResult, NotificationScheduler, SchedulerCapabilities};
use notistack_util::{ChannelId, NotificationId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

use crate::delivery::lock;
use crate::{Delivery, EmulatedScheduler, next_fire_after};

#[derive(Debug, Clone)]
struct PendingRequest {
    identifier: String,
    notification: OsNotification,
    category: ChannelId,
    interval: Option<Duration>,
    next_fire: DateTime<Utc>,
}

/// Emulated identifier-keyed notification center
pub struct CalendarScheduler {
    capabilities: SchedulerCapabilities,
    categories: Mutex<HashSet<ChannelId>>,
    pending: Mutex<Vec<PendingRequest>>,
    delivered: Mutex<Vec<String>>,
}

impl CalendarScheduler {
    pub fn new() -> Self {
        Self {
            capabilities: SchedulerCapabilities::calendar(),
            categories: Mutex::new(HashSet::new()),
            pending: Mutex::new(Vec::new()),
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Identifiers of pending requests, in the order they were added
    pub fn pending_identifiers(&self) -> Vec<String> {
        lock(&self.pending)
            .iter()
            .map(|r| r.identifier.clone())
            .collect()
    }

    pub fn has_category(&self, id: &ChannelId) -> bool {
        lock(&self.categories).contains(id)
    }

    fn remove_identifier(&self, identifier: &str) -> bool {
        let mut pending = lock(&self.pending);
        let before = pending.len();
        pending.retain(|r| r.identifier != identifier);
        lock(&self.delivered).retain(|d| d != identifier);
        pending.len() != before
    }

    fn add(
        &self,
        notification: &OsNotification,
        channel: &ChannelId,
        id: NotificationId,
        interval: Option<Duration>,
    ) {
        let identifier = id.as_identifier();
        // A re-added identifier is no longer reported as delivered
        lock(&self.delivered).retain(|d| *d != identifier);

        let mut pending = lock(&self.pending);
        let duplicates = pending.iter().filter(|r| r.identifier == identifier).count();
        pending.push(PendingRequest {
            identifier: identifier.clone(),
            notification: notification.clone(),
            category: channel.clone(),
            interval,
            next_fire: notification.fire_time,
        });

        debug!(
            identifier = %identifier,
            fire_time = %notification.fire_time,
            repeating = interval.is_some(),
            duplicates,
            "Request added"
        );
    }
}

impl Default for CalendarScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationScheduler for CalendarScheduler {
    fn capabilities(&self) -> &SchedulerCapabilities {
        &self.capabilities
    }

    fn register_channel(&self, channel: &ChannelSpec) -> HostResult<()> {
        // Categories are optional on this platform
        lock(&self.categories).insert(channel.id.clone());
        Ok(())
    }

    fn schedule_absolute(
        &self,
        notification: &OsNotification,
        channel: &ChannelId,
        id: NotificationId,
    ) -> HostResult<()> {
        self.add(notification, channel, id, None);
        Ok(())
    }

    fn schedule_repeating(
        &self,
        notification: &OsNotification,
        channel: &ChannelId,
        id: NotificationId,
        interval: Duration,
    ) -> HostResult<()> {
        if interval.is_zero() {
            return Err(HostError::ScheduleFailed {
                id,
                reason: "repeat interval must be non-zero".into(),
            });
        }
        self.add(notification, channel, id, Some(interval));
        Ok(())
    }

    fn cancel(&self, id: NotificationId) -> HostResult<()> {
        let removed = self.remove_identifier(&id.as_identifier());
        debug!(id = %id, removed, "Request removed");
        Ok(())
    }

    fn cancel_all(&self) -> HostResult<()> {
        let mut pending = lock(&self.pending);
        info!(count = pending.len(), "All requests removed");
        pending.clear();
        lock(&self.delivered).clear();
        Ok(())
    }

    fn query_status(&self, id: NotificationId) -> HostResult<ScheduleStatus> {
        let identifier = id.as_identifier();

        if lock(&self.pending).iter().any(|r| r.identifier == identifier) {
            return Ok(ScheduleStatus::Scheduled);
        }
        if lock(&self.delivered).iter().any(|d| *d == identifier) {
            return Ok(ScheduleStatus::Delivered);
        }
        Ok(ScheduleStatus::Unknown)
    }
}

impl EmulatedScheduler for CalendarScheduler {
    fn deliver_due(&self, now: DateTime<Utc>) -> Vec<Delivery> {
        let mut pending = lock(&self.pending);
        let mut delivered = lock(&self.delivered);
        let mut deliveries = Vec::new();

        pending.retain_mut(|request| {
            if request.next_fire > now {
                return true;
            }

            let id = request
                .identifier
                .parse()
                .unwrap_or(NotificationId::UNMAPPED);
            deliveries.push(Delivery {
                id,
                title: request.notification.title.clone(),
                body: request.notification.body.clone(),
                channel: request.category.clone(),
                fired_at: request.next_fire,
                repeating: request.interval.is_some(),
            });

            match request.interval {
                Some(interval) => {
                    request.next_fire = next_fire_after(request.next_fire, interval, now);
                    true
                }
                None => {
                    delivered.push(request.identifier.clone());
                    false
                }
            }
        });

        deliveries
    }

    fn as_scheduler(self: Arc<Self>) -> Arc<dyn NotificationScheduler> {
        self
    }
}
