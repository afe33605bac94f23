//! Android-style alarm table
//!
//! Registrations are keyed by integer id and must name a registered channel.
//! Scheduling an id that is already present overwrites it. The platform may
//! wipe the whole table at any time, which `simulate_platform_clear` models.

use chrono::{DateTime, Utc};
use notistack_api::{ChannelSpec, OsNotification, ScheduleStatus};
use notistack_host_api::{HostError, HostResult, NotificationScheduler, SchedulerCapabilities};
use notistack_util::{ChannelId, NotificationId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

use crate::delivery::lock;
use crate::{Delivery, EmulatedScheduler, next_fire_after};

#[derive(Debug, Clone)]
struct Alarm {
    notification: OsNotification,
    channel: ChannelId,
    interval: Option<Duration>,
    next_fire: DateTime<Utc>,
}

/// Emulated integer-keyed alarm table
pub struct AlarmTableScheduler {
    capabilities: SchedulerCapabilities,
    channels: Mutex<HashMap<ChannelId, ChannelSpec>>,
    alarms: Mutex<BTreeMap<NotificationId, Alarm>>,
    delivered: Mutex<HashSet<NotificationId>>,
}

impl AlarmTableScheduler {
    pub fn new() -> Self {
        Self {
            capabilities: SchedulerCapabilities::alarm_table(),
            channels: Mutex::new(HashMap::new()),
            alarms: Mutex::new(BTreeMap::new()),
            delivered: Mutex::new(HashSet::new()),
        }
    }

    pub fn channel(&self, id: &ChannelId) -> Option<ChannelSpec> {
        lock(&self.channels).get(id).cloned()
    }

    /// Ids with a pending alarm, in id order
    pub fn scheduled_ids(&self) -> Vec<NotificationId> {
        lock(&self.alarms).keys().copied().collect()
    }

    /// Next fire time for `id`, if an alarm is pending
    pub fn next_fire(&self, id: NotificationId) -> Option<DateTime<Utc>> {
        lock(&self.alarms).get(&id).map(|a| a.next_fire)
    }

    /// The platform drops every pending alarm, e.g. on app resume or reboot
    pub fn simulate_platform_clear(&self) {
        let mut alarms = lock(&self.alarms);
        info!(dropped = alarms.len(), "Platform cleared alarm table");
        alarms.clear();
    }

    fn insert(
        &self,
        notification: &OsNotification,
        channel: &ChannelId,
        id: NotificationId,
        interval: Option<Duration>,
    ) -> HostResult<()> {
        if !lock(&self.channels).contains_key(channel) {
            return Err(HostError::ChannelNotRegistered(channel.clone()));
        }

        let previous = lock(&self.alarms).insert(
            id,
            Alarm {
                notification: notification.clone(),
                channel: channel.clone(),
                interval,
                next_fire: notification.fire_time,
            },
        );
        lock(&self.delivered).remove(&id);

        debug!(
            id = %id,
            channel = %channel,
            fire_time = %notification.fire_time,
            repeating = interval.is_some(),
            replaced = previous.is_some(),
            "Alarm set"
        );
        Ok(())
    }
}

impl Default for AlarmTableScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationScheduler for AlarmTableScheduler {
    fn capabilities(&self) -> &SchedulerCapabilities {
        &self.capabilities
    }

    fn register_channel(&self, channel: &ChannelSpec) -> HostResult<()> {
        if channel.id.is_empty() {
            return Err(HostError::Internal("Channel id must not be empty".into()));
        }
        lock(&self.channels).insert(channel.id.clone(), channel.clone());
        debug!(channel = %channel.id, importance = ?channel.importance, "Channel registered");
        Ok(())
    }

    fn schedule_absolute(
        &self,
        notification: &OsNotification,
        channel: &ChannelId,
        id: NotificationId,
    ) -> HostResult<()> {
        self.insert(notification, channel, id, None)
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
        self.insert(notification, channel, id, Some(interval))
    }

    fn cancel(&self, id: NotificationId) -> HostResult<()> {
        let removed = lock(&self.alarms).remove(&id).is_some();
        lock(&self.delivered).remove(&id);
        debug!(id = %id, removed, "Alarm cancelled");
        Ok(())
    }

    fn cancel_all(&self) -> HostResult<()> {
        let mut alarms = lock(&self.alarms);
        info!(count = alarms.len(), "All alarms cancelled");
        alarms.clear();
        lock(&self.delivered).clear();
        Ok(())
    }

    fn query_status(&self, id: NotificationId) -> HostResult<ScheduleStatus> {
        if lock(&self.alarms).contains_key(&id) {
            return Ok(ScheduleStatus::Scheduled);
        }
        if lock(&self.delivered).contains(&id) {
            return Ok(ScheduleStatus::Delivered);
        }
        Ok(ScheduleStatus::Unknown)
    }
}

impl EmulatedScheduler for AlarmTableScheduler {
    fn deliver_due(&self, now: DateTime<Utc>) -> Vec<Delivery> {
        let mut alarms = lock(&self.alarms);
        let mut delivered = lock(&self.delivered);
        let mut deliveries = Vec::new();

        alarms.retain(|id, alarm| {
            if alarm.next_fire > now {
                return true;
            }

            deliveries.push(Delivery {
                id: *id,
                title: alarm.notification.title.clone(),
                body: alarm.notification.body.clone(),
                channel: alarm.channel.clone(),
                fired_at: alarm.next_fire,
                repeating: alarm.interval.is_some(),
            });

            match alarm.interval {
                Some(interval) => {
                    alarm.next_fire = next_fire_after(alarm.next_fire, interval, now);
                    true
                }
                None => {
                    delivered.insert(*id);
                    false
                }
            }
        });

        if !deliveries.is_empty() {
            debug!(count = deliveries.len(), "Alarms fired");
        }
        deliveries
    }

    fn as_scheduler(self: Arc<Self>) -> Arc<dyn NotificationScheduler> {
        self
    }
}
