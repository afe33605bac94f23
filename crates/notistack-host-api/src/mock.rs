//! Mock scheduler for testing

use chrono::{DateTime, Utc};
use notistack_api::{ChannelSpec, OsNotification, ScheduleStatus};
use notistack_util::{ChannelId, NotificationId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::{HostError, HostResult, NotificationScheduler, SchedulerCapabilities};

/// One call made against the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerCall {
    RegisterChannel(ChannelId),
    ScheduleAbsolute {
        id: NotificationId,
        channel: ChannelId,
        fire_time: DateTime<Utc>,
    },
    ScheduleRepeating {
        id: NotificationId,
        channel: ChannelId,
        fire_time: DateTime<Utc>,
        interval: Duration,
    },
    Cancel(NotificationId),
    CancelAll,
    QueryStatus(NotificationId),
}

impl SchedulerCall {
    pub fn is_schedule(&self) -> bool {
        matches!(
            self,
            SchedulerCall::ScheduleAbsolute { .. } | SchedulerCall::ScheduleRepeating { .. }
        )
    }
}

/// A live registration held by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRegistration {
    pub notification: OsNotification,
    pub channel: ChannelId,
    pub interval: Option<Duration>,
    pub status: ScheduleStatus,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock scheduler for unit/integration testing
pub struct MockScheduler {
    capabilities: SchedulerCapabilities,
    calls: Arc<Mutex<Vec<SchedulerCall>>>,
    registrations: Arc<Mutex<HashMap<NotificationId, MockRegistration>>>,
    channels: Arc<Mutex<HashSet<ChannelId>>>,

    /// Configure every schedule call to fail
    pub fail_schedule: Arc<Mutex<bool>>,

    /// Configure schedule calls for specific ids to fail
    pub fail_schedule_ids: Arc<Mutex<HashSet<NotificationId>>>,

    /// Configure cancel and cancel_all to fail
    pub fail_cancel: Arc<Mutex<bool>>,

    /// Configure status queries to fail
    pub fail_query: Arc<Mutex<bool>>,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self {
            capabilities: SchedulerCapabilities::alarm_table(),
            calls: Arc::new(Mutex::new(Vec::new())),
            registrations: Arc::new(Mutex::new(HashMap::new())),
            channels: Arc::new(Mutex::new(HashSet::new())),
            fail_schedule: Arc::new(Mutex::new(false)),
            fail_schedule_ids: Arc::new(Mutex::new(HashSet::new())),
            fail_cancel: Arc::new(Mutex::new(false)),
            fail_query: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_capabilities(mut self, caps: SchedulerCapabilities) -> Self {
        self.capabilities = caps;
        self
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<SchedulerCall> {
        lock(&self.calls).clone()
    }

    /// Only the schedule calls, absolute and repeating
    pub fn schedule_calls(&self) -> Vec<SchedulerCall> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.is_schedule())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Ids with a live registration, sorted
    pub fn registered_ids(&self) -> Vec<NotificationId> {
        let mut ids: Vec<_> = lock(&self.registrations)
            .iter()
            .filter(|(_, r)| r.status.is_scheduled())
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn registration(&self, id: NotificationId) -> Option<MockRegistration> {
        lock(&self.registrations).get(&id).cloned()
    }

    pub fn is_channel_registered(&self, channel: &ChannelId) -> bool {
        lock(&self.channels).contains(channel)
    }

    /// Simulate the OS delivering `id`
    pub fn simulate_delivery(&self, id: NotificationId) {
        if let Some(reg) = lock(&self.registrations).get_mut(&id) {
            reg.status = ScheduleStatus::Delivered;
        }
    }

    /// Simulate the OS dropping every registration without being asked
    pub fn simulate_platform_clear(&self) {
        lock(&self.registrations).clear();
    }

    pub fn set_fail_schedule_for(&self, id: NotificationId, fail: bool) {
        let mut ids = lock(&self.fail_schedule_ids);
        if fail {
            ids.insert(id);
        } else {
            ids.remove(&id);
        }
    }

    fn record(&self, call: SchedulerCall) {
        lock(&self.calls).push(call);
    }

    fn check_schedule(&self, id: NotificationId) -> HostResult<()> {
        if *lock(&self.fail_schedule) || lock(&self.fail_schedule_ids).contains(&id) {
            return Err(HostError::ScheduleFailed {
                id,
                reason: "Mock schedule failure".into(),
            });
        }
        Ok(())
    }

    fn insert(
        &self,
        notification: &OsNotification,
        channel: &ChannelId,
        id: NotificationId,
        interval: Option<Duration>,
    ) {
        lock(&self.registrations).insert(
            id,
            MockRegistration {
                notification: notification.clone(),
                channel: channel.clone(),
                interval,
                status: ScheduleStatus::Scheduled,
            },
        );
    }
}

impl Default for MockScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationScheduler for MockScheduler {
    fn capabilities(&self) -> &SchedulerCapabilities {
        &self.capabilities
    }

    fn register_channel(&self, channel: &ChannelSpec) -> HostResult<()> {
        self.record(SchedulerCall::RegisterChannel(channel.id.clone()));
        lock(&self.channels).insert(channel.id.clone());
        Ok(())
    }

    fn schedule_absolute(
        &self,
        notification: &OsNotification,
        channel: &ChannelId,
        id: NotificationId,
    ) -> HostResult<()> {
        self.record(SchedulerCall::ScheduleAbsolute {
            id,
            channel: channel.clone(),
            fire_time: notification.fire_time,
        });
        self.check_schedule(id)?;
        self.insert(notification, channel, id, None);
        Ok(())
    }

    fn schedule_repeating(
        &self,
        notification: &OsNotification,
        channel: &ChannelId,
        id: NotificationId,
        interval: Duration,
    ) -> HostResult<()> {
        self.record(SchedulerCall::ScheduleRepeating {
            id,
            channel: channel.clone(),
            fire_time: notification.fire_time,
            interval,
        });
        self.check_schedule(id)?;
        self.insert(notification, channel, id, Some(interval));
        Ok(())
    }

    fn cancel(&self, id: NotificationId) -> HostResult<()> {
        self.record(SchedulerCall::Cancel(id));
        if *lock(&self.fail_cancel) {
            return Err(HostError::CancelFailed("Mock cancel failure".into()));
        }
        lock(&self.registrations).remove(&id);
        Ok(())
    }

    fn cancel_all(&self) -> HostResult<()> {
        self.record(SchedulerCall::CancelAll);
        if *lock(&self.fail_cancel) {
            return Err(HostError::CancelFailed("Mock cancel-all failure".into()));
        }
        lock(&self.registrations).clear();
        Ok(())
    }

    fn query_status(&self, id: NotificationId) -> HostResult<ScheduleStatus> {
        self.record(SchedulerCall::QueryStatus(id));
        if *lock(&self.fail_query) {
            return Err(HostError::QueryFailed("Mock query failure".into()));
        }
        Ok(lock(&self.registrations)
            .get(&id)
            .map(|r| r.status)
            .unwrap_or(ScheduleStatus::Unknown))
    }
}
