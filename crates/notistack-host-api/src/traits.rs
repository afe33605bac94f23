//! Scheduler adapter traits

use notistack_api::{ChannelSpec, OsNotification, ScheduleStatus};
use notistack_util::{ChannelId, NotificationId};
use std::time::Duration;
use thiserror::Error;

use crate::SchedulerCapabilities;

/// Errors from OS scheduler operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Channel not registered: {0}")]
    ChannelNotRegistered(ChannelId),

    #[error("Schedule failed for {id}: {reason}")]
    ScheduleFailed { id: NotificationId, reason: String },

    #[error("Cancel failed: {0}")]
    CancelFailed(String),

    #[error("Status query failed: {0}")]
    QueryFailed(String),

    #[error("Unsupported by this scheduler: {0}")]
    Unsupported(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Platform notification service, seen from the stack core.
///
/// Every call is synchronous from the caller's point of view. Implementations
/// use interior mutability; the core only ever holds a shared reference.
///
/// Scheduling an id that already has a registration replaces it only when
/// `capabilities().replaces_on_schedule` is set. [`schedule_replacing`] gives
/// replace semantics on every scheduler.
pub trait NotificationScheduler: Send + Sync {
    /// Get the capabilities of this scheduler
    fn capabilities(&self) -> &SchedulerCapabilities;

    /// Register a presentation channel. Idempotent.
    fn register_channel(&self, channel: &ChannelSpec) -> HostResult<()>;

    /// Register a single delivery at `notification.fire_time`
    fn schedule_absolute(
        &self,
        notification: &OsNotification,
        channel: &ChannelId,
        id: NotificationId,
    ) -> HostResult<()>;

    /// Register a series starting at `notification.fire_time`
    fn schedule_repeating(
        &self,
        notification: &OsNotification,
        channel: &ChannelId,
        id: NotificationId,
        interval: Duration,
    ) -> HostResult<()>;

    /// Cancel the registration for `id`. No-op if there is none.
    fn cancel(&self, id: NotificationId) -> HostResult<()>;

    /// Cancel every registration, whoever made it
    fn cancel_all(&self) -> HostResult<()>;

    /// Live status of `id`
    fn query_status(&self, id: NotificationId) -> HostResult<ScheduleStatus>;

    /// Optional: check if the scheduler is reachable
    fn is_healthy(&self) -> bool {
        true
    }
}

/// Register `notification` under `id`, leaving exactly one registration for
/// it. A `Some` interval registers a repeating series.
///
/// Cancels first when the scheduler does not replace on its own.
pub fn schedule_replacing(
    scheduler: &dyn NotificationScheduler,
    notification: &OsNotification,
    channel: &ChannelId,
    id: NotificationId,
    interval: Option<Duration>,
) -> HostResult<()> {
    let caps = scheduler.capabilities();
    if interval.is_some() && !caps.supports_repeating {
        return Err(HostError::Unsupported(format!(
            "repeating notification {id} on {}",
            caps.platform
        )));
    }

    if !caps.replaces_on_schedule {
        scheduler.cancel(id)?;
    }

    match interval {
        Some(interval) => scheduler.schedule_repeating(notification, channel, id, interval),
        None => scheduler.schedule_absolute(notification, channel, id),
    }
}
