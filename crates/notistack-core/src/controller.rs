//! Per-platform controllers
//!
//! [`StackController`] serves schedulers that may lose their registrations:
//! sends are staged locally and replayed into the OS on pause.
//! [`DirectController`] serves schedulers that keep their own state: sends go
//! straight to the OS and lifecycle transitions are ignored.

use chrono::{DateTime, Utc};
use notistack_api::{ChannelSpec, Platform, SendRequest, StackEntry};
use notistack_config::StackPolicy;
use notistack_host_api::{NotificationScheduler, schedule_replacing};
use notistack_store::StackPersistence;
use notistack_util::NotificationId;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{CoreEvent, CoreResult, LifecycleEvent, NotificationStack, cancel_if_scheduled};

/// Build the stack entry for a send request. Relative fire times are
/// resolved against `now` here, once.
pub fn entry_from_request(
    request: &SendRequest,
    channel: &ChannelSpec,
    now: DateTime<Utc>,
) -> StackEntry {
    let mut entry = StackEntry::new(
        request.target.id(),
        request.title.clone(),
        request.body.clone(),
        request.when.resolve(now),
        channel.id.clone(),
    );
    entry.repeat_interval = request.repeat_interval();
    entry
}

/// Operations the facade dispatches to the active platform
pub trait PlatformController: Send {
    fn platform(&self) -> Platform;

    /// Accept a notification request
    fn send(&mut self, request: &SendRequest, now: DateTime<Utc>) -> CoreResult<Vec<CoreEvent>>;

    /// Cancel `id`. True if anything was cancelled.
    fn cancel(&mut self, id: NotificationId) -> CoreResult<bool>;

    /// Whether the OS currently holds a live registration for `id`
    fn is_scheduled(&self, id: NotificationId) -> CoreResult<bool>;

    /// Cancel every notification
    fn cancel_all(&mut self) -> CoreResult<Vec<CoreEvent>>;

    /// React to an app lifecycle transition
    fn on_lifecycle(
        &mut self,
        event: LifecycleEvent,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<CoreEvent>>;

    /// Locally staged entries, if this platform keeps any
    fn pending(&self) -> Vec<StackEntry>;
}

/// Controller for schedulers that are cleared wholesale
pub struct StackController {
    stack: NotificationStack,
    scheduler: Arc<dyn NotificationScheduler>,
    channel: ChannelSpec,
}

impl StackController {
    /// Register the channel and load the stack
    pub fn new(
        persistence: Arc<dyn StackPersistence>,
        scheduler: Arc<dyn NotificationScheduler>,
        channel: ChannelSpec,
        policy: StackPolicy,
    ) -> CoreResult<Self> {
        scheduler.register_channel(&channel)?;
        let stack = NotificationStack::load(persistence, scheduler.clone(), policy)?;

        info!(
            channel = %channel.id,
            staged = stack.len(),
            "Stack controller ready"
        );

        Ok(Self {
            stack,
            scheduler,
            channel,
        })
    }

    pub fn stack(&self) -> &NotificationStack {
        &self.stack
    }

    fn flush(&mut self, now: DateTime<Utc>) -> CoreResult<Vec<CoreEvent>> {
        // Registration may have been lost along with the alarms
        if let Err(e) = self.scheduler.register_channel(&self.channel) {
            warn!(channel = %self.channel.id, error = %e, "Channel registration failed");
        }

        let report = self.stack.flush_to_os(now)?;
        Ok(vec![CoreEvent::Flushed(report)])
    }
}

impl PlatformController for StackController {
    fn platform(&self) -> Platform {
        self.scheduler.capabilities().platform
    }

    fn send(&mut self, request: &SendRequest, now: DateTime<Utc>) -> CoreResult<Vec<CoreEvent>> {
        let entry = entry_from_request(request, &self.channel, now);
        self.stack.stage(entry, now)
    }

    /// Withdraws the staged entry before asking the OS. If the OS query or
    /// cancel then fails, the withdrawal stands and the error is returned.
    fn cancel(&mut self, id: NotificationId) -> CoreResult<bool> {
        let withdrawn = if self.stack.policy().cancel_withdraws_staged {
            !self.stack.withdraw(id)?.is_empty()
        } else {
            false
        };
        let cancelled = self.stack.cancel_if_scheduled(id)?;

        debug!(id = %id, withdrawn, cancelled, "Cancel requested");
        Ok(withdrawn || cancelled)
    }

    fn is_scheduled(&self, id: NotificationId) -> CoreResult<bool> {
        Ok(self.scheduler.query_status(id)?.is_scheduled())
    }

    fn cancel_all(&mut self) -> CoreResult<Vec<CoreEvent>> {
        let mut events = self.stack.clear()?;
        self.scheduler.cancel_all()?;

        info!(cleared = events.len(), "All notifications cancelled");
        events.push(CoreEvent::CancelledAll);
        Ok(events)
    }

    fn on_lifecycle(
        &mut self,
        event: LifecycleEvent,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<CoreEvent>> {
        match event {
            LifecycleEvent::Paused => self.flush(now),
            LifecycleEvent::Resumed => {
                let staged = self.stack.reset()?;
                Ok(vec![CoreEvent::Reset { staged }])
            }
        }
    }

    fn pending(&self) -> Vec<StackEntry> {
        self.stack.entries().to_vec()
    }
}

/// Controller for schedulers that keep their own registrations
pub struct DirectController {
    scheduler: Arc<dyn NotificationScheduler>,
    channel: ChannelSpec,
}

impl DirectController {
    pub fn new(scheduler: Arc<dyn NotificationScheduler>, channel: ChannelSpec) -> CoreResult<Self> {
        scheduler.register_channel(&channel)?;
        info!(channel = %channel.id, "Direct controller ready");
        Ok(Self { scheduler, channel })
    }
}

impl PlatformController for DirectController {
    fn platform(&self) -> Platform {
        self.scheduler.capabilities().platform
    }

    fn send(&mut self, request: &SendRequest, now: DateTime<Utc>) -> CoreResult<Vec<CoreEvent>> {
        let entry = entry_from_request(request, &self.channel, now);
        schedule_replacing(
            self.scheduler.as_ref(),
            &entry.to_os_notification(),
            &entry.channel_id,
            entry.id,
            entry.effective_repeat(),
        )?;

        debug!(id = %entry.id, fire_time = %entry.fire_time, "Notification scheduled directly");
        Ok(vec![CoreEvent::Scheduled {
            id: entry.id,
            fire_time: entry.fire_time,
            repeating: entry.has_repeat(),
        }])
    }

    fn cancel(&mut self, id: NotificationId) -> CoreResult<bool> {
        Ok(cancel_if_scheduled(self.scheduler.as_ref(), id)?)
    }

    fn is_scheduled(&self, id: NotificationId) -> CoreResult<bool> {
        Ok(self.scheduler.query_status(id)?.is_scheduled())
    }

    fn cancel_all(&mut self) -> CoreResult<Vec<CoreEvent>> {
        self.scheduler.cancel_all()?;
        info!("All notifications cancelled");
        Ok(vec![CoreEvent::CancelledAll])
    }

    fn on_lifecycle(
        &mut self,
        event: LifecycleEvent,
        _now: DateTime<Utc>,
    ) -> CoreResult<Vec<CoreEvent>> {
        debug!(?event, "Lifecycle ignored, scheduler keeps its own state");
        Ok(Vec::new())
    }

    fn pending(&self) -> Vec<StackEntry> {
        Vec::new()
    }
}
