//! Application-facing facade
//!
//! Routes every call to the controller for the active platform. Holds no
//! notification state of its own.

use chrono::{DateTime, Utc};
use notistack_api::{FireAt, Platform, SendRequest, StackEntry, Target};
use notistack_config::Config;
use notistack_host_api::NotificationScheduler;
use notistack_store::StackPersistence;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::{
    CoreEvent, CoreResult, DirectController, LifecycleEvent, PlatformController, StackController,
};

pub struct NotificationFacade {
    controller: Box<dyn PlatformController>,
}

impl NotificationFacade {
    pub fn new(controller: Box<dyn PlatformController>) -> Self {
        Self { controller }
    }

    /// Pick the controller the scheduler needs: a local stack when the OS
    /// may drop registrations, direct scheduling otherwise
    pub fn for_config(
        config: &Config,
        persistence: Arc<dyn StackPersistence>,
        scheduler: Arc<dyn NotificationScheduler>,
    ) -> CoreResult<Self> {
        let caps = scheduler.capabilities();
        if caps.platform != config.service.platform {
            warn!(
                configured = %config.service.platform,
                scheduler = %caps.platform,
                "Scheduler platform differs from configuration"
            );
        }

        let controller: Box<dyn PlatformController> = if caps.needs_local_stack() {
            Box::new(StackController::new(
                persistence,
                scheduler,
                config.channel.clone(),
                config.stack,
            )?)
        } else {
            Box::new(DirectController::new(scheduler, config.channel.clone())?)
        };
        Ok(Self::new(controller))
    }

    pub fn platform(&self) -> Platform {
        self.controller.platform()
    }

    /// Send a notification.
    ///
    /// `repeat` only takes effect with a non-zero `interval`.
    #[allow(clippy::too_many_arguments)]
    pub fn send(
        &mut self,
        title: impl Into<String>,
        body: impl Into<String>,
        when: FireAt,
        target: impl Into<Target>,
        repeat: bool,
        interval: Option<Duration>,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<CoreEvent>> {
        let mut request = SendRequest::new(title, body, when, target);
        request.repeat = repeat;
        request.interval = interval;
        self.send_request(&request, now)
    }

    pub fn send_request(
        &mut self,
        request: &SendRequest,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<CoreEvent>> {
        self.controller.send(request, now)
    }

    pub fn cancel(&mut self, target: impl Into<Target>) -> CoreResult<bool> {
        self.controller.cancel(target.into().id())
    }

    pub fn is_scheduled(&self, target: impl Into<Target>) -> CoreResult<bool> {
        self.controller.is_scheduled(target.into().id())
    }

    pub fn cancel_all(&mut self) -> CoreResult<Vec<CoreEvent>> {
        self.controller.cancel_all()
    }

    /// Entering background
    pub fn on_pause(&mut self, now: DateTime<Utc>) -> CoreResult<Vec<CoreEvent>> {
        self.controller.on_lifecycle(LifecycleEvent::Paused, now)
    }

    /// Returning to foreground
    pub fn on_resume(&mut self, now: DateTime<Utc>) -> CoreResult<Vec<CoreEvent>> {
        self.controller.on_lifecycle(LifecycleEvent::Resumed, now)
    }

    /// Locally staged entries
    pub fn pending(&self) -> Vec<StackEntry> {
        self.controller.pending()
    }
}
