//! The notification stack
//!
//! An ordered list of pending notifications that is the source of truth for
//! what the OS scheduler should hold. Every mutation is written through to
//! persistence before it becomes visible in memory, so the in-memory and
//! persisted copies never disagree once a call returns.
//!
//! The OS scheduler is never trusted. It is rebuilt from the stack on every
//! pause ([`NotificationStack::flush_to_os`]) and discarded on every resume
//! ([`NotificationStack::reset`]).

use chrono::{DateTime, Utc};
use notistack_api::StackEntry;
use notistack_config::StackPolicy;
use notistack_host_api::{HostResult, NotificationScheduler, schedule_replacing};
use notistack_store::StackPersistence;
use notistack_util::NotificationId;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{CoreEvent, CoreResult, EvictionReason, FlushFailure, FlushReport};

/// Cancel `id` if, and only if, the OS reports it as scheduled
pub fn cancel_if_scheduled(
    scheduler: &dyn NotificationScheduler,
    id: NotificationId,
) -> HostResult<bool> {
    if !scheduler.query_status(id)?.is_scheduled() {
        debug!(id = %id, "Not scheduled, nothing to cancel");
        return Ok(false);
    }

    scheduler.cancel(id)?;
    debug!(id = %id, "Scheduled notification cancelled");
    Ok(true)
}

/// In-memory stack backed by persistence and replayed into the OS scheduler
pub struct NotificationStack {
    entries: Vec<StackEntry>,
    persistence: Arc<dyn StackPersistence>,
    scheduler: Arc<dyn NotificationScheduler>,
    policy: StackPolicy,
}

impl NotificationStack {
    /// Build the stack from whatever is persisted
    pub fn load(
        persistence: Arc<dyn StackPersistence>,
        scheduler: Arc<dyn NotificationScheduler>,
        policy: StackPolicy,
    ) -> CoreResult<Self> {
        let entries = persistence.load()?;
        debug!(count = entries.len(), "Notification stack loaded");

        Ok(Self {
            entries,
            persistence,
            scheduler,
            policy,
        })
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn policy(&self) -> StackPolicy {
        self.policy
    }

    /// Persist `next`, then make it the in-memory stack
    fn commit(&mut self, next: Vec<StackEntry>) -> CoreResult<()> {
        self.persistence.save(&next)?;
        self.entries = next;
        Ok(())
    }

    /// Why staging `incoming` would evict `existing`, if it would
    fn stage_eviction(
        &self,
        existing: &StackEntry,
        incoming: &StackEntry,
        now: DateTime<Utc>,
    ) -> Option<EvictionReason> {
        if existing.id == incoming.id {
            let keeps_overdue_repeat = !self.policy.same_id_replaces_overdue_repeating
                && existing.is_overdue(now)
                && existing.has_repeat();
            if !keeps_overdue_repeat {
                return Some(EvictionReason::ReplacedById);
            }
        }

        if existing.is_stale(now) {
            return Some(EvictionReason::Overdue);
        }

        None
    }

    /// Append `entry`, evicting same-id and stale entries, and persist.
    ///
    /// Returns the evictions followed by the `Staged` event. On a persistence
    /// failure nothing changes in memory.
    pub fn stage(&mut self, entry: StackEntry, now: DateTime<Utc>) -> CoreResult<Vec<CoreEvent>> {
        let mut events = Vec::new();
        let mut next = Vec::with_capacity(self.entries.len() + 1);

        for existing in &self.entries {
            match self.stage_eviction(existing, &entry, now) {
                Some(reason) => {
                    debug!(id = %existing.id, %reason, "Evicting on stage");
                    events.push(CoreEvent::evicted(existing.id, reason));
                }
                None => next.push(existing.clone()),
            }
        }

        let staged = CoreEvent::Staged {
            id: entry.id,
            fire_time: entry.fire_time,
            repeating: entry.has_repeat(),
        };
        debug!(
            id = %entry.id,
            fire_time = %entry.fire_time,
            repeating = entry.has_repeat(),
            evicted = events.len(),
            "Staging notification"
        );
        next.push(entry);

        self.commit(next)?;
        events.push(staged);
        Ok(events)
    }

    /// Prune stale entries, persist, then register every survivor with the
    /// OS scheduler.
    ///
    /// A scheduler failure for one entry is logged and reported; the entry
    /// stays staged and the rest are still scheduled. Persistence failures
    /// abort before anything is scheduled.
    pub fn flush_to_os(&mut self, now: DateTime<Utc>) -> CoreResult<FlushReport> {
        let mut report = FlushReport::default();

        let (stale, kept): (Vec<_>, Vec<_>) =
            self.entries.iter().cloned().partition(|e| e.is_stale(now));
        for entry in &stale {
            debug!(id = %entry.id, fire_time = %entry.fire_time, "Pruning overdue notification");
            report
                .evicted
                .push(CoreEvent::evicted(entry.id, EvictionReason::Overdue));
        }
        self.commit(kept)?;

        for entry in &self.entries {
            let interval = entry.effective_repeat();
            let result = schedule_replacing(
                self.scheduler.as_ref(),
                &entry.to_os_notification(),
                &entry.channel_id,
                entry.id,
                interval,
            );

            match result {
                Ok(()) if interval.is_some() => report.scheduled_repeating += 1,
                Ok(()) => report.scheduled_absolute += 1,
                Err(e) => {
                    warn!(id = %entry.id, error = %e, "Failed to schedule notification");
                    report.failed.push(FlushFailure {
                        id: entry.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            evicted = report.evicted.len(),
            scheduled = report.scheduled(),
            failed = report.failed.len(),
            "Stack flushed to OS scheduler"
        );
        Ok(report)
    }

    /// Drop every OS registration and reload the stack from persistence.
    ///
    /// Returns the number of staged entries after the reload.
    pub fn reset(&mut self) -> CoreResult<usize> {
        self.scheduler.cancel_all()?;
        self.entries = self.persistence.load()?;

        info!(staged = self.entries.len(), "OS schedule reset");
        Ok(self.entries.len())
    }

    /// Cancel `id` in the OS scheduler if it is live there. The stack is not
    /// touched; see [`NotificationStack::withdraw`].
    pub fn cancel_if_scheduled(&self, id: NotificationId) -> CoreResult<bool> {
        Ok(cancel_if_scheduled(self.scheduler.as_ref(), id)?)
    }

    /// Remove every entry with `id` from the stack and persist
    pub fn withdraw(&mut self, id: NotificationId) -> CoreResult<Vec<CoreEvent>> {
        if !self.contains(id) {
            return Ok(Vec::new());
        }

        let next: Vec<_> = self.entries.iter().filter(|e| e.id != id).cloned().collect();
        let removed = self.entries.len() - next.len();
        self.commit(next)?;

        debug!(id = %id, removed, "Notification withdrawn from stack");
        Ok(vec![CoreEvent::evicted(id, EvictionReason::Withdrawn); removed])
    }

    /// Remove every entry and persist the empty stack
    pub fn clear(&mut self) -> CoreResult<Vec<CoreEvent>> {
        let events = self
            .entries
            .iter()
            .map(|e| CoreEvent::evicted(e.id, EvictionReason::Cleared))
            .collect();
        self.commit(Vec::new())?;

        debug!("Notification stack cleared");
        Ok(events)
    }
}
