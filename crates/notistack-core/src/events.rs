//! Core events emitted by the stack and controllers

use chrono::{DateTime, Utc};
use notistack_util::NotificationId;
use std::fmt;

/// Why an entry left the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionReason {
    /// A newer entry with the same id was staged
    ReplacedById,
    /// Fire time passed and the entry does not repeat
    Overdue,
    /// Cancelled by id
    Withdrawn,
    /// The whole stack was cleared
    Cleared,
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvictionReason::ReplacedById => "replaced_by_id",
            EvictionReason::Overdue => "overdue",
            EvictionReason::Withdrawn => "withdrawn",
            EvictionReason::Cleared => "cleared",
        };
        f.write_str(s)
    }
}

/// App lifecycle transitions the controllers react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Entering background
    Paused,
    /// Returning to foreground
    Resumed,
}

/// An OS schedule call that failed during a flush
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushFailure {
    pub id: NotificationId,
    pub error: String,
}

/// Outcome of replaying the stack into the OS scheduler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Entries pruned before scheduling
    pub evicted: Vec<CoreEvent>,
    /// Single-shot registrations made
    pub scheduled_absolute: usize,
    /// Repeating registrations made
    pub scheduled_repeating: usize,
    /// Entries the scheduler refused. They stay staged.
    pub failed: Vec<FlushFailure>,
}

impl FlushReport {
    pub fn scheduled(&self) -> usize {
        self.scheduled_absolute + self.scheduled_repeating
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Events emitted by the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// Entry appended to the stack and persisted
    Staged {
        id: NotificationId,
        fire_time: DateTime<Utc>,
        repeating: bool,
    },

    /// Entry removed from the stack
    Evicted {
        id: NotificationId,
        reason: EvictionReason,
    },

    /// Registered directly with the OS, without a local stack
    Scheduled {
        id: NotificationId,
        fire_time: DateTime<Utc>,
        repeating: bool,
    },

    /// Stack replayed into the OS scheduler
    Flushed(FlushReport),

    /// OS registrations dropped on resume; stack reloaded from persistence
    Reset { staged: usize },

    /// Every registration cancelled
    CancelledAll,
}

impl CoreEvent {
    pub(crate) fn evicted(id: NotificationId, reason: EvictionReason) -> Self {
        CoreEvent::Evicted { id, reason }
    }

    /// Reason, if this is an eviction
    pub fn eviction_reason(&self) -> Option<EvictionReason> {
        match self {
            CoreEvent::Evicted { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
