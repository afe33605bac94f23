//! Stack entry: the record kept for one pending notification

use chrono::{DateTime, Utc};
use notistack_util::{ChannelId, NotificationId};
use std::time::Duration;

use crate::OsNotification;

/// One pending notification as staged in the stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    /// Display title, opaque to the stack
    pub title: String,

    /// Display body, opaque to the stack
    pub body: String,

    /// First delivery time
    pub fire_time: DateTime<Utc>,

    /// Cadence after `fire_time`. None or zero means single-shot.
    pub repeat_interval: Option<Duration>,

    /// Channel the OS should present this notification on
    pub channel_id: ChannelId,

    /// Stack key, also used as the OS scheduler key
    pub id: NotificationId,
}

impl StackEntry {
    pub fn new(
        id: NotificationId,
        title: impl Into<String>,
        body: impl Into<String>,
        fire_time: DateTime<Utc>,
        channel_id: ChannelId,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            fire_time,
            repeat_interval: None,
            channel_id,
            id,
        }
    }

    pub fn with_repeat(mut self, interval: Duration) -> Self {
        self.repeat_interval = Some(interval);
        self
    }

    /// Fire time is at or before `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.fire_time <= now
    }

    /// No repeat interval, or a zero one
    pub fn is_non_repeating(&self) -> bool {
        self.repeat_interval.is_none_or(|interval| interval.is_zero())
    }

    pub fn has_repeat(&self) -> bool {
        !self.is_non_repeating()
    }

    /// Overdue and will never fire again
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.is_overdue(now) && self.is_non_repeating()
    }

    /// The interval to hand to the OS scheduler, if this entry repeats
    pub fn effective_repeat(&self) -> Option<Duration> {
        self.repeat_interval.filter(|interval| !interval.is_zero())
    }

    /// Fresh OS payload for this entry
    pub fn to_os_notification(&self) -> OsNotification {
        OsNotification {
            title: self.title.clone(),
            body: self.body.clone(),
            fire_time: self.fire_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn entry(fire_offset: i64, repeat: Option<Duration>) -> StackEntry {
        let mut e = StackEntry::new(
            NotificationId::new(1),
            "title",
            "body",
            at(fire_offset),
            ChannelId::new("default"),
        );
        e.repeat_interval = repeat;
        e
    }

    #[test]
    fn overdue_is_inclusive() {
        let now = at(0);
        assert!(entry(0, None).is_overdue(now));
        assert!(entry(-5, None).is_overdue(now));
        assert!(!entry(5, None).is_overdue(now));
    }

    #[test]
    fn zero_interval_is_non_repeating() {
        assert!(entry(0, None).is_non_repeating());
        assert!(entry(0, Some(Duration::ZERO)).is_non_repeating());
        assert!(!entry(0, Some(Duration::from_secs(30))).is_non_repeating());
        assert!(entry(0, Some(Duration::from_secs(30))).has_repeat());
    }

    #[test]
    fn stale_requires_overdue_and_non_repeating() {
        let now = at(0);
        assert!(entry(-5, None).is_stale(now));
        assert!(!entry(5, None).is_stale(now));
        assert!(!entry(-5, Some(Duration::from_secs(30))).is_stale(now));
        assert!(entry(-5, Some(Duration::ZERO)).is_stale(now));
    }

    #[test]
    fn effective_repeat_drops_zero() {
        assert_eq!(entry(0, Some(Duration::ZERO)).effective_repeat(), None);
        assert_eq!(
            entry(0, Some(Duration::from_secs(60))).effective_repeat(),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn os_notification_carries_payload() {
        let e = entry(10, None);
        let n = e.to_os_notification();
        assert_eq!(n.title, "title");
        assert_eq!(n.body, "body");
        assert_eq!(n.fire_time, at(10));
    }
}
