//! Send requests as issued by the application

use chrono::{DateTime, Utc};
use notistack_util::{NotificationId, add_duration};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Symbolic notification types with stable ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Type1,
    Type2,
    Type3,
}

impl NotificationType {
    pub const ALL: [NotificationType; 3] = [
        NotificationType::Type1,
        NotificationType::Type2,
        NotificationType::Type3,
    ];

    /// Stable id used as the dedup and cancel key
    pub fn id(&self) -> NotificationId {
        match self {
            NotificationType::Type1 => NotificationId::new(1),
            NotificationType::Type2 => NotificationId::new(2),
            NotificationType::Type3 => NotificationId::new(3),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NotificationType::Type1 => "type1",
            NotificationType::Type2 => "type2",
            NotificationType::Type3 => "type3",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

/// What a send or cancel call refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Id(NotificationId),
    Type(NotificationType),
}

impl Target {
    pub fn id(&self) -> NotificationId {
        match self {
            Target::Id(id) => *id,
            Target::Type(t) => t.id(),
        }
    }
}

impl From<NotificationId> for Target {
    fn from(id: NotificationId) -> Self {
        Target::Id(id)
    }
}

impl From<NotificationType> for Target {
    fn from(t: NotificationType) -> Self {
        Target::Type(t)
    }
}

/// When a notification should first fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireAt {
    /// Absolute instant
    At(DateTime<Utc>),
    /// Relative to the moment the request is resolved
    After(Duration),
}

impl FireAt {
    /// Resolve to an absolute instant. Relative times are computed once here
    /// and never re-evaluated.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            FireAt::At(at) => *at,
            FireAt::After(delay) => add_duration(now, *delay),
        }
    }
}

/// A request to deliver a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub title: String,
    pub body: String,
    pub when: FireAt,
    pub target: Target,
    pub repeat: bool,
    pub interval: Option<Duration>,
}

impl SendRequest {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        when: FireAt,
        target: impl Into<Target>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            when,
            target: target.into(),
            repeat: false,
            interval: None,
        }
    }

    /// Repeat at `interval` after the first delivery
    pub fn repeating(mut self, interval: Duration) -> Self {
        self.repeat = true;
        self.interval = Some(interval);
        self
    }

    /// Interval to use, if this request actually repeats.
    ///
    /// Requires the repeat flag and a non-zero interval. A repeat flag
    /// without a usable interval is sent single-shot.
    pub fn repeat_interval(&self) -> Option<Duration> {
        if !self.repeat {
            return None;
        }

        match self.interval {
            Some(interval) if !interval.is_zero() => Some(interval),
            _ => {
                tracing::warn!(
                    id = %self.target.id(),
                    "Repeat requested without a usable interval, sending once"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn type_ids_are_stable() {
        assert_eq!(NotificationType::Type1.id().get(), 1);
        assert_eq!(NotificationType::Type2.id().get(), 2);
        assert_eq!(NotificationType::Type3.id().get(), 3);
    }

    #[test]
    fn type_from_name() {
        assert_eq!(NotificationType::from_name("TYPE2"), Some(NotificationType::Type2));
        assert_eq!(NotificationType::from_name("type9"), None);
    }

    #[test]
    fn target_resolves_id() {
        assert_eq!(Target::from(NotificationId::new(9)).id().get(), 9);
        assert_eq!(Target::from(NotificationType::Type3).id().get(), 3);
    }

    #[test]
    fn relative_fire_time_resolves_once() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let when = FireAt::After(Duration::from_secs(10));
        assert_eq!(
            when.resolve(now),
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 10).unwrap()
        );

        let absolute = FireAt::At(now);
        assert_eq!(absolute.resolve(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()), now);
    }

    #[test]
    fn repeat_requires_flag_and_interval() {
        let base = SendRequest::new(
            "t",
            "b",
            FireAt::After(Duration::from_secs(60)),
            NotificationType::Type1,
        );
        assert_eq!(base.repeat_interval(), None);

        let repeating = base.clone().repeating(Duration::from_secs(60));
        assert_eq!(repeating.repeat_interval(), Some(Duration::from_secs(60)));

        let flag_only = SendRequest {
            repeat: true,
            ..base.clone()
        };
        assert_eq!(flag_only.repeat_interval(), None);

        let zero = base.clone().repeating(Duration::ZERO);
        assert_eq!(zero.repeat_interval(), None);

        let interval_only = SendRequest {
            interval: Some(Duration::from_secs(60)),
            ..base
        };
        assert_eq!(interval_only.repeat_interval(), None);
    }
}
