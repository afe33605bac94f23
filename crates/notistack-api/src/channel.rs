//! Types shared with OS scheduler adapters

use chrono::{DateTime, Utc};
use notistack_util::ChannelId;
use serde::{Deserialize, Serialize};

/// Platform whose notification service is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Integer-keyed alarm table, cleared on resume
    #[default]
    Android,
    /// Identifier-keyed pending list that survives pause
    Ios,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Channel importance as understood by the OS presentation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    None,
    Min,
    Low,
    #[default]
    Default,
    High,
}

/// Everything needed to register a notification channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub id: ChannelId,
    pub name: String,
    pub description: String,
    pub importance: Importance,
}

impl ChannelSpec {
    pub fn new(id: impl Into<ChannelId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            importance: Importance::Default,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }
}

impl Default for ChannelSpec {
    fn default() -> Self {
        ChannelSpec::new("default", "Notifications")
            .with_description("General notifications")
            .with_importance(Importance::High)
    }
}

/// Payload handed to the OS scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsNotification {
    pub title: String,
    pub body: String,
    pub fire_time: DateTime<Utc>,
}

/// Live status of an id in the OS scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Scheduled,
    Delivered,
    Unknown,
}

impl ScheduleStatus {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, ScheduleStatus::Scheduled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_default_and_names() {
        assert_eq!(Platform::default(), Platform::Android);
        assert_eq!(Platform::Ios.to_string(), "ios");
    }

    #[test]
    fn platform_serialization() {
        let json = serde_json::to_string(&Platform::Ios).unwrap();
        assert_eq!(json, "\"ios\"");
        let parsed: Platform = serde_json::from_str("\"android\"").unwrap();
        assert_eq!(parsed, Platform::Android);
    }

    #[test]
    fn importance_ordering() {
        assert!(Importance::High > Importance::Default);
        assert!(Importance::Min > Importance::None);
    }

    #[test]
    fn channel_builder() {
        let spec = ChannelSpec::new("alerts", "Alerts")
            .with_description("Urgent alerts")
            .with_importance(Importance::High);

        assert_eq!(spec.id.as_str(), "alerts");
        assert_eq!(spec.description, "Urgent alerts");
        assert_eq!(spec.importance, Importance::High);
    }

    #[test]
    fn only_scheduled_counts_as_scheduled() {
        assert!(ScheduleStatus::Scheduled.is_scheduled());
        assert!(!ScheduleStatus::Delivered.is_scheduled());
        assert!(!ScheduleStatus::Unknown.is_scheduled());
    }
}
