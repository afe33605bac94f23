//! Stack persistence on top of a key-value store
//!
//! The whole stack is written as one JSON document under one key:
//!
//! ```json
//! { "version": 2, "entries": [ { "title": "...", "body": "...",
//!   "fire_time": { "secs": 1700000000, "nanos": 250000 },
//!   "repeat_interval": { "secs": 60, "nanos": 0 },
//!   "channel_id": "default", "id": 1 } ] }
//! ```
//!
//! Times and intervals are stored as whole seconds plus nanoseconds, so a
//! stack loads back exactly as it was saved. Version 1 documents, which used
//! integer milliseconds in `fire_time_ms` and `repeat_interval_ms`, are still
//! read.
//!
//! Decoding is lenient per record: a fire time that is missing or out of
//! range decodes as the Unix epoch (so the entry is overdue), and a repeat
//! interval that cannot be read decodes as "no repeat". A document that is
//! not valid JSON is moved aside to `<key>.corrupt` and the stack loads empty.

use chrono::{DateTime, Utc};
use notistack_api::StackEntry;
use notistack_util::{ChannelId, EpochTimestamp, NotificationId, from_epoch_millis, unix_epoch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{StackPersistence, Store, StoreResult};

/// Current persisted stack format version
pub const STACK_FORMAT_VERSION: u32 = 2;

/// Millisecond format, still accepted on load
const MILLIS_FORMAT_VERSION: u32 = 1;

/// Default key the stack is stored under
pub const DEFAULT_STACK_KEY: &str = "notification_stack";

/// Suffix for the key a corrupt document is moved to
pub const CORRUPT_SUFFIX: &str = ".corrupt";

#[derive(Debug, Serialize)]
struct StackDocument<'a> {
    version: u32,
    entries: Vec<PersistedEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct PersistedEntry<'a> {
    title: &'a str,
    body: &'a str,
    fire_time: EpochTimestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    repeat_interval: Option<Duration>,
    channel_id: &'a str,
    id: i32,
}

impl<'a> From<&'a StackEntry> for PersistedEntry<'a> {
    fn from(entry: &'a StackEntry) -> Self {
        Self {
            title: &entry.title,
            body: &entry.body,
            fire_time: EpochTimestamp::from_datetime(&entry.fire_time),
            repeat_interval: entry.repeat_interval,
            channel_id: entry.channel_id.as_str(),
            id: entry.id.get(),
        }
    }
}

/// Loosely-typed record, decoded field by field
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    fire_time: Option<Value>,
    #[serde(default)]
    repeat_interval: Option<Value>,
    #[serde(default)]
    fire_time_ms: Option<Value>,
    #[serde(default)]
    repeat_interval_ms: Option<Value>,
    #[serde(default)]
    channel_id: String,
    id: i32,
}

impl RawEntry {
    fn into_entry(self) -> StackEntry {
        let id = NotificationId::new(self.id);
        let fire_time = decode_fire_time(id, self.fire_time.as_ref(), self.fire_time_ms.as_ref());
        let repeat_interval = decode_repeat(
            id,
            self.repeat_interval.as_ref(),
            self.repeat_interval_ms.as_ref(),
        );

        StackEntry {
            title: self.title,
            body: self.body,
            fire_time,
            repeat_interval,
            channel_id: ChannelId::new(self.channel_id),
            id,
        }
    }
}

fn decode_fire_time(
    id: NotificationId,
    exact: Option<&Value>,
    millis: Option<&Value>,
) -> DateTime<Utc> {
    let decoded = match (exact, millis) {
        (Some(v), _) => serde_json::from_value::<EpochTimestamp>(v.clone())
            .ok()
            .and_then(EpochTimestamp::to_datetime),
        (None, Some(v)) => v.as_i64().and_then(from_epoch_millis),
        (None, None) => None,
    };

    decoded.unwrap_or_else(|| {
        warn!(
            id = %id,
            raw = ?exact.or(millis),
            "Unreadable fire time in persisted entry, treating as overdue"
        );
        unix_epoch()
    })
}

fn decode_repeat(
    id: NotificationId,
    exact: Option<&Value>,
    millis: Option<&Value>,
) -> Option<Duration> {
    let (raw, decoded) = match (exact, millis) {
        (Some(v), _) => (v, serde_json::from_value::<Duration>(v.clone()).ok()),
        (None, Some(v)) => (v, v.as_u64().map(Duration::from_millis)),
        (None, None) => return None,
    };

    if decoded.is_none() {
        warn!(
            id = %id,
            raw = %raw,
            "Unreadable repeat interval in persisted entry, treating as single-shot"
        );
    }
    decoded
}

/// Persists the stack as one blob under one key of a [`Store`]
pub struct KvStackPersistence {
    store: Arc<dyn Store>,
    key: String,
}

impl KvStackPersistence {
    pub fn new(store: Arc<dyn Store>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn corrupt_key(&self) -> String {
        format!("{}{}", self.key, CORRUPT_SUFFIX)
    }

    /// Move an unreadable document aside so the next save can't destroy it
    fn quarantine(&self, raw: &str, reason: &str) -> StoreResult<Vec<StackEntry>> {
        let corrupt_key = self.corrupt_key();
        warn!(
            key = %self.key,
            corrupt_key = %corrupt_key,
            reason,
            "Persisted stack unreadable, starting empty"
        );
        self.store.put(&corrupt_key, raw)?;
        Ok(Vec::new())
    }

    fn decode_records(records: Vec<Value>) -> Vec<StackEntry> {
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::from_value::<RawEntry>(record.clone()) {
                Ok(raw) => entries.push(raw.into_entry()),
                Err(e) => {
                    // Without an id there is nothing to key the entry on
                    warn!(error = %e, record = %record, "Dropping unkeyed persisted entry");
                }
            }
        }
        entries
    }
}

impl StackPersistence for KvStackPersistence {
    fn load(&self) -> StoreResult<Vec<StackEntry>> {
        let raw = match self.store.get(&self.key)? {
            Some(raw) => raw,
            None => {
                debug!(key = %self.key, "No persisted stack");
                return Ok(Vec::new());
            }
        };

        let document: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => return self.quarantine(&raw, &e.to_string()),
        };

        let records = match document {
            // Bare array: unversioned document, decoded like any other
            Value::Array(records) => records,
            Value::Object(mut map) => {
                let version = map.get("version").and_then(Value::as_u64);
                let known = [STACK_FORMAT_VERSION, MILLIS_FORMAT_VERSION].map(u64::from);
                if !version.is_some_and(|v| known.contains(&v)) {
                    return self.quarantine(&raw, "unsupported stack format version");
                }
                match map.remove("entries") {
                    Some(Value::Array(records)) => records,
                    None => Vec::new(),
                    Some(_) => return self.quarantine(&raw, "entries is not an array"),
                }
            }
            _ => return self.quarantine(&raw, "unexpected document shape"),
        };

        let entries = Self::decode_records(records);
        debug!(key = %self.key, count = entries.len(), "Stack loaded");
        Ok(entries)
    }

    fn save(&self, entries: &[StackEntry]) -> StoreResult<()> {
        let document = StackDocument {
            version: STACK_FORMAT_VERSION,
            entries: entries.iter().map(PersistedEntry::from).collect(),
        };
        let json = serde_json::to_string(&document)?;

        // Single replace; the key is never observed missing
        self.store.put(&self.key, &json)?;

        debug!(key = %self.key, count = entries.len(), "Stack saved");
        Ok(())
    }
}
