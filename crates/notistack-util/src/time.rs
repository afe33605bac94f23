//! Time utilities for notistack
//!
//! Fire times are absolute wall-clock instants kept in UTC and persisted as
//! an [`EpochTimestamp`] (whole seconds since the Unix epoch plus
//! nanoseconds), so stored stacks round-trip exactly and never depend on the
//! locale or timezone of the device that wrote them.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `NOTISTACK_MOCK_TIME` environment variable can be set
//! to override the system time. The mock clock advances at the same rate as
//! the real one.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` in UTC (e.g., `2025-12-25 14:30:00`)

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "NOTISTACK_MOCK_TIME";

/// Offset between mock time and real time, computed once per process.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // wraps Utc::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S") {
                    Ok(naive_dt) => {
                        let mock_dt = Utc.from_utc_datetime(&naive_dt);
                        let offset = mock_dt.signed_duration_since(Utc::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    Err(_) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = "%Y-%m-%d %H:%M:%S",
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current UTC time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // the one place that reads the real clock
pub fn now() -> DateTime<Utc> {
    let real_now = Utc::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// The instant used for fire times that could not be decoded.
/// It is always in the past, so such entries are treated as overdue.
pub fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Lossless encoding of an instant: seconds since the Unix epoch plus the
/// nanoseconds into that second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochTimestamp {
    pub secs: i64,
    pub nanos: u32,
}

impl EpochTimestamp {
    pub fn from_datetime(dt: &DateTime<Utc>) -> Self {
        Self {
            secs: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }

    /// None if the value is outside chrono's representable range
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.secs, self.nanos).single()
    }
}

/// Encode an instant as milliseconds since the Unix epoch
pub fn to_epoch_millis(dt: &DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Decode milliseconds since the Unix epoch.
/// Returns None if the value is outside chrono's representable range.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Add a std duration to an instant, saturating at chrono's maximum
pub fn add_duration(dt: DateTime<Utc>, d: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(d)
        .ok()
        .and_then(|delta| dt.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Format an instant for display with full date and time.
pub fn format_datetime_full(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Helper to format durations in human-readable form
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Parse a compact duration such as `10s`, `5m`, `1h30m` or a bare number
/// of seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(secs) = s.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let mut total = 0u64;
    let mut digits = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let value: u64 = digits.parse().ok()?;
        digits.clear();
        let unit = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        total = total.checked_add(value.checked_mul(unit)?)?;
    }

    // Trailing digits without a unit are ambiguous
    if !digits.is_empty() {
        return None;
    }

    Some(Duration::from_secs(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_epoch_millis_round_trip() {
        let dt = Utc.with_ymd_and_hms(2025, 12, 25, 14, 30, 45).unwrap();
        let millis = to_epoch_millis(&dt);
        assert_eq!(from_epoch_millis(millis), Some(dt));
    }

    #[test]
    fn test_epoch_timestamp_keeps_nanoseconds() {
        let dt = Utc.timestamp_opt(1_893_456_000, 123_456_789).unwrap();
        let ts = EpochTimestamp::from_datetime(&dt);
        assert_eq!(ts, EpochTimestamp { secs: 1_893_456_000, nanos: 123_456_789 });
        assert_eq!(ts.to_datetime(), Some(dt));

        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, r#"{"secs":1893456000,"nanos":123456789}"#);
    }

    #[test]
    fn test_epoch_timestamp_extremes() {
        for dt in [DateTime::<Utc>::MAX_UTC, DateTime::<Utc>::MIN_UTC, unix_epoch()] {
            assert_eq!(EpochTimestamp::from_datetime(&dt).to_datetime(), Some(dt));
        }
        assert!(EpochTimestamp { secs: i64::MAX, nanos: 0 }.to_datetime().is_none());
    }

    #[test]
    fn test_epoch_millis_out_of_range() {
        assert!(from_epoch_millis(i64::MAX).is_none());
    }

    #[test]
    fn test_unix_epoch_is_in_the_past() {
        assert!(unix_epoch() < now());
        assert_eq!(to_epoch_millis(&unix_epoch()), 0);
    }

    #[test]
    fn test_add_duration_saturates() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            add_duration(dt, Duration::from_secs(60)),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 1, 0).unwrap()
        );
        assert_eq!(add_duration(dt, Duration::MAX), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m 1s");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("10s"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("1h30m"), Some(Duration::from_secs(5400)));
        assert_eq!(parse_duration("1h30"), None);
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn test_format_datetime_full() {
        let dt = Utc.with_ymd_and_hms(2025, 12, 25, 14, 30, 45).unwrap();
        assert_eq!(format_datetime_full(&dt), "2025-12-25 14:30:45");
    }

    #[test]
    fn test_now_returns_time() {
        let t = now();
        assert!(t.year() >= 2020);
        assert!(t.year() <= 2100);
    }

    #[test]
    fn test_mock_time_env_var_name() {
        assert_eq!(MOCK_TIME_ENV_VAR, "NOTISTACK_MOCK_TIME");
    }
}
