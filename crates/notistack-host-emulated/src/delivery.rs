//! Delivery records and firing arithmetic shared by the emulators

use chrono::{DateTime, Utc};
use notistack_util::{ChannelId, NotificationId};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A notification the emulated OS presented to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub id: NotificationId,
    pub title: String,
    pub body: String,
    pub channel: ChannelId,
    /// The fire time that came due, not the time `deliver_due` ran
    pub fired_at: DateTime<Utc>,
    pub repeating: bool,
}

/// First instant of the series `start + k * interval` strictly after `now`.
///
/// Several missed firings collapse into one; the OS shows a single
/// notification per id, not a backlog.
pub fn next_fire_after(
    start: DateTime<Utc>,
    interval: Duration,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    const NANOS_PER_SEC: i128 = 1_000_000_000;

    let interval_ns = i128::try_from(interval.as_nanos()).unwrap_or(i128::MAX);
    if interval_ns == 0 || start > now {
        return start;
    }

    let elapsed = now.signed_duration_since(start);
    let elapsed_ns =
        i128::from(elapsed.num_seconds()) * NANOS_PER_SEC + i128::from(elapsed.subsec_nanos());
    let steps = elapsed_ns / interval_ns + 1;

    steps
        .checked_mul(interval_ns)
        .and_then(|delta_ns| {
            let secs = u64::try_from(delta_ns / NANOS_PER_SEC).ok()?;
            let nanos = u32::try_from(delta_ns % NANOS_PER_SEC).ok()?;
            chrono::Duration::from_std(Duration::new(secs, nanos)).ok()
        })
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
