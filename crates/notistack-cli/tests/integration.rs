//! Integration tests for notistack
//!
//! These tests drive the stack, controllers and facade end to end against
//! mock and emulated schedulers and real stores.

use chrono::{DateTime, TimeZone, Utc};
use notistack_api::{
    ChannelSpec, FireAt, NotificationType, Platform, ScheduleStatus, StackEntry,
};
use notistack_config::{Config, StackPolicy, parse_config};
use notistack_core::{CoreEvent, EvictionReason, NotificationFacade, NotificationStack};
use notistack_host_api::{MockScheduler, NotificationScheduler, SchedulerCall};
use notistack_host_emulated::{AlarmTableScheduler, CalendarScheduler, EmulatedScheduler};
use notistack_store::{KvStackPersistence, SqliteStore, StackPersistence, Store};
use notistack_util::{ChannelId, NotificationId};
use std::sync::Arc;
use std::time::Duration;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn secs(n: i64) -> DateTime<Utc> {
    now() + chrono::Duration::seconds(n)
}

fn entry(id: i32, offset: i64, repeat: Option<u64>) -> StackEntry {
    let mut e = StackEntry::new(
        NotificationId::new(id),
        format!("Notification {id}"),
        "body",
        secs(offset),
        ChannelId::new("default"),
    );
    e.repeat_interval = repeat.map(Duration::from_secs);
    e
}

struct Harness {
    persistence: Arc<KvStackPersistence>,
    scheduler: Arc<MockScheduler>,
    stack: NotificationStack,
}

fn harness() -> Harness {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let persistence = Arc::new(KvStackPersistence::new(store, "notification_stack"));
    let scheduler = Arc::new(MockScheduler::new());
    let stack = NotificationStack::load(
        persistence.clone(),
        scheduler.clone(),
        StackPolicy::default(),
    )
    .unwrap();

    Harness {
        persistence,
        scheduler,
        stack,
    }
}

#[test]
fn scenario_a_future_one_shot_is_scheduled_once() {
    let mut h = harness();

    h.stack.stage(entry(1, 10, None), now()).unwrap();
    h.stack.flush_to_os(now()).unwrap();

    let calls = h.scheduler.schedule_calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(
        &calls[0],
        SchedulerCall::ScheduleAbsolute { id, fire_time, .. }
            if id.get() == 1 && *fire_time == secs(10)
    ));
    assert_eq!(h.stack.len(), 1);
}

#[test]
fn scenario_b_same_id_keeps_only_latest() {
    let mut h = harness();

    h.stack.stage(entry(1, 60, Some(60)), now()).unwrap();
    let events = h.stack.stage(entry(1, 120, Some(60)), now()).unwrap();

    assert_eq!(events[0], CoreEvent::Evicted {
        id: NotificationId::new(1),
        reason: EvictionReason::ReplacedById,
    });
    assert_eq!(h.stack.entries(), &[entry(1, 120, Some(60))]);
    assert_eq!(h.persistence.load().unwrap(), vec![entry(1, 120, Some(60))]);
}

#[test]
fn scenario_c_overdue_one_shot_is_dropped() {
    let mut h = harness();

    h.stack.stage(entry(2, -5, None), now()).unwrap();
    let report = h.stack.flush_to_os(now()).unwrap();

    assert_eq!(h.stack.len(), 0);
    assert!(h.persistence.load().unwrap().is_empty());
    assert!(h.scheduler.schedule_calls().is_empty());
    assert_eq!(report.evicted.len(), 1);
}

#[test]
fn scenario_d_overdue_repeating_is_rescheduled() {
    let mut h = harness();

    h.stack.stage(entry(3, -5, Some(30)), now()).unwrap();
    h.stack.flush_to_os(now()).unwrap();

    assert_eq!(h.stack.len(), 1);
    assert_eq!(
        h.scheduler.schedule_calls(),
        vec![SchedulerCall::ScheduleRepeating {
            id: NotificationId::new(3),
            channel: ChannelId::new("default"),
            fire_time: secs(-5),
            interval: Duration::from_secs(30),
        }]
    );
}

#[test]
fn p1_one_entry_per_id_after_staging() {
    let mut h = harness();

    for (i, id) in [1, 2, 1, 3, 2, 1].into_iter().enumerate() {
        let offset = 10 + i as i64;
        h.stack.stage(entry(id, offset, None), now()).unwrap();
    }

    let mut ids: Vec<_> = h.stack.entries().iter().map(|e| e.id.get()).collect();
    ids.sort();
    assert_eq!(ids, vec![1, 2, 3]);

    // The survivor for each id is the last one staged
    let latest_1 = h.stack.entries().iter().find(|e| e.id.get() == 1).unwrap();
    assert_eq!(latest_1.fire_time, secs(15));
}

#[test]
fn p2_persistence_round_trip() {
    let h = harness();
    let entries = vec![
        entry(1, 10, None),
        entry(2, -3600, Some(86_400)),
        StackEntry::new(
            NotificationId::new(-7),
            "",
            "línea 1\nline \"2\"",
            Utc.with_ymd_and_hms(2199, 12, 31, 23, 59, 59).unwrap(),
            ChannelId::new("alerts"),
        )
        .with_repeat(Duration::from_millis(1500)),
        entry(1, 20, None),
    ];

    h.persistence.save(&entries).unwrap();
    assert_eq!(h.persistence.load().unwrap(), entries);

    h.persistence.save(&[]).unwrap();
    assert!(h.persistence.load().unwrap().is_empty());
}

#[test]
fn p3_flush_evicts_stale_from_memory_and_disk() {
    let mut h = harness();

    h.stack.stage(entry(1, 10, None), now()).unwrap();
    h.stack.stage(entry(2, 20, None), now()).unwrap();

    // Time moves on past the first entry
    let later = secs(15);
    h.stack.flush_to_os(later).unwrap();

    assert_eq!(h.stack.entries(), &[entry(2, 20, None)]);
    assert_eq!(h.persistence.load().unwrap(), vec![entry(2, 20, None)]);
    assert!(
        h.scheduler
            .schedule_calls()
            .iter()
            .all(|c| !matches!(c, SchedulerCall::ScheduleAbsolute { id, .. } if id.get() == 1))
    );
}

#[test]
fn p4_repeating_survives_every_flush() {
    let mut h = harness();
    h.stack.stage(entry(3, -5, Some(30)), now()).unwrap();

    for round in 0..3 {
        h.stack.flush_to_os(secs(round * 1000)).unwrap();
        h.stack.reset().unwrap();
    }

    assert_eq!(h.stack.len(), 1);
    let repeating = h
        .scheduler
        .schedule_calls()
        .into_iter()
        .filter(|c| matches!(c, SchedulerCall::ScheduleRepeating { .. }))
        .count();
    assert_eq!(repeating, 3);
}

#[test]
fn p5_reset_clears_os_only() {
    let mut h = harness();
    h.stack.stage(entry(1, 10, None), now()).unwrap();
    h.stack.stage(entry(2, 20, Some(60)), now()).unwrap();
    h.stack.flush_to_os(now()).unwrap();
    assert_eq!(h.scheduler.registered_ids().len(), 2);

    let before_memory = h.stack.entries().to_vec();
    let before_disk = h.persistence.load().unwrap();

    h.stack.reset().unwrap();

    assert!(h.scheduler.registered_ids().is_empty());
    assert!(h.scheduler.calls().contains(&SchedulerCall::CancelAll));
    assert_eq!(h.stack.entries(), before_memory.as_slice());
    assert_eq!(h.persistence.load().unwrap(), before_disk);
}

#[test]
fn p2_p5_hold_at_clock_precision() {
    // A wall clock reading with sub-millisecond digits
    let clock = now() + chrono::Duration::nanoseconds(123_456_789);
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let persistence = Arc::new(KvStackPersistence::new(store, "notification_stack"));
    let scheduler = Arc::new(MockScheduler::new());
    let mut facade =
        NotificationFacade::for_config(&Config::default(), persistence.clone(), scheduler.clone())
            .unwrap();

    facade
        .send(
            "t",
            "b",
            FireAt::After(Duration::new(10, 250)),
            NotificationType::Type1,
            true,
            Some(Duration::from_micros(1_500_250)),
            clock,
        )
        .unwrap();
    let staged = facade.pending();
    assert_eq!(persistence.load().unwrap(), staged);

    facade.on_pause(clock).unwrap();
    facade.on_resume(clock).unwrap();
    assert_eq!(facade.pending(), staged);

    // Long after the first firing the entry still repeats
    let much_later = clock + chrono::Duration::days(1);
    facade.on_pause(much_later).unwrap();
    assert_eq!(facade.pending(), staged);
    assert_eq!(
        scheduler.registration(NotificationId::new(1)).unwrap().interval,
        Some(Duration::from_micros(1_500_250))
    );
}

#[test]
fn stack_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("notistack.db");
    let config = Config::default();

    {
        let store = Arc::new(SqliteStore::open(&db_path).unwrap());
        let persistence = Arc::new(KvStackPersistence::new(store, "notification_stack"));
        let mut facade = NotificationFacade::for_config(
            &config,
            persistence,
            Arc::new(MockScheduler::new()),
        )
        .unwrap();

        facade
            .send(
                "Reminder",
                "Come back",
                FireAt::After(Duration::from_secs(600)),
                NotificationType::Type1,
                false,
                None,
                now(),
            )
            .unwrap();
        // Process dies without ever pausing
    }

    let store = Arc::new(SqliteStore::open(&db_path).unwrap());
    let persistence = Arc::new(KvStackPersistence::new(store, "notification_stack"));
    let scheduler = Arc::new(MockScheduler::new());
    let mut facade =
        NotificationFacade::for_config(&config, persistence, scheduler.clone()).unwrap();

    assert_eq!(facade.pending().len(), 1);
    facade.on_pause(now()).unwrap();
    assert_eq!(scheduler.registered_ids(), vec![NotificationType::Type1.id()]);
}

#[test]
fn android_flow_rebuilds_after_platform_clear() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let persistence = Arc::new(KvStackPersistence::new(store, "notification_stack"));
    let scheduler = Arc::new(AlarmTableScheduler::new());
    let mut facade = NotificationFacade::for_config(
        &Config::default(),
        persistence,
        scheduler.clone(),
    )
    .unwrap();

    facade
        .send(
            "Daily",
            "Check in",
            FireAt::At(secs(60)),
            NotificationType::Type2,
            true,
            Some(Duration::from_secs(3600)),
            now(),
        )
        .unwrap();
    facade.on_pause(now()).unwrap();
    assert!(facade.is_scheduled(NotificationType::Type2).unwrap());

    // The OS wipes its table while the app is in the background
    scheduler.simulate_platform_clear();
    assert!(!facade.is_scheduled(NotificationType::Type2).unwrap());

    facade.on_resume(secs(30)).unwrap();
    facade.on_pause(secs(30)).unwrap();
    assert!(facade.is_scheduled(NotificationType::Type2).unwrap());

    let fired = scheduler.deliver_due(secs(60));
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].id, NotificationType::Type2.id());
    assert_eq!(scheduler.next_fire(NotificationType::Type2.id()), Some(secs(3660)));
}

#[test]
fn android_channel_is_registered_before_scheduling() {
    let config = parse_config(
        r#"
            config_version = 1

            [channel]
            id = "channel_id"
            name = "Default Channel"
            description = "Generic notifications"
            importance = "high"
        "#,
    )
    .unwrap();

    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let persistence = Arc::new(KvStackPersistence::new(store, "notification_stack"));
    let scheduler = Arc::new(AlarmTableScheduler::new());
    let mut facade =
        NotificationFacade::for_config(&config, persistence, scheduler.clone()).unwrap();

    facade
        .send("t", "b", FireAt::At(secs(10)), NotificationId::new(9), false, None, now())
        .unwrap();
    let events = facade.on_pause(now()).unwrap();

    assert!(matches!(&events[0], CoreEvent::Flushed(r) if r.is_complete() && r.scheduled() == 1));
    let channel = scheduler.channel(&ChannelId::new("channel_id")).unwrap();
    assert_eq!(channel.name, "Default Channel");
    assert_eq!(scheduler.scheduled_ids(), vec![NotificationId::new(9)]);
}

#[test]
fn ios_flow_schedules_directly() {
    let mut config = Config::default();
    config.service.platform = Platform::Ios;

    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let persistence = Arc::new(KvStackPersistence::new(store.clone(), "notification_stack"));
    let scheduler = Arc::new(CalendarScheduler::new());
    let mut facade =
        NotificationFacade::for_config(&config, persistence, scheduler.clone()).unwrap();

    for _ in 0..2 {
        facade
            .send(
                "t",
                "b",
                FireAt::After(Duration::from_secs(10)),
                NotificationType::Type3,
                false,
                None,
                now(),
            )
            .unwrap();
    }

    // Re-sending replaced the pending request rather than adding a second
    assert_eq!(scheduler.pending_identifiers(), vec!["3".to_string()]);
    // Nothing is staged locally
    assert!(facade.pending().is_empty());
    assert!(store.get("notification_stack").unwrap().is_none());

    // Lifecycle transitions leave the OS state alone
    facade.on_pause(now()).unwrap();
    facade.on_resume(now()).unwrap();
    assert!(facade.is_scheduled(NotificationType::Type3).unwrap());

    scheduler.deliver_due(secs(10));
    assert_eq!(
        scheduler.query_status(NotificationType::Type3.id()).unwrap(),
        ScheduleStatus::Delivered
    );
    assert!(!facade.cancel(NotificationType::Type3).unwrap());
}

#[test]
fn cancel_all_clears_stack_and_scheduler() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let persistence = Arc::new(KvStackPersistence::new(store, "notification_stack"));
    let scheduler = Arc::new(MockScheduler::new());
    let mut facade = NotificationFacade::for_config(
        &Config::default(),
        persistence.clone(),
        scheduler.clone(),
    )
    .unwrap();

    for t in NotificationType::ALL {
        facade
            .send("t", "b", FireAt::At(secs(10)), t, false, None, now())
            .unwrap();
    }
    facade.on_pause(now()).unwrap();

    facade.cancel_all().unwrap();

    assert!(facade.pending().is_empty());
    assert!(persistence.load().unwrap().is_empty());
    assert!(scheduler.registered_ids().is_empty());
}

#[test]
fn corrupt_persisted_stack_starts_empty() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    store.put("notification_stack", "[{\"id\": 1, ").unwrap();

    let persistence = Arc::new(KvStackPersistence::new(store.clone(), "notification_stack"));
    let facade = NotificationFacade::for_config(
        &Config::default(),
        persistence,
        Arc::new(MockScheduler::new()),
    )
    .unwrap();

    assert!(facade.pending().is_empty());
    assert_eq!(
        store.get("notification_stack.corrupt").unwrap().as_deref(),
        Some("[{\"id\": 1, ")
    );
}

#[test]
fn default_channel_spec_is_high_importance() {
    let channel = ChannelSpec::default();
    assert_eq!(Config::default().channel, channel);
    assert_eq!(channel.importance, notistack_api::Importance::High);
}
