// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::RestartConfig;
use chrono::{DateTime, TimeDelta, Utc};
use pw_adapters::{FakeProcessAdapter, FakeWebhookAdapter};
use pw_config::ServerConfigFile;
use pw_core::{FakeClock, LogEvent, Schedule, TrackEntry};
use tempfile::TempDir;

const NOW: &str = "2026-03-06T12:00:00Z";

fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

struct Rig {
    api: ControlApi<FakeProcessAdapter, FakeWebhookAdapter, FakeClock>,
    machine: SmartRestart<FakeProcessAdapter, FakeClock>,
    players: Arc<PlayerTracker<FakeClock>>,
    store: ScheduleStore,
    _dir: TempDir,
}

fn rig() -> Rig {
    let dir = TempDir::new().unwrap();
    let cfg_path = dir.path().join("server_config.cfg");
    std::fs::write(&cfg_path, "server_name=Pitwall\n\n# Event Loop\n").unwrap();

    let clock = FakeClock::new();
    clock.set_utc(utc(NOW));
    let players = Arc::new(PlayerTracker::new(clock.clone()));
    let tracks = Arc::new(TrackChangeTracker::new(clock.clone()));
    let store = ScheduleStore::new(dir.path());
    let machine = SmartRestart::new(
        RestartConfig::default(),
        Arc::new(FakeProcessAdapter::new()),
        players.clone(),
        ServerConfigFile::new(&cfg_path),
        clock.clone(),
    );
    let scheduler = Scheduler::new(
        SchedulerConfig::default(),
        store.clone(),
        machine.clone(),
        Arc::new(FakeWebhookAdapter::new()),
        clock.clone(),
    );
    let api = ControlApi::new(
        SchedulerConfig::default(),
        store.clone(),
        scheduler,
        machine.clone(),
        players.clone(),
        tracks,
        clock,
    );
    Rig { api, machine, players, store, _dir: dir }
}

fn seed(store: &ScheduleStore, events: Vec<ScheduledEvent>) {
    let mut schedule = Schedule { events, last_updated: Utc::now() };
    store.save(&mut schedule).unwrap();
}

fn valid_event(id: i64, name: &str, at: DateTime<Utc>) -> ScheduledEvent {
    let mut event = ScheduledEvent::new(id, name, at);
    event.tracks = vec![TrackEntry::new("speedway2")];
    event
}

#[tokio::test]
async fn replace_persists_a_valid_document() {
    let rig = rig();
    let response = rig
        .api
        .handle(Request::ReplaceSchedule {
            events: vec![valid_event(1, "Weekend", utc(NOW) + TimeDelta::minutes(2))],
        })
        .await;

    match response {
        Response::Schedule { schedule } => assert_eq!(schedule.events.len(), 1),
        other => panic!("expected schedule, got {other:?}"),
    }
    assert!(rig.store.load().find(1).is_some());
}

#[tokio::test]
async fn replace_rejects_invalid_document_with_all_messages() {
    let rig = rig();
    let broken: ScheduledEvent = serde_json::from_str(
        r#"{
            "id": 0,
            "name": "",
            "tracks": [{"track": ""}],
            "recurringPattern": {"type": "Weekly", "days": [], "time": "20:00:00"}
        }"#,
    )
    .unwrap();

    let response = rig.api.handle(Request::ReplaceSchedule { events: vec![broken] }).await;
    match response {
        Response::Error { error: OpError::Validation { messages } } => {
            assert_eq!(messages.len(), 5, "{messages:?}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(rig.store.load().events.is_empty(), "rejected document never lands");
}

#[tokio::test]
async fn upcoming_and_due_partition_on_the_lead_window() {
    let rig = rig();
    let mut active = valid_event(3, "active", utc(NOW) - TimeDelta::hours(2));
    active.is_active = true;
    seed(
        &rig.store,
        vec![
            valid_event(1, "due-now", utc(NOW) + TimeDelta::minutes(3)),
            valid_event(2, "tonight", utc(NOW) + TimeDelta::hours(8)),
            active,
            valid_event(4, "overdue", utc(NOW) - TimeDelta::minutes(30)),
        ],
    );

    match rig.api.handle(Request::GetDueEvents).await {
        Response::DueEvents { events } => {
            let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
            assert_eq!(ids, vec![4, 1], "overdue first, active excluded");
        }
        other => panic!("expected due events, got {other:?}"),
    }

    match rig.api.handle(Request::GetUpcomingEvents).await {
        Response::UpcomingEvents { events } => {
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].event.id, 2);
            assert_eq!(events[0].starts_in, "8h");
        }
        other => panic!("expected upcoming events, got {other:?}"),
    }
}

#[tokio::test]
async fn summary_counts() {
    let rig = rig();
    let mut active = valid_event(3, "active", utc(NOW));
    active.is_active = true;
    seed(
        &rig.store,
        vec![
            valid_event(1, "due", utc(NOW)),
            valid_event(2, "later", utc(NOW) + TimeDelta::hours(3)),
            active,
        ],
    );

    match rig.api.handle(Request::GetSummary).await {
        Response::Summary { summary } => {
            assert_eq!(summary.total, 3);
            assert_eq!(summary.active, 1);
            assert_eq!(summary.due, 1);
            assert_eq!(summary.upcoming, 1);
        }
        other => panic!("expected summary, got {other:?}"),
    }
}

#[tokio::test]
async fn lookup_and_active_queries() {
    let rig = rig();
    let mut active = valid_event(2, "running", utc(NOW));
    active.is_active = true;
    seed(&rig.store, vec![valid_event(1, "a", utc(NOW)), active]);

    match rig.api.handle(Request::GetEvent { id: 1 }).await {
        Response::Event { event: Some(event) } => assert_eq!(event.name, "a"),
        other => panic!("expected event, got {other:?}"),
    }
    match rig.api.handle(Request::GetEvent { id: 9 }).await {
        Response::Event { event: None } => {}
        other => panic!("expected empty lookup, got {other:?}"),
    }
    match rig.api.handle(Request::GetActiveEvent).await {
        Response::ActiveEvent { event: Some(event) } => assert_eq!(event.id, 2),
        other => panic!("expected active event, got {other:?}"),
    }
}

#[tokio::test]
async fn manual_activate_routes_through_scheduler() {
    let rig = rig();
    seed(&rig.store, vec![valid_event(1, "manual", utc(NOW) + TimeDelta::hours(5))]);

    match rig.api.handle(Request::ActivateEvent { id: 1 }).await {
        Response::Activating { id } => assert_eq!(id, 1),
        other => panic!("expected activating, got {other:?}"),
    }
    match rig.api.handle(Request::ActivateEvent { id: 42 }).await {
        Response::Error { error: OpError::NotFound { .. } } => {}
        other => panic!("expected not-found, got {other:?}"),
    }
}

#[tokio::test]
async fn cancel_restart_only_works_while_cancellable() {
    let rig = rig();

    // Nothing in flight: conflict.
    match rig.api.handle(Request::CancelRestart).await {
        Response::Error { error: OpError::Conflict { .. } } => {}
        other => panic!("expected conflict, got {other:?}"),
    }

    // Humans online puts the machine into Warning; cancel succeeds.
    rig.players.apply(&LogEvent::Join { name: "Kimi".into(), is_bot: false });
    rig.machine
        .initiate(valid_event(1, "x", utc(NOW)), Box::new(|_| {}))
        .unwrap();
    match rig.api.handle(Request::CancelRestart).await {
        Response::RestartCancelled => {}
        other => panic!("expected cancelled, got {other:?}"),
    }
    assert_eq!(rig.machine.phase(), crate::restart::RestartPhase::Idle);
}

#[tokio::test]
async fn backup_snapshots_the_document() {
    let rig = rig();

    // No document yet.
    match rig.api.handle(Request::BackupSchedule).await {
        Response::Error { error: OpError::NotFound { .. } } => {}
        other => panic!("expected not-found, got {other:?}"),
    }

    seed(&rig.store, vec![valid_event(1, "a", utc(NOW))]);
    match rig.api.handle(Request::BackupSchedule).await {
        Response::BackupCreated { path } => {
            assert!(path.exists());
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("event-schedule.backup."), "{name}");
            assert!(name.ends_with(".json"), "{name}");
        }
        other => panic!("expected backup, got {other:?}"),
    }
}

#[tokio::test]
async fn status_reports_phase_and_roster() {
    let rig = rig();
    rig.players.apply(&LogEvent::Join { name: "Kimi".into(), is_bot: false });
    rig.players.apply(&LogEvent::Join { name: "Bot".into(), is_bot: true });

    match rig.api.handle(Request::GetStatus).await {
        Response::Status { status } => {
            assert_eq!(status.restart_phase, "idle");
            assert!(!status.restart_processing);
            assert_eq!(status.countdown_minutes_remaining, None);
            assert_eq!(status.online_humans, 1);
            assert_eq!(status.total_humans, 1);
            assert_eq!(status.current_track, None);
        }
        other => panic!("expected status, got {other:?}"),
    }

    rig.machine
        .initiate(valid_event(1, "x", utc(NOW)), Box::new(|_| {}))
        .unwrap();
    match rig.api.handle(Request::GetStatus).await {
        Response::Status { status } => {
            assert_eq!(status.restart_phase, "warning");
            assert_eq!(status.countdown_minutes_remaining, Some(5));
        }
        other => panic!("expected status, got {other:?}"),
    }
}
