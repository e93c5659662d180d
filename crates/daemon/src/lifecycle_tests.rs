// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-daemon scenarios over fakes and a real temp filesystem.

use super::*;
use crate::config::DaemonConfig;
use chrono::Utc;
use pw_adapters::{FakeProcessAdapter, FakeWebhookAdapter};
use pw_core::{FakeClock, Schedule, ScheduledEvent, ServerOverrides, TrackEntry};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn fast_config(dir: &Path) -> DaemonConfig {
    let mut config = DaemonConfig::new(dir.join("server_config.cfg"), dir);
    config.poll_interval = Duration::from_millis(20);
    config.debounce = Duration::from_millis(5);
    config.scheduler.sweep_interval = Duration::from_millis(50);
    config.restart.countdown_tick = Duration::from_millis(30);
    config.restart.check_interval = Duration::from_millis(30);
    config.restart.stabilize_delay = Duration::from_millis(10);
    config.restart.completed_reset_delay = Duration::from_millis(10);
    config
}

fn append_log(dir: &Path, text: &str) {
    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("server.log"))
        .unwrap();
    f.write_all(text.as_bytes()).unwrap();
}

async fn wait_until(what: &str, f: impl Fn() -> bool) {
    for _ in 0..400 {
        if f() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {what}");
}

#[tokio::test(flavor = "multi_thread")]
#[serial_test::serial]
async fn scheduled_event_activates_through_the_whole_stack() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("server_config.cfg"),
        "server_name=Old\nlog=server.log\n\n# Event Loop\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("server.log"), "").unwrap();

    let clock = FakeClock::new();
    let process = Arc::new(FakeProcessAdapter::new());
    let webhook = Arc::new(FakeWebhookAdapter::new());
    let daemon = Daemon::start(fast_config(dir.path()), process.clone(), webhook.clone(), clock.clone());

    // Three humans join via the tailed log.
    append_log(dir.path(), "- Alice has joined.\n- Bob has joined.\n- Cara has joined.\n");
    wait_until("roster sees three humans", || daemon.players().count().online_humans == 3).await;

    // The admin pushes a due event while the daemon is running.
    let mut event =
        ScheduledEvent::new(1, "Weekend", clock.now_utc() + chrono::TimeDelta::minutes(2));
    event.tracks = vec![TrackEntry::new("a")];
    event.server_config = Some(ServerOverrides {
        server_name: Some("Weekend Bash".into()),
        ..Default::default()
    });
    let store = ScheduleStore::new(dir.path());
    let mut schedule = Schedule { events: vec![event], last_updated: Utc::now() };
    store.save(&mut schedule).unwrap();

    // The sweep warns, counts down, then parks waiting for a lobby.
    wait_until("pending announced", || {
        process
            .console_lines()
            .contains(&"say Server will restart at the next lobby.".to_string())
    })
    .await;
    assert!(process
        .console_lines()
        .contains(&"say Server will restart in 5 minute(s).".to_string()));
    assert_eq!(process.restart_count(), 0);

    // Lobby arrives through the log.
    append_log(dir.path(), "Current track loaded! (a)\n");
    wait_until("restart executed", || process.restart_count() == 1).await;
    wait_until("webhook fired", || !webhook.notices().is_empty()).await;

    let notices = webhook.notices();
    assert_eq!(notices[0].event_id, 1);
    assert_eq!(notices[0].event_name, "Weekend");

    wait_until("active flag persisted", || {
        store.load().find(1).map(|e| e.is_active).unwrap_or(false)
    })
    .await;

    let server_config = pw_config::ServerConfigFile::new(dir.path().join("server_config.cfg"));
    let basic = server_config.read_basic().unwrap();
    assert_eq!(basic.server_name.as_deref(), Some("Weekend Bash"));
    let (collection, tracks) = server_config.read_tracks().unwrap();
    assert_eq!(collection, "Event: Weekend");
    assert_eq!(tracks, vec![TrackEntry::new("a")]);

    daemon.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
#[serial_test::serial]
async fn startup_with_only_missed_events_stays_idle() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("server_config.cfg"),
        "server_name=Old\nlog=server.log\n\n# Event Loop\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("server.log"), "").unwrap();

    let clock = FakeClock::new();
    let store = ScheduleStore::new(dir.path());
    let mut schedule = Schedule {
        events: vec![ScheduledEvent::new(
            1,
            "missed",
            clock.now_utc() - chrono::TimeDelta::minutes(30),
        )],
        last_updated: Utc::now(),
    };
    store.save(&mut schedule).unwrap();

    let process = Arc::new(FakeProcessAdapter::new());
    let webhook = Arc::new(FakeWebhookAdapter::new());
    let daemon = Daemon::start(fast_config(dir.path()), process.clone(), webhook.clone(), clock);

    // Give several sweeps a chance; the missed event must stay untouched.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(process.restart_count(), 0);
    assert!(!store.load().find(1).unwrap().is_active);
    assert!(webhook.notices().is_empty());

    daemon.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
#[serial_test::serial]
async fn clean_shutdown_stops_background_tasks() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("server_config.cfg"),
        "server_name=Old\nlog=server.log\n\n# Event Loop\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("server.log"), "").unwrap();

    let daemon = Daemon::start(
        fast_config(dir.path()),
        Arc::new(FakeProcessAdapter::new()),
        Arc::new(FakeWebhookAdapter::new()),
        FakeClock::new(),
    );
    daemon.shutdown().await;
}
