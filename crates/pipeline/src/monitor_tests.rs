// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pw_core::Topic;
use std::io::Write;
use tempfile::TempDir;

fn fast_config(path: &Path) -> MonitorConfig {
    MonitorConfig {
        log_path: path.to_path_buf(),
        poll_interval: Duration::from_millis(20),
        debounce: Duration::from_millis(5),
    }
}

fn append(path: &Path, text: &str) {
    let mut f = std::fs::OpenOptions::new().create(true).append(true).open(path).unwrap();
    f.write_all(text.as_bytes()).unwrap();
}

fn collect(bus: &LogBus, topic: Topic) -> Arc<Mutex<Vec<LogEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    bus.subscribe(topic, move |ev| s.lock().push(ev.clone()));
    seen
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
#[serial_test::serial]
async fn publishes_appended_lines_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("server.log");
    std::fs::write(&path, "before monitoring\n").unwrap();

    let bus = Arc::new(LogBus::new());
    let raw = collect(&bus, Topic::Raw);
    let monitor = LogMonitor::start(fast_config(&path), bus.clone());
    settle().await;

    append(&path, "one\ntwo\n");
    settle().await;

    monitor.stop().await;
    let texts: Vec<String> = raw
        .lock()
        .iter()
        .filter_map(|e| match e {
            LogEvent::RawLine { text } => Some(text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["one", "two"], "seeded content skipped, each line once");
}

#[tokio::test]
#[serial_test::serial]
async fn parses_player_lines_onto_player_topic() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("server.log");
    std::fs::write(&path, "").unwrap();

    let bus = Arc::new(LogBus::new());
    let players = collect(&bus, Topic::Player);
    let monitor = LogMonitor::start(fast_config(&path), bus.clone());
    settle().await;

    append(&path, "12:00:00 - Kimi has joined.\nnoise line\n");
    settle().await;

    monitor.stop().await;
    assert_eq!(
        *players.lock(),
        vec![LogEvent::Join { name: "Kimi".into(), is_bot: false }]
    );
}

#[tokio::test]
#[serial_test::serial]
async fn recovers_from_truncation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("server.log");
    std::fs::write(&path, "a lot of old content that will vanish\n").unwrap();

    let bus = Arc::new(LogBus::new());
    let raw = collect(&bus, Topic::Raw);
    let monitor = LogMonitor::start(fast_config(&path), bus.clone());
    settle().await;

    std::fs::write(&path, "tiny\n").unwrap();
    settle().await;

    monitor.stop().await;
    let count = raw.lock().len();
    assert_eq!(count, 1, "exactly one line after truncation recovery");
}

#[test]
fn resolves_log_path_from_config_key() {
    let dir = TempDir::new().unwrap();
    let cfg_path = dir.path().join("server_config.cfg");
    std::fs::write(&cfg_path, "log=logs/server.log\n").unwrap();
    let cfg = pw_config::ServerConfigFile::new(&cfg_path);

    let resolved = resolve_log_path(&cfg, Some(Path::new("/fallback.log"))).unwrap();
    assert_eq!(resolved, dir.path().join("logs/server.log"));
}

#[test]
fn resolve_falls_back_when_key_absent() {
    let dir = TempDir::new().unwrap();
    let cfg_path = dir.path().join("server_config.cfg");
    std::fs::write(&cfg_path, "server_name=x\n").unwrap();
    let cfg = pw_config::ServerConfigFile::new(&cfg_path);

    let resolved = resolve_log_path(&cfg, Some(Path::new("/fallback.log")));
    assert_eq!(resolved, Some(PathBuf::from("/fallback.log")));

    assert_eq!(resolve_log_path(&cfg, None), None);
}
