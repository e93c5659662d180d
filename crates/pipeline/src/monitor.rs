// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log monitor: drives the cursor from filesystem notifications and a
//! poll fallback, publishing parsed events onto the bus.
//!
//! Both wake sources funnel into the same read path. Notifications are
//! debounced to coalesce write bursts; the poll covers platforms and
//! edge cases where notifications are lost. The cursor sits behind a
//! try-mutex with a small budget; a contended tick is skipped and the
//! next one covers it.

use crate::bus::LogBus;
use crate::cursor::LogCursor;
use crate::parse::parse_line;
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use parking_lot::Mutex;
use pw_core::LogEvent;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// How long a tick waits for the cursor before giving up.
const CURSOR_LOCK_BUDGET: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub log_path: PathBuf,
    /// Poll fallback period.
    pub poll_interval: Duration,
    /// Quiet window after a filesystem notification.
    pub debounce: Duration,
}

impl MonitorConfig {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            poll_interval: Duration::from_secs(2),
            debounce: Duration::from_millis(100),
        }
    }
}

/// Resolve the server log path: the `log=` key of the active server config
/// (relative paths anchored at the config file's directory), else the
/// configured fallback.
pub fn resolve_log_path(
    server_config: &pw_config::ServerConfigFile,
    fallback: Option<&Path>,
) -> Option<PathBuf> {
    let from_config = server_config
        .read_basic()
        .ok()
        .and_then(|cfg| cfg.log)
        .filter(|v| !v.is_empty())
        .map(|v| {
            let raw = PathBuf::from(v);
            if raw.is_absolute() {
                raw
            } else {
                server_config
                    .path()
                    .parent()
                    .map(|dir| dir.join(&raw))
                    .unwrap_or(raw)
            }
        });
    from_config.or_else(|| fallback.map(Path::to_path_buf))
}

/// Running monitor task. Dropping the handle leaves the task running;
/// call [`LogMonitor::stop`] for an orderly shutdown.
pub struct LogMonitor {
    shutdown_tx: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<()>,
}

impl LogMonitor {
    /// Seed the cursor at the file's current end and start tailing.
    pub fn start(config: MonitorConfig, bus: Arc<LogBus>) -> Self {
        let cursor = Arc::new(Mutex::new(LogCursor::seed(&config.log_path)));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(monitor_loop(config, bus, cursor, shutdown_rx));
        Self { shutdown_tx, handle }
    }

    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

async fn monitor_loop(
    config: MonitorConfig,
    bus: Arc<LogBus>,
    cursor: Arc<Mutex<LogCursor>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let (file_tx, mut file_rx) = mpsc::channel::<()>(16);

    // Watch the parent directory; some editors and the server itself
    // replace the file, which would drop a watch on the file node.
    let _watcher = install_watcher(&config.log_path, file_tx);

    let mut poll = tokio::time::interval(config.poll_interval);
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut watching = true;

    loop {
        tokio::select! {
            _ = poll.tick() => {}
            notified = file_rx.recv(), if watching => {
                match notified {
                    Some(()) => {
                        tokio::time::sleep(config.debounce).await;
                        while file_rx.try_recv().is_ok() {}
                    }
                    None => {
                        // Watcher gone; the poll keeps the tail alive.
                        debug!("file watcher channel closed, polling only");
                        watching = false;
                        continue;
                    }
                }
            }
            _ = &mut shutdown_rx => break,
        }
        drain(&cursor, &bus);
    }
}

fn install_watcher(
    log_path: &Path,
    file_tx: mpsc::Sender<()>,
) -> Option<notify::RecommendedWatcher> {
    let mut watcher = match notify::recommended_watcher(move |res: Result<NotifyEvent, _>| {
        if let Ok(event) = res {
            if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                let _ = file_tx.blocking_send(());
            }
        }
    }) {
        Ok(w) => w,
        Err(e) => {
            warn!(error = %e, "file watcher unavailable, polling only");
            return None;
        }
    };

    let watch_dir = log_path.parent().unwrap_or(log_path);
    if let Err(e) = watcher.watch(watch_dir, RecursiveMode::NonRecursive) {
        warn!(dir = %watch_dir.display(), error = %e, "watch failed, polling only");
        return None;
    }
    Some(watcher)
}

fn drain(cursor: &Mutex<LogCursor>, bus: &LogBus) {
    let Some(mut cursor) = cursor.try_lock_for(CURSOR_LOCK_BUDGET) else {
        debug!("cursor busy, skipping tick");
        return;
    };
    let lines = match cursor.read_new_lines() {
        Ok(lines) => lines,
        Err(e) => {
            warn!(path = %cursor.path().display(), error = %e, "log read failed");
            return;
        }
    };
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        bus.publish(&LogEvent::RawLine { text: line.clone() });
        if let Some(event) = parse_line(&line) {
            bus.publish(&event);
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
