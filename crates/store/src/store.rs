// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule document store.

use chrono::Utc;
use pw_core::{Schedule, ScheduledEvent};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

const SCHEDULE_FILE: &str = "event-schedule.json";
const MAX_BACKUPS: usize = 5;

/// Errors from store operations.
///
/// Only writes surface errors; `load` degrades to an empty schedule.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed schedule store.
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    data_dir: PathBuf,
}

impl ScheduleStore {
    /// Store rooted at `<base>/Data`, where `base` is the server's working
    /// directory or the application directory when unset.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { data_dir: base.into().join("Data") }
    }

    pub fn schedule_path(&self) -> PathBuf {
        self.data_dir.join(SCHEDULE_FILE)
    }

    /// Load the schedule document.
    ///
    /// Missing file: empty schedule. Structurally invalid document: logged
    /// and an empty schedule, never an error; the previous content stays
    /// on disk for operator recovery. Timestamp normalization to UTC is
    /// handled by the document model on deserialize.
    pub fn load(&self) -> Schedule {
        let path = self.schedule_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Schedule::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "schedule unreadable, starting empty");
                return Schedule::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "schedule invalid, starting empty");
                Schedule::default()
            }
        }
    }

    /// Persist the schedule atomically, stamping `lastUpdated`.
    pub fn save(&self, schedule: &mut Schedule) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)?;
        schedule.last_updated = Utc::now();

        let path = self.schedule_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(schedule)?)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Swap in a whole new event list (the admin pushes full documents).
    pub fn replace(&self, events: Vec<ScheduledEvent>) -> Result<Schedule, StoreError> {
        let mut schedule = Schedule { events, last_updated: Utc::now() };
        self.save(&mut schedule)?;
        Ok(schedule)
    }

    /// Copy the current document to a timestamped backup, rotating old
    /// backups out past [`MAX_BACKUPS`].
    pub fn backup(&self) -> Result<PathBuf, StoreError> {
        let path = self.schedule_path();
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let backup = self.data_dir.join(format!("event-schedule.backup.{stamp}.json"));
        fs::copy(&path, &backup)?;
        self.rotate_backups()?;
        Ok(backup)
    }

    fn rotate_backups(&self) -> Result<(), StoreError> {
        let mut backups: Vec<PathBuf> = fs::read_dir(&self.data_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| is_backup(p))
            .collect();
        // Timestamped names sort chronologically.
        backups.sort();
        while backups.len() > MAX_BACKUPS {
            let oldest = backups.remove(0);
            let _ = fs::remove_file(oldest);
        }
        Ok(())
    }
}

fn is_backup(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("event-schedule.backup.") && n.ends_with(".json"))
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
