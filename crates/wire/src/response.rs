// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use pw_core::{Schedule, ScheduledEvent};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::OpError;

/// An upcoming event with its humanized countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEvent {
    #[serde(flatten)]
    pub event: ScheduledEvent,
    /// `startTime - now`, humanized ("2d 3h", "5m").
    pub starts_in: String,
}

/// Count summary over the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub total: usize,
    pub active: usize,
    pub upcoming: usize,
    pub due: usize,
    pub last_updated: DateTime<Utc>,
}

/// Live daemon status.
///
/// `restart_phase` is the machine phase's display name; the wire crate
/// stays free of the daemon's types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonStatus {
    pub restart_phase: String,
    pub restart_processing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_minutes_remaining: Option<u32>,
    pub online_humans: usize,
    pub total_humans: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_track: Option<String>,
}

/// Responses to control requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Response {
    Ok,

    Schedule { schedule: Schedule },

    ActiveEvent { event: Option<Box<ScheduledEvent>> },

    UpcomingEvents { events: Vec<UpcomingEvent> },

    DueEvents { events: Vec<ScheduledEvent> },

    Summary { summary: ScheduleSummary },

    Event { event: Option<Box<ScheduledEvent>> },

    /// Activation was accepted and handed to the restart machine.
    Activating { id: i64 },

    RestartCancelled,

    BackupCreated { path: PathBuf },

    Status { status: DaemonStatus },

    Error { error: OpError },
}

impl Response {
    pub fn error(error: OpError) -> Self {
        Self::Error { error }
    }
}
