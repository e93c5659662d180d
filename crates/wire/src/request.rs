// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pw_core::ScheduledEvent;
use serde::{Deserialize, Serialize};

/// Control requests from the admin front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    /// Replace the whole schedule (validated before it lands).
    ReplaceSchedule { events: Vec<ScheduledEvent> },

    /// The full schedule document.
    GetSchedule,

    /// The currently active event, if any.
    GetActiveEvent,

    /// Non-active events beyond the due window, nearest first.
    GetUpcomingEvents,

    /// Non-active events inside the due window.
    GetDueEvents,

    /// Count summary over the schedule.
    GetSummary,

    /// Lookup by id.
    GetEvent { id: i64 },

    /// Operator-initiated activation, same path as a scheduled one.
    ActivateEvent { id: i64 },

    /// Cancel a graceful restart that has not begun yet.
    CancelRestart,

    /// Snapshot the schedule document to a timestamped backup.
    BackupSchedule,

    /// Live daemon status: restart phase, roster counts, current track.
    GetStatus,
}
