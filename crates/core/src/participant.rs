// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracked session participant.
//!
//! A participant is created on the first observed join and kept (offline)
//! after departure so reconnects preserve `joined_at`. Entries are erased
//! only when the roster is reset on server-process stop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    pub is_bot: bool,
    pub is_online: bool,
    pub joined_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    /// Grid slot, when known. Populated out-of-band by enrichment; absent
    /// slots sort last in roster snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<u32>,
}

impl Participant {
    pub fn joined(name: impl Into<String>, is_bot: bool, at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            is_bot,
            is_online: true,
            joined_at: at,
            last_seen_at: at,
            slot: None,
        }
    }
}
