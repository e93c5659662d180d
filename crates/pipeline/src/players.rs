// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory roster of session participants.
//!
//! Fed from the bus's player topic. Departed participants stay in the map
//! (offline) so a reconnect keeps its original `joined_at`; the roster is
//! cleared only on server-process stop.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pw_core::{Clock, LogEvent, Participant};
use std::collections::HashMap;

/// Human head-count snapshot. Bots are excluded: the restart machine uses
/// these numbers to decide whether anyone needs warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerCount {
    pub online_humans: usize,
    pub total_humans: usize,
}

pub struct PlayerTracker<C: Clock> {
    clock: C,
    roster: Mutex<HashMap<String, Participant>>,
}

impl<C: Clock> PlayerTracker<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, roster: Mutex::new(HashMap::new()) }
    }

    /// Apply a player-topic event.
    pub fn apply(&self, event: &LogEvent) {
        let now = self.clock.now_utc();
        match event {
            LogEvent::Join { name, is_bot } => self.on_join(name, *is_bot, now),
            LogEvent::Leave { name, .. } | LogEvent::Kick { name, .. } => self.on_depart(name, now),
            _ => {}
        }
    }

    fn on_join(&self, name: &str, is_bot: bool, now: DateTime<Utc>) {
        let mut roster = self.roster.lock();
        roster
            .entry(name.to_string())
            .and_modify(|p| {
                p.is_online = true;
                p.is_bot = is_bot;
                p.last_seen_at = now;
            })
            .or_insert_with(|| Participant::joined(name, is_bot, now));
    }

    fn on_depart(&self, name: &str, now: DateTime<Utc>) {
        let mut roster = self.roster.lock();
        if let Some(p) = roster.get_mut(name) {
            p.is_online = false;
            p.last_seen_at = now;
        }
    }

    /// Record a participant's grid slot (populated out-of-band).
    pub fn set_slot(&self, name: &str, slot: u32) {
        let mut roster = self.roster.lock();
        if let Some(p) = roster.get_mut(name) {
            p.slot = Some(slot);
        }
    }

    /// Currently-online participants, sorted by slot (absent slots last),
    /// then by join time.
    pub fn snapshot(&self) -> Vec<Participant> {
        let roster = self.roster.lock();
        let mut online: Vec<Participant> =
            roster.values().filter(|p| p.is_online).cloned().collect();
        online.sort_by(|a, b| {
            match (a.slot, b.slot) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then(a.joined_at.cmp(&b.joined_at))
        });
        online
    }

    /// Human counts; always `online_humans <= total_humans`.
    pub fn count(&self) -> PlayerCount {
        let roster = self.roster.lock();
        let total_humans = roster.values().filter(|p| !p.is_bot).count();
        let online_humans = roster.values().filter(|p| !p.is_bot && p.is_online).count();
        PlayerCount { online_humans, total_humans }
    }

    /// Erase all entries (server process stopped).
    pub fn reset(&self) {
        self.roster.lock().clear();
    }
}

#[cfg(test)]
#[path = "players_tests.rs"]
mod tests;
