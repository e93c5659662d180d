// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule document model.
//!
//! The schedule is a JSON document persisted by `pw-store` and replaced
//! wholesale by the admin front-end. Timestamps are normalized to UTC on
//! load: offset-bearing values are shifted, offset-free values are taken
//! as already UTC.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Partial server-config override bag carried by an event.
///
/// `None` fields mean "leave the current value". String fields treat the
/// empty string the same as `None`, except `password` where an explicit
/// empty value clears the server password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_players: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bots: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_damage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lobby_countdown: Option<u32>,
}

/// One entry of an event's track rotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEntry {
    pub track: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamemode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bots: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_teams: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_reset_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrong_way_limiter_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_class_restriction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_restriction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
}

impl TrackEntry {
    pub fn new(track: impl Into<String>) -> Self {
        Self { track: track.into(), ..Self::default() }
    }
}

/// Recurrence rule type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternKind {
    Daily,
    Weekly,
}

crate::simple_display! {
    PatternKind {
        Daily => "daily",
        Weekly => "weekly",
    }
}

/// Recurrence rule attached to an event.
///
/// `days` holds weekday indices (0=Sunday..6=Saturday) and is only
/// meaningful for `Weekly` patterns. `occurrences`, when present, is a
/// remaining-activation budget decremented by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPattern {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    #[serde(default)]
    pub days: Vec<u8>,
    pub time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<i32>,
}

impl RecurringPattern {
    /// Whether the occurrence budget is exhausted.
    pub fn is_expired(&self) -> bool {
        matches!(self.occurrences, Some(n) if n <= 0)
    }
}

/// A scheduled server reconfiguration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEvent {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "unset_time", with = "utc_lenient")]
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_config: Option<ServerOverrides>,
    #[serde(default)]
    pub tracks: Vec<TrackEntry>,
    #[serde(default)]
    pub collection_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_pattern: Option<RecurringPattern>,
}

impl ScheduledEvent {
    pub fn new(id: i64, name: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            start_time,
            is_active: false,
            server_config: None,
            tracks: Vec::new(),
            collection_name: String::new(),
            recurring_pattern: None,
        }
    }

    /// Whether `start_time` was never supplied by the admin.
    pub fn start_time_unset(&self) -> bool {
        self.start_time == unset_time()
    }

    /// Display name for the track set, synthesized from the event name
    /// when the admin left it blank.
    pub fn collection_display_name(&self) -> String {
        if self.collection_name.is_empty() {
            format!("Event: {}", self.name)
        } else {
            self.collection_name.clone()
        }
    }
}

/// The persisted schedule document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub events: Vec<ScheduledEvent>,
    #[serde(default = "unset_time", with = "utc_lenient")]
    pub last_updated: DateTime<Utc>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self { events: Vec::new(), last_updated: unset_time() }
    }
}

impl Schedule {
    pub fn find(&self, id: i64) -> Option<&ScheduledEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn find_mut(&mut self, id: i64) -> Option<&mut ScheduledEvent> {
        self.events.iter_mut().find(|e| e.id == id)
    }

    pub fn active(&self) -> Option<&ScheduledEvent> {
        self.events.iter().find(|e| e.is_active)
    }

    /// Flip `is_active` on the given event and clear it everywhere else,
    /// preserving the at-most-one-active invariant.
    pub fn set_active(&mut self, id: i64) {
        for event in &mut self.events {
            event.is_active = event.id == id;
        }
    }
}

fn unset_time() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Lenient UTC timestamp (de)serialization.
///
/// Accepts RFC 3339 with any offset (shifted to UTC) or an offset-free
/// date-time (taken as UTC). Always serializes with the `Z` designator.
pub mod utc_lenient {
    use super::*;
    use serde::de::Error as _;
    use serde::{Deserializer, Serializer};

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn serialize<S: Serializer>(t: &DateTime<Utc>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(de)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognized timestamp: {raw}")))
    }

    pub(crate) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
            return Some(t.with_timezone(&Utc));
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(naive.and_utc());
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
