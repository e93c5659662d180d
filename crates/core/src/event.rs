// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed events produced by the log pipeline.
//!
//! Every line the tailer consumes is published as [`LogEvent::RawLine`];
//! lines matching a parser additionally produce one of the typed variants.
//! Subscribers register per [`Topic`] so a consumer only sees the category
//! it cares about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events parsed out of the server console log.
///
/// Serializes with `{"type": "log:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LogEvent {
    /// A complete, non-blank line appended to the log.
    #[serde(rename = "log:raw")]
    RawLine { text: String },

    /// A participant joined the session.
    #[serde(rename = "log:join")]
    Join { name: String, is_bot: bool },

    /// A participant left the session.
    #[serde(rename = "log:leave")]
    Leave { name: String, is_bot: bool },

    /// A participant was kicked.
    #[serde(rename = "log:kick")]
    Kick { name: String, is_bot: bool },

    /// The server finished loading a track (the inter-race lobby signal).
    #[serde(rename = "log:track-loaded")]
    TrackLoaded { track_id: String },

    /// A race event started.
    #[serde(rename = "log:event-started")]
    EventStarted,
}

impl LogEvent {
    /// The fan-out topic this event is delivered on.
    pub fn topic(&self) -> Topic {
        match self {
            LogEvent::RawLine { .. } => Topic::Raw,
            LogEvent::Join { .. } | LogEvent::Leave { .. } | LogEvent::Kick { .. } => Topic::Player,
            LogEvent::TrackLoaded { .. } => Topic::Track,
            LogEvent::EventStarted => Topic::Race,
        }
    }
}

/// Subscription topics for the log fan-out bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Every non-blank line, unparsed.
    Raw,
    /// Join / Leave / Kick.
    Player,
    /// Track load transitions.
    Track,
    /// Race lifecycle markers.
    Race,
}

crate::simple_display! {
    Topic {
        Raw => "raw",
        Player => "player",
        Track => "track",
        Race => "race",
    }
}

/// Notice published by the track-change tracker on every track transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackChanged {
    pub track_id: String,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
