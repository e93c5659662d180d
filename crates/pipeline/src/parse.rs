// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Console log line parsers.
//!
//! Bots are prefixed with `*` in the server's join/leave lines; group 1
//! captures the marker, group 2 the bare name.

use pw_core::LogEvent;
use regex::Regex;
use std::sync::LazyLock;

static JOIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"- (\*?)(.+?) has joined\.").expect("constant regex pattern is valid")
});

static LEAVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"- (\*?)(.+?) has quit").expect("constant regex pattern is valid")
});

static KICK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"- (\*?)(.+?) kicked\.").expect("constant regex pattern is valid")
});

static TRACK_LOADED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Current track loaded!\s*\(([^)]+)\)").expect("constant regex pattern is valid")
});

const EVENT_STARTED: &str = "Event started!";

/// Parse one log line into a typed event. First match wins; lines matching
/// no parser return `None` (they still flow through the bus as raw lines).
pub fn parse_line(line: &str) -> Option<LogEvent> {
    if let Some(caps) = JOIN.captures(line) {
        return Some(LogEvent::Join {
            name: caps[2].to_string(),
            is_bot: !caps[1].is_empty(),
        });
    }
    if let Some(caps) = LEAVE.captures(line) {
        return Some(LogEvent::Leave {
            name: caps[2].to_string(),
            is_bot: !caps[1].is_empty(),
        });
    }
    if let Some(caps) = KICK.captures(line) {
        return Some(LogEvent::Kick {
            name: caps[2].to_string(),
            is_bot: !caps[1].is_empty(),
        });
    }
    if let Some(caps) = TRACK_LOADED.captures(line) {
        return Some(LogEvent::TrackLoaded { track_id: caps[1].to_string() });
    }
    if line.contains(EVENT_STARTED) {
        return Some(LogEvent::EventStarted);
    }
    None
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
