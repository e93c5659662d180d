// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule document validation.
//!
//! Returns every failure at once so the front-end can surface the full
//! list instead of fixing errors one round-trip at a time.

use pw_core::{PatternKind, ScheduledEvent};
use std::collections::HashSet;

/// Validate an incoming event list. An empty result means the document is
/// acceptable.
pub fn validate_events(events: &[ScheduledEvent]) -> Vec<String> {
    let mut messages = Vec::new();
    let mut ids = HashSet::new();
    let mut active = 0usize;

    for event in events {
        let label = event_label(event);

        if event.id <= 0 {
            messages.push(format!("{label}: id must be greater than zero"));
        } else if !ids.insert(event.id) {
            messages.push(format!("{label}: duplicate id"));
        }
        if event.name.trim().is_empty() {
            messages.push(format!("{label}: name is required"));
        }
        if event.start_time_unset() {
            messages.push(format!("{label}: startTime is required"));
        }
        if event.is_active {
            active += 1;
        }

        for (n, track) in event.tracks.iter().enumerate() {
            if track.track.trim().is_empty() {
                messages.push(format!("{label}: track {} has an empty path", n + 1));
            }
        }

        if let Some(pattern) = &event.recurring_pattern {
            if pattern.kind == PatternKind::Weekly && pattern.days.is_empty() {
                messages.push(format!("{label}: weekly pattern needs at least one day"));
            }
            if pattern.days.iter().any(|d| *d > 6) {
                messages.push(format!("{label}: weekday indices must be 0..=6"));
            }
        }
    }

    if active > 1 {
        messages.push("at most one event may be active".to_string());
    }

    messages
}

fn event_label(event: &ScheduledEvent) -> String {
    if event.name.trim().is_empty() {
        format!("event #{}", event.id)
    } else {
        format!("event '{}'", event.name)
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
