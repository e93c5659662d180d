// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Humanized durations for queries and log lines.

use chrono::TimeDelta;

/// Format a time-until delta as a compact human string ("2d 3h", "5m",
/// "now"). Non-positive deltas collapse to "now".
pub fn format_eta(delta: TimeDelta) -> String {
    let secs = delta.num_seconds();
    if secs <= 0 {
        return "now".to_string();
    }
    format_secs(secs as u64)
}

/// Format how far in the past an instant lies ("30m ago").
pub fn format_overdue(delta: TimeDelta) -> String {
    let secs = delta.num_seconds();
    if secs <= 0 {
        return "now".to_string();
    }
    format!("{} ago", format_secs(secs as u64))
}

fn format_secs(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let mins = (secs % 3_600) / 60;

    if days > 0 {
        if hours > 0 {
            format!("{days}d {hours}h")
        } else {
            format!("{days}d")
        }
    } else if hours > 0 {
        if mins > 0 {
            format!("{hours}h {mins}m")
        } else {
            format!("{hours}h")
        }
    } else if mins > 0 {
        format!("{mins}m")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
