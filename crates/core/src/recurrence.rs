// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Next-instance arithmetic for recurring events.
//!
//! Weekday indices follow the persisted document: 0=Sunday..6=Saturday,
//! matching `chrono::Weekday::num_days_from_sunday`.

use crate::schedule::{PatternKind, RecurringPattern};
use chrono::{DateTime, Datelike, Days, Utc};

/// Compute the next UTC instant strictly after `from` at which the pattern
/// fires, or `None` if its occurrence budget is exhausted.
///
/// The budget itself is decremented by the scheduler after a successful
/// activation, never here.
pub fn next_instance(pattern: &RecurringPattern, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if pattern.is_expired() {
        return None;
    }

    match pattern.kind {
        PatternKind::Daily => {
            let candidate = from.date_naive().and_time(pattern.time).and_utc();
            if candidate > from {
                Some(candidate)
            } else {
                Some(candidate.checked_add_days(Days::new(1))?)
            }
        }
        PatternKind::Weekly => {
            let mut days: Vec<u8> = pattern.days.iter().copied().filter(|d| *d <= 6).collect();
            if days.is_empty() {
                return None;
            }
            days.sort_unstable();
            days.dedup();

            let today = from.weekday().num_days_from_sunday() as u8;
            let today_at = from.date_naive().and_time(pattern.time).and_utc();

            // Smallest listed day still ahead this week; a match on today
            // only counts if today's firing time has not passed.
            let this_week = days
                .iter()
                .copied()
                .find(|d| *d > today || (*d == today && today_at > from));

            let ahead = match this_week {
                Some(d) => u64::from(d - today),
                // Wrap to the first listed day next week; exactly 7 when
                // today is the only listed day and its time has passed.
                None => u64::from(days[0] + 7 - today),
            };

            let date = from.date_naive().checked_add_days(Days::new(ahead))?;
            Some(date.and_time(pattern.time).and_utc())
        }
    }
}

#[cfg(test)]
#[path = "recurrence_tests.rs"]
mod tests;
