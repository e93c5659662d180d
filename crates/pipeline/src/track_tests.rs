// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex as PlMutex;
use pw_core::FakeClock;
use std::sync::Arc;

#[test]
fn updates_current_and_notifies() {
    let tracker = TrackChangeTracker::new(FakeClock::new());
    let seen: Arc<PlMutex<Vec<String>>> = Arc::new(PlMutex::new(Vec::new()));
    let s = seen.clone();
    tracker.on_change(move |notice| s.lock().push(notice.track_id.clone()));

    assert_eq!(tracker.current(), None);
    tracker.track_loaded("speedway2");
    tracker.track_loaded("mudpit");

    assert_eq!(tracker.current().as_deref(), Some("mudpit"));
    assert_eq!(*seen.lock(), vec!["speedway2", "mudpit"]);
}

#[test]
fn panicking_listener_does_not_poison_tracker() {
    let tracker = TrackChangeTracker::new(FakeClock::new());
    tracker.on_change(|_| panic!("boom"));
    tracker.track_loaded("speedway2");
    assert_eq!(tracker.current().as_deref(), Some("speedway2"));
}

#[test]
fn notice_carries_clock_time() {
    let clock = FakeClock::new();
    let at = clock.now_utc();
    let tracker = TrackChangeTracker::new(clock);
    let seen = Arc::new(PlMutex::new(None));
    let s = seen.clone();
    tracker.on_change(move |notice| *s.lock() = Some(notice.at));
    tracker.track_loaded("x");
    assert_eq!(*seen.lock(), Some(at));
}
