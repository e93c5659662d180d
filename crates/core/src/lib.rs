// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pw-core: Core library for the Pitwall game-server control plane

pub mod macros;

pub mod clock;
pub mod event;
pub mod participant;
pub mod recurrence;
pub mod schedule;
pub mod time_fmt;

pub use clock::{Clock, FakeClock, SystemClock};
pub use event::{LogEvent, Topic, TrackChanged};
pub use participant::Participant;
pub use recurrence::next_instance;
pub use schedule::{
    PatternKind, RecurringPattern, Schedule, ScheduledEvent, ServerOverrides, TrackEntry,
};
pub use time_fmt::{format_eta, format_overdue};
