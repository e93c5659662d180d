// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pw-pipeline: the log pipeline.
//!
//! The server process appends to a console log; this crate tails it from
//! a byte cursor, parses each complete line into typed [`pw_core::LogEvent`]s,
//! and fans them out synchronously to per-topic subscribers. The player
//! roster and track-change tracker are the built-in consumers.

pub mod bus;
pub mod cursor;
pub mod monitor;
pub mod parse;
pub mod players;
pub mod track;

pub use bus::{LogBus, SubscriberToken};
pub use cursor::LogCursor;
pub use monitor::{resolve_log_path, LogMonitor, MonitorConfig};
pub use parse::parse_line;
pub use players::{PlayerCount, PlayerTracker};
pub use track::TrackChangeTracker;
