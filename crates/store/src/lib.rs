// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pw-store: schedule persistence.
//!
//! The schedule lives as a single JSON document under a `Data/` directory
//! next to the server's working dir (or the application dir when unset).
//! Saves are atomic (tmp write + rename) and every save stamps
//! `lastUpdated`. Loading is lossy-tolerant: a missing or unreadable
//! document yields an empty schedule rather than an error, because the
//! scheduler must come up even when the document is gone or mangled.

mod store;

pub use store::{ScheduleStore, StoreError};
