// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! Defaults mirror production behavior; tests shrink the intervals.

use std::path::PathBuf;
use std::time::Duration;

/// Smart-restart knobs.
#[derive(Debug, Clone)]
pub struct RestartConfig {
    /// Warning countdown length, one chat announcement per minute.
    pub countdown_minutes: u32,
    /// Spacing between countdown announcements.
    pub countdown_tick: Duration,
    /// Hard ceiling on waiting for a lobby once Pending.
    pub pending_timeout: Duration,
    /// Spacing of drain/timeout checks while Pending.
    pub check_interval: Duration,
    /// Wait after a successful process restart before touching config.
    pub stabilize_delay: Duration,
    /// Dwell in Completed before re-arming to Idle.
    pub completed_reset_delay: Duration,
    /// Console command used for in-game announcements. Deployments using
    /// the alternate console dialect set `/message` here.
    pub chat_command: String,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            countdown_minutes: 5,
            countdown_tick: Duration::from_secs(60),
            pending_timeout: Duration::from_secs(10 * 60),
            check_interval: Duration::from_secs(30),
            stabilize_delay: Duration::from_secs(2),
            completed_reset_delay: Duration::from_secs(5),
            chat_command: "say".to_string(),
        }
    }
}

/// Scheduler knobs.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Sweep period.
    pub sweep_interval: Duration,
    /// Events starting within this lead are due; sized so the warning
    /// countdown finishes at the scheduled minute.
    pub due_lead: chrono::TimeDelta,
    /// Events older than this at startup are reported, never auto-run.
    pub missed_grace: chrono::TimeDelta,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(30),
            due_lead: chrono::TimeDelta::minutes(5),
            missed_grace: chrono::TimeDelta::minutes(5),
        }
    }
}

/// Top-level daemon wiring.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// The game server's config file (basic keys + tracks section).
    pub server_config_path: PathBuf,
    /// Base directory for persisted state; the store appends `Data/`.
    pub state_base: PathBuf,
    /// Log path used when the server config has no `log=` key.
    pub log_path_fallback: Option<PathBuf>,
    /// Outbound activation webhook endpoint (`http://host:port/path`).
    pub webhook_endpoint: Option<String>,
    /// Log poll period (the watcher covers the common case).
    pub poll_interval: Duration,
    /// Quiet window applied to watcher bursts.
    pub debounce: Duration,
    pub restart: RestartConfig,
    pub scheduler: SchedulerConfig,
}

impl DaemonConfig {
    pub fn new(server_config_path: impl Into<PathBuf>, state_base: impl Into<PathBuf>) -> Self {
        Self {
            server_config_path: server_config_path.into(),
            state_base: state_base.into(),
            log_path_fallback: None,
            webhook_endpoint: None,
            poll_interval: Duration::from_secs(2),
            debounce: Duration::from_millis(100),
            restart: RestartConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}
