// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Smart restart: warn, wait for a safe moment, restart, reconfigure.
//!
//! Phases: Idle → Warning → Pending → Restarting → Completed → Idle.
//! With nobody online the machine goes straight to Restarting. While
//! Pending, three exits race: a track change (lobby), the roster draining
//! to zero humans, and a hard timeout.
//!
//! All state lives under one mutex. Timer tasks and the track-change
//! callback re-check phase and generation under that mutex on every wake,
//! so a cancelled or superseded run's tasks fall through harmlessly. The
//! mutex is never held across an await; announcements and supervisor
//! calls happen off-lock.

use crate::config::RestartConfig;
use pw_adapters::{ProcessAdapter, ProcessError};
use pw_config::{BasicConfig, ConfigError, ServerConfigFile};
use pw_core::{Clock, ScheduledEvent, ServerOverrides};
use pw_pipeline::PlayerTracker;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};

const MSG_PENDING: &str = "Server will restart at the next lobby.";
const MSG_RESTARTING: &str = "Server restarting now.";
const MSG_TIMEOUT: &str = "Server restarting now (timeout).";
const MSG_CANCELLED: &str = "Server restart cancelled.";

/// Machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPhase {
    Idle,
    Warning,
    Pending,
    Restarting,
    Completed,
}

pw_core::simple_display! {
    RestartPhase {
        Idle => "idle",
        Warning => "warning",
        Pending => "pending",
        Restarting => "restarting",
        Completed => "completed",
    }
}

/// Errors from machine entry points.
#[derive(Debug, Error)]
pub enum RestartError {
    #[error("a restart is already in flight (phase: {0})")]
    Busy(RestartPhase),
    #[error("nothing to cancel in phase {0}")]
    NotCancellable(RestartPhase),
}

/// Invoked with the event once the restart completed and config applied.
pub type CompletionCallback = Box<dyn FnOnce(ScheduledEvent) + Send>;

/// Point-in-time view of the machine for status queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartStatus {
    pub phase: RestartPhase,
    /// Remaining warning announcements, while Warning.
    pub countdown_minutes_remaining: Option<u32>,
    /// Time since the warning countdown began, while Warning or later.
    pub warning_elapsed: Option<std::time::Duration>,
    pub pending_event_id: Option<i64>,
}

struct RestartState {
    phase: RestartPhase,
    pending_event: Option<ScheduledEvent>,
    on_complete: Option<CompletionCallback>,
    countdown_remaining: u32,
    countdown_started_at: Option<Instant>,
    wait_started_at: Option<Instant>,
    /// Bumped on initiate and cancel so stale timer tasks self-retire.
    generation: u64,
}

/// The restart machine. Cheap to clone; clones share state.
pub struct SmartRestart<P: ProcessAdapter, C: Clock> {
    state: Arc<Mutex<RestartState>>,
    process: Arc<P>,
    players: Arc<PlayerTracker<C>>,
    server_config: ServerConfigFile,
    clock: C,
    cfg: Arc<RestartConfig>,
}

impl<P: ProcessAdapter, C: Clock> Clone for SmartRestart<P, C> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            process: self.process.clone(),
            players: self.players.clone(),
            server_config: self.server_config.clone(),
            clock: self.clock.clone(),
            cfg: self.cfg.clone(),
        }
    }
}

impl<P: ProcessAdapter, C: Clock> SmartRestart<P, C> {
    pub fn new(
        cfg: RestartConfig,
        process: Arc<P>,
        players: Arc<PlayerTracker<C>>,
        server_config: ServerConfigFile,
        clock: C,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(RestartState {
                phase: RestartPhase::Idle,
                pending_event: None,
                on_complete: None,
                countdown_remaining: 0,
                countdown_started_at: None,
                wait_started_at: None,
                generation: 0,
            })),
            process,
            players,
            server_config,
            clock,
            cfg: Arc::new(cfg),
        }
    }

    pub fn phase(&self) -> RestartPhase {
        self.state.lock().phase
    }

    pub fn status(&self) -> RestartStatus {
        let state = self.state.lock();
        RestartStatus {
            phase: state.phase,
            countdown_minutes_remaining: (state.phase == RestartPhase::Warning)
                .then_some(state.countdown_remaining),
            warning_elapsed: state
                .countdown_started_at
                .filter(|_| state.phase != RestartPhase::Idle)
                .map(|at| self.clock.now().duration_since(at)),
            pending_event_id: state.pending_event.as_ref().map(|e| e.id),
        }
    }

    /// Begin a restart for `event`. Only valid while Idle.
    ///
    /// With zero humans online the warning phase is skipped entirely; no
    /// chat is sent to an empty server.
    pub fn initiate(
        &self,
        event: ScheduledEvent,
        on_complete: CompletionCallback,
    ) -> Result<(), RestartError> {
        let mut state = self.state.lock();
        if state.phase != RestartPhase::Idle {
            return Err(RestartError::Busy(state.phase));
        }
        state.generation += 1;
        let generation = state.generation;
        state.pending_event = Some(event);
        state.on_complete = Some(on_complete);

        if self.players.count().online_humans == 0 {
            state.phase = RestartPhase::Restarting;
            drop(state);
            info!("no humans online, restarting immediately");
            tokio::spawn(self.clone().run_restart());
        } else {
            state.phase = RestartPhase::Warning;
            state.countdown_remaining = self.cfg.countdown_minutes;
            state.countdown_started_at = Some(self.clock.now());
            drop(state);
            info!(minutes = self.cfg.countdown_minutes, "restart warning countdown started");
            tokio::spawn(self.clone().run_countdown(generation));
        }
        Ok(())
    }

    /// Cancel a restart that has not begun yet (Warning or Pending).
    pub async fn cancel(&self) -> Result<(), RestartError> {
        {
            let mut state = self.state.lock();
            match state.phase {
                RestartPhase::Warning | RestartPhase::Pending => {
                    state.phase = RestartPhase::Idle;
                    state.pending_event = None;
                    state.on_complete = None;
                    state.generation += 1;
                }
                phase => return Err(RestartError::NotCancellable(phase)),
            }
        }
        info!("restart cancelled by operator");
        self.announce(MSG_CANCELLED).await;
        Ok(())
    }

    /// Lobby signal from the track-change tracker.
    pub fn on_track_changed(&self) {
        let advance = {
            let mut state = self.state.lock();
            if state.phase == RestartPhase::Pending {
                state.phase = RestartPhase::Restarting;
                true
            } else {
                false
            }
        };
        if advance {
            info!("lobby detected, restarting");
            let this = self.clone();
            tokio::spawn(async move {
                this.announce(MSG_RESTARTING).await;
                this.run_restart().await;
            });
        }
    }

    /// One announcement per minute, then hand over to the pending phase.
    async fn run_countdown(self, generation: u64) {
        enum Step {
            Announce(String),
            EnterPending,
            Stop,
        }
        loop {
            let step = {
                let mut state = self.state.lock();
                if state.generation != generation || state.phase != RestartPhase::Warning {
                    Step::Stop
                } else if state.countdown_remaining > 0 {
                    let n = state.countdown_remaining;
                    state.countdown_remaining -= 1;
                    Step::Announce(format!("Server will restart in {n} minute(s)."))
                } else {
                    state.phase = RestartPhase::Pending;
                    state.wait_started_at = Some(self.clock.now());
                    Step::EnterPending
                }
            };
            match step {
                Step::Stop => return,
                Step::Announce(msg) => {
                    self.announce(&msg).await;
                    tokio::time::sleep(self.cfg.countdown_tick).await;
                }
                Step::EnterPending => {
                    self.announce(MSG_PENDING).await;
                    tokio::spawn(self.clone().run_pending_checks(generation));
                    return;
                }
            }
        }
    }

    /// Drain and timeout checks while waiting for a lobby.
    async fn run_pending_checks(self, generation: u64) {
        enum Verdict {
            Continue,
            Drained,
            TimedOut,
            Stop,
        }
        loop {
            tokio::time::sleep(self.cfg.check_interval).await;
            let verdict = {
                let mut state = self.state.lock();
                if state.generation != generation || state.phase != RestartPhase::Pending {
                    Verdict::Stop
                } else if self.players.count().online_humans == 0 {
                    state.phase = RestartPhase::Restarting;
                    Verdict::Drained
                } else if state
                    .wait_started_at
                    .is_some_and(|at| self.clock.now().duration_since(at) >= self.cfg.pending_timeout)
                {
                    state.phase = RestartPhase::Restarting;
                    Verdict::TimedOut
                } else {
                    Verdict::Continue
                }
            };
            match verdict {
                Verdict::Stop => return,
                Verdict::Continue => {}
                Verdict::Drained => {
                    info!("server drained, restarting");
                    self.run_restart().await;
                    return;
                }
                Verdict::TimedOut => {
                    warn!("no lobby within the pending ceiling, forcing restart");
                    self.announce(MSG_TIMEOUT).await;
                    self.run_restart().await;
                    return;
                }
            }
        }
    }

    /// Restart the process, apply the event's config, fire the callback.
    async fn run_restart(self) {
        if let Err(e) = self.process.restart().await {
            // Terminal for this activation; no automatic re-arm.
            error!(error = %e, "server restart failed, abandoning activation");
            let mut state = self.state.lock();
            state.phase = RestartPhase::Idle;
            state.pending_event = None;
            state.on_complete = None;
            return;
        }

        // The process bounced; the roster rebuilds from the fresh log.
        self.players.reset();
        tokio::time::sleep(self.cfg.stabilize_delay).await;

        let event = self.state.lock().pending_event.clone();
        if let Some(event) = &event {
            if let Err(e) = self.apply_event_config(event) {
                // The restart is the primary outcome; a config failure is
                // logged and the activation still completes.
                warn!(event_id = event.id, error = %e, "config apply failed after restart");
            }
        }

        let callback = {
            let mut state = self.state.lock();
            state.phase = RestartPhase::Completed;
            state.on_complete.take()
        };
        if let (Some(callback), Some(event)) = (callback, event) {
            info!(event_id = event.id, event_name = %event.name, "restart completed");
            callback(event);
        }

        tokio::time::sleep(self.cfg.completed_reset_delay).await;
        let mut state = self.state.lock();
        state.phase = RestartPhase::Idle;
        state.pending_event = None;
    }

    /// Rewrite the server config from the event's override bag and tracks.
    fn apply_event_config(&self, event: &ScheduledEvent) -> Result<(), ConfigError> {
        if let Some(overrides) = &event.server_config {
            let mut cfg = self.server_config.read_basic()?;
            apply_overrides(&mut cfg, overrides);
            self.server_config.write_basic(&cfg)?;
        }
        if !event.tracks.is_empty() {
            self.server_config
                .write_tracks(&event.collection_display_name(), &event.tracks)?;
        }
        Ok(())
    }

    async fn announce(&self, message: &str) {
        let line = format!("{} {}", self.cfg.chat_command, message);
        if let Err(e) = self.process.send_console_command(&line).await {
            match e {
                ProcessError::NotRunning => {}
                e => warn!(error = %e, "chat announcement failed"),
            }
        }
    }
}

/// Fold the event's override bag into the current basic config. Unset and
/// empty-string fields leave the current value; an explicit password is
/// applied even when empty (clears the password).
fn apply_overrides(cfg: &mut BasicConfig, overrides: &ServerOverrides) {
    let set_str = |slot: &mut Option<String>, v: &Option<String>| {
        if let Some(v) = v {
            if !v.is_empty() {
                *slot = Some(v.clone());
            }
        }
    };
    set_str(&mut cfg.server_name, &overrides.server_name);
    set_str(&mut cfg.welcome_message, &overrides.welcome_message);
    set_str(&mut cfg.ai_difficulty, &overrides.ai_difficulty);
    set_str(&mut cfg.vehicle_damage, &overrides.vehicle_damage);
    if let Some(password) = &overrides.password {
        cfg.password = Some(password.clone());
    }
    if let Some(v) = overrides.max_players {
        cfg.max_players = Some(v);
    }
    if let Some(v) = overrides.bots {
        cfg.bots = Some(v);
    }
    if let Some(v) = overrides.laps {
        cfg.laps = Some(v);
    }
    if let Some(v) = overrides.lobby_countdown {
        cfg.lobby_countdown = Some(v);
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
