// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and teardown.
//!
//! Startup order: load the schedule store, wire the log pipeline
//! (bus → roster / track tracker → restart machine), start the log
//! monitor, then the scheduler sweep. Teardown stops in reverse so no
//! activation fires into a half-dismantled pipeline.

use crate::config::DaemonConfig;
use crate::ops::ControlApi;
use crate::restart::SmartRestart;
use crate::scheduler::{Scheduler, SchedulerHandle};
use pw_adapters::{ProcessAdapter, WebhookAdapter};
use pw_config::ServerConfigFile;
use pw_core::{Clock, LogEvent, Topic};
use pw_pipeline::{resolve_log_path, LogBus, LogMonitor, MonitorConfig, PlayerTracker, TrackChangeTracker};
use pw_store::ScheduleStore;
use std::sync::Arc;
use tracing::{info, warn};

/// A running pitwall daemon.
pub struct Daemon<P: ProcessAdapter, W: WebhookAdapter, C: Clock> {
    api: ControlApi<P, W, C>,
    players: Arc<PlayerTracker<C>>,
    tracks: Arc<TrackChangeTracker<C>>,
    bus: Arc<LogBus>,
    monitor: Option<LogMonitor>,
    scheduler_handle: Option<SchedulerHandle>,
}

impl<P: ProcessAdapter, W: WebhookAdapter, C: Clock> Daemon<P, W, C> {
    /// Wire and start everything.
    pub fn start(config: DaemonConfig, process: Arc<P>, webhook: Arc<W>, clock: C) -> Self {
        let server_config = ServerConfigFile::new(&config.server_config_path);
        let store = ScheduleStore::new(&config.state_base);

        // Pipeline singletons.
        let bus = Arc::new(LogBus::new());
        let players = Arc::new(PlayerTracker::new(clock.clone()));
        let tracks = Arc::new(TrackChangeTracker::new(clock.clone()));

        {
            let players = players.clone();
            bus.subscribe(Topic::Player, move |event| players.apply(event));
        }
        {
            let tracks = tracks.clone();
            bus.subscribe(Topic::Track, move |event| {
                if let LogEvent::TrackLoaded { track_id } = event {
                    tracks.track_loaded(track_id);
                }
            });
        }

        let machine = SmartRestart::new(
            config.restart.clone(),
            process,
            players.clone(),
            server_config.clone(),
            clock.clone(),
        );
        {
            let machine = machine.clone();
            tracks.on_change(move |_| machine.on_track_changed());
        }

        // The monitor needs a log path; without one the pipeline idles and
        // the scheduler still runs (restarts then skip the lobby wait only
        // via drain or timeout).
        let monitor = match resolve_log_path(&server_config, config.log_path_fallback.as_deref()) {
            Some(log_path) => {
                info!(path = %log_path.display(), "starting log monitor");
                let mut monitor_config = MonitorConfig::new(log_path);
                monitor_config.poll_interval = config.poll_interval;
                monitor_config.debounce = config.debounce;
                Some(LogMonitor::start(monitor_config, bus.clone()))
            }
            None => {
                warn!("no server log path resolved, pipeline disabled");
                None
            }
        };

        let scheduler = Scheduler::new(
            config.scheduler.clone(),
            store.clone(),
            machine.clone(),
            webhook,
            clock.clone(),
        );
        let scheduler_handle = Some(scheduler.start());

        let api = ControlApi::new(
            config.scheduler,
            store,
            scheduler,
            machine,
            players.clone(),
            tracks.clone(),
            clock,
        );
        info!("pitwall daemon started");

        Self { api, players, tracks, bus, monitor, scheduler_handle }
    }

    /// The transport-agnostic control surface.
    pub fn api(&self) -> &ControlApi<P, W, C> {
        &self.api
    }

    pub fn players(&self) -> &PlayerTracker<C> {
        &self.players
    }

    pub fn tracks(&self) -> &TrackChangeTracker<C> {
        &self.tracks
    }

    pub fn bus(&self) -> &Arc<LogBus> {
        &self.bus
    }

    /// Orderly shutdown: scheduler first, then the log monitor.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.scheduler_handle.take() {
            handle.stop().await;
        }
        if let Some(monitor) = self.monitor.take() {
            monitor.stop().await;
        }
        info!("pitwall daemon stopped");
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
