// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control API: the transport-agnostic face of the daemon.
//!
//! Hosts decode their transport into [`pw_wire::Request`], call
//! [`ControlApi::handle`], and encode the [`pw_wire::Response`] back out.

use crate::config::SchedulerConfig;
use crate::restart::SmartRestart;
use crate::scheduler::Scheduler;
use pw_adapters::{ProcessAdapter, WebhookAdapter};
use pw_core::{format_eta, Clock, ScheduledEvent};
use pw_pipeline::{PlayerTracker, TrackChangeTracker};
use pw_store::{ScheduleStore, StoreError};
use pw_wire::{
    validate_events, DaemonStatus, OpError, Request, Response, ScheduleSummary, UpcomingEvent,
};
use std::sync::Arc;
use tracing::info;

pub struct ControlApi<P: ProcessAdapter, W: WebhookAdapter, C: Clock> {
    store: ScheduleStore,
    scheduler: Scheduler<P, W, C>,
    machine: SmartRestart<P, C>,
    players: Arc<PlayerTracker<C>>,
    tracks: Arc<TrackChangeTracker<C>>,
    clock: C,
    cfg: SchedulerConfig,
}

impl<P: ProcessAdapter, W: WebhookAdapter, C: Clock> ControlApi<P, W, C> {
    pub fn new(
        cfg: SchedulerConfig,
        store: ScheduleStore,
        scheduler: Scheduler<P, W, C>,
        machine: SmartRestart<P, C>,
        players: Arc<PlayerTracker<C>>,
        tracks: Arc<TrackChangeTracker<C>>,
        clock: C,
    ) -> Self {
        Self { store, scheduler, machine, players, tracks, clock, cfg }
    }

    /// Dispatch one request.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::ReplaceSchedule { events } => self.replace_schedule(events),
            Request::GetSchedule => Response::Schedule { schedule: self.store.load() },
            Request::GetActiveEvent => {
                let schedule = self.store.load();
                Response::ActiveEvent { event: schedule.active().cloned().map(Box::new) }
            }
            Request::GetUpcomingEvents => self.upcoming(),
            Request::GetDueEvents => self.due(),
            Request::GetSummary => self.summary(),
            Request::GetEvent { id } => {
                let schedule = self.store.load();
                Response::Event { event: schedule.find(id).cloned().map(Box::new) }
            }
            Request::ActivateEvent { id } => match self.scheduler.activate_now(id) {
                Ok(()) => Response::Activating { id },
                Err(error) => Response::error(error),
            },
            Request::CancelRestart => match self.machine.cancel().await {
                Ok(()) => Response::RestartCancelled,
                Err(e) => Response::error(OpError::conflict(e.to_string())),
            },
            Request::BackupSchedule => match self.store.backup() {
                Ok(path) => Response::BackupCreated { path },
                Err(e) => Response::error(backup_error(e)),
            },
            Request::GetStatus => self.status(),
        }
    }

    fn replace_schedule(&self, events: Vec<ScheduledEvent>) -> Response {
        let messages = validate_events(&events);
        if !messages.is_empty() {
            return Response::error(OpError::Validation { messages });
        }
        match self.store.replace(events) {
            Ok(schedule) => {
                info!(events = schedule.events.len(), "schedule replaced");
                Response::Schedule { schedule }
            }
            Err(e) => Response::error(store_error(e)),
        }
    }

    /// Non-active events past the due window, nearest first.
    fn upcoming(&self) -> Response {
        let schedule = self.store.load();
        let now = self.clock.now_utc();
        let horizon = now + self.cfg.due_lead;

        let mut events: Vec<&ScheduledEvent> = schedule
            .events
            .iter()
            .filter(|e| !e.is_active && e.start_time > horizon)
            .collect();
        events.sort_by_key(|e| e.start_time);

        Response::UpcomingEvents {
            events: events
                .into_iter()
                .map(|e| UpcomingEvent {
                    event: e.clone(),
                    starts_in: format_eta(e.start_time - now),
                })
                .collect(),
        }
    }

    /// Non-active events inside the due window, including overdue ones
    /// held for operator review.
    fn due(&self) -> Response {
        let schedule = self.store.load();
        let horizon = self.clock.now_utc() + self.cfg.due_lead;

        let mut events: Vec<ScheduledEvent> = schedule
            .events
            .iter()
            .filter(|e| !e.is_active && e.start_time <= horizon)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start_time);
        Response::DueEvents { events }
    }

    fn summary(&self) -> Response {
        let schedule = self.store.load();
        let horizon = self.clock.now_utc() + self.cfg.due_lead;

        let active = schedule.events.iter().filter(|e| e.is_active).count();
        let due = schedule
            .events
            .iter()
            .filter(|e| !e.is_active && e.start_time <= horizon)
            .count();
        let upcoming = schedule
            .events
            .iter()
            .filter(|e| !e.is_active && e.start_time > horizon)
            .count();

        Response::Summary {
            summary: ScheduleSummary {
                total: schedule.events.len(),
                active,
                upcoming,
                due,
                last_updated: schedule.last_updated,
            },
        }
    }

    fn status(&self) -> Response {
        let restart = self.machine.status();
        let count = self.players.count();
        Response::Status {
            status: DaemonStatus {
                restart_phase: restart.phase.to_string(),
                restart_processing: self.scheduler.is_processing(),
                countdown_minutes_remaining: restart.countdown_minutes_remaining,
                online_humans: count.online_humans,
                total_humans: count.total_humans,
                current_track: self.tracks.current(),
            },
        }
    }
}

fn store_error(e: StoreError) -> OpError {
    OpError::fatal(format!("schedule persistence failed: {e}"))
}

fn backup_error(e: StoreError) -> OpError {
    match &e {
        StoreError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            OpError::not_found("no schedule document to back up")
        }
        _ => OpError::fatal(format!("backup failed: {e}")),
    }
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
