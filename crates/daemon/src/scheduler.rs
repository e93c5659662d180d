// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic sweep of the schedule store.
//!
//! The store is the source of truth: every sweep reloads from disk so
//! documents pushed by the admin between sweeps are picked up. A
//! `processing` flag serializes activations: while a restart
//! orchestration is outstanding, sweeps skip.
//!
//! Due window: `start_time <= now + due_lead` with a matching lower
//! bound. Events that slipped further into the past than the grace are
//! never auto-activated; they are reported at startup and kept for
//! operator review.

use crate::config::SchedulerConfig;
use crate::restart::{RestartError, SmartRestart};
use parking_lot::Mutex;
use pw_adapters::{ActivationNotice, ProcessAdapter, WebhookAdapter};
use pw_core::{format_eta, format_overdue, next_instance, Clock, ScheduledEvent};
use pw_store::ScheduleStore;
use pw_wire::OpError;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// The scheduler. Cheap to clone; clones share the processing flag.
pub struct Scheduler<P: ProcessAdapter, W: WebhookAdapter, C: Clock> {
    store: ScheduleStore,
    restart: SmartRestart<P, C>,
    webhook: Arc<W>,
    clock: C,
    cfg: SchedulerConfig,
    processing: Arc<Mutex<bool>>,
}

impl<P: ProcessAdapter, W: WebhookAdapter, C: Clock> Clone for Scheduler<P, W, C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            restart: self.restart.clone(),
            webhook: self.webhook.clone(),
            clock: self.clock.clone(),
            cfg: self.cfg.clone(),
            processing: self.processing.clone(),
        }
    }
}

/// Running sweep task.
pub struct SchedulerHandle {
    shutdown_tx: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<()>,
}

impl SchedulerHandle {
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

impl<P: ProcessAdapter, W: WebhookAdapter, C: Clock> Scheduler<P, W, C> {
    pub fn new(
        cfg: SchedulerConfig,
        store: ScheduleStore,
        restart: SmartRestart<P, C>,
        webhook: Arc<W>,
        clock: C,
    ) -> Self {
        Self {
            store,
            restart,
            webhook,
            clock,
            cfg,
            processing: Arc::new(Mutex::new(false)),
        }
    }

    pub fn is_processing(&self) -> bool {
        *self.processing.lock()
    }

    /// Report missed events and start the periodic sweep.
    pub fn start(&self) -> SchedulerHandle {
        self.report_missed();

        let this = self.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(this.cfg.sweep_interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = tick.tick() => this.sweep(),
                    _ = &mut shutdown_rx => break,
                }
            }
        });
        SchedulerHandle { shutdown_tx, handle }
    }

    /// Log non-active events already past the grace window. They stay in
    /// the schedule untouched.
    pub fn report_missed(&self) {
        let schedule = self.store.load();
        let cutoff = self.clock.now_utc() - self.cfg.missed_grace;
        for event in schedule.events.iter().filter(|e| !e.is_active && e.start_time < cutoff) {
            warn!(
                event_id = event.id,
                event_name = %event.name,
                overdue = %format_overdue(self.clock.now_utc() - event.start_time),
                "missed scheduled event, leaving for operator review"
            );
        }
    }

    /// One sweep: pick the earliest due event and activate it.
    pub fn sweep(&self) {
        {
            let processing = self.processing.lock();
            if *processing {
                debug!("restart in progress, skipping sweep");
                return;
            }
        }

        let schedule = self.store.load();
        let now = self.clock.now_utc();
        let horizon = now + self.cfg.due_lead;
        let floor = now - self.cfg.missed_grace;

        let mut due: Vec<&ScheduledEvent> = schedule
            .events
            .iter()
            .filter(|e| !e.is_active && e.start_time <= horizon && e.start_time >= floor)
            .collect();

        if due.is_empty() {
            if let Some(next) = schedule
                .events
                .iter()
                .filter(|e| !e.is_active && e.start_time > horizon)
                .min_by_key(|e| e.start_time)
            {
                debug!(
                    event_id = next.id,
                    starts_in = %format_eta(next.start_time - now),
                    "no due events"
                );
            }
            return;
        }

        due.sort_by_key(|e| e.start_time);
        let event = due[0].clone();
        info!(event_id = event.id, event_name = %event.name, "event due, starting activation");

        *self.processing.lock() = true;
        if let Err(e) = self.hand_to_restart(event) {
            warn!(error = %e, "restart machine rejected activation, will retry next sweep");
            *self.processing.lock() = false;
        }
    }

    /// Operator-initiated activation; same path as a scheduled one.
    pub fn activate_now(&self, id: i64) -> Result<(), OpError> {
        {
            let processing = self.processing.lock();
            if *processing {
                return Err(OpError::conflict("a restart is already in flight"));
            }
        }
        let schedule = self.store.load();
        let Some(event) = schedule.find(id).cloned() else {
            return Err(OpError::not_found(format!("no event with id {id}")));
        };
        if event.is_active {
            return Err(OpError::conflict(format!("event {id} is already active")));
        }

        *self.processing.lock() = true;
        self.hand_to_restart(event).map_err(|e| {
            *self.processing.lock() = false;
            OpError::conflict(e.to_string())
        })
    }

    fn hand_to_restart(&self, event: ScheduledEvent) -> Result<(), RestartError> {
        let this = self.clone();
        self.restart
            .initiate(event, Box::new(move |event| this.finish_activation(event)))
    }

    /// Completion callback: flip the active flag, notify, reschedule
    /// recurring instances, release the processing flag.
    fn finish_activation(&self, event: ScheduledEvent) {
        // Reload to absorb edits made while the restart was running.
        let mut schedule = self.store.load();
        schedule.set_active(event.id);
        if let Err(e) = self.store.save(&mut schedule) {
            // The activation happened on the server; a missing active flag
            // beats a stuck processing state. The next sweep reloads.
            error!(event_id = event.id, error = %e, "failed to persist active flag");
        }

        let notice = ActivationNotice {
            event_id: event.id,
            event_name: event.name.clone(),
            timestamp: self.clock.now_utc(),
        };
        let webhook = self.webhook.clone();
        tokio::spawn(async move {
            let _ = webhook.notify_activation(&notice).await;
        });

        if let Some(pattern) = &event.recurring_pattern {
            match next_instance(pattern, self.clock.now_utc()) {
                Some(next) => {
                    if let Some(stored) = schedule.find_mut(event.id) {
                        stored.start_time = next;
                        stored.is_active = false;
                        if let Some(p) = &mut stored.recurring_pattern {
                            if let Some(n) = &mut p.occurrences {
                                *n -= 1;
                            }
                        }
                        info!(event_id = event.id, next = %next, "recurring event rescheduled");
                        if let Err(e) = self.store.save(&mut schedule) {
                            error!(event_id = event.id, error = %e, "failed to persist reschedule");
                        }
                    }
                }
                None => {
                    debug!(event_id = event.id, "recurring pattern expired, leaving event as-is");
                }
            }
        }

        *self.processing.lock() = false;
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
