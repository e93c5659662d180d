// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronous fan-out of log events to per-topic subscribers.
//!
//! Delivery happens in the tailer's thread of control and must not
//! back-pressure: handlers are expected to be quick, and anything they
//! panic with is caught, logged, and dropped. The registry is append-only;
//! a subscriber leaves by cancelling its token, which marks the entry
//! inert until the bus is rebuilt.

use parking_lot::Mutex;
use pw_core::{LogEvent, Topic};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

type Handler = Box<dyn Fn(&LogEvent) + Send + Sync>;

struct Subscriber {
    topic: Topic,
    live: Arc<AtomicBool>,
    handler: Handler,
}

/// Handle returned from [`LogBus::subscribe`]; cancelling it stops
/// delivery to that handler.
#[derive(Clone)]
pub struct SubscriberToken {
    live: Arc<AtomicBool>,
}

impl SubscriberToken {
    pub fn cancel(&self) {
        self.live.store(false, Ordering::Relaxed);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Relaxed)
    }
}

/// In-process event bus for the log pipeline.
#[derive(Default)]
pub struct LogBus {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl LogBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one topic. Handlers run synchronously on the
    /// publisher's thread and must not block.
    pub fn subscribe(
        &self,
        topic: Topic,
        handler: impl Fn(&LogEvent) + Send + Sync + 'static,
    ) -> SubscriberToken {
        let live = Arc::new(AtomicBool::new(true));
        self.subscribers.lock().push(Subscriber {
            topic,
            live: live.clone(),
            handler: Box::new(handler),
        });
        SubscriberToken { live }
    }

    /// Deliver an event to every live subscriber of its topic.
    pub fn publish(&self, event: &LogEvent) {
        let topic = event.topic();
        let subscribers = self.subscribers.lock();
        for sub in subscribers.iter() {
            if sub.topic != topic || !sub.live.load(Ordering::Relaxed) {
                continue;
            }
            if catch_unwind(AssertUnwindSafe(|| (sub.handler)(event))).is_err() {
                warn!(%topic, "log subscriber panicked; event dropped for it");
            }
        }
    }

    /// Number of live subscribers (diagnostics).
    pub fn live_count(&self) -> usize {
        self.subscribers.lock().iter().filter(|s| s.live.load(Ordering::Relaxed)).count()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
