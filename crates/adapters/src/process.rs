// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervisor port.
//!
//! The game-server process itself is launched and owned by a peripheral
//! controller; the core only needs the capabilities below. `restart` may
//! legitimately take a long time (the supervisor can fold a content
//! update into it), so callers must tolerate slow failures.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from supervisor operations.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("server is not running")]
    NotRunning,
    #[error("server is already running")]
    AlreadyRunning,
    #[error("operation failed: {0}")]
    Failed(String),
}

/// Coarse process state as reported by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Stopped,
    Running,
    Updating,
}

pw_core::simple_display! {
    ProcessStatus {
        Stopped => "stopped",
        Running => "running",
        Updating => "updating",
    }
}

/// Capabilities the core requires from the process supervisor.
#[async_trait]
pub trait ProcessAdapter: Send + Sync + 'static {
    async fn start(&self) -> Result<(), ProcessError>;
    async fn stop(&self) -> Result<(), ProcessError>;
    async fn restart(&self) -> Result<(), ProcessError>;
    /// Write a line to the server console (chat announcements use this).
    async fn send_console_command(&self, text: &str) -> Result<(), ProcessError>;
    async fn current_status(&self) -> ProcessStatus;
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessAdapter, ProcessCall};

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{ProcessAdapter, ProcessError, ProcessStatus};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Recorded supervisor call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ProcessCall {
        Start,
        Stop,
        Restart,
        Console(String),
    }

    struct FakeProcessState {
        calls: Vec<ProcessCall>,
        status: ProcessStatus,
        fail_restart: bool,
    }

    /// Fake supervisor for testing
    #[derive(Clone)]
    pub struct FakeProcessAdapter {
        inner: Arc<Mutex<FakeProcessState>>,
    }

    impl Default for FakeProcessAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeProcessState {
                    calls: Vec::new(),
                    status: ProcessStatus::Running,
                    fail_restart: false,
                })),
            }
        }
    }

    impl FakeProcessAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_restart() -> Self {
            let fake = Self::default();
            fake.inner.lock().fail_restart = true;
            fake
        }

        pub fn set_status(&self, status: ProcessStatus) {
            self.inner.lock().status = status;
        }

        /// All recorded calls in order
        pub fn calls(&self) -> Vec<ProcessCall> {
            self.inner.lock().calls.clone()
        }

        /// Console lines sent, in order
        pub fn console_lines(&self) -> Vec<String> {
            self.inner
                .lock()
                .calls
                .iter()
                .filter_map(|c| match c {
                    ProcessCall::Console(line) => Some(line.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn restart_count(&self) -> usize {
            self.inner.lock().calls.iter().filter(|c| **c == ProcessCall::Restart).count()
        }
    }

    #[async_trait]
    impl ProcessAdapter for FakeProcessAdapter {
        async fn start(&self) -> Result<(), ProcessError> {
            let mut state = self.inner.lock();
            state.calls.push(ProcessCall::Start);
            state.status = ProcessStatus::Running;
            Ok(())
        }

        async fn stop(&self) -> Result<(), ProcessError> {
            let mut state = self.inner.lock();
            state.calls.push(ProcessCall::Stop);
            state.status = ProcessStatus::Stopped;
            Ok(())
        }

        async fn restart(&self) -> Result<(), ProcessError> {
            let mut state = self.inner.lock();
            state.calls.push(ProcessCall::Restart);
            if state.fail_restart {
                return Err(ProcessError::Failed("restart refused by fake".into()));
            }
            state.status = ProcessStatus::Running;
            Ok(())
        }

        async fn send_console_command(&self, text: &str) -> Result<(), ProcessError> {
            self.inner.lock().calls.push(ProcessCall::Console(text.to_string()));
            Ok(())
        }

        async fn current_status(&self) -> ProcessStatus {
            self.inner.lock().status
        }
    }
}
