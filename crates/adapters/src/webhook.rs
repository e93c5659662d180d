// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound webhook port.
//!
//! Activation notices are fire-and-forget: delivery failure never aborts
//! an activation. The HTTP implementation sends a single HTTP/1.1 POST
//! over a plain TCP stream with a timeout covering connect + write.
//! Delivery is best-effort, so the response body is read and discarded.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{info, warn};

/// Errors from webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Payload delivered when an event activates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationNotice {
    pub event_id: i64,
    pub event_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Adapter for delivering activation notices.
#[async_trait]
pub trait WebhookAdapter: Send + Sync + 'static {
    /// Queue a notice for delivery. Implementations return once the notice
    /// is handed off, not once it is delivered.
    async fn notify_activation(&self, notice: &ActivationNotice) -> Result<(), WebhookError>;
}

/// HTTP webhook adapter.
///
/// `endpoint` is `http://host:port/path`; an unset endpoint turns the
/// adapter into a no-op so deployments without a webhook need no wiring.
#[derive(Clone, Debug, Default)]
pub struct HttpWebhookAdapter {
    endpoint: Option<String>,
}

impl HttpWebhookAdapter {
    pub fn new(endpoint: Option<String>) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl WebhookAdapter for HttpWebhookAdapter {
    async fn notify_activation(&self, notice: &ActivationNotice) -> Result<(), WebhookError> {
        let Some(endpoint) = self.endpoint.clone() else {
            return Ok(());
        };
        let body = serde_json::to_string(notice)
            .map_err(|e| WebhookError::SendFailed(e.to_string()))?;
        let event_id = notice.event_id;

        // Fire-and-forget: hand off to a task so activation never blocks
        // on a slow or unreachable endpoint.
        tokio::spawn(async move {
            match post_json(&endpoint, &body).await {
                Ok(()) => info!(event_id, "activation webhook delivered"),
                Err(e) => warn!(event_id, error = %e, "activation webhook failed"),
            }
        });
        Ok(())
    }
}

/// Send a POST with a 5-second budget covering the entire operation.
async fn post_json(endpoint: &str, body: &str) -> Result<(), WebhookError> {
    tokio::time::timeout(Duration::from_secs(5), send_post(endpoint, body))
        .await
        .map_err(|_| WebhookError::SendFailed("request timed out".into()))?
}

async fn send_post(endpoint: &str, body: &str) -> Result<(), WebhookError> {
    let (authority, path) = split_endpoint(endpoint)?;
    let mut stream = TcpStream::connect(authority)
        .await
        .map_err(|e| WebhookError::SendFailed(format!("connect failed: {e}")))?;

    let request = format!(
        "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        path,
        authority,
        body.len(),
        body
    );
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|e| WebhookError::SendFailed(format!("write failed: {e}")))?;

    // Drain whatever the endpoint answers; only delivery matters.
    let mut sink = Vec::new();
    let _ = stream.read_to_end(&mut sink).await;
    Ok(())
}

/// Split `http://host:port/path` into authority and path.
fn split_endpoint(endpoint: &str) -> Result<(&str, &str), WebhookError> {
    let rest = endpoint
        .strip_prefix("http://")
        .ok_or_else(|| WebhookError::SendFailed(format!("unsupported endpoint: {endpoint}")))?;
    Ok(match rest.split_once('/') {
        Some((authority, path_rest)) => {
            let path_start = endpoint.len() - path_rest.len() - 1;
            (authority, &endpoint[path_start..])
        }
        None => (rest, "/"),
    })
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeWebhookAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{ActivationNotice, WebhookAdapter, WebhookError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Fake webhook adapter recording every notice
    #[derive(Clone, Default)]
    pub struct FakeWebhookAdapter {
        notices: Arc<Mutex<Vec<ActivationNotice>>>,
    }

    impl FakeWebhookAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn notices(&self) -> Vec<ActivationNotice> {
            self.notices.lock().clone()
        }
    }

    #[async_trait]
    impl WebhookAdapter for FakeWebhookAdapter {
        async fn notify_activation(&self, notice: &ActivationNotice) -> Result<(), WebhookError> {
            self.notices.lock().push(notice.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
