// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Categorized operation errors surfaced to API callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error taxonomy for control operations.
///
/// `Validation` carries one message per failed rule so the front-end can
/// show all of them at once. `Transient` failures are safe to retry;
/// `Fatal` ones need operator attention.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OpError {
    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("validation failed: {}", messages.join("; "))]
    Validation { messages: Vec<String> },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("transient failure: {message}")]
    Transient { message: String },

    #[error("fatal: {message}")]
    Fatal { message: String },
}

impl OpError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient { message: message.into() }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal { message: message.into() }
    }
}
