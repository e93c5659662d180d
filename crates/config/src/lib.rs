// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pw-config: editor for the game server's line-oriented config file.
//!
//! The file is a flat sequence of `key=value` lines, blanks, and `#`
//! comments. A comment line beginning `# Event Loop` marks the start of the
//! tracks section; everything after it belongs to the track rotation
//! (`el_add` entries plus their `el_*` option keys).
//!
//! Edits are surgical: basic-key writes rewrite only changed known-key
//! lines and never touch the tracks section; tracks writes replace exactly
//! the tracks section and leave the rest of the file byte-for-byte intact.

mod atomic;
mod basic;
mod tracks;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use basic::BasicConfig;

/// Comment line that opens the tracks section.
pub const TRACKS_MARKER: &str = "# Event Loop";

/// Comment prefix carrying the persisted collection name.
pub const COLLECTION_PREFIX: &str = "#CollectionName";

/// Errors from config file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// Handle to the server config file on disk.
///
/// Stateless between calls; every operation re-reads the file so edits by
/// the admin between operations are picked up.
#[derive(Debug, Clone)]
pub struct ServerConfigFile {
    path: PathBuf,
}

impl ServerConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_to_string(&self) -> Result<String, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ConfigError::NotFound(self.path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Split a `key=value` line at the first `=`. Returns trimmed key and
/// trimmed value; `None` for lines without `=`.
fn split_kv(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}
