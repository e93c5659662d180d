// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Byte-offset cursor over an append-only log file.
//!
//! Each appended line is observed at most once for the lifetime of a
//! cursor. Lines straddling a read boundary are never split: a trailing
//! chunk without a newline stays unconsumed until the writer completes it.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub struct LogCursor {
    path: PathBuf,
    position: u64,
}

impl LogCursor {
    /// Cursor seeded at the file's current end, so only lines appended
    /// after this point are observed. A missing file seeds at 0.
    pub fn seed(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let position = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Self { path, position }
    }

    /// Cursor at offset 0 (observes the whole file).
    pub fn at_start(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), position: 0 }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read every complete line appended since the last call.
    ///
    /// If the file shrank below the cursor (rotation/truncation), the
    /// cursor resets to 0 and reads from the top. A missing file reads as
    /// no new lines.
    pub fn read_new_lines(&mut self) -> io::Result<Vec<String>> {
        let len = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        if len < self.position {
            debug!(path = %self.path.display(), "log truncated, resetting cursor");
            self.position = 0;
        }
        if len == self.position {
            return Ok(Vec::new());
        }

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(self.position))?;
        let mut reader = BufReader::new(file);

        let mut lines = Vec::new();
        let mut buf = String::new();
        loop {
            buf.clear();
            let n = reader.read_line(&mut buf)?;
            if n == 0 {
                break;
            }
            if !buf.ends_with('\n') {
                // Partial trailing line: leave it for the next read.
                break;
            }
            self.position += n as u64;
            let line = buf.trim_end_matches(['\n', '\r']);
            lines.push(line.to_string());
        }
        Ok(lines)
    }
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
