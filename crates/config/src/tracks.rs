// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracks-section view of the server config.
//!
//! The section starts at the `# Event Loop` comment. Each entry begins
//! with `el_add=<track>` followed by any `el_*` option keys belonging to
//! it. Entries disabled in place by commenting still parse: a single
//! leading `#` is stripped before decoding.

use crate::{split_kv, ConfigError, ServerConfigFile, COLLECTION_PREFIX, TRACKS_MARKER};
use pw_core::TrackEntry;

impl ServerConfigFile {
    /// Read the track rotation and its collection name.
    ///
    /// A file without a tracks section reads as an empty rotation.
    pub fn read_tracks(&self) -> Result<(String, Vec<TrackEntry>), ConfigError> {
        let text = self.read_to_string()?;
        let mut collection = String::new();
        let mut tracks: Vec<TrackEntry> = Vec::new();
        let mut in_section = false;

        for (idx, line) in text.lines().enumerate() {
            if !in_section {
                in_section = line.starts_with(TRACKS_MARKER);
                continue;
            }
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix(COLLECTION_PREFIX) {
                collection = rest.trim().to_string();
                continue;
            }
            // Recover entries disabled in place by a single leading '#'.
            let effective = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
            if effective.is_empty() || effective.starts_with('#') {
                continue;
            }
            let Some((key, value)) = split_kv(effective) else { continue };
            if key == "el_add" {
                tracks.push(TrackEntry::new(value));
            } else if let Some(opt) = key.strip_prefix("el_") {
                if let Some(entry) = tracks.last_mut() {
                    apply_option(entry, opt, value, idx + 1)?;
                }
            }
        }
        Ok((collection, tracks))
    }

    /// Replace the tracks section with the given rotation.
    ///
    /// Everything before the `# Event Loop` marker is streamed verbatim.
    /// After the marker, contiguous leading comments are preserved except
    /// `## Add` headers, commented-out `el_*` lines, and the old
    /// `#CollectionName` (a fresh one is always emitted). Everything else
    /// in the old section is dropped. Re-running with the same input is a
    /// no-op.
    pub fn write_tracks(
        &self,
        collection_name: &str,
        tracks: &[TrackEntry],
    ) -> Result<(), ConfigError> {
        let text = self.read_to_string()?;
        let mut out: Vec<String> = Vec::new();
        let mut lines = text.lines();
        let mut saw_marker = false;

        for line in lines.by_ref() {
            out.push(line.to_string());
            if line.starts_with(TRACKS_MARKER) {
                saw_marker = true;
                break;
            }
        }
        if !saw_marker {
            out.push(TRACKS_MARKER.to_string());
        }

        // Preserve the section's leading free-form comments.
        for line in lines {
            let trimmed = line.trim();
            if !trimmed.starts_with('#') {
                break;
            }
            if trimmed.starts_with("## Add") || trimmed.starts_with(COLLECTION_PREFIX) {
                break;
            }
            let effective = trimmed.trim_start_matches('#').trim();
            if split_kv(effective).is_some_and(|(k, _)| k.starts_with("el_")) {
                break;
            }
            out.push(line.to_string());
        }

        out.push(format!("{COLLECTION_PREFIX} {collection_name}"));
        for (n, entry) in tracks.iter().enumerate() {
            out.push(String::new());
            out.push(format!("## Add event {} to Loop", n + 1));
            out.push(format!("el_add={}", entry.track));
            emit_options(&mut out, entry);
        }

        let mut contents = out.join("\n");
        contents.push('\n');
        crate::atomic::write_atomic(&self.path, &contents)?;
        Ok(())
    }
}

fn apply_option(
    entry: &mut TrackEntry,
    opt: &str,
    value: &str,
    line: usize,
) -> Result<(), ConfigError> {
    let number = |v: &str| -> Result<u32, ConfigError> {
        v.parse().map_err(|_| ConfigError::Malformed {
            line,
            message: format!("expected a number for 'el_{opt}', got '{v}'"),
        })
    };
    let flag = |v: &str| -> Result<bool, ConfigError> {
        match v {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            _ => Err(ConfigError::Malformed {
                line,
                message: format!("expected 0/1 for 'el_{opt}', got '{v}'"),
            }),
        }
    };
    match opt {
        "gamemode" => entry.gamemode = Some(value.to_string()),
        "laps" => entry.laps = Some(number(value)?),
        "bots" => entry.bots = Some(number(value)?),
        "num_teams" => entry.num_teams = Some(number(value)?),
        "car_reset_disabled" => entry.car_reset_disabled = Some(flag(value)?),
        "wrong_way_limiter_disabled" => entry.wrong_way_limiter_disabled = Some(flag(value)?),
        "car_class_restriction" => entry.car_class_restriction = Some(value.to_string()),
        "car_restriction" => entry.car_restriction = Some(value.to_string()),
        "weather" => entry.weather = Some(value.to_string()),
        // Unrecognized el_ options are dropped; the rotation write emits
        // only keys the model carries.
        _ => {}
    }
    Ok(())
}

fn emit_options(out: &mut Vec<String>, entry: &TrackEntry) {
    if let Some(v) = &entry.gamemode {
        out.push(format!("el_gamemode={v}"));
    }
    if let Some(v) = entry.laps {
        out.push(format!("el_laps={v}"));
    }
    if let Some(v) = entry.bots {
        out.push(format!("el_bots={v}"));
    }
    if let Some(v) = entry.num_teams {
        out.push(format!("el_num_teams={v}"));
    }
    if let Some(v) = entry.car_reset_disabled {
        out.push(format!("el_car_reset_disabled={}", v as u8));
    }
    if let Some(v) = entry.wrong_way_limiter_disabled {
        out.push(format!("el_wrong_way_limiter_disabled={}", v as u8));
    }
    if let Some(v) = &entry.car_class_restriction {
        out.push(format!("el_car_class_restriction={v}"));
    }
    if let Some(v) = &entry.car_restriction {
        out.push(format!("el_car_restriction={v}"));
    }
    if let Some(v) = &entry.weather {
        out.push(format!("el_weather={v}"));
    }
}

#[cfg(test)]
#[path = "tracks_tests.rs"]
mod tests;
