// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flat `key=value` view of the server config.
//!
//! Only the keys the control plane manages are typed here; every other
//! line (legacy keys included) is preserved verbatim by `write_basic`.

use crate::{split_kv, ConfigError, ServerConfigFile, TRACKS_MARKER};

/// Typed bag of the known basic keys. `None` means the key is absent from
/// the file (on read) or should be left untouched (on write).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicConfig {
    pub server_name: Option<String>,
    pub welcome_message: Option<String>,
    pub password: Option<String>,
    pub max_players: Option<u32>,
    pub bots: Option<u32>,
    pub ai_difficulty: Option<String>,
    pub laps: Option<u32>,
    pub vehicle_damage: Option<String>,
    pub lobby_countdown: Option<u32>,
    /// Path of the server's console log, used to seed the log pipeline.
    pub log: Option<String>,
}

pub(crate) const KNOWN_KEYS: &[&str] = &[
    "server_name",
    "welcome_message",
    "password",
    "max_players",
    "bots",
    "ai_difficulty",
    "laps",
    "vehicle_damage",
    "lobby_countdown",
    "log",
];

impl BasicConfig {
    /// Canonical string value for a known key, if set.
    fn value_for(&self, key: &str) -> Option<String> {
        match key {
            "server_name" => self.server_name.clone(),
            "welcome_message" => self.welcome_message.clone(),
            "password" => self.password.clone(),
            "max_players" => self.max_players.map(|n| n.to_string()),
            "bots" => self.bots.map(|n| n.to_string()),
            "ai_difficulty" => self.ai_difficulty.clone(),
            "laps" => self.laps.map(|n| n.to_string()),
            "vehicle_damage" => self.vehicle_damage.clone(),
            "lobby_countdown" => self.lobby_countdown.map(|n| n.to_string()),
            "log" => self.log.clone(),
            _ => None,
        }
    }

    fn set_from(&mut self, key: &str, value: &str, line: usize) -> Result<(), ConfigError> {
        let number = |v: &str| -> Result<u32, ConfigError> {
            v.parse().map_err(|_| ConfigError::Malformed {
                line,
                message: format!("expected a number for '{key}', got '{v}'"),
            })
        };
        match key {
            "server_name" => self.server_name = Some(value.to_string()),
            "welcome_message" => self.welcome_message = Some(value.to_string()),
            "password" => self.password = Some(value.to_string()),
            "max_players" => self.max_players = Some(number(value)?),
            "bots" => self.bots = Some(number(value)?),
            "ai_difficulty" => self.ai_difficulty = Some(value.to_string()),
            "laps" => self.laps = Some(number(value)?),
            "vehicle_damage" => self.vehicle_damage = Some(value.to_string()),
            "lobby_countdown" => self.lobby_countdown = Some(number(value)?),
            "log" => self.log = Some(value.to_string()),
            _ => {}
        }
        Ok(())
    }
}

impl ServerConfigFile {
    /// Read the known basic keys into a typed bag.
    ///
    /// Blanks, comments, `el_*` keys, and lines without `=` are ignored.
    pub fn read_basic(&self) -> Result<BasicConfig, ConfigError> {
        let text = self.read_to_string()?;
        let mut cfg = BasicConfig::default();
        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = split_kv(trimmed) else { continue };
            if key.starts_with("el_") || !KNOWN_KEYS.contains(&key) {
                continue;
            }
            cfg.set_from(key, value, idx + 1)?;
        }
        Ok(cfg)
    }

    /// Rewrite known-key lines with the bag's current values.
    ///
    /// Lines whose parsed value already matches are copied byte-for-byte,
    /// as is everything else: unknown keys, comments, blanks, and the
    /// entire tracks section. Keys set in the bag but missing from the
    /// file are appended just above the tracks section.
    pub fn write_basic(&self, cfg: &BasicConfig) -> Result<(), ConfigError> {
        let text = self.read_to_string()?;
        let mut out: Vec<String> = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        let mut in_tracks = false;
        let mut marker_at: Option<usize> = None;

        for line in text.lines() {
            if !in_tracks && line.starts_with(TRACKS_MARKER) {
                in_tracks = true;
                marker_at = Some(out.len());
            }
            if in_tracks {
                out.push(line.to_string());
                continue;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                out.push(line.to_string());
                continue;
            }
            match split_kv(trimmed) {
                Some((key, value)) if KNOWN_KEYS.contains(&key) && !key.starts_with("el_") => {
                    seen.push(key);
                    match cfg.value_for(key) {
                        Some(new) if new != value => out.push(format!("{key}={new}")),
                        _ => out.push(line.to_string()),
                    }
                }
                _ => out.push(line.to_string()),
            }
        }

        // Keys the caller set that have no line yet.
        let missing: Vec<String> = KNOWN_KEYS
            .iter()
            .copied()
            .filter(|k| !seen.contains(k))
            .filter_map(|k| cfg.value_for(k).map(|v| format!("{k}={v}")))
            .collect();
        if !missing.is_empty() {
            match marker_at {
                Some(at) => {
                    for (i, line) in missing.into_iter().enumerate() {
                        out.insert(at + i, line);
                    }
                }
                None => out.extend(missing),
            }
        }

        let mut contents = out.join("\n");
        contents.push('\n');
        crate::atomic::write_atomic(&self.path, &contents)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "basic_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "property_tests.rs"]
mod property_tests;
