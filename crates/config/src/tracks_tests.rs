// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ServerConfigFile;
use tempfile::TempDir;

const SAMPLE: &str = "\
server_name=Pitwall
max_players=24

# Event Loop
# Rotation is managed by pitwall; edits below are replaced.
#CollectionName Dirt Classics

## Add event 1 to Loop
el_add=speedway2
el_gamemode=racing
el_laps=3

## Add event 2 to Loop
el_add=mudpit
el_car_reset_disabled=1
";

fn file_with(dir: &TempDir, text: &str) -> ServerConfigFile {
    let path = dir.path().join("server_config.cfg");
    std::fs::write(&path, text).unwrap();
    ServerConfigFile::new(path)
}

#[test]
fn read_tracks_parses_entries_and_collection() {
    let dir = TempDir::new().unwrap();
    let file = file_with(&dir, SAMPLE);

    let (collection, tracks) = file.read_tracks().unwrap();
    assert_eq!(collection, "Dirt Classics");
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].track, "speedway2");
    assert_eq!(tracks[0].gamemode.as_deref(), Some("racing"));
    assert_eq!(tracks[0].laps, Some(3));
    assert_eq!(tracks[1].track, "mudpit");
    assert_eq!(tracks[1].car_reset_disabled, Some(true));
}

#[test]
fn read_tracks_recovers_commented_entries() {
    let text = "\
# Event Loop
#CollectionName Night Set
#el_add=figure8
#el_laps=5
";
    let dir = TempDir::new().unwrap();
    let file = file_with(&dir, text);

    let (_, tracks) = file.read_tracks().unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].track, "figure8");
    assert_eq!(tracks[0].laps, Some(5));
}

#[test]
fn read_tracks_without_section_is_empty() {
    let dir = TempDir::new().unwrap();
    let file = file_with(&dir, "server_name=x\n");
    let (collection, tracks) = file.read_tracks().unwrap();
    assert!(collection.is_empty());
    assert!(tracks.is_empty());
}

#[test]
fn write_tracks_replaces_exactly_the_section() {
    let dir = TempDir::new().unwrap();
    let file = file_with(&dir, SAMPLE);

    let entry = pw_core::TrackEntry {
        laps: Some(4),
        weather: Some("rain".into()),
        ..pw_core::TrackEntry::new("tarmac1")
    };
    file.write_tracks("Wet League", &[entry]).unwrap();

    let written = std::fs::read_to_string(file.path()).unwrap();
    // prefix untouched
    assert!(written.starts_with("server_name=Pitwall\nmax_players=24\n\n# Event Loop\n"));
    // free-form section comment preserved, old rotation gone
    assert!(written.contains("# Rotation is managed by pitwall"));
    assert!(!written.contains("speedway2"));
    assert!(!written.contains("mudpit"));
    assert!(written.contains("#CollectionName Wet League\n"));
    assert!(written.contains("\n## Add event 1 to Loop\nel_add=tarmac1\nel_laps=4\nel_weather=rain\n"));
}

#[test]
fn write_tracks_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let file = file_with(&dir, SAMPLE);

    let (collection, tracks) = file.read_tracks().unwrap();
    file.write_tracks(&collection, &tracks).unwrap();
    let first = std::fs::read_to_string(file.path()).unwrap();

    let (collection, tracks) = file.read_tracks().unwrap();
    file.write_tracks(&collection, &tracks).unwrap();
    let second = std::fs::read_to_string(file.path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn write_tracks_appends_marker_when_missing() {
    let dir = TempDir::new().unwrap();
    let file = file_with(&dir, "server_name=x\n");

    file.write_tracks("Set", &[pw_core::TrackEntry::new("a")]).unwrap();
    let written = std::fs::read_to_string(file.path()).unwrap();
    assert!(written.contains("# Event Loop\n#CollectionName Set\n"));
    assert!(written.contains("el_add=a"));
}

#[test]
fn skips_unset_optional_fields() {
    let dir = TempDir::new().unwrap();
    let file = file_with(&dir, "# Event Loop\n");

    file.write_tracks("S", &[pw_core::TrackEntry::new("a")]).unwrap();
    let written = std::fs::read_to_string(file.path()).unwrap();
    assert!(!written.contains("el_laps"));
    assert!(!written.contains("el_gamemode"));
}
