//! End-to-end tests of the tool library against files on disk.

use std::fs;
use std::path::Path;

use lanefall_core::data::MatchConfig;
use lanefall_tools::simulate::{run_match, save_replay, verify_replay_file, SimulateOptions};
use lanefall_tools::validate::{load_match_config, validate_path, write_default_config};
use lanefall_tools::ToolError;
use lanefall_test_utils::fixtures::duel_config;

fn workspace_data_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

#[test]
fn test_shipped_data_is_valid() {
    let report = validate_path(&workspace_data_dir()).unwrap();
    assert!(report.checked() >= 1);
    assert!(report.is_ok(), "{:?}", report.failed);
}

#[test]
fn test_exported_default_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("default.ron");
    write_default_config(&path).unwrap();
    assert_eq!(load_match_config(&path).unwrap(), MatchConfig::default());
}

#[test]
fn test_directory_report_collects_failures() {
    let dir = tempfile::tempdir().unwrap();
    write_default_config(&dir.path().join("a_good.ron")).unwrap();
    fs::write(dir.path().join("b_broken.ron"), "MatchConfig(").unwrap();

    let mut short_deck = MatchConfig::default();
    short_deck.deck.pop();
    fs::write(
        dir.path().join("c_short_deck.ron"),
        short_deck.to_ron_string().unwrap(),
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let report = validate_path(dir.path()).unwrap();
    assert_eq!(report.checked(), 3);
    assert_eq!(report.passed.len(), 1);
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed[1].1.contains("Deck"), "{}", report.failed[1].1);
    assert!(matches!(
        report.into_result(),
        Err(ToolError::ValidationFailed {
            failed: 2,
            checked: 3
        })
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_match_config(&dir.path().join("absent.ron")),
        Err(ToolError::Io { .. })
    ));
}

#[test]
fn test_saved_replay_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("match.replay");
    let (summary, replay) = run_match(
        duel_config(60),
        SimulateOptions {
            max_ticks: 2000,
            ..SimulateOptions::default()
        },
    )
    .unwrap();
    save_replay(&replay, &path).unwrap();

    assert_eq!(verify_replay_file(&path).unwrap() as u64, summary.ticks);
}

#[test]
fn test_corrupted_replay_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.replay");
    fs::write(&path, [0xde, 0xad, 0xbe, 0xef]).unwrap();
    assert!(matches!(
        verify_replay_file(&path),
        Err(ToolError::Game { .. })
    ));
}
