mod common;

use clap::{Args, Command, FromArgMatches};
use common::*;
use keytrace::config::Config;
use keytrace::error::KeyTraceError;
use keytrace::geometry::{Fingermap, Layout};
use keytrace::keymap::Keymap;
use std::io::Write;
use tempfile::NamedTempFile;

const INFO_JSON: &str = r#"{
    "keyboard_name": "tiny",
    "url": "",
    "maintainer": "qmk",
    "layouts": {
        "LAYOUT_tiny": {
            "layout": [
                {"x": 0, "y": 0, "matrix": [0, 0]},
                {"x": 1, "y": 0, "w": 1.5, "matrix": [0, 1]},
                {"x": 0.5, "y": 1}
            ]
        }
    }
}"#;

fn temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

// --- LAYOUT ---

#[test]
fn test_layout_from_info_json() {
    let file = temp_file(INFO_JSON);
    let layout = Layout::load_from_file(file.path(), Some("LAYOUT_tiny")).unwrap();

    assert_eq!(layout.len(), 3);
    assert_eq!(layout.keys[1].w, 1.5);
    assert_eq!(layout.keys[1].h, 1.0);
    assert_eq!(layout.keys[0].matrix, Some([0, 0]));
    assert_eq!(layout.keys[2].matrix, None);
}

#[test]
fn test_single_layout_needs_no_name() {
    let layout = Layout::from_json_str(INFO_JSON, None).unwrap();
    assert_eq!(layout.len(), 3);
}

#[test]
fn test_unknown_layout_name() {
    let err = Layout::from_json_str(INFO_JSON, Some("LAYOUT_big")).unwrap_err();
    assert!(matches!(err, KeyTraceError::Validation(_)));
    assert!(err.to_string().contains("LAYOUT_big"));
}

#[test]
fn test_bare_layout_array() {
    let layout = Layout::from_json_str(r#"[{"x": 0, "y": 0}, {"x": 2, "y": 1}]"#, None).unwrap();
    assert_eq!(layout.len(), 2);
    assert_eq!(layout.keys[1].x, 2.0);
}

#[test]
fn test_layout_bad_json() {
    assert!(matches!(
        Layout::from_json_str("{not json", None),
        Err(KeyTraceError::Json(_))
    ));
}

// --- FINGERMAP ---

#[test]
fn test_fingermap_validation() {
    let layout = Layout::from_json_str(INFO_JSON, None).unwrap();

    let file = temp_file(r#"{"mappings": [1, 4, 5]}"#);
    let fingermap = Fingermap::load_from_file(file.path()).unwrap();
    assert!(fingermap.validate(&layout).is_ok());

    assert!(Fingermap::new(vec![1, 4]).validate(&layout).is_err());
    assert!(Fingermap::new(vec![1, 4, 12]).validate(&layout).is_err());
}

// --- KEYMAP ---

#[test]
fn test_keymap_name_defaults_to_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("colemak.json");
    std::fs::write(
        &path,
        r#"{"layers": [[{"default": "a", "shift": "A"}, {"hold": "MO 1"}], [{}, {}]]}"#,
    )
    .unwrap();

    let keymap = Keymap::load_from_file(&path).unwrap();
    assert_eq!(keymap.name, "colemak");
    assert_eq!(keymap.layers.len(), 2);
    assert_eq!(keymap.layers[0][1].hold, "MO 1");
    assert!(keymap.layers[1][0].is_empty());
    assert!(keymap.validate(2).is_ok());
    assert!(keymap.validate(3).is_err());
}

#[test]
fn test_board_files_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let board = standard_board();
    let (layout_path, fingermap_path, keymap_path) = board.write_files(dir.path());

    let layout = Layout::load_from_file(&layout_path, None).unwrap();
    let fingermap = Fingermap::load_from_file(&fingermap_path).unwrap();
    let keymap = Keymap::load_from_file(&keymap_path).unwrap();

    assert_eq!(&layout, board.layout.as_ref());
    assert_eq!(fingermap, board.fingermap);
    assert_eq!(keymap, board.keymap);
}

// --- CONFIG ---

#[test]
fn test_config_partial_file() {
    let file = temp_file(r#"{"analysis": {"top_sfbs": 3}}"#);
    let config = Config::load_from_file(file.path()).unwrap();

    assert_eq!(config.analysis.top_sfbs, 3);
    assert!(!config.analysis.include_repeats);
    assert_eq!(config.sequencer.default_layer, 0);
}

#[test]
fn test_config_missing_file() {
    let err = Config::load_from_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, KeyTraceError::Config(_)));
}

#[test]
fn test_cli_flags_override_file() {
    let file = temp_file(r#"{"analysis": {"top_sfbs": 3, "include_repeats": false}, "sequencer": {"default_layer": 1}}"#);
    let mut config = Config::load_from_file(file.path()).unwrap();

    let command = Config::augment_args(Command::new("test"));
    let matches = command
        .try_get_matches_from(["test", "--include-repeats"])
        .unwrap();
    let cli = Config::from_arg_matches(&matches).unwrap();

    config.merge_from_cli(&cli, &matches);

    assert!(config.analysis.include_repeats, "flag given on the command line wins");
    assert_eq!(config.analysis.top_sfbs, 3, "defaults do not clobber the file");
    assert_eq!(config.sequencer.default_layer, 1);
}
