mod common;

use common::*;
use keytrace::api::{compare_keymap_files, compare_keymaps, AnalysisSession};
use keytrace::config::Config;
use keytrace::error::KeyTraceError;
use keytrace::keymap::{KeyDescriptor, Keymap};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_session_report() {
    let board = standard_board();
    let session = board.session(Config::default());

    let report = session.run("HellO").unwrap();
    assert_eq!(report.keymap, "standard");
    assert_eq!(report.text, "HellO");
    assert_eq!(report.replay, "<lsft>H</lsft>ell<lsft>O</lsft>");
    assert_eq!(report.events, 14);
    assert_eq!(report.analysis.sfb_total, 0);
}

#[test]
fn test_session_honours_config() {
    let board = standard_board();
    let mut config = Config::default();
    config.analysis.include_repeats = true;
    config.sequencer.default_layer = 1;

    let report = board.session(config).run("12").unwrap();
    assert_eq!(report.analysis.layer_switches, 0);
    assert_eq!(report.analysis.layer_counts, vec![0, 2]);

    let mut config = Config::default();
    config.analysis.include_repeats = true;
    let report = board.session(config).run("hello").unwrap();
    assert_eq!(report.analysis.sfb_total, 1);
}

#[test]
fn test_session_rejects_bad_inputs() {
    let board = standard_board();

    let mut config = Config::default();
    config.sequencer.default_layer = 5;
    let err = AnalysisSession::new(
        Arc::clone(&board.layout),
        &board.fingermap,
        &board.keymap,
        config,
    )
    .err()
    .unwrap();
    assert!(matches!(err, KeyTraceError::Config(_)));

    let short = Keymap::new(vec![vec![KeyDescriptor::tap("a")]]);
    assert!(AnalysisSession::new(
        Arc::clone(&board.layout),
        &board.fingermap,
        &short,
        Config::default()
    )
    .is_err());

    let mut config = Config::default();
    config.sequencer.movement_weights_x = "1.0".to_string();
    assert!(board.session(config).sequencer().is_err());
}

#[test]
fn test_sessions_are_independent() {
    let board = standard_board();
    let session = board.session(Config::default());

    let mut a = session.sequencer().unwrap();
    let mut b = session.sequencer().unwrap();
    a.build("a1").unwrap();
    b.build("hello").unwrap();

    assert_eq!(a.play(true), "a1");
    assert_eq!(b.play(true), "hello");
}

#[test]
fn test_compare_keeps_order_and_errors() {
    let board = standard_board();

    let mut missing_o = board.keymap.clone();
    missing_o.name = "no-o".to_string();
    missing_o.layers[0][8] = KeyDescriptor::default();

    let mut copy = board.keymap.clone();
    copy.name = "copy".to_string();

    let keymaps = vec![board.keymap.clone(), missing_o, copy];
    let results = compare_keymaps(
        Arc::clone(&board.layout),
        &board.fingermap,
        &keymaps,
        &Config::default(),
        "hello",
    );

    let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["standard", "no-o", "copy"]);

    assert!(results[0].1.is_ok());
    assert!(matches!(
        results[1].1,
        Err(KeyTraceError::UnmappableSymbol { .. })
    ));

    let first = results[0].1.as_ref().unwrap();
    let third = results[2].1.as_ref().unwrap();
    assert_eq!(first.analysis, third.analysis);
}

#[test]
fn test_compare_files_keeps_unreadable_keymap_in_place() {
    let board = standard_board();
    let dir = tempdir().unwrap();
    let (_, _, keymap_path) = board.write_files(dir.path());
    let missing = dir.path().join("missing.json");

    let paths = vec![keymap_path, missing.clone()];
    let results = compare_keymap_files(
        Arc::clone(&board.layout),
        &board.fingermap,
        &paths,
        &Config::default(),
        "hello",
    );

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "standard");
    assert_eq!(results[0].1.as_ref().unwrap().events, 10);

    assert_eq!(results[1].0, missing.display().to_string());
    assert!(matches!(results[1].1, Err(KeyTraceError::Io(_))));
}
