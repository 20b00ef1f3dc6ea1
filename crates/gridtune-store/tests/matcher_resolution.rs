use std::fs;

use gridtune_core::{Param, ParamSet, TuneError};
use gridtune_store::{matcher, CsvStore};
use serde_json::json;
use tempfile::tempdir;

fn params(pairs: &[(&str, serde_json::Value)]) -> ParamSet {
    pairs
        .iter()
        .map(|(name, value)| Param::new(*name, value.clone()))
        .collect()
}

#[test]
fn empty_root_appends_in_caller_order() {
    let root = tempdir().expect("root");
    let config = params(&[("--lr", json!(0.1)), ("--bs", json!(16))]);
    let segments = matcher::resolve(root.path(), &config).expect("resolve");
    assert_eq!(segments, vec!["--lr=0.1", "--bs=16"]);
}

#[test]
fn existing_layout_dictates_segment_order() {
    let root = tempdir().expect("root");
    fs::create_dir_all(root.path().join("--lr=0.1").join("--bs=16")).expect("tree");
    // Caller lists bs first; the tree already stores lr above bs.
    let config = params(&[
        ("--bs", json!(16)),
        ("--lr", json!(0.1)),
        ("--epochs", json!(10)),
    ]);
    let segments = matcher::resolve(root.path(), &config).expect("resolve");
    assert_eq!(segments, vec!["--lr=0.1", "--bs=16", "--epochs=10"]);
}

#[test]
fn deepest_matching_branch_wins() {
    let root = tempdir().expect("root");
    fs::create_dir_all(root.path().join("--a=1")).expect("shallow");
    fs::create_dir_all(root.path().join("--b=2").join("--a=9")).expect("deep");
    let config = params(&[("--a", json!(1)), ("--b", json!(2))]);
    let segments = matcher::resolve(root.path(), &config).expect("resolve");
    // The two-level chain beats the single-level one; values come from
    // the caller, not from the matched directories.
    assert_eq!(segments, vec!["--b=2", "--a=1"]);
}

#[test]
fn a_key_is_consumed_by_one_level_only() {
    let root = tempdir().expect("root");
    fs::create_dir_all(root.path().join("--a=1").join("--a=2")).expect("tree");
    let config = params(&[("--a", json!(1))]);
    let segments = matcher::resolve(root.path(), &config).expect("resolve");
    assert_eq!(segments, vec!["--a=1"]);
}

#[test]
fn duplicate_parameters_are_rejected() {
    let root = tempdir().expect("root");
    let config = params(&[("--lr", json!(0.1)), ("lr", json!(0.2))]);
    let err = matcher::resolve(root.path(), &config).unwrap_err();
    assert!(matches!(err, TuneError::DuplicateParameter(_)));
}

#[test]
fn resolution_is_idempotent_against_an_unchanged_tree() {
    let root = tempdir().expect("root");
    let store = CsvStore::new(root.path());
    let config = params(&[("--lr", json!(0.1)), ("--bs", json!(16))]);
    let first = store.resolve_dir(&config).expect("first");
    fs::create_dir_all(&first).expect("materialize");
    let second = store.resolve_dir(&config).expect("second");
    assert_eq!(first, second);
}

#[test]
fn prefixless_request_reuses_prefixed_directories() {
    let root = tempdir().expect("root");
    fs::create_dir_all(root.path().join("--lr=0.1")).expect("tree");
    let config = params(&[("lr", json!(0.1)), ("bs", json!(16))]);
    let segments = matcher::resolve(root.path(), &config).expect("resolve");
    // The match is keyed on the stripped name; rendering keeps the
    // caller's own spelling and reconciliation maps it back onto disk.
    assert_eq!(segments, vec!["lr=0.1", "bs=16"]);
}
