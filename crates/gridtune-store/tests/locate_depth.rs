use std::fs;
use std::path::Path;

use gridtune_core::{Param, ParamSet};
use gridtune_store::{find_all, find_at_depth};
use serde_json::{json, Value};
use tempfile::tempdir;

fn write_result(root: &Path, dirs: &[&str], name: &str) {
    let mut dir = root.to_path_buf();
    for part in dirs {
        dir = dir.join(part);
    }
    fs::create_dir_all(&dir).expect("dirs");
    fs::write(dir.join(name), "a,b\n1,2\n").expect("file");
}

fn params(pairs: &[(&str, Value)]) -> ParamSet {
    pairs
        .iter()
        .map(|(name, value)| Param::new(*name, value.clone()))
        .collect()
}

/// Files at depths one to three under a shared prefix.
fn seed(root: &Path) {
    write_result(root, &["--param1=1"], "results_0.csv");
    write_result(root, &["--param1=1", "--param2=2"], "results_0.csv");
    write_result(root, &["--param1=1", "--param2=2"], "results_1.csv");
    write_result(root, &["--param1=1", "--param2=2", "--param3=3"], "results_0.csv");
    write_result(root, &["--param1=1", "--param2=2", "--param3=3"], "results_1.csv");
    write_result(root, &["--param1=1", "--param2=2", "--param3=3"], "results_2.csv");
}

#[test]
fn exact_depth_counts_only_its_own_level() {
    let root = tempdir().expect("root");
    seed(root.path());
    let two = params(&[("param1", json!(1)), ("param2", json!(2))]);
    let three = params(&[
        ("param1", json!(1)),
        ("param2", json!(2)),
        ("param3", json!(3)),
    ]);
    assert_eq!(find_at_depth(root.path(), "csv", &two).unwrap().len(), 2);
    assert_eq!(find_at_depth(root.path(), "csv", &three).unwrap().len(), 3);
}

#[test]
fn any_depth_spans_shallow_and_deep_results() {
    let root = tempdir().expect("root");
    seed(root.path());
    let two = params(&[("param1", json!(1)), ("param2", json!(2))]);
    // Depth-two and depth-three files all carry both constraints.
    assert_eq!(find_all(root.path(), "csv", &two).unwrap().len(), 5);
}

#[test]
fn empty_constraints_match_every_file() {
    let root = tempdir().expect("root");
    seed(root.path());
    assert_eq!(find_all(root.path(), "csv", &ParamSet::new()).unwrap().len(), 6);
    assert_eq!(
        find_at_depth(root.path(), "csv", &ParamSet::new())
            .unwrap()
            .len(),
        0
    );
}

#[test]
fn numeric_formatting_does_not_split_configurations() {
    let root = tempdir().expect("root");
    write_result(root.path(), &["--param1=1", "--param2=2"], "results_0.csv");
    write_result(root.path(), &["--param1=1.0", "--param2=2.0"], "results_0.csv");
    let query = params(&[("param1", json!(1)), ("param2", json!(2))]);
    // Both spellings satisfy the numeric constraints at depth two.
    assert_eq!(find_at_depth(root.path(), "csv", &query).unwrap().len(), 2);
}

#[test]
fn opaque_segments_do_not_count_toward_depth() {
    let root = tempdir().expect("root");
    write_result(root.path(), &["archive", "--p=5"], "results_0.csv");
    let query = params(&[("p", json!(5))]);
    assert_eq!(find_at_depth(root.path(), "csv", &query).unwrap().len(), 1);
}

#[test]
fn other_extensions_are_ignored() {
    let root = tempdir().expect("root");
    write_result(root.path(), &["--p=5"], "results_0.csv");
    write_result(root.path(), &["--p=5"], "results_1.json");
    let query = params(&[("p", json!(5))]);
    assert_eq!(find_all(root.path(), "csv", &query).unwrap().len(), 1);
    assert_eq!(find_all(root.path(), "json", &query).unwrap().len(), 1);
}

#[test]
fn consistent_duplicate_constraints_collapse() {
    let root = tempdir().expect("root");
    write_result(root.path(), &["--p=5"], "results_0.csv");
    let query = params(&[("p", json!(5)), ("--p", json!(5))]);
    assert_eq!(find_at_depth(root.path(), "csv", &query).unwrap().len(), 1);
}

#[test]
fn missing_root_reads_as_no_results() {
    let root = tempdir().expect("root");
    let gone = root.path().join("nothing_here");
    assert!(find_all(&gone, "csv", &ParamSet::new()).unwrap().is_empty());
}
