use std::fs;

use tempfile::TempDir;
use wikitables_engine::{reset_output_root, ConsolidateError, Consolidator};

fn stage_job(staging_root: &std::path::Path, name: &str) {
    let dir = staging_root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("table-1.csv"), "a,b\n1,2\n").unwrap();
}

#[test]
fn reset_creates_a_missing_output_root() {
    let temp = TempDir::new().unwrap();
    let output_root = temp.path().join("output");
    assert!(!output_root.exists());
    reset_output_root(&output_root).unwrap();
    assert!(output_root.is_dir());
}

#[test]
fn reset_wipes_leftover_state_from_a_previous_run() {
    let temp = TempDir::new().unwrap();
    let output_root = temp.path().join("output");
    fs::create_dir_all(output_root.join("stale_job")).unwrap();
    fs::write(output_root.join("stale_job").join("old.csv"), "x").unwrap();

    reset_output_root(&output_root).unwrap();
    assert!(output_root.is_dir());
    assert_eq!(fs::read_dir(&output_root).unwrap().count(), 0);
}

#[test]
fn consolidate_relocates_directories_with_their_contents() {
    let temp = TempDir::new().unwrap();
    let staging_root = temp.path().join("outputTables");
    let output_root = temp.path().join("output");
    stage_job(&staging_root, "mountains");
    stage_job(&staging_root, "films");
    // Nested content survives the move.
    let nested = staging_root.join("mountains").join("notes");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("extra.txt"), "n").unwrap();

    reset_output_root(&output_root).unwrap();
    let names = vec!["mountains".to_string(), "films".to_string()];
    let summary = Consolidator::new(&staging_root, &output_root)
        .consolidate(&names)
        .unwrap();

    assert_eq!(summary.moved, names);
    assert_eq!(
        fs::read_to_string(output_root.join("mountains").join("table-1.csv")).unwrap(),
        "a,b\n1,2\n"
    );
    assert_eq!(
        fs::read_to_string(output_root.join("mountains").join("notes").join("extra.txt")).unwrap(),
        "n"
    );
    assert!(!staging_root.join("mountains").exists());
    assert!(!staging_root.join("films").exists());
}

#[test]
fn missing_staged_directory_is_fatal() {
    let temp = TempDir::new().unwrap();
    let staging_root = temp.path().join("outputTables");
    let output_root = temp.path().join("output");
    fs::create_dir_all(&staging_root).unwrap();
    reset_output_root(&output_root).unwrap();

    let err = Consolidator::new(&staging_root, &output_root)
        .consolidate(&["ghost".to_string()])
        .unwrap_err();
    assert!(matches!(err, ConsolidateError::MissingJobDir(name) if name == "ghost"));
}

#[test]
fn occupied_destination_is_a_collision() {
    let temp = TempDir::new().unwrap();
    let staging_root = temp.path().join("outputTables");
    let output_root = temp.path().join("output");
    stage_job(&staging_root, "nba");
    reset_output_root(&output_root).unwrap();
    fs::create_dir_all(output_root.join("nba")).unwrap();

    let err = Consolidator::new(&staging_root, &output_root)
        .consolidate(&["nba".to_string()])
        .unwrap_err();
    assert!(matches!(err, ConsolidateError::Collision(_)));
    // The staged source is left untouched for inspection.
    assert!(staging_root.join("nba").is_dir());
}

#[test]
fn back_to_back_runs_do_not_collide() {
    let temp = TempDir::new().unwrap();
    let staging_root = temp.path().join("outputTables");
    let output_root = temp.path().join("output");
    let names = vec!["volcanoes".to_string()];
    let consolidator = Consolidator::new(&staging_root, &output_root);

    for _ in 0..2 {
        stage_job(&staging_root, "volcanoes");
        reset_output_root(&output_root).unwrap();
        consolidator.consolidate(&names).unwrap();
        assert!(output_root.join("volcanoes").is_dir());
    }
}
