use filetrack::scanner::Hasher;
use filetrack::session::{SessionReport, UpdateParams, UpdateSession};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn setup(files: usize) -> tempfile::TempDir {
    let root = tempdir().unwrap();
    let data = root.path().join("data");
    fs::create_dir(&data).unwrap();
    for i in 0..files {
        fs::write(data.join(format!("f{i:02}.str")), format!("content {i}")).unwrap();
    }
    fs::write(root.path().join("experiments.txt"), "").unwrap();
    fs::write(root.path().join("dirs.txt"), format!("{}\n", data.display())).unwrap();
    root
}

fn run(root: &Path, input: &str, output: &str, max: Option<usize>) -> SessionReport {
    let dirs = root.join("dirs.txt");
    let params = UpdateParams::new(root.join(input), root.join(output), dirs, max).unwrap();
    UpdateSession::open(params, Hasher::new())
        .unwrap()
        .execute()
        .unwrap()
}

#[test]
fn test_budget_caps_additions() {
    let root = setup(10);
    let report = run(root.path(), "experiments.txt", "out.txt", Some(3));

    assert_eq!(report.added_count(), 3);
    assert!(report.budget_reached);
    assert_eq!(report.candidates_unprocessed, 7);

    let out = fs::read_to_string(root.path().join("out.txt")).unwrap();
    assert_eq!(out.lines().count(), 3);
}

#[test]
fn test_budget_larger_than_new_files() {
    let root = setup(2);
    let report = run(root.path(), "experiments.txt", "out.txt", Some(5));

    assert_eq!(report.added_count(), 2);
    assert!(!report.budget_reached);
}

#[test]
fn test_budgeted_runs_converge() {
    let root = setup(5);

    let first = run(root.path(), "experiments.txt", "out1.txt", Some(2));
    let second = run(root.path(), "out1.txt", "out2.txt", Some(2));
    let third = run(root.path(), "out2.txt", "out3.txt", Some(2));
    let fourth = run(root.path(), "out3.txt", "out4.txt", Some(2));

    assert_eq!(first.added_count(), 2);
    assert_eq!(second.added_count(), 2);
    assert_eq!(third.added_count(), 1);
    assert!(!third.budget_reached);
    assert_eq!(fourth.added_count(), 0);

    let out = fs::read_to_string(root.path().join("out3.txt")).unwrap();
    assert_eq!(out.lines().count(), 5);
}

#[test]
fn test_unbounded_adds_everything() {
    let root = setup(12);
    let report = run(root.path(), "experiments.txt", "out.txt", None);
    assert_eq!(report.added_count(), 12);
    assert!(!report.budget_reached);
}
