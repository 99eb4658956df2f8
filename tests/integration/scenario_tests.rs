use filetrack::registry::Registry;
use filetrack::scanner::Hasher;
use filetrack::session::{SessionReport, UpdateParams, UpdateSession};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const ABC_SHA256: &str = "b5d4045c3f466fa91fe2cc6abe79232a1a57cdf104f7a26e716e0a1e2789df78";

/// Registry, directory list and output location in one temp dir.
struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            root: tempdir().unwrap(),
        }
    }

    fn data_dir(&self, name: &str) -> PathBuf {
        let dir = self.root.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(&self, path: &Path, content: &[u8]) {
        fs::write(path, content).unwrap();
    }

    fn registry(&self, content: &str) -> PathBuf {
        let path = self.root.path().join("experiments.txt");
        fs::write(&path, content).unwrap();
        path
    }

    fn dir_list(&self, dirs: &[&Path]) -> PathBuf {
        let path = self.root.path().join("dirs.txt");
        let content: String = dirs.iter().map(|d| format!("{}\n", d.display())).collect();
        fs::write(&path, content).unwrap();
        path
    }

    fn update(&self, input: &Path, out_name: &str, max_files: Option<usize>) -> SessionReport {
        let params = UpdateParams::new(
            input,
            self.root.path().join(out_name),
            self.root.path().join("dirs.txt"),
            max_files,
        )
        .unwrap();
        UpdateSession::open(params, Hasher::new())
            .unwrap()
            .execute()
            .unwrap()
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.root.path().join(name)).unwrap()
    }
}

#[test]
fn test_scenario_a_single_new_file() {
    let ws = Workspace::new();
    let data = ws.data_dir("data");
    ws.write(&data.join("sample.rhit"), b"ABC");
    let input = ws.registry("");
    ws.dir_list(&[&data]);

    let report = ws.update(&input, "out.txt", None);

    assert_eq!(report.added_count(), 1);
    assert_eq!(ws.read("out.txt"), format!("sample.rhit;{ABC_SHA256}\n"));
}

#[test]
fn test_scenario_b_known_name_is_skipped() {
    let ws = Workspace::new();
    let data = ws.data_dir("data");
    ws.write(&data.join("a.hits"), b"content whose hash is not H1");
    let original = "a.hits;H1\n";
    let input = ws.registry(original);
    ws.dir_list(&[&data]);

    let report = ws.update(&input, "out.txt", None);

    assert_eq!(report.added_count(), 0);
    assert_eq!(report.skipped_known, 1);
    assert_eq!(report.bytes_hashed, 0);
    assert_eq!(ws.read("out.txt"), original);
}

#[test]
fn test_scenario_c_identical_content_conflicts() {
    let ws = Workspace::new();
    let data = ws.data_dir("data");
    ws.write(&data.join("x.str"), b"identical bytes");
    ws.write(&data.join("y.str"), b"identical bytes");
    let input = ws.registry("");
    ws.dir_list(&[&data]);

    let report = ws.update(&input, "out.txt", None);

    assert_eq!(report.added_count(), 1);
    assert_eq!(report.conflicts.len(), 1);
    let added = &report.added[0].filename;
    assert_eq!(&report.conflicts[0].registered_as, added);
    assert_ne!(&report.conflicts[0].filename, added);

    let out = ws.read("out.txt");
    assert_eq!(out.lines().count(), 1);
    assert!(out.starts_with(added.as_str()));
}

#[test]
fn test_scenario_d_missing_directory_is_non_fatal() {
    let ws = Workspace::new();
    let data = ws.data_dir("data");
    ws.write(&data.join("present.rraw"), b"here");
    let missing = ws.root.path().join("unplugged-share");
    let input = ws.registry("");
    ws.dir_list(&[&missing, &data]);

    let report = ws.update(&input, "out.txt", None);

    assert_eq!(report.added_count(), 1);
    assert_eq!(report.scan_errors.len(), 1);
    assert!(report.scan_errors[0].contains("unplugged-share"));
    assert!(report.has_warnings());
}

#[test]
fn test_conflict_with_preexisting_entry() {
    let ws = Workspace::new();
    let data = ws.data_dir("data");
    ws.write(&data.join("renamed.rhit"), b"ABC");
    let input = ws.registry(&format!("original.rhit;{ABC_SHA256}\n"));
    ws.dir_list(&[&data]);

    let report = ws.update(&input, "out.txt", None);

    assert_eq!(report.added_count(), 0);
    assert_eq!(report.conflicts[0].registered_as, "original.rhit");
    assert_eq!(ws.read("out.txt"), format!("original.rhit;{ABC_SHA256}\n"));
}

#[test]
fn test_duplicates_across_directories() {
    let ws = Workspace::new();
    let first = ws.data_dir("first");
    let second = ws.data_dir("second");
    ws.write(&first.join("run1.rhit"), b"same run");
    ws.write(&second.join("run1-copy.rhit"), b"same run");
    // Same filename in two directories: the second is known by name
    ws.write(&second.join("run1.rhit"), b"other bytes");
    let input = ws.registry("");
    ws.dir_list(&[&first, &second]);

    let report = ws.update(&input, "out.txt", None);

    assert_eq!(report.added_count(), 1);
    assert_eq!(report.added[0].path, first.join("run1.rhit"));
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.skipped_known, 1);
}

#[test]
fn test_second_run_is_idempotent() {
    let ws = Workspace::new();
    let data = ws.data_dir("data");
    for i in 0..4 {
        ws.write(&data.join(format!("r{i}.hits")), format!("run {i}").as_bytes());
    }
    let input = ws.registry("# experiment list\n");
    ws.dir_list(&[&data]);

    let first = ws.update(&input, "out1.txt", None);
    let out1 = ws.root.path().join("out1.txt");
    let second = ws.update(&out1, "out2.txt", None);

    assert_eq!(first.added_count(), 4);
    assert_eq!(second.added_count(), 0);
    assert_eq!(second.skipped_known, 4);
    assert_eq!(ws.read("out1.txt"), ws.read("out2.txt"));
}

#[test]
fn test_output_is_textual_superset_of_input() {
    let ws = Workspace::new();
    let data = ws.data_dir("data");
    ws.write(&data.join("new.rhit"), b"new");
    let original = "# machine 1\nold.rhit;0a0b;2019-01-01\n   # indented comment\n\nold2.str;0c0d";
    let input = ws.registry(original);
    ws.dir_list(&[&data]);

    ws.update(&input, "out.txt", None);

    let out = ws.read("out.txt");
    assert!(out.starts_with(original));
    let registry = Registry::parse(&out);
    assert_eq!(registry.len(), 3);
    assert!(registry.contains("new.rhit"));
    assert!(registry.inconsistencies().is_empty());
}

#[test]
fn test_unrecognized_files_are_ignored() {
    let ws = Workspace::new();
    let data = ws.data_dir("data");
    ws.write(&data.join("readme.txt"), b"ignore me");
    ws.write(&data.join("run.RHIT"), b"keep me");
    let input = ws.registry("");
    ws.dir_list(&[&data]);

    let report = ws.update(&input, "out.txt", None);

    assert_eq!(report.candidates_total, 1);
    assert_eq!(report.added[0].filename, "run.RHIT");
}

#[test]
fn test_name_with_separator_is_never_registered() {
    let ws = Workspace::new();
    let data = ws.data_dir("data");
    ws.write(&data.join("run;2.rhit"), b"semicolon in the name");
    ws.write(&data.join("run3.rhit"), b"plain name");
    let input = ws.registry("");
    ws.dir_list(&[&data]);

    let first = ws.update(&input, "out1.txt", None);
    let out1 = ws.root.path().join("out1.txt");
    let second = ws.update(&out1, "out2.txt", None);

    assert_eq!(first.added_count(), 1);
    assert_eq!(first.scan_errors.len(), 1);
    assert_eq!(second.added_count(), 0);
    assert_eq!(ws.read("out1.txt"), ws.read("out2.txt"));

    let registry = Registry::parse(&ws.read("out2.txt"));
    assert_eq!(registry.len(), 1);
    assert!(registry.contains("run3.rhit"));
}

#[test]
fn test_empty_hash_column_marks_name_known() {
    let ws = Workspace::new();
    let data = ws.data_dir("data");
    ws.write(&data.join("a.rhit"), b"ABC");
    let input = ws.registry("a.rhit;\n");
    ws.dir_list(&[&data]);

    let report = ws.update(&input, "out.txt", None);

    assert_eq!(report.added_count(), 0);
    assert_eq!(report.skipped_known, 1);
    assert_eq!(ws.read("out.txt"), "a.rhit;\n");
}
