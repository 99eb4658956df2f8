use clap::Parser;
use filetrack::cli::Cli;
use filetrack::error::ExitCode;
use filetrack::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(args: &[&str]) -> Result<ExitCode, ExitCode> {
    let mut argv = vec!["filetrack", "--quiet"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    run_app(cli).map_err(|e| ExitCode::for_error(&e))
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_update_end_to_end() {
    let root = tempdir().unwrap();
    let data = root.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("sample.rhit"), "ABC").unwrap();
    let input = root.path().join("experiments.txt");
    let dirs = root.path().join("dirs.txt");
    let output = root.path().join("out.txt");
    fs::write(&input, "").unwrap();
    fs::write(&dirs, format!("# shares\n{}\n", data.display())).unwrap();

    let code = run(&[
        "update",
        "--inputFile",
        arg(&input),
        "--outputFile",
        arg(&output),
        "--dirFile",
        arg(&dirs),
        "--no-progress",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    let out = fs::read_to_string(&output).unwrap();
    assert!(out.starts_with("sample.rhit;b5d4045c"));
}

#[test]
fn test_update_refuses_existing_output() {
    let root = tempdir().unwrap();
    let input = root.path().join("experiments.txt");
    let dirs = root.path().join("dirs.txt");
    let output = root.path().join("out.txt");
    fs::write(&input, "").unwrap();
    fs::write(&dirs, "").unwrap();
    fs::write(&output, "precious").unwrap();

    let code = run(&[
        "update",
        "--input-file",
        arg(&input),
        "--output-file",
        arg(&output),
        "--dir-file",
        arg(&dirs),
    ])
    .unwrap_err();

    assert_eq!(code, ExitCode::ConfigError);
    assert_eq!(fs::read_to_string(&output).unwrap(), "precious");
}

#[test]
fn test_update_missing_input_is_config_error() {
    let root = tempdir().unwrap();
    let dirs = root.path().join("dirs.txt");
    let output = root.path().join("out.txt");
    fs::write(&dirs, "").unwrap();

    let code = run(&[
        "update",
        "--input-file",
        arg(&root.path().join("missing.txt")),
        "--output-file",
        arg(&output),
        "--dir-file",
        arg(&dirs),
    ])
    .unwrap_err();

    assert_eq!(code, ExitCode::ConfigError);
    assert!(!output.exists());
}

#[test]
fn test_update_budget_from_config_file() {
    let root = tempdir().unwrap();
    let data = root.path().join("data");
    fs::create_dir(&data).unwrap();
    for i in 0..5 {
        fs::write(data.join(format!("{i}.hits")), format!("{i}")).unwrap();
    }
    let input = root.path().join("experiments.txt");
    let dirs = root.path().join("dirs.txt");
    let output = root.path().join("out.txt");
    let config = root.path().join("filetrack.toml");
    fs::write(&input, "").unwrap();
    fs::write(&dirs, format!("{}\n", data.display())).unwrap();
    fs::write(&config, "max_files = 2\n").unwrap();

    run(&[
        "--config",
        arg(&config),
        "update",
        "--input-file",
        arg(&input),
        "--output-file",
        arg(&output),
        "--dir-file",
        arg(&dirs),
        "--report",
        "json",
    ])
    .unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 2);
}

#[test]
fn test_missing_config_file_is_config_error() {
    let root = tempdir().unwrap();
    let dirs = root.path().join("dirs.txt");
    fs::write(&dirs, "").unwrap();

    let code = run(&[
        "--config",
        arg(&root.path().join("absent.toml")),
        "list",
        "--dir-file",
        arg(&dirs),
    ])
    .unwrap_err();
    assert_eq!(code, ExitCode::ConfigError);
}

#[test]
fn test_check_consistent_registry() {
    let root = tempdir().unwrap();
    let registry = root.path().join("experiments.txt");
    fs::write(&registry, "# list\na.rhit;01\nb.rhit;02\n").unwrap();

    assert_eq!(run(&["check", arg(&registry)]).unwrap(), ExitCode::Success);
}

#[test]
fn test_check_inconsistent_registry() {
    let root = tempdir().unwrap();
    let registry = root.path().join("experiments.txt");
    fs::write(&registry, "a.rhit;01\nb.rhit;01\n").unwrap();

    assert_eq!(run(&["check", arg(&registry)]).unwrap(), ExitCode::ConfigError);
}

#[test]
fn test_list_missing_dir_file() {
    let root = tempdir().unwrap();
    let code = run(&["list", "--dir-file", arg(&root.path().join("none.txt"))]).unwrap_err();
    assert_eq!(code, ExitCode::ConfigError);
}
