use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn dupescan(args: &[&str], config: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dupescan"))
        .args(args)
        .arg("--config")
        .arg(config)
        .env_remove("RUST_LOG")
        .env_remove("DUPESCAN_WORKERS")
        .env_remove("DUPESCAN_FORMAT")
        .env_remove("DUPESCAN_INCLUDE_EMPTY")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

fn empty_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("settings.toml");
    fs::write(&path, "").unwrap();
    path
}

#[test]
fn test_exit_code_duplicates_found() {
    let scratch = tempdir().unwrap();
    let data = tempdir().unwrap();
    fs::write(data.path().join("a"), b"twin").unwrap();
    fs::write(data.path().join("b"), b"twin").unwrap();

    let output = dupescan(
        &[data.path().to_str().unwrap(), "-q"],
        &empty_config(scratch.path()),
    );

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total duplicate files found: 2"));
    assert!(stdout.contains("Total reclaimable space: 4 bytes"));
}

#[test]
fn test_exit_code_no_duplicates() {
    let scratch = tempdir().unwrap();
    let data = tempdir().unwrap();
    fs::write(data.path().join("a"), b"one").unwrap();

    let output = dupescan(
        &[data.path().to_str().unwrap(), "-q"],
        &empty_config(scratch.path()),
    );
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_exit_code_invalid_root_with_json_errors() {
    let scratch = tempdir().unwrap();
    let missing = scratch.path().join("does-not-exist");

    let output = dupescan(
        &[missing.to_str().unwrap(), "-q", "--json-errors"],
        &empty_config(scratch.path()),
    );

    assert_eq!(output.status.code(), Some(4));
    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["code"], "DS004");
    assert_eq!(err["exit_code"], 4);
}

#[test]
fn test_json_report_to_file() {
    let scratch = tempdir().unwrap();
    let data = tempdir().unwrap();
    fs::write(data.path().join("x1"), vec![b'x'; 100]).unwrap();
    fs::write(data.path().join("x2"), vec![b'x'; 100]).unwrap();
    fs::write(data.path().join("y"), vec![b'y'; 100]).unwrap();
    let report_path = scratch.path().join("report.json");

    let output = dupescan(
        &[
            data.path().to_str().unwrap(),
            "-q",
            "--format",
            "json",
            "--report",
            report_path.to_str().unwrap(),
            "--workers",
            "2",
        ],
        &empty_config(scratch.path()),
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(value["report"]["total_groups"], 1);
    assert_eq!(value["report"]["reclaimable_bytes"], 100);
    assert_eq!(value["summary"]["exit_code_name"], "DS000");
}

#[test]
fn test_settings_file_selects_format() {
    let scratch = tempdir().unwrap();
    let data = tempdir().unwrap();
    fs::write(data.path().join("a"), b"same").unwrap();
    fs::write(data.path().join("b"), b"same").unwrap();
    let config = scratch.path().join("settings.toml");
    fs::write(&config, "format = \"csv\"\n").unwrap();

    let output = dupescan(&[data.path().to_str().unwrap(), "-q"], &config);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("group_id,digest,size,path"));
}

#[test]
fn test_print_config() {
    let scratch = tempdir().unwrap();
    let config = scratch.path().join("settings.toml");
    fs::write(&config, "workers = 3\n").unwrap();

    let output = dupescan(&["--print-config", "--exclude-empty"], &config);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("workers = 3"));
    assert!(stdout.contains("include_empty = false"));
}
