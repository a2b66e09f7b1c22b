// tests/cli.rs

//! Exit status and output of the reposync binary against real RPMs.

mod common;

use common::write_rpm;
use std::path::Path;
use std::process::{Command, Output};

fn reposync(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reposync"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_sync_real_rpm_and_regenerate() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("incoming");
    let dest = temp.path().join("repo");
    std::fs::create_dir_all(&dest).unwrap();
    write_rpm(&source, "hello", "2.1", "noarch");

    let out = reposync(&["-x", "true", path_str(&source), path_str(&dest)]);

    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(dest.join("noarch/hello-2.1-1.noarch.rpm").is_file());
}

#[test]
fn test_verbose_narrates_run() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("incoming");
    let dest = temp.path().join("repo");
    std::fs::create_dir_all(&dest).unwrap();
    write_rpm(&source, "hello", "2.1", "noarch");

    let out = reposync(&["-v", "-x", "true", path_str(&source), path_str(&dest)]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert_eq!(out.status.code(), Some(0));
    assert!(stdout.contains("Found packages to copy"));
    assert!(stdout.contains("-package: hello"));
    assert!(stdout.contains("== Running true in directory"));
}

#[test]
fn test_dry_run_prints_plan() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("incoming");
    let dest = temp.path().join("repo");
    std::fs::create_dir_all(&dest).unwrap();
    write_rpm(&source, "hello", "2.1", "noarch");

    let out = reposync(&["--dry-run", path_str(&source), path_str(&dest)]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert_eq!(out.status.code(), Some(0));
    assert!(stdout.contains("[DRY-RUN] Would add hello"));
    assert!(!dest.join("noarch").exists());
}

#[test]
fn test_exit_code_classes() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("incoming");
    let dest = temp.path().join("repo");
    std::fs::create_dir_all(&dest).unwrap();
    let empty = temp.path().join("empty");
    std::fs::create_dir_all(&empty).unwrap();
    write_rpm(&source, "hello", "2.1", "noarch");

    // No packages
    let out = reposync(&["-x", "true", path_str(&empty), path_str(&dest)]);
    assert_eq!(out.status.code(), Some(2));

    // Destination is not a directory
    let missing = temp.path().join("missing");
    let out = reposync(&["-x", "true", path_str(&source), path_str(&missing)]);
    assert_eq!(out.status.code(), Some(3));

    // Regeneration tool fails
    let out = reposync(&["-x", "false", path_str(&source), path_str(&dest)]);
    assert_eq!(out.status.code(), Some(6));
    assert!(dest.join("noarch/hello-2.1-1.noarch.rpm").is_file());

    // Regeneration tool does not exist
    let out = reposync(&["-x", "no-such-tool-xyz", path_str(&source), path_str(&dest)]);
    assert_eq!(out.status.code(), Some(6));
}

#[test]
fn test_usage_errors_and_help() {
    assert_eq!(reposync(&["only-one"]).status.code(), Some(1));
    assert_eq!(reposync(&["--bogus", "a", "b"]).status.code(), Some(1));
    assert_eq!(reposync(&["--help"]).status.code(), Some(0));
}

#[test]
fn test_unreadable_file_reported_once() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("incoming");
    let dest = temp.path().join("repo");
    std::fs::create_dir_all(&dest).unwrap();
    write_rpm(&source, "hello", "2.1", "noarch");
    std::fs::write(source.join("broken.rpm"), "not a package").unwrap();

    let out = reposync(&["-x", "true", path_str(&source), path_str(&dest)]);
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(
        stderr.lines().filter(|l| l.contains("broken.rpm")).count(),
        1,
        "{stderr}"
    );
}

#[test]
fn test_verbose_narration_order() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("incoming");
    let dest = temp.path().join("repo");
    std::fs::create_dir_all(&dest).unwrap();
    write_rpm(&source, "hello", "2.1", "noarch");
    std::fs::write(source.join("broken.rpm"), "not a package").unwrap();

    let out = reposync(&["-v", "-x", "true", path_str(&source), path_str(&dest)]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    let header = stdout.find("=== reposync").unwrap();
    let skipped = stdout.find("Skipped unreadable source file").unwrap();
    assert!(header < skipped, "{stdout}");
}

#[test]
fn test_verbose_is_silent_without_packages() {
    let temp = tempfile::tempdir().unwrap();
    let empty = temp.path().join("empty");
    let dest = temp.path().join("repo");
    std::fs::create_dir_all(&empty).unwrap();
    std::fs::create_dir_all(&dest).unwrap();

    let out = reposync(&["-v", "-x", "true", path_str(&empty), path_str(&dest)]);

    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty(), "{}", String::from_utf8_lossy(&out.stdout));
}
