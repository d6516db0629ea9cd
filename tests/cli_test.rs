// tests/cli_test.rs
mod common;

use assert_cmd::Command;
use common::{head_message, write, Fixture, PROPERTIES};
use predicates::prelude::*;
use tempfile::TempDir;

fn git_release(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("git-release").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();
    git_release(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("git-release"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_outside_repository_fails() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    write(dir.path(), "gradle.properties", PROPERTIES);

    git_release(&home)
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("ERROR"));
}

#[test]
fn test_dry_run_changes_nothing() {
    let home = TempDir::new().unwrap();
    let fixture = Fixture::new();

    git_release(&home)
        .arg("--dir")
        .arg(fixture.work.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("v1.2.3"))
        .stdout(predicate::str::contains("1.2.4-SNAPSHOT"));

    assert_eq!(fixture.properties(), PROPERTIES);
    assert_eq!(head_message(&fixture.repo()), "Initial commit");
}

#[test]
fn test_release_exit_codes() {
    let home = TempDir::new().unwrap();
    let fixture = Fixture::new();

    git_release(&home)
        .arg("--dir")
        .arg(fixture.work.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Released v1.2.3"));

    // 1.2.4-SNAPSHOT is now released; an untracked file stops the next run.
    write(fixture.work.path(), "scratch.txt", "x");
    git_release(&home)
        .arg("--dir")
        .arg(fixture.work.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Release failed at step Checking"))
        .stderr(predicate::str::contains("scratch.txt"));
}

#[test]
fn test_project_config_file_is_used() {
    let home = TempDir::new().unwrap();
    let fixture = Fixture::new();
    write(
        fixture.work.path(),
        "release.toml",
        "tagTemplate = \"release-${version}\"\nfailOnUnversionedFiles = false\n",
    );

    git_release(&home)
        .arg("--dir")
        .arg(fixture.work.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("release-1.2.3"));
}
