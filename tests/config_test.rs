// tests/config_test.rs
use git_release::config::{load_config, parse_config, ReleaseConfig, CONFIG_FILE_NAME};
use git_release::domain::Increment;
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
tagTemplate = "${name}-${version}"
failOnCommitNeeded = false
failOnUnversionedFiles = false
failOnPublishNeeded = false
preCommitText = "CHORE:"
versionPropertyFile = "version.properties"
versionProperties = ["appVersion"]
nextVersionIncrement = "minor"
publishTasks = ["./gradlew publish"]

[git]
requireBranch = "kotlin"
pushToRemote = "upstream"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let dir = TempDir::new().unwrap();
    let config = load_config(Some(temp_file.path()), dir.path()).unwrap();
    assert_eq!(config.tag_template, "${name}-${version}");
    assert!(!config.fail_on_commit_needed);
    assert!(!config.fail_on_unversioned_files);
    assert!(!config.fail_on_publish_needed);
    assert!(config.fail_on_update_needed);
    assert_eq!(config.pre_commit_text, "CHORE:");
    assert_eq!(config.version_property_file, PathBuf::from("version.properties"));
    assert_eq!(config.version_properties, vec!["appVersion".to_string()]);
    assert_eq!(config.next_version_increment, Increment::Minor);
    assert_eq!(config.publish_tasks, vec!["./gradlew publish".to_string()]);
    assert_eq!(config.git.require_branch.as_deref(), Some("kotlin"));
    assert_eq!(config.git.push_to_remote, "upstream");
}

#[test]
fn test_partial_file_keeps_defaults() {
    let config = parse_config("revertOnFail = false").unwrap();
    assert!(!config.revert_on_fail);
    assert_eq!(config.tag_template, "v$version");
    assert_eq!(config.snapshot_suffix, "-SNAPSHOT");
    assert_eq!(config.git.push_to_remote, "origin");
}

#[test]
fn test_project_config_takes_precedence() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "tagTemplate = \"release-$version\"\n").unwrap();

    let config = load_config(None, dir.path()).unwrap();
    assert_eq!(config.tag_template, "release-$version");
}

#[test]
fn test_invalid_toml_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "tagTemplate = [").unwrap();

    let err = load_config(Some(&path), dir.path()).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[test]
fn test_empty_template_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("release.toml");
    fs::write(&path, "tagTemplate = \"  \"").unwrap();

    assert!(load_config(Some(&path), dir.path()).is_err());
}

#[test]
fn test_missing_custom_file_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(load_config(Some(&missing), dir.path()).is_err());
}

#[test]
#[serial]
fn test_user_config_dir_fallback() {
    let project = TempDir::new().unwrap();
    let config_home = TempDir::new().unwrap();
    let user_dir = config_home.path().join("git-release");
    fs::create_dir_all(&user_dir).unwrap();
    fs::write(user_dir.join(CONFIG_FILE_NAME), "snapshotSuffix = \"-dev\"\n").unwrap();

    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", config_home.path());
    let result = load_config(None, project.path());
    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    if cfg!(target_os = "linux") {
        assert_eq!(result.unwrap().snapshot_suffix, "-dev");
    } else {
        assert!(result.is_ok());
    }
}

#[test]
#[serial]
fn test_defaults_without_any_file() {
    let project = TempDir::new().unwrap();
    let config_home = TempDir::new().unwrap();

    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", config_home.path());
    let result = load_config(None, project.path());
    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    if cfg!(target_os = "linux") {
        assert_eq!(result.unwrap(), ReleaseConfig::default());
    }
}
