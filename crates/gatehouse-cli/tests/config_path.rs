use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("gatehouse")
        .env("GATEHOUSE_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("gatehouse")
        .env("GATEHOUSE_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    assert!(config_path.exists());

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("[backend]"));
    assert!(contents.contains("anon_key ="));
    assert!(contents.contains("# timeout_secs ="));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    fs::write(&config_path, "# existing config").unwrap();

    cargo_bin_cmd!("gatehouse")
        .env("GATEHOUSE_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_set_writes_backend_values() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    cargo_bin_cmd!("gatehouse")
        .env("GATEHOUSE_HOME", dir.path())
        .args([
            "config",
            "set",
            "--url",
            "https://project.example.co",
            "--anon-key",
            "anon-123",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains(r#"url = "https://project.example.co""#));
    assert!(contents.contains(r#"anon_key = "anon-123""#));
    // Template comments survive the edit.
    assert!(contents.contains("row-level security"));
}

#[test]
fn test_config_set_requires_a_value() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("gatehouse")
        .env("GATEHOUSE_HOME", dir.path())
        .args(["config", "set"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to set"));
}
