//! Integration tests for the marginalia CLI
//!
//! These tests run the binary end-to-end against temporary source trees.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("marginalia").unwrap();
    cmd.arg("--no-color");
    cmd
}

/// A project with one formatted file and one that needs formatting.
fn create_test_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("clean.py"),
        "# header\nx = 1  # one\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("messy.py"),
        "x = [1,  # one\n     2]\n",
    )
    .unwrap();
    temp_dir
}

#[test]
fn test_help_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("fmt"))
        .stdout(predicate::str::contains("tokens"));
}

#[test]
fn test_version_command() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(VERSION));
}

#[test]
fn test_version_detailed() {
    cli()
        .args(["version", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("marginalia-core"))
        .stdout(predicate::str::contains("OpenMpPragma"));
}

#[test]
fn test_fmt_check_reports_without_writing() {
    let project = create_test_project();
    cli()
        .args(["fmt", "--check"])
        .arg(project.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Would reformat:"))
        .stdout(predicate::str::contains("messy.py"))
        .stdout(predicate::str::contains("Files checked: 2"));

    let messy = fs::read_to_string(project.path().join("messy.py")).unwrap();
    assert_eq!(messy, "x = [1,  # one\n     2]\n");
}

#[test]
fn test_fmt_check_with_diff() {
    let project = create_test_project();
    cli()
        .args(["fmt", "--check", "--diff"])
        .arg(project.path().join("messy.py"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("-     2]"))
        .stdout(predicate::str::contains("+    2]"));
}

#[test]
fn test_fmt_writes_files() {
    let project = create_test_project();
    cli()
        .arg("fmt")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied formatting to 1 file(s)"));

    let messy = fs::read_to_string(project.path().join("messy.py")).unwrap();
    assert_eq!(messy, "x = [1,  # one\n    2]\n");

    cli()
        .args(["fmt", "--check"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("All files are formatted correctly"));
}

#[test]
fn test_fmt_uses_discovered_config() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".marginaliarc.toml"),
        "[printer]\nindentSize = 2\neolPadding = 1\n",
    )
    .unwrap();
    let file = temp_dir.path().join("a.py");
    fs::write(&file, "if x:\n    y = 1  # set\n").unwrap();

    cli().arg("fmt").arg(&file).assert().success();
    assert_eq!(fs::read_to_string(&file).unwrap(), "if x:\n  y = 1 # set\n");
}

#[test]
fn test_fmt_reports_syntax_errors() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("broken.py");
    fs::write(&file, "x = (\n").unwrap();

    cli()
        .args(["fmt", "--check"])
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse"))
        .stdout(predicate::str::contains("could not be processed"));
}

#[test]
fn test_fmt_nonexistent_path() {
    cli()
        .args(["fmt", "/nonexistent/path/to/sources"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn test_dump_shows_spliced_comments() {
    let project = create_test_project();
    cli()
        .arg("dump")
        .arg(project.path().join("clean.py"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"Comment(payload=" header", eol=false)"#,
        ))
        .stdout(predicate::str::contains(r#"Comment(payload=" one", eol=true)"#));
}

#[test]
fn test_dump_plain_has_no_comments() {
    let project = create_test_project();
    cli()
        .args(["dump", "--plain"])
        .arg(project.path().join("clean.py"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Module(body=["))
        .stdout(predicate::str::contains("Comment").not());
}

#[test]
fn test_dump_json() {
    let project = create_test_project();
    let output = cli()
        .args(["dump", "--json"])
        .arg(project.path().join("clean.py"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value.is_object());
}

#[test]
fn test_tokens_lists_classification_and_anchor() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("loop.py");
    fs::write(&file, "#pragma omp parallel for\nfor i in y:\n    pass  # body\n").unwrap();

    cli()
        .arg("tokens")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("[OpenMpPragma]"))
        .stdout(predicate::str::contains("-> Module.body[0]"))
        .stdout(predicate::str::contains("(end of line)"))
        .stdout(predicate::str::contains("2 trivia token(s)"));
}

#[test]
fn test_tokens_json() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("a.py");
    fs::write(&file, "x = 1  # one\n").unwrap();

    let output = cli().args(["tokens", "--json"]).arg(&file).output().unwrap();
    assert!(output.status.success());
    let events: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let kinds: Vec<_> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["event"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["classified", "anchored", "inserted"]);
}

#[test]
fn test_check_accepts_commented_sources() {
    let project = create_test_project();
    cli()
        .arg("check")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Every file round-trips"));
}

#[test]
fn test_config_show() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("marginalia.toml");
    fs::write(&config, "[classifier]\nenabled = false\n").unwrap();

    cli()
        .args(["config", "show", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("[classifier]"))
        .stdout(predicate::str::contains("enabled = false"));
}

#[test]
fn test_config_show_resolved_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("marginalia.toml");
    fs::write(&config, "[printer]\nindentSize = 2\n").unwrap();

    cli()
        .args(["config", "show", "--resolved", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Loaded from"))
        .stdout(predicate::str::contains("indentSize = 2"))
        .stdout(predicate::str::contains("eolPadding = 2"));
}

#[test]
fn test_config_schema() {
    cli()
        .args(["config", "schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("indentSize"));
}

#[test]
fn test_config_not_found() {
    cli()
        .args(["config", "show", "--config", "/nonexistent/marginalia.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_verbose_output() {
    let project = create_test_project();
    cli()
        .args(["-vv", "check"])
        .arg(project.path())
        .assert()
        .success();
}
