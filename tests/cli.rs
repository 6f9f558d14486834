use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

/// Return a `Command` for the `rulecheck` binary built by Cargo.
fn rulecheck() -> Command {
    cargo_bin_cmd!("rulecheck")
}

const GOOD: &str = "\
groups:
  - name: example
    rules:
      - record: job:up:sum
        expr: sum(up) by (job)
      - alert: InstanceDown
        expr: up == 0
        for: 5m
        labels:
          severity: page
      - alert: TooManyRestarts
        expr: changes(process_start_time_seconds[15m]) > 2
";

const BAD: &str = "\
groups:
  - name: broken
    rules:
      - alert: MissingExpr
      - record: job:up:sum
        expr: sum(up
";

/// Assert that each needle appears on consecutive lines, in order.
fn assert_lines_in_order(output: &str, needles: &[String]) {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines
        .iter()
        .position(|l| l.contains(needles[0].as_str()))
        .unwrap_or_else(|| panic!("no line contains {:?} in:\n{output}", needles[0]));
    for (offset, needle) in needles.iter().enumerate() {
        let line = lines.get(start + offset).copied().unwrap_or_default();
        assert!(
            line.contains(needle.as_str()),
            "line {} should contain {needle:?}, got {line:?}\nfull output:\n{output}",
            start + offset
        );
    }
}

/// Write a rule file under `dir` and return its path.
fn write_rules(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

// ── Global flags ────────────────────────────────────────────────────

#[test]
fn help_flag() {
    rulecheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rules-check"));
}

#[test]
fn version_flag() {
    rulecheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn about_flag() {
    rulecheck()
        .arg("--about")
        .assert()
        .success()
        .stdout(predicate::str::contains("rulecheck:"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_args_shows_usage() {
    rulecheck()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

// ── rules-check ─────────────────────────────────────────────────────

#[test]
fn rules_flag_is_required() {
    rulecheck()
        .arg("rules-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--rules"));
}

#[test]
fn valid_file_succeeds_with_rule_count() {
    let dir = tempdir().unwrap();
    let good = write_rules(dir.path(), "good.yml", GOOD);
    rulecheck()
        .args(["rules-check", "--rules", good.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("checking"))
        .stderr(predicate::str::contains("SUCCESS"))
        .stderr(predicate::str::contains("rules found=3"));
}

#[test]
fn glob_matches_several_files() {
    let dir = tempdir().unwrap();
    write_rules(dir.path(), "a.yml", GOOD);
    write_rules(dir.path(), "b.yml", "groups: []\n");
    let pattern = dir.path().join("*.yml");
    rulecheck()
        .args(["rules-check", "--rules", pattern.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("a.yml"))
        .stderr(predicate::str::contains("b.yml"))
        .stderr(predicate::str::contains("rules found=0"));
}

#[test]
fn missing_pattern_fails() {
    let dir = tempdir().unwrap();
    let good = write_rules(dir.path(), "good.yml", GOOD);
    let missing = dir.path().join("missing-*.yml");
    rulecheck()
        .args([
            "rules-check",
            "--rules",
            good.to_str().unwrap(),
            "--rules",
            missing.to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("rules found=3"))
        .stderr(predicate::str::contains("no matching file found"))
        .stderr(predicate::str::contains("rules check failed"));
}

#[test]
fn good_and_missing_log_lines_are_ordered() {
    let dir = tempdir().unwrap();
    let good = write_rules(dir.path(), "good.yml", GOOD);
    let missing = dir.path().join("missing-*.yml");
    let good = good.to_str().unwrap();
    let missing = missing.to_str().unwrap();
    let assert = rulecheck()
        .args(["rules-check", "--rules", good, "--rules", missing])
        .assert()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert_lines_in_order(
        &stderr,
        &[
            format!("INFO checking pattern={good}"),
            format!("INFO checking filename={good}"),
            "INFO result=SUCCESS rules found=3".to_string(),
            format!("INFO checking pattern={missing}"),
            format!("ERROR result=FAILED error=no matching file found for pattern {missing:?}"),
        ],
    );
}

#[test]
fn invalid_file_reports_every_error_and_keeps_going() {
    let dir = tempdir().unwrap();
    let bad = write_rules(dir.path(), "bad.yml", BAD);
    let good = write_rules(dir.path(), "good.yml", GOOD);
    rulecheck()
        .args([
            "rules-check",
            "--rules",
            bad.to_str().unwrap(),
            "--rules",
            good.to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("FAILED"))
        .stderr(predicate::str::contains("field 'expr' must be set in rule"))
        .stderr(predicate::str::contains("unclosed left parenthesis"))
        .stderr(predicate::str::contains("2 errors"))
        .stderr(predicate::str::contains("rules found=3"));
}

#[test]
fn unparsable_file_fails() {
    let dir = tempdir().unwrap();
    let path = write_rules(dir.path(), "junk.yml", "groups:\n  - name: [oops\n");
    rulecheck()
        .args(["rules-check", "--rules", path.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse rule file"));
}

#[test]
fn json_log_format() {
    let dir = tempdir().unwrap();
    let good = write_rules(dir.path(), "good.yml", GOOD);
    rulecheck()
        .args([
            "--log.format",
            "json",
            "rules-check",
            "--rules",
            good.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("\"rules found\":3"));
}

#[test]
fn error_log_level_hides_progress() {
    let dir = tempdir().unwrap();
    let good = write_rules(dir.path(), "good.yml", GOOD);
    rulecheck()
        .args([
            "--log.level",
            "error",
            "rules-check",
            "--rules",
            good.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("SUCCESS").not());
}
