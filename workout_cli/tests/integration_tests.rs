//! Integration tests for the coach binary.
//!
//! These tests drive full sessions through stdin and check:
//! - Session logging and journal persistence
//! - Stats and CSV export over the journal
//! - Recovery from damaged journal lines

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI with config lookups pinned inside `dir`
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("coach"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

/// A two-set plan without rest so no timer runs during tests
fn write_short_plan(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("short.toml");
    fs::write(
        &path,
        r#"
name = "short"

[[exercises]]
name = "Goblet Squat"
target_sets = 2
target_reps = 10

[[exercises]]
name = "Push-up"
target_sets = 2
target_reps = 15
"#,
    )
    .expect("Failed to write plan");
    path
}

fn sessions_journal(dir: &Path) -> std::path::PathBuf {
    dir.join("data/journal/sessions.jsonl")
}

fn run_short_session(dir: &Path, input: &str) -> assert_cmd::assert::Assert {
    let plan = write_short_plan(dir);
    cli(dir)
        .arg("run")
        .arg("--plan-file")
        .arg(&plan)
        .write_stdin(input)
        .assert()
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rest timer"));
}

#[test]
fn test_plans_lists_builtin_plans() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("plans")
        .assert()
        .success()
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("Bench Press"))
        .stdout(predicate::str::contains("conditioning"));
}

#[test]
fn test_finished_session_written_to_journal() {
    let temp_dir = setup_test_dir();

    run_short_session(temp_dir.path(), "20 10\n20x10\nf great felt strong\n")
        .success()
        .stdout(predicate::str::contains("Set 1 logged"))
        .stdout(predicate::str::contains("Set 2 logged"))
        .stdout(predicate::str::contains("Session saved"));

    let content = fs::read_to_string(sessions_journal(temp_dir.path())).expect("Failed to read journal");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);

    let row: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(row["trainee"], "me");
    assert_eq!(row["plan_name"], "short");
    assert_eq!(row["feeling"], "great");
    assert_eq!(row["notes"], "felt strong");
    assert_eq!(row["completed"], true);
    // The untouched second exercise is not persisted
    assert_eq!(row["exercises"].as_array().unwrap().len(), 1);
    assert_eq!(row["exercises"][0]["sets"].as_array().unwrap().len(), 2);

    let progress = fs::read_to_string(temp_dir.path().join("data/journal/progress.jsonl")).unwrap();
    assert_eq!(progress.lines().count(), 1);
}

#[test]
fn test_cancel_writes_nothing() {
    let temp_dir = setup_test_dir();

    run_short_session(temp_dir.path(), "20 10\nc\n")
        .success()
        .stdout(predicate::str::contains("Session discarded"));

    assert!(!sessions_journal(temp_dir.path()).exists());
}

#[test]
fn test_closed_input_discards_session() {
    let temp_dir = setup_test_dir();

    run_short_session(temp_dir.path(), "20 10\n")
        .success()
        .stdout(predicate::str::contains("discarding session"));

    assert!(!sessions_journal(temp_dir.path()).exists());
}

#[test]
fn test_next_on_last_exercise_is_refused() {
    let temp_dir = setup_test_dir();

    run_short_session(temp_dir.path(), "n\nn\n15 15\nf\n")
        .success()
        .stdout(predicate::str::contains("[2/2] Push-up"))
        .stdout(predicate::str::contains("This is the last exercise"))
        .stdout(predicate::str::contains("Session saved"));

    let content = fs::read_to_string(sessions_journal(temp_dir.path())).unwrap();
    let row: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(row["exercises"][0]["name"], "Push-up");
}

#[test]
fn test_invalid_input_keeps_session_running() {
    let temp_dir = setup_test_dir();

    run_short_session(temp_dir.path(), "heavy\n-5 10\n20 0\n20 10\nf\n")
        .success()
        .stdout(predicate::str::contains("Unrecognised input 'heavy'"))
        .stdout(predicate::str::contains("✗"))
        .stdout(predicate::str::contains("Set 1 logged"))
        .stdout(predicate::str::contains("Session saved"));

    let content = fs::read_to_string(sessions_journal(temp_dir.path())).unwrap();
    let row: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(row["exercises"][0]["sets"].as_array().unwrap().len(), 1);
}

#[test]
fn test_status_reports_progress() {
    let temp_dir = setup_test_dir();

    run_short_session(temp_dir.path(), "20 10\ns\nc\n")
        .success()
        .stdout(predicate::str::contains("Exercise 1/2: Goblet Squat | sets 1/2 x 10"));
}

#[test]
fn test_unknown_plan_fails() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("run")
        .arg("--plan")
        .arg("arms")
        .write_stdin("")
        .assert()
        .failure();

    assert!(!sessions_journal(temp_dir.path()).exists());
}

#[test]
fn test_stats_after_session() {
    let temp_dir = setup_test_dir();
    run_short_session(temp_dir.path(), "20 10\nf\n").success();

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Streak:       1 days"))
        .stdout(predicate::str::contains("Workouts:     1 in the last 30 days"))
        .stdout(predicate::str::contains("Weekly volume: 200"));
}

#[test]
fn test_stats_with_empty_journal() {
    let temp_dir = setup_test_dir();

    // No subcommand defaults to stats
    cli(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Streak:       0 days"))
        .stdout(predicate::str::contains("Consistency:  0%"));
}

#[test]
fn test_stats_only_counts_own_trainee() {
    let temp_dir = setup_test_dir();
    run_short_session(temp_dir.path(), "20 10\nf\n").success();

    cli(temp_dir.path())
        .arg("--trainee")
        .arg("someone-else")
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workouts:     0 in the last 30 days"));
}

#[test]
fn test_export_creates_csv() {
    let temp_dir = setup_test_dir();
    run_short_session(temp_dir.path(), "20 10\n22.5 10\nf good\n").success();

    let csv_path = temp_dir.path().join("out/sessions.csv");
    cli(temp_dir.path())
        .arg("export")
        .arg("--out")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 rows from 1 sessions"));

    let csv = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("date,trainee,plan"));
    assert!(lines[1].contains("Goblet Squat"));
    assert!(lines[2].contains("22.5"));
}

#[test]
fn test_corrupted_journal_lines_ignored() {
    let temp_dir = setup_test_dir();
    run_short_session(temp_dir.path(), "20 10\nf\n").success();

    let journal = sessions_journal(temp_dir.path());
    let mut content = fs::read_to_string(&journal).unwrap();
    content.push_str("{\"trainee\": \"me\", \"truncat\n");
    content.push_str("not json at all\n");
    fs::write(&journal, content).unwrap();

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workouts:     1 in the last 30 days"));

    // Appending after damage still works
    run_short_session(temp_dir.path(), "20 10\nf\n").success();
    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workouts:     2 in the last 30 days"));
}

#[test]
fn test_config_file_sets_default_trainee() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/coach");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[trainee]\nid = \"ana\"\n").unwrap();

    run_short_session(temp_dir.path(), "20 10\nf\n").success();

    let content = fs::read_to_string(sessions_journal(temp_dir.path())).unwrap();
    let row: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(row["trainee"], "ana");
}
