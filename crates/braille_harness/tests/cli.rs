//! End-to-end tests for the run-harness binary.
//!
//! The engine is a small shell script run through `sh`, so these only run
//! on Unix.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a Command for the run-harness binary with a clean environment.
#[allow(deprecated)]
fn harness_cmd() -> Command {
    let mut cmd = Command::cargo_bin("run-harness").unwrap();
    cmd.env_remove("LOUIS_ENGINE")
        .env_remove("HARNESS_DIR")
        .env_remove("LOUIS_TABLEPATH")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_engine_is_required() {
    harness_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--engine"));
}

#[test]
fn test_help_mentions_compact_output() {
    harness_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--compact_output"))
        .stdout(predicate::str::contains("harnessFiles"));
}

#[cfg(unix)]
mod with_bridge {
    use super::*;

    /// Bridge that answers every translation with `braille`
    fn bridge(dir: &Path, braille: &str) -> String {
        let script = dir.join("bridge.sh");
        fs::write(
            &script,
            format!(
                "cat > /dev/null\n\
                 printf '%s' '{{\"braille\": \"{braille}\", \"inputPositions\": [], \"outputPositions\": [], \"cursorPos\": 0}}'\n"
            ),
        )
        .unwrap();
        script.display().to_string()
    }

    /// Bridge that echoes its table path back as the braille
    fn table_path_bridge(dir: &Path) -> String {
        let script = dir.join("bridge.sh");
        fs::write(
            &script,
            "cat > /dev/null\n\
             printf '{\"braille\": \"%s\", \"inputPositions\": [], \"outputPositions\": [], \"cursorPos\": 0}' \"$LOUIS_TABLEPATH\"\n",
        )
        .unwrap();
        script.display().to_string()
    }

    fn fixture(dir: &Path, name: &str, output: &str) {
        fs::write(
            dir.join(name),
            format!(
                r#"{{"tables": "en-ueb-g1.ctb", "tests": [{{"data": [{{"input": "hello", "output": "{output}"}}]}}]}}"#
            ),
        )
        .unwrap();
    }

    fn run(dir: &TempDir, script: &str) -> Command {
        let mut cmd = harness_cmd();
        cmd.arg("--harness-dir")
            .arg(dir.path())
            .arg("--engine")
            .arg("sh")
            .arg("--engine-arg")
            .arg(script);
        cmd
    }

    #[test]
    fn test_passing_run() {
        let dir = TempDir::new().unwrap();
        let script = bridge(dir.path(), "⠓⠑⠇⠇⠕");
        fixture(dir.path(), "en_harness.txt", "⠓⠑⠇⠇⠕");

        run(&dir, &script)
            .assert()
            .success()
            .stdout("Ran 1 tests (100.0% success), with 0 failures and 0 errors.\n");
    }

    #[test]
    fn test_failing_run_exits_non_zero() {
        let dir = TempDir::new().unwrap();
        let script = bridge(dir.path(), "⠓⠑⠇⠇⠕");
        fixture(dir.path(), "en_harness.txt", "⠞⠑⠏⠞");

        run(&dir, &script)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("--- Braille Difference Failure:"))
            .stdout(predicate::str::contains("expected:                 '⠞⠑⠏⠞'"))
            .stdout(predicate::str::contains("received:                 '⠓⠑⠇⠇⠕'"))
            .stdout(predicate::str::ends_with(
                "Ran 1 tests (0.0% success), with 1 failures and 0 errors.\n",
            ));
    }

    #[test]
    fn test_always_succeed() {
        let dir = TempDir::new().unwrap();
        let script = bridge(dir.path(), "⠓⠑⠇⠇⠕");
        fixture(dir.path(), "en_harness.txt", "⠞⠑⠏⠞");

        run(&dir, &script)
            .arg("--always-succeed")
            .assert()
            .success()
            .stdout(predicate::str::contains("1 failures"));
    }

    #[test]
    fn test_compact_output() {
        let dir = TempDir::new().unwrap();
        let script = bridge(dir.path(), "⠓⠑⠇⠇⠕");
        fixture(dir.path(), "en_harness.txt", "⠞⠑⠏⠞");

        run(&dir, &script)
            .arg("-c")
            .assert()
            .failure()
            .stdout(predicate::str::contains(
                r#""errorType": "Braille Difference", "input": "hello", "expected": "⠞⠑⠏⠞", "received": "⠓⠑⠇⠇⠕"}"#,
            ));
    }

    #[test]
    fn test_named_harness_files_only() {
        let dir = TempDir::new().unwrap();
        let script = bridge(dir.path(), "⠓⠑⠇⠇⠕");
        fixture(dir.path(), "good_harness.txt", "⠓⠑⠇⠇⠕");
        fixture(dir.path(), "bad_harness.txt", "⠞⠑⠏⠞");

        run(&dir, &script)
            .arg("good_*")
            .assert()
            .success()
            .stdout(predicate::str::contains("Ran 1 tests"));
    }

    #[test]
    fn test_engine_failure_is_an_error_entry() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("bridge.sh");
        fs::write(&script, "cat > /dev/null\necho 'table not found' >&2\nexit 3\n").unwrap();
        fixture(dir.path(), "en_harness.txt", "⠓⠑⠇⠇⠕");

        run(&dir, &script.display().to_string())
            .assert()
            .failure()
            .stdout(predicate::str::contains("--- Error: ---"))
            .stdout(predicate::str::contains("exited with status 3; stderr=table not found"))
            .stdout(predicate::str::contains("with 0 failures and 1 errors."));
    }

    #[test]
    fn test_table_path_is_passed_to_engine() {
        let dir = TempDir::new().unwrap();
        let script = table_path_bridge(dir.path());
        fixture(dir.path(), "en_harness.txt", "/opt/tables");

        run(&dir, &script)
            .arg("--table-path")
            .arg("/opt/tables")
            .assert()
            .success();
    }

    #[test]
    fn test_default_table_path_without_harness_dir() {
        let dir = TempDir::new().unwrap();
        let script = table_path_bridge(dir.path());
        fixture(dir.path(), "en_harness.txt", "../tables,../../tables");

        harness_cmd()
            .current_dir(dir.path())
            .arg("--engine")
            .arg("sh")
            .arg("--engine-arg")
            .arg(&script)
            .assert()
            .success()
            .stdout(predicate::str::contains("(100.0% success)"));
    }

    #[test]
    fn test_default_harness_dir_names_files_with_leading_dot() {
        let dir = TempDir::new().unwrap();
        let script = bridge(dir.path(), "⠓⠑⠇⠇⠕");
        fixture(dir.path(), "en_harness.txt", "⠞⠑⠏⠞");

        harness_cmd()
            .current_dir(dir.path())
            .arg("-c")
            .arg("--engine")
            .arg("sh")
            .arg("--engine-arg")
            .arg(&script)
            .assert()
            .failure()
            .stdout(predicate::str::starts_with(r#"{"file": "./en_harness.txt", "#));
    }
}
