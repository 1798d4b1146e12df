//! End-to-end runs of the harness library against an in-process engine.

use braille_harness::harness::{cursor_ruler, hyphenated_word};
use braille_harness::prelude::*;
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A tiny fake engine with a fixed vocabulary
struct FakeEngine;

impl FakeEngine {
    fn braille(word: &str) -> Option<&'static str> {
        match word {
            "hello" => Some("⠓⠑⠇⠇⠕"),
            "you" => Some("⠽"),
            _ => None,
        }
    }
}

impl TranscriptionEngine for FakeEngine {
    fn translate(
        &self,
        _tables: &[String],
        input: &str,
        _mode: TranslationMode,
        cursor_pos: Option<usize>,
        _typeform: Option<&[u16]>,
    ) -> Result<Translation, EngineError> {
        let braille = Self::braille(input).ok_or_else(|| EngineError::Rejected {
            operation: "translate",
            message: format!("unknown word {input:?}"),
        })?;
        Ok(Translation::new(braille).with_cursor(cursor_pos.map_or(0, |pos| pos.min(1))))
    }

    fn back_translate(
        &self,
        _tables: &[String],
        input: &str,
        _mode: TranslationMode,
    ) -> Result<String, EngineError> {
        match input {
            "⠓⠑⠇⠇⠕" => Ok("hello".to_string()),
            _ => Ok(String::new()),
        }
    }

    fn hyphenate(
        &self,
        _tables: &[String],
        word: &str,
        _mode: TranslationMode,
    ) -> Result<String, EngineError> {
        // break before every third character
        Ok(word
            .chars()
            .enumerate()
            .map(|(i, _)| if i > 0 && i % 3 == 0 { '1' } else { '0' })
            .collect())
    }
}

fn harness_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

fn run(dir: &TempDir, style: ReportStyle) -> (TestSummary, Reporter) {
    let config = HarnessConfig::new(dir.path()).with_style(style);
    let mut reporter = Reporter::new(config.style);
    let summary = TestRunner::new(FixtureLoader::new(config)).run(&FakeEngine, &mut reporter);
    (summary, reporter)
}

#[test]
fn test_hello_passes() {
    let dir = harness_dir(&[(
        "en_harness.txt",
        r#"{"tables": "en-ueb-g1.ctb", "tests": [{"data": [{"input": "hello", "output": "⠓⠑⠇⠇⠕"}]}]}"#,
    )]);

    let (summary, reporter) = run(&dir, ReportStyle::Verbose);
    assert!(summary.is_success());
    assert_eq!(summary.passed, 1);
    assert_eq!(
        reporter.render(),
        "Ran 1 tests (100.0% success), with 0 failures and 0 errors.\n"
    );
}

#[test]
fn test_braille_difference_report() {
    let dir = harness_dir(&[(
        "en_harness.txt",
        r#"{"tables": "en-ueb-g1.ctb", "tests": [{"data": [{"input": "hello", "output": "⠞⠑⠏⠞"}]}]}"#,
    )]);
    let harness = dir.path().join("en_harness.txt").display().to_string();

    let (summary, reporter) = run(&dir, ReportStyle::Verbose);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        reporter.render(),
        format!(
            "--- Braille Difference Failure: {harness} ---\n\
             input:                    'hello'\n\
             expected:                 '⠞⠑⠏⠞'\n\
             received:                 '⠓⠑⠇⠇⠕'\n\
             --- end ---\n\
             \n\
             Ran 1 tests (0.0% success), with 1 failures and 0 errors.\n"
        )
    );
}

#[test]
fn test_compact_report() {
    let dir = harness_dir(&[(
        "en_harness.txt",
        r#"{"tables": "en-ueb-g1.ctb", "tests": [{"data": [
            {"input": "hello", "output": "⠞⠑⠏⠞", "comment": ["greeting"]},
            {"input": "hello", "output": "⠓⠑⠇⠇⠕"}
        ]}]}"#,
    )]);
    let harness = dir.path().join("en_harness.txt").display().to_string();

    let (_, reporter) = run(&dir, ReportStyle::Compact);
    let rendered = reporter.render();
    let first = rendered.lines().next().unwrap();
    let record: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(record["file"], harness.as_str());
    assert_eq!(record["errorType"], "Braille Difference");
    assert_eq!(record["comment"], serde_json::json!(["greeting"]));
    assert!(rendered.ends_with("Ran 2 tests (50.0% success), with 1 failures and 0 errors.\n"));
}

#[test]
fn test_cursor_difference_report() {
    let dir = harness_dir(&[(
        "en_harness.txt",
        r#"{"tables": "en-ueb-g2.ctb", "tests": [{"data": [
            {"input": "hello", "output": "⠓⠑⠇⠇⠕", "cursorPos": 3, "brlCursorPos": 3}
        ]}]}"#,
    )]);

    let (summary, reporter) = run(&dir, ReportStyle::Verbose);
    assert_eq!(summary.failed, 1);
    let entry = reporter.entries().next().unwrap();
    assert!(entry.starts_with("--- Braille Cursor Difference Failure:"));
    assert!(entry.contains("BRLCursorAt 1 expected 3: ' ^ * '"));
}

#[test]
fn test_mixed_modes_and_errors() {
    let dir = harness_dir(&[
        (
            "a_harness.txt",
            r#"{"tables": ["unicode.dis", "en.ctb"], "tests": [
                {"flags": {"testmode": "backtranslate"}, "data": [{"input": "⠓⠑⠇⠇⠕", "output": "hello"}]},
                {"flags": {"testmode": "hyphenate"}, "data": [
                    {"input": "braille", "output": "bra-ill-e"},
                    {"input": "braille", "output": "bra-ill-e", "xfail": "hyphenation is off"}
                ]}
            ]}"#,
        ),
        ("b_harness.txt", "this is not json"),
        (
            "c_harness.yaml",
            "tables: [en.ctb]\ntests:\n  - [zebra, \"⠵\"]\n  - [you, \"⠽\", {xfail: true}]\n",
        ),
    ]);

    let (summary, reporter) = run(&dir, ReportStyle::Verbose);
    // backtranslate + first hyphenate pass, second hyphenate is an unexpected pass,
    // b is a load error, zebra is an engine error, you is an unexpected pass
    assert_eq!(summary.total, 6);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.errors, 2);
    assert_eq!(summary.skipped, 0);

    let entries: Vec<_> = reporter.entries().collect();
    assert!(entries[0].starts_with("--- Failure Expected Failure:"));
    assert!(entries[0].contains("expected failure:         'hyphenation is off'"));
    assert!(entries[1].contains("doesn't look like a harness file"));
    assert!(entries[2].contains("translate failed: unknown word \"zebra\""));
    assert!(entries[3].starts_with("--- Failure Expected Failure:"));
    assert!(!entries[3].contains("expected failure:"));
}

#[test]
fn test_expected_failure_that_fails_is_skipped() {
    let dir = harness_dir(&[(
        "en_harness.txt",
        r#"{"tables": "en.ctb", "tests": [{"data": [
            {"input": "hello", "output": "⠞⠑⠏⠞", "xfail": "known contraction bug"}
        ]}]}"#,
    )]);

    let (summary, reporter) = run(&dir, ReportStyle::Verbose);
    assert_eq!(summary.skipped, 1);
    assert!(summary.is_success());
    assert_eq!(reporter.entries().count(), 0);
}

#[test]
fn test_yaml_mode_lists_and_xfail_words() {
    let dir = harness_dir(&[(
        "de_harness.yaml",
        "tables: [de-g1.ctb]\n\
         flags: {mode: [noContractions, dotsIO]}\n\
         tests:\n\
         \x20 - [hello, \"⠓⠑⠇⠇⠕\"]\n\
         \x20 - [hello, \"⠞⠑⠏⠞\", {xfail: Yes}]\n\
         \x20 - [hello, \"⠞⠑⠏⠞\", {xfail: off}]\n",
    )]);

    let (summary, reporter) = run(&dir, ReportStyle::Verbose);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 1);
    let entry = reporter.entries().next().unwrap();
    assert!(entry.starts_with("--- Braille Difference Failure:"));
    assert!(!entry.contains("expected failure:"));
}

proptest! {
    #[test]
    fn prop_ruler_has_requested_width(len in 0usize..40, found in 0usize..50, expected in 0usize..50) {
        let ruler = cursor_ruler(len, found, Some(expected));
        prop_assert_eq!(ruler.chars().count(), len);
        prop_assert_eq!(ruler.contains('*'), expected < len);
        prop_assert_eq!(ruler.contains('^'), found < len && found != expected);
    }

    #[test]
    fn prop_hyphenated_word_keeps_letters(word in "[a-zäöü]{1,12}", seed in any::<u64>()) {
        let mask: String = word
            .chars()
            .enumerate()
            .map(|(i, _)| if (seed >> (i % 64)) & 1 == 1 { '1' } else { '0' })
            .collect();
        let hyphenated = hyphenated_word(&word, &mask);
        prop_assert_eq!(hyphenated.replace('-', ""), word.clone());
        let breaks = mask.chars().filter(|&m| m == '1').count();
        prop_assert_eq!(hyphenated.matches('-').count(), breaks);
    }
}
