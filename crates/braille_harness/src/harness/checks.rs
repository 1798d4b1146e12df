//! Check procedures - run one case against the engine
//!
//! Each procedure calls the engine and compares the result against the
//! case's expectation. The raw comparison is then folded through the
//! expected-failure policy:
//!
//! | comparison | xfail | outcome                         |
//! |------------|-------|---------------------------------|
//! | mismatch   | no    | `Failed` (procedure's tag)      |
//! | mismatch   | yes   | `Skipped`                       |
//! | match      | yes   | `Failed` (`Failure Expected`)   |
//! | match      | no    | `Passed`                        |

use std::fmt;

use super::case::{BrailleTest, CheckKind, Comment};
use super::engine::{EngineError, TranscriptionEngine};

/// Tag naming what kind of difference a failure report describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Translation output differs
    BrailleDifference,
    /// Braille cursor position differs
    BrailleCursorDifference,
    /// Back-translation output differs
    Backtranslate,
    /// Hyphenated word differs
    Hyphenation,
    /// The case was expected to fail but passed
    FailureExpected,
}

impl FailureKind {
    /// Get the report tag
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::BrailleDifference => "Braille Difference",
            FailureKind::BrailleCursorDifference => "Braille Cursor Difference",
            FailureKind::Backtranslate => "Backtranslate",
            FailureKind::Hyphenation => "Hyphenation",
            FailureKind::FailureExpected => "Failure Expected",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the reporter needs to describe one failed case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// What differed
    pub kind: FailureKind,
    /// Originating fixture file
    pub harness_name: String,
    /// Case comment
    pub comment: Option<Comment>,
    /// Reason given for an expected failure, if any
    pub xfail_reason: Option<String>,
    /// Case input
    pub input: String,
    /// Expected result
    pub expected: String,
    /// Result the engine produced
    pub received: String,
    /// `(found, expected)` braille cursor positions for cursor differences
    pub cursor: Option<(usize, usize)>,
}

impl FailureReport {
    fn new(case: &BrailleTest, kind: FailureKind, received: String) -> Self {
        Self {
            kind,
            harness_name: case.harness_name().to_string(),
            comment: case.comment().cloned(),
            xfail_reason: case.xfail().reason().map(String::from),
            input: case.input().to_string(),
            expected: case.expected().to_string(),
            received,
            cursor: None,
        }
    }
}

/// Final result of running one case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The engine matched the expectation
    Passed,
    /// A genuine failure, or an expected failure that did not happen
    Failed(FailureReport),
    /// An expected failure that did happen
    Skipped(String),
}

impl Outcome {
    /// Returns true if the case passed
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    /// Returns true if the case was skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }
}

/// Raw comparison before the expected-failure policy is applied
enum Comparison {
    Match(String),
    Mismatch(FailureReport),
}

/// Run the check procedure selected by the case.
///
/// Engine errors are returned as `Err` and never folded into an outcome.
pub fn run_check<E>(engine: &E, case: &BrailleTest) -> Result<Outcome, EngineError>
where
    E: TranscriptionEngine + ?Sized,
{
    let comparison = match case.check_kind() {
        CheckKind::Translate => check_translate(engine, case)?,
        CheckKind::TranslateAndCursor => check_translate_and_cursor(engine, case)?,
        CheckKind::BackTranslate => check_backtranslate(engine, case)?,
        CheckKind::Hyphenate => check_hyphenate(engine, case)?,
    };

    Ok(match comparison {
        Comparison::Mismatch(_) if case.xfail().is_expected() => Outcome::Skipped(
            case.xfail()
                .reason()
                .unwrap_or("expected failure")
                .to_string(),
        ),
        Comparison::Mismatch(report) => Outcome::Failed(report),
        Comparison::Match(received) if case.xfail().is_expected() => Outcome::Failed(
            FailureReport::new(case, FailureKind::FailureExpected, received),
        ),
        Comparison::Match(_) => Outcome::Passed,
    })
}

fn compare(case: &BrailleTest, kind: FailureKind, received: String) -> Comparison {
    if received == case.expected() {
        Comparison::Match(received)
    } else {
        Comparison::Mismatch(FailureReport::new(case, kind, received))
    }
}

fn check_translate<E>(engine: &E, case: &BrailleTest) -> Result<Comparison, EngineError>
where
    E: TranscriptionEngine + ?Sized,
{
    let translation = engine.translate(
        case.tables(),
        case.input(),
        case.mode(),
        case.cursor_pos(),
        case.typeform(),
    )?;
    Ok(compare(
        case,
        FailureKind::BrailleDifference,
        translation.braille,
    ))
}

fn check_translate_and_cursor<E>(engine: &E, case: &BrailleTest) -> Result<Comparison, EngineError>
where
    E: TranscriptionEngine + ?Sized,
{
    let translation = engine.translate(
        case.tables(),
        case.input(),
        case.mode(),
        case.cursor_pos(),
        None,
    )?;

    let braille = compare(case, FailureKind::BrailleDifference, translation.braille);
    let Comparison::Match(braille) = braille else {
        return Ok(braille);
    };

    match case.expected_brl_cursor_pos() {
        Some(expected) if expected != translation.cursor_pos => {
            let mut report =
                FailureReport::new(case, FailureKind::BrailleCursorDifference, braille);
            report.cursor = Some((translation.cursor_pos, expected));
            Ok(Comparison::Mismatch(report))
        }
        _ => Ok(Comparison::Match(braille)),
    }
}

fn check_backtranslate<E>(engine: &E, case: &BrailleTest) -> Result<Comparison, EngineError>
where
    E: TranscriptionEngine + ?Sized,
{
    let text = engine.back_translate(case.tables(), case.input(), case.mode())?;
    Ok(compare(case, FailureKind::Backtranslate, text))
}

fn check_hyphenate<E>(engine: &E, case: &BrailleTest) -> Result<Comparison, EngineError>
where
    E: TranscriptionEngine + ?Sized,
{
    // The engine reads one position past the end of the word unless padded.
    let padded = format!("{} ", case.input());
    let mask = engine.hyphenate(case.tables(), &padded, case.mode())?;
    Ok(compare(
        case,
        FailureKind::Hyphenation,
        hyphenated_word(case.input(), &mask),
    ))
}

/// Insert a hyphen before every character whose mask position is `'1'`.
///
/// Mask positions beyond the end of `word` are ignored.
pub fn hyphenated_word(word: &str, mask: &str) -> String {
    let mut hyphenated = String::with_capacity(word.len() * 2);
    for (c, marker) in word.chars().zip(mask.chars()) {
        if marker == '1' {
            hyphenated.push('-');
        }
        hyphenated.push(c);
    }
    hyphenated
}
