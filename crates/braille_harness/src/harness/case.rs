//! BrailleTest - one normalized test case
//!
//! A case is built from a fixture record merged over its section's flags,
//! validated field by field, and never modified afterwards.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use super::fixtures::{FixtureFormat, Record};
use super::modes::TranslationMode;

/// YAML scalars read as a true `xfail`; any other scalar is false.
const YAML_TRUE_SCALARS: [&str; 4] = ["Y", "true", "Yes", "ON"];

/// Display table prepended when a case asks for Unicode braille output.
pub const UNICODE_DISPLAY_TABLE: &str = "unicode.dis";

/// Field names a record may carry.
const KNOWN_FIELDS: [&str; 10] = [
    "input",
    "output",
    "typeform",
    "outputUniBrl",
    "mode",
    "cursorPos",
    "brlCursorPos",
    "testmode",
    "comment",
    "xfail",
];

/// Errors raised while building a test case from a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseError {
    /// A required field is absent
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    /// A field has the wrong JSON type
    #[error("field '{field}' must be {expected}, found {found}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    /// A field the harness does not know about
    #[error("unrecognized field '{field}'")]
    UnknownField { field: String },

    /// A mode name missing from the registry
    #[error("unknown mode '{name}'")]
    UnknownMode { name: String },

    /// More than one mode named on a single case
    #[error("a case may name at most one mode, found {names:?}")]
    MultipleModes { names: Vec<String> },

    /// A `testmode` other than translate/backtranslate/hyphenate
    #[error("unknown testmode '{value}'")]
    UnknownTestMode { value: String },

    /// A typeform that cannot be applied to the input
    #[error("invalid typeform: {reason}")]
    InvalidTypeform { reason: String },

    /// `cursorPos` on a case that is not a translation
    #[error("cursorPos requires testmode 'translate', found '{testmode}'")]
    CursorRequiresTranslate { testmode: TestMode },

    /// `cursorPos` without the braille-side position to compare against
    #[error("cursorPos is set but brlCursorPos is missing")]
    MissingBrlCursorPos,
}

/// Which engine operation a case exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum TestMode {
    /// Forward translation
    #[default]
    Translate,
    /// Back-translation
    BackTranslate,
    /// Hyphenation
    Hyphenate,
}

impl TestMode {
    /// Parse the fixture spelling
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "translate" => Some(TestMode::Translate),
            "backtranslate" => Some(TestMode::BackTranslate),
            "hyphenate" => Some(TestMode::Hyphenate),
            _ => None,
        }
    }

    /// Get the fixture spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            TestMode::Translate => "translate",
            TestMode::BackTranslate => "backtranslate",
            TestMode::Hyphenate => "hyphenate",
        }
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check procedure selected for a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    /// Compare the translation
    Translate,
    /// Compare the translation and the braille cursor position
    TranslateAndCursor,
    /// Compare the back-translation
    BackTranslate,
    /// Compare the hyphenated word
    Hyphenate,
}

impl CheckKind {
    /// Get the procedure name
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Translate => "translate",
            CheckKind::TranslateAndCursor => "translate_and_cursor",
            CheckKind::BackTranslate => "backtranslate",
            CheckKind::Hyphenate => "hyphenate",
        }
    }
}

/// Expected-failure marker of a case
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExpectedFailure {
    /// The case is expected to pass
    #[default]
    No,
    /// The case is expected to fail
    Yes,
    /// The case is expected to fail, for the given reason
    Reason(String),
}

impl ExpectedFailure {
    /// Returns true if the case is expected to fail
    pub fn is_expected(&self) -> bool {
        !matches!(self, ExpectedFailure::No)
    }

    /// The stated reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            ExpectedFailure::Reason(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Free-text annotation carried through to reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Comment {
    /// A single string
    Text(String),
    /// A list of strings
    Lines(Vec<String>),
}

impl Comment {
    /// The comment as one string, list items concatenated
    pub fn joined(&self) -> String {
        match self {
            Comment::Text(text) => text.clone(),
            Comment::Lines(lines) => lines.concat(),
        }
    }
}

/// A single braille test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrailleTest {
    harness_name: String,
    tables: Vec<String>,
    input: String,
    expected: String,
    typeform: Option<Vec<u16>>,
    mode: TranslationMode,
    cursor_pos: Option<usize>,
    expected_brl_cursor_pos: Option<usize>,
    comment: Option<Comment>,
    test_mode: TestMode,
    xfail: ExpectedFailure,
}

impl BrailleTest {
    /// Build a case from a record, its section flags and the fixture tables.
    ///
    /// The effective fields are `{"testmode": "translate"}`, overridden by
    /// `flags`, overridden by `record`. YAML fixtures may combine several
    /// names in a `mode` list and spell `xfail` as a YAML boolean word.
    pub fn from_record(
        harness_name: &str,
        tables: &[String],
        flags: &Record,
        record: &Record,
        format: FixtureFormat,
    ) -> Result<Self, CaseError> {
        let mut merged = Record::new();
        merged.insert("testmode".to_string(), Value::from("translate"));
        merged.extend(flags.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.extend(record.iter().map(|(k, v)| (k.clone(), v.clone())));

        if let Some(unknown) = merged.keys().find(|k| !KNOWN_FIELDS.contains(&k.as_str())) {
            return Err(CaseError::UnknownField {
                field: unknown.clone(),
            });
        }

        let input = required_str(&merged, "input")?;
        let expected = required_str(&merged, "output")?;

        let mut tables = tables.to_vec();
        if merged.get("outputUniBrl").is_some_and(truthy) {
            tables.insert(0, UNICODE_DISPLAY_TABLE.to_string());
        }

        let typeform = parse_typeform(merged.get("typeform"), &input)?;
        let mode = parse_mode(merged.get("mode"), format)?;
        let cursor_pos = optional_position(&merged, "cursorPos")?;
        let expected_brl_cursor_pos = optional_position(&merged, "brlCursorPos")?;
        let comment = parse_comment(merged.get("comment"))?;
        let xfail = parse_xfail(merged.get("xfail"), format)?;

        let test_mode = match merged.get("testmode") {
            Some(Value::String(value)) => {
                TestMode::parse(value).ok_or_else(|| CaseError::UnknownTestMode {
                    value: value.clone(),
                })?
            }
            Some(other) => {
                return Err(CaseError::InvalidField {
                    field: "testmode",
                    expected: "a string",
                    found: other.to_string(),
                });
            }
            None => TestMode::Translate,
        };

        if cursor_pos.is_some() {
            if test_mode != TestMode::Translate {
                return Err(CaseError::CursorRequiresTranslate {
                    testmode: test_mode,
                });
            }
            if expected_brl_cursor_pos.is_none() {
                return Err(CaseError::MissingBrlCursorPos);
            }
        }

        Ok(Self {
            harness_name: harness_name.to_string(),
            tables,
            input,
            expected,
            typeform,
            mode,
            cursor_pos,
            expected_brl_cursor_pos,
            comment,
            test_mode,
            xfail,
        })
    }

    /// Fixture file this case came from
    pub fn harness_name(&self) -> &str {
        &self.harness_name
    }

    /// Tables passed to the engine
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Source text
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Expected engine result
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Per-character emphasis, one entry per input character
    pub fn typeform(&self) -> Option<&[u16]> {
        self.typeform.as_deref()
    }

    /// Engine mode flags
    pub fn mode(&self) -> TranslationMode {
        self.mode
    }

    /// Input-side cursor position
    pub fn cursor_pos(&self) -> Option<usize> {
        self.cursor_pos
    }

    /// Expected braille-side cursor position
    pub fn expected_brl_cursor_pos(&self) -> Option<usize> {
        self.expected_brl_cursor_pos
    }

    /// Comment, if present
    pub fn comment(&self) -> Option<&Comment> {
        self.comment.as_ref()
    }

    /// Engine operation under test
    pub fn test_mode(&self) -> TestMode {
        self.test_mode
    }

    /// Expected-failure marker
    pub fn xfail(&self) -> &ExpectedFailure {
        &self.xfail
    }

    /// Select the check procedure for this case
    pub fn check_kind(&self) -> CheckKind {
        match self.test_mode {
            TestMode::Translate if self.cursor_pos.is_some() => CheckKind::TranslateAndCursor,
            TestMode::Translate => CheckKind::Translate,
            TestMode::BackTranslate => CheckKind::BackTranslate,
            TestMode::Hyphenate => CheckKind::Hyphenate,
        }
    }

    /// Short human-readable description for scheduler output
    pub fn describe(&self) -> String {
        format!(
            "{} [{}] {:?}",
            self.harness_name,
            self.check_kind().as_str(),
            self.input
        )
    }
}

impl fmt::Display for BrailleTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.harness_name)
    }
}

/// Truthiness of a fixture value: null, false, zero and empty values are false
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn required_str(record: &Record, field: &'static str) -> Result<String, CaseError> {
    match record.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(CaseError::InvalidField {
            field,
            expected: "a string",
            found: other.to_string(),
        }),
        None => Err(CaseError::MissingField { field }),
    }
}

fn optional_position(record: &Record, field: &'static str) -> Result<Option<usize>, CaseError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| CaseError::InvalidField {
                field,
                expected: "a non-negative integer",
                found: value.to_string(),
            }),
    }
}

fn parse_typeform(value: Option<&Value>, input: &str) -> Result<Option<Vec<u16>>, CaseError> {
    let digits = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.is_empty() => return Ok(None),
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(CaseError::InvalidField {
                field: "typeform",
                expected: "a string of digits",
                found: other.to_string(),
            });
        }
    };

    let typeform = digits
        .chars()
        .map(|c| {
            c.to_digit(10)
                .map(|d| d as u16)
                .ok_or_else(|| CaseError::InvalidTypeform {
                    reason: format!("'{c}' is not a digit"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let input_len = input.chars().count();
    if typeform.len() != input_len {
        return Err(CaseError::InvalidTypeform {
            reason: format!(
                "{} entries for an input of {} characters",
                typeform.len(),
                input_len
            ),
        });
    }

    Ok(Some(typeform))
}

fn parse_mode(
    value: Option<&Value>,
    format: FixtureFormat,
) -> Result<TranslationMode, CaseError> {
    let lookup = |name: &str| -> Result<TranslationMode, CaseError> {
        TranslationMode::lookup(name).ok_or_else(|| CaseError::UnknownMode {
            name: name.to_string(),
        })
    };

    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(TranslationMode::empty()),
        Some(Value::Number(n)) if n.as_u64() == Some(0) => Ok(TranslationMode::empty()),
        Some(Value::String(name)) if name.is_empty() => Ok(TranslationMode::empty()),
        Some(Value::String(name)) => lookup(name),
        Some(Value::Array(items)) => {
            let names = items
                .iter()
                .map(|item| {
                    item.as_str().ok_or_else(|| CaseError::InvalidField {
                        field: "mode",
                        expected: "a list of mode names",
                        found: item.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            match (names.as_slice(), format) {
                ([], _) => Ok(TranslationMode::empty()),
                ([name], _) => lookup(name),
                (_, FixtureFormat::Yaml) => {
                    names.iter().try_fold(TranslationMode::empty(), |mode, name| {
                        Ok::<_, CaseError>(mode | lookup(name)?)
                    })
                }
                (_, FixtureFormat::Json) => Err(CaseError::MultipleModes {
                    names: names.iter().map(|n| n.to_string()).collect(),
                }),
            }
        }
        Some(other) => Err(CaseError::InvalidField {
            field: "mode",
            expected: "0 or a mode name",
            found: other.to_string(),
        }),
    }
}

fn parse_comment(value: Option<&Value>) -> Result<Option<Comment>, CaseError> {
    let invalid = |found: &Value| CaseError::InvalidField {
        field: "comment",
        expected: "a string or a list of strings",
        found: found.to_string(),
    };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(Comment::Text(s.clone()))),
        Some(Value::Array(items)) if items.is_empty() => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(String::from).ok_or_else(|| invalid(item)))
            .collect::<Result<Vec<_>, _>>()
            .map(|lines| Some(Comment::Lines(lines))),
        Some(other) => Err(invalid(other)),
    }
}

fn parse_xfail(
    value: Option<&Value>,
    format: FixtureFormat,
) -> Result<ExpectedFailure, CaseError> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(ExpectedFailure::No),
        Some(Value::Bool(true)) => Ok(ExpectedFailure::Yes),
        Some(Value::String(word)) if format == FixtureFormat::Yaml => {
            if YAML_TRUE_SCALARS.contains(&word.as_str()) {
                Ok(ExpectedFailure::Yes)
            } else {
                Ok(ExpectedFailure::No)
            }
        }
        Some(Value::Number(_)) if format == FixtureFormat::Yaml => Ok(ExpectedFailure::No),
        Some(Value::String(reason)) if reason.is_empty() => Ok(ExpectedFailure::No),
        Some(Value::String(reason)) => Ok(ExpectedFailure::Reason(reason.clone())),
        Some(other) => Err(CaseError::InvalidField {
            field: "xfail",
            expected: "a boolean or a reason string",
            found: other.to_string(),
        }),
    }
}
