//! TranscriptionEngine - the contract the harness tests against
//!
//! The harness never implements braille translation itself. It drives an
//! engine through [`TranscriptionEngine`]; [`CommandEngine`] is the stock
//! implementation, talking JSON to an engine bridge running as a child
//! process (one process per call).
//!
//! # Bridge protocol
//!
//! The request is written to the child's stdin as a single JSON object:
//!
//! ```json
//! {"operation": "translate", "tables": ["en-ueb-g1.ctb"], "input": "hello",
//!  "mode": 0, "cursorPos": null, "typeform": null}
//! ```
//!
//! `operation` is one of `translate`, `backtranslate` or `hyphenate`. The
//! child answers on stdout with `{"braille", "inputPositions",
//! "outputPositions", "cursorPos"}`, `{"text"}` or `{"mask"}` respectively,
//! or `{"error": "..."}` when the engine rejects the call.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::trace;

use super::modes::TranslationMode;

/// Environment variable the engine reads its table search path from.
pub const TABLE_PATH_VAR: &str = "LOUIS_TABLEPATH";

/// Errors raised by an engine call
#[derive(Debug, Error)]
pub enum EngineError {
    /// The bridge process could not be started
    #[error("failed to spawn engine `{command}`: {error}")]
    Spawn { command: String, error: String },

    /// Talking to the bridge process failed
    #[error("I/O error talking to engine `{command}`: {error}")]
    Io { command: String, error: String },

    /// The bridge process exited unsuccessfully
    #[error("engine `{command}` exited with status {status}{}", fmt_stderr(.stderr))]
    Exited {
        command: String,
        status: String,
        stderr: String,
    },

    /// The bridge answered with something that is not a valid response
    #[error("invalid response from engine `{command}`: {error}")]
    InvalidResponse { command: String, error: String },

    /// The engine rejected the call
    #[error("{operation} failed: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
}

fn fmt_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("; stderr={stderr}")
    }
}

/// Result of a forward translation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// Braille output
    pub braille: String,
    /// For each output cell, the input position it came from
    #[serde(default)]
    pub input_positions: Vec<usize>,
    /// For each input character, the output position it went to
    #[serde(default)]
    pub output_positions: Vec<usize>,
    /// Braille-side cursor position
    #[serde(default)]
    pub cursor_pos: usize,
}

impl Translation {
    /// A translation with only braille output set
    pub fn new(braille: impl Into<String>) -> Self {
        Self {
            braille: braille.into(),
            ..Self::default()
        }
    }

    /// Set the braille-side cursor position
    pub fn with_cursor(mut self, cursor_pos: usize) -> Self {
        self.cursor_pos = cursor_pos;
        self
    }
}

/// Operations the harness needs from a braille transcription engine
///
/// `tables` is the ordered table list of the case. Implementations are
/// called once per case and must not keep per-case state.
pub trait TranscriptionEngine {
    /// Translate `input` to braille.
    ///
    /// At most one of `cursor_pos` and `typeform` is supplied by the harness.
    fn translate(
        &self,
        tables: &[String],
        input: &str,
        mode: TranslationMode,
        cursor_pos: Option<usize>,
        typeform: Option<&[u16]>,
    ) -> Result<Translation, EngineError>;

    /// Translate braille `input` back to text
    fn back_translate(
        &self,
        tables: &[String],
        input: &str,
        mode: TranslationMode,
    ) -> Result<String, EngineError>;

    /// Compute the hyphenation mask of `word`, one marker per character
    fn hyphenate(
        &self,
        tables: &[String],
        word: &str,
        mode: TranslationMode,
    ) -> Result<String, EngineError>;
}

/// Request sent to the bridge
#[derive(Debug, Serialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
enum Request<'a> {
    Translate {
        tables: &'a [String],
        input: &'a str,
        mode: u32,
        #[serde(rename = "cursorPos")]
        cursor_pos: Option<usize>,
        typeform: Option<&'a [u16]>,
    },
    BackTranslate {
        tables: &'a [String],
        input: &'a str,
        mode: u32,
    },
    Hyphenate {
        tables: &'a [String],
        input: &'a str,
        mode: u32,
    },
}

impl Request<'_> {
    fn operation(&self) -> &'static str {
        match self {
            Request::Translate { .. } => "translate",
            Request::BackTranslate { .. } => "backtranslate",
            Request::Hyphenate { .. } => "hyphenate",
        }
    }
}

/// Response read from the bridge
#[derive(Debug, Default, Deserialize)]
struct Response {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    mask: Option<String>,
    #[serde(flatten)]
    translation: Option<Translation>,
}

/// Engine running as a child process per call
#[derive(Debug, Clone)]
pub struct CommandEngine {
    /// Bridge executable
    program: OsString,
    /// Extra arguments passed before the request is written
    args: Vec<OsString>,
    /// Value of `LOUIS_TABLEPATH` for the child, if any
    table_path: Option<String>,
}

impl CommandEngine {
    /// Create an engine that runs `program` for every call
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            table_path: None,
        }
    }

    /// Add arguments passed to the bridge
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the table search path handed to the bridge
    pub fn with_table_path(mut self, table_path: impl Into<String>) -> Self {
        self.table_path = Some(table_path.into());
        self
    }

    /// Table search path handed to the bridge, if any
    pub fn table_path(&self) -> Option<&str> {
        self.table_path.as_deref()
    }

    fn command_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn call(&self, request: &Request<'_>) -> Result<Response, EngineError> {
        let command = self.command_name();
        let payload = serde_json::to_vec(request).map_err(|e| EngineError::Io {
            command: command.clone(),
            error: format!("failed to serialize request: {e}"),
        })?;
        trace!(engine = %command, operation = request.operation(), "calling engine");

        let mut process = Command::new(&self.program);
        process
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref table_path) = self.table_path {
            process.env(TABLE_PATH_VAR, table_path);
        }

        let mut child = process.spawn().map_err(|e| EngineError::Spawn {
            command: command.clone(),
            error: e.to_string(),
        })?;

        let written = child
            .stdin
            .as_mut()
            .map_or(Ok(()), |stdin| stdin.write_all(&payload));
        if let Err(e) = written {
            // reap the child so a failed write leaves no zombie behind
            let _ = child.kill();
            let _ = child.wait();
            return Err(EngineError::Io {
                command,
                error: format!("failed to write request: {e}"),
            });
        }

        let output = child.wait_with_output().map_err(|e| EngineError::Io {
            command: command.clone(),
            error: format!("failed waiting for exit: {e}"),
        })?;

        if !output.status.success() {
            return Err(EngineError::Exited {
                command,
                status: output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_string(), |code| code.to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let response: Response =
            serde_json::from_slice(&output.stdout).map_err(|e| EngineError::InvalidResponse {
                command: command.clone(),
                error: e.to_string(),
            })?;

        if let Some(message) = response.error {
            return Err(EngineError::Rejected {
                operation: request.operation(),
                message,
            });
        }
        Ok(response)
    }

    fn missing(&self, field: &str) -> EngineError {
        EngineError::InvalidResponse {
            command: self.command_name(),
            error: format!("response has no `{field}`"),
        }
    }
}

impl TranscriptionEngine for CommandEngine {
    fn translate(
        &self,
        tables: &[String],
        input: &str,
        mode: TranslationMode,
        cursor_pos: Option<usize>,
        typeform: Option<&[u16]>,
    ) -> Result<Translation, EngineError> {
        let response = self.call(&Request::Translate {
            tables,
            input,
            mode: mode.bits(),
            cursor_pos,
            typeform,
        })?;
        response.translation.ok_or_else(|| self.missing("braille"))
    }

    fn back_translate(
        &self,
        tables: &[String],
        input: &str,
        mode: TranslationMode,
    ) -> Result<String, EngineError> {
        let response = self.call(&Request::BackTranslate {
            tables,
            input,
            mode: mode.bits(),
        })?;
        response.text.ok_or_else(|| self.missing("text"))
    }

    fn hyphenate(
        &self,
        tables: &[String],
        word: &str,
        mode: TranslationMode,
    ) -> Result<String, EngineError> {
        let response = self.call(&Request::Hyphenate {
            tables,
            input: word,
            mode: mode.bits(),
        })?;
        response.mask.ok_or_else(|| self.missing("mask"))
    }
}
