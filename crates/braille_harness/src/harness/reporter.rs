//! Reporter - accumulates failures and renders the final report
//!
//! Failures are rendered as soon as they are recorded but only written out
//! once, at the end of the run, so multi-line blocks stay contiguous.
//!
//! Two styles are supported:
//! - [`ReportStyle::Verbose`]: one `--- ... ---` block per failure
//! - [`ReportStyle::Compact`]: one JSON object per failure, one per line
//!
//! Both end with a summary line:
//!
//! ```text
//! Ran 12 tests (91.67% success), with 1 failures and 0 errors.
//! ```

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::error::Error as StdError;
use std::io::{self, Write};
use termcolor::{Color, ColorSpec, WriteColor};

use super::checks::{FailureKind, FailureReport, Outcome};

/// Rendering style, chosen once for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportStyle {
    /// Multi-line human-readable blocks
    #[default]
    Verbose,
    /// Single-line JSON records, suitable for grepping
    Compact,
}

/// What a rendered entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Failure(FailureKind),
    Error,
}

#[derive(Debug, Clone)]
struct Entry {
    kind: EntryKind,
    text: String,
}

/// Run-wide accumulator of results
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    style: ReportStyle,
    entries: Vec<Entry>,
    run: usize,
    failures: usize,
    errors: usize,
    skipped: usize,
}

impl Reporter {
    /// Create a reporter rendering in the given style
    pub fn new(style: ReportStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    /// Number of results recorded
    pub fn run(&self) -> usize {
        self.run
    }

    /// Number of failures recorded
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Number of errors recorded
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Number of skipped (expected) failures recorded
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns true if any failure or error was recorded
    pub fn has_failures(&self) -> bool {
        self.failures > 0 || self.errors > 0
    }

    /// Rendered failure and error entries, in recording order
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.text.as_str())
    }

    /// Record the outcome of one case
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Passed => self.record_pass(),
            Outcome::Skipped(_) => self.record_skip(),
            Outcome::Failed(report) => self.record_failure(report),
        }
    }

    /// Record a passing case
    pub fn record_pass(&mut self) {
        self.run += 1;
    }

    /// Record a case skipped as an expected failure
    pub fn record_skip(&mut self) {
        self.run += 1;
        self.skipped += 1;
    }

    /// Record and render a failed case
    pub fn record_failure(&mut self, report: &FailureReport) {
        let text = match self.style {
            ReportStyle::Verbose => render_verbose(report),
            ReportStyle::Compact => render_compact(report),
        };
        self.run += 1;
        self.failures += 1;
        self.entries.push(Entry {
            kind: EntryKind::Failure(report.kind),
            text,
        });
    }

    /// Record and render an error that prevented a case from running
    ///
    /// `context` names what was being run; the error's source chain is
    /// included.
    pub fn record_error(&mut self, context: &str, error: &dyn StdError) {
        let mut message = format!("{context}\n{error}");
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(&format!("\ncaused by: {cause}"));
            source = cause.source();
        }

        self.run += 1;
        self.errors += 1;
        self.entries.push(Entry {
            kind: EntryKind::Error,
            text: format!("--- Error: ---\n{message}\n--- end ---\n"),
        });
    }

    /// The final summary line, with trailing newline
    pub fn summary(&self) -> String {
        let percent = if self.run > 0 {
            let passed = self.run.saturating_sub(self.failures + self.errors);
            let ratio = passed as f64 / self.run as f64 * 100.0;
            format!(" ({:?}% success)", (ratio * 100.0).round() / 100.0)
        } else {
            String::new()
        };
        format!(
            "Ran {} tests{}, with {} failures and {} errors.\n",
            self.run, percent, self.failures, self.errors
        )
    }

    /// The whole report: every entry, then the summary, joined by newlines
    pub fn render(&self) -> String {
        self.entries()
            .map(String::from)
            .chain(std::iter::once(self.summary()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the report, colouring verbose block headers when supported
    pub fn emit<W: WriteColor + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        for entry in &self.entries {
            match (self.style, entry.text.split_once('\n')) {
                (ReportStyle::Verbose, Some((header, rest))) => {
                    out.set_color(&header_color(entry.kind))?;
                    write!(out, "{header}")?;
                    out.reset()?;
                    write!(out, "\n{rest}")?;
                }
                _ => write!(out, "{}", entry.text)?,
            }
            writeln!(out)?;
        }
        write!(out, "{}", self.summary())?;
        out.flush()
    }
}

fn header_color(kind: EntryKind) -> ColorSpec {
    let mut spec = ColorSpec::new();
    let color = match kind {
        EntryKind::Failure(FailureKind::FailureExpected) => Color::Yellow,
        EntryKind::Failure(_) => Color::Red,
        EntryKind::Error => Color::Magenta,
    };
    spec.set_fg(Some(color)).set_bold(true);
    spec
}

/// Show a found (`^`) and expected (`*`) cursor within `length` columns.
///
/// Positions outside the ruler are not marked; the expected marker wins
/// when both fall on the same column. Column 0 is a real position, so an
/// expected cursor of 0 draws `*` in the first column like any other.
pub fn cursor_ruler(length: usize, found: usize, expected: Option<usize>) -> String {
    let mut display = vec![' '; length];
    if let Some(slot) = display.get_mut(found) {
        *slot = '^';
    }
    if let Some(slot) = expected.and_then(|pos| display.get_mut(pos)) {
        *slot = '*';
    }
    display.into_iter().collect()
}

fn field_line(label: &str, value: &str) -> String {
    format!("{label:<25} '{value}'")
}

fn render_verbose(report: &FailureReport) -> String {
    let mut lines = vec![format!(
        "--- {} Failure: {} ---",
        report.kind, report.harness_name
    )];

    if let Some(ref comment) = report.comment {
        lines.push(field_line("comment:", &comment.joined()));
    }
    if report.kind == FailureKind::FailureExpected {
        if let Some(ref reason) = report.xfail_reason {
            lines.push(field_line("expected failure:", reason));
        }
    }
    lines.push(field_line("input:", &report.input));
    if report.expected != report.received {
        lines.push(field_line("expected:", &report.expected));
    }
    lines.push(field_line("received:", &report.received));
    if let Some((found, expected)) = report.cursor {
        let ruler = cursor_ruler(report.expected.chars().count(), found, Some(expected));
        lines.push(field_line(
            &format!("BRLCursorAt {found} expected {expected}:"),
            &ruler,
        ));
    }
    lines.push("--- end ---\n".to_string());
    lines.join("\n")
}

/// Compact record with a fixed key order
struct CompactRecord<'a>(&'a FailureReport);

impl Serialize for CompactRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let report = self.0;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("file", &report.harness_name)?;
        map.serialize_entry("errorType", report.kind.as_str())?;
        if let Some(ref comment) = report.comment {
            map.serialize_entry("comment", comment)?;
        }
        if report.kind == FailureKind::FailureExpected {
            if let Some(ref reason) = report.xfail_reason {
                map.serialize_entry("expected failure", reason)?;
            }
        }
        map.serialize_entry("input", &report.input)?;
        if report.expected != report.received {
            map.serialize_entry("expected", &report.expected)?;
        }
        map.serialize_entry("received", &report.received)?;
        if let Some((found, expected)) = report.cursor {
            map.serialize_entry(
                &format!("expected cursor at: {expected}"),
                &format!("found at: {found}"),
            )?;
        }
        map.end()
    }
}

/// JSON formatting with `", "` and `": "` separators
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

fn render_compact(report: &FailureReport) -> String {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    match CompactRecord(report).serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(e) => format!("{{\"file\": {:?}, \"errorType\": \"{e}\"}}", report.harness_name),
    }
}
