#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]
//! Conformance Testing Harness for Braille Transcription
//!
//! This crate loads declarative braille test fixtures, runs every case against
//! a transcription engine and reports the differences.
//!
//! ## Architecture
//!
//! The harness provides:
//! - **TranslationMode**: The fixed registry of engine mode flags
//! - **FixtureSet**: In-memory model of one fixture file (JSON or YAML)
//! - **BrailleTest**: One normalized, validated test case
//! - **TranscriptionEngine**: The engine contract, plus a subprocess bridge
//! - **run_check**: The four check procedures and the expected-failure policy
//! - **Reporter**: Verbose or compact failure report with a summary line
//! - **FixtureLoader**: Fixture discovery and lazy case expansion
//! - **TestRunner**: Sequential scheduler tying it all together
//!
//! ## Usage
//!
//! ```rust,ignore
//! use braille_harness::prelude::*;
//!
//! let config = HarnessConfig::new("tests/harness").with_style(ReportStyle::Compact);
//! let engine = CommandEngine::new("louis-bridge").with_table_path("../tables");
//! let mut reporter = Reporter::new(config.style);
//! let summary = TestRunner::new(FixtureLoader::new(config)).run(&engine, &mut reporter);
//! print!("{}", reporter.render());
//! ```

#![forbid(unsafe_code)]

pub mod harness;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::harness::{
        BrailleTest, CaseError, CheckKind, CommandEngine, Comment, EngineError, ExpectedFailure,
        FailureKind, FailureReport, FixtureError, FixtureFormat, FixtureLoader, FixtureResult,
        FixtureSet, HarnessConfig, HarnessError, Outcome, ReportStyle, Reporter, RunnableCase,
        Section, TestMode, TestRunner, TestSummary, TranscriptionEngine, Translation,
        TranslationMode, run_check,
    };
}
