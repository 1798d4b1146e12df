//! Braille Conformance Harness
//!
//! This module provides the core infrastructure for fixture-driven testing:
//!
//! - [`TranslationMode`]: Mode registry mapping fixture names to engine flags
//! - [`FixtureSet`]: Parsed fixture files
//! - [`BrailleTest`]: Test cases built from fixture records
//! - [`TranscriptionEngine`]: The engine contract and [`CommandEngine`] bridge
//! - [`run_check`]: Check procedures with expected-failure handling
//! - [`Reporter`]: Failure rendering and the run summary
//! - [`FixtureLoader`]: Fixture discovery and lazy case expansion
//! - [`TestRunner`]: Sequential execution of loaded cases

mod case;
mod checks;
mod config;
mod engine;
mod fixtures;
mod loader;
mod modes;
mod reporter;
mod runner;

pub use case::{BrailleTest, CaseError, CheckKind, Comment, ExpectedFailure, TestMode};
pub use checks::{FailureKind, FailureReport, Outcome, hyphenated_word, run_check};
pub use config::{DEFAULT_PATTERNS, DEFAULT_TABLE_PATH, HarnessConfig};
pub use engine::{CommandEngine, EngineError, TABLE_PATH_VAR, TranscriptionEngine, Translation};
pub use fixtures::{
    FixtureError, FixtureFormat, FixtureResult, FixtureSet, Section, YamlFixtureError,
};
pub use loader::{Cases, FixtureLoader, HarnessError, RunnableCase};
pub use modes::TranslationMode;
pub use reporter::{ReportStyle, Reporter, cursor_ruler};
pub use runner::{TestRunner, TestSummary};
