//! TestRunner - executing harness cases
//!
//! Pulls cases from a [`FixtureLoader`] one at a time, runs each against the
//! engine and routes the outcome to a [`Reporter`]. Loading errors and
//! engine errors become `Error` entries; nothing stops the run early.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::checks::Outcome;
use super::engine::TranscriptionEngine;
use super::loader::FixtureLoader;
use super::reporter::Reporter;

/// Summary of test execution results
#[derive(Debug, Clone, Default)]
pub struct TestSummary {
    /// Total number of results recorded
    pub total: usize,
    /// Number of passed cases
    pub passed: usize,
    /// Number of failed cases
    pub failed: usize,
    /// Number of expected failures that failed
    pub skipped: usize,
    /// Number of cases that could not be loaded or run
    pub errors: usize,
    /// Total execution time
    pub duration: Duration,
}

impl TestSummary {
    /// Returns true if nothing failed and nothing errored
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

/// Runner for harness cases
#[derive(Debug, Clone)]
pub struct TestRunner {
    loader: FixtureLoader,
}

impl TestRunner {
    /// Create a runner over the loader's cases
    pub fn new(loader: FixtureLoader) -> Self {
        Self { loader }
    }

    /// Run every case in order and return a summary
    pub fn run<E>(&self, engine: &E, reporter: &mut Reporter) -> TestSummary
    where
        E: TranscriptionEngine + ?Sized,
    {
        let start = Instant::now();
        let mut summary = TestSummary::default();

        for item in self.loader.cases() {
            let case = match item {
                Ok(case) => case,
                Err(e) => {
                    reporter.record_error("failed to load harness case", &e);
                    summary.errors += 1;
                    summary.total += 1;
                    continue;
                }
            };

            let case_start = Instant::now();
            match case.run(engine) {
                Ok(outcome) => {
                    debug!(
                        case = %case.description,
                        elapsed = ?case_start.elapsed(),
                        passed = outcome.is_pass(),
                        "ran case"
                    );
                    match outcome {
                        Outcome::Passed => summary.passed += 1,
                        Outcome::Failed(_) => summary.failed += 1,
                        Outcome::Skipped(_) => summary.skipped += 1,
                    }
                    reporter.record(&outcome);
                }
                Err(e) => {
                    warn!(case = %case.description, error = %e, "engine error");
                    reporter.record_error(&case.description, &e);
                    summary.errors += 1;
                }
            }
            summary.total += 1;
        }

        summary.duration = start.elapsed();
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            errors = summary.errors,
            duration = ?summary.duration,
            "harness run finished"
        );
        summary
    }
}
