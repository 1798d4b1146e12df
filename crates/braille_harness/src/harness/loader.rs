//! FixtureLoader - fixture discovery and case expansion
//!
//! Resolves harness file patterns, then walks file → section → record and
//! produces one [`RunnableCase`] per record. Files are read only when the
//! iterator reaches them, so a broken fixture late in the list does not
//! prevent earlier cases from running.

use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::case::{BrailleTest, CaseError};
use super::checks::{Outcome, run_check};
use super::config::HarnessConfig;
use super::engine::{EngineError, TranscriptionEngine};
use super::fixtures::{FixtureError, FixtureResult, FixtureSet};

/// Errors raised while turning fixtures into runnable cases
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A whole fixture file could not be used
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// One record could not be turned into a case
    #[error("{harness}: section {section}, test {index} is misconfigured")]
    Case {
        harness: String,
        section: usize,
        index: usize,
        source: CaseError,
    },
}

/// A case paired with its scheduler description
#[derive(Debug, Clone)]
pub struct RunnableCase {
    /// Short description used in logs and error entries
    pub description: String,
    /// The case to check
    pub case: BrailleTest,
}

impl RunnableCase {
    fn new(case: BrailleTest) -> Self {
        Self {
            description: case.describe(),
            case,
        }
    }

    /// Run the case's check procedure against `engine`
    pub fn run<E>(&self, engine: &E) -> Result<Outcome, EngineError>
    where
        E: TranscriptionEngine + ?Sized,
    {
        run_check(engine, &self.case)
    }
}

/// Loader for harness fixtures
///
/// # Example
///
/// ```rust,ignore
/// let loader = FixtureLoader::new(HarnessConfig::new("tests/braille-specs"));
/// for case in loader.cases() {
///     let case = case?;
///     println!("{}", case.description);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FixtureLoader {
    config: HarnessConfig,
}

impl FixtureLoader {
    /// Create a loader for the given configuration
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Expand every pattern against the harness directory.
    ///
    /// Matches are sorted within each pattern; pattern order is kept.
    pub fn resolve_paths(&self) -> FixtureResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for pattern in self.config.effective_patterns() {
            paths.extend(self.expand(&pattern)?);
        }
        Ok(paths)
    }

    /// Read and parse one fixture file
    pub fn load_file(&self, path: &Path) -> FixtureResult<FixtureSet> {
        FixtureSet::load(path)
    }

    /// Lazily expand every fixture into runnable cases.
    ///
    /// Each call starts over from disk.
    pub fn cases(&self) -> Cases<'_> {
        let mut sources = VecDeque::new();
        for pattern in self.config.effective_patterns() {
            match self.expand(&pattern) {
                Ok(paths) => sources.extend(paths.into_iter().map(Ok)),
                Err(e) => sources.push_back(Err(e)),
            }
        }
        Cases {
            loader: self,
            sources,
            current: None,
        }
    }

    fn expand(&self, pattern: &str) -> FixtureResult<Vec<PathBuf>> {
        let dir = glob::Pattern::escape(&self.config.harness_dir.to_string_lossy());
        let full = Path::new(&dir).join(pattern);
        let full = full.to_string_lossy();

        let entries = glob::glob(&full).map_err(|e| FixtureError::InvalidPattern {
            pattern: full.to_string(),
            error: e.to_string(),
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(harness_path(&self.config.harness_dir, path)),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable harness path");
                    None
                }
            })
            .collect();
        paths.sort();

        if paths.is_empty() && !self.config.patterns.is_empty() {
            warn!(pattern = %full, "pattern matched no harness files");
        }
        Ok(paths)
    }

    fn open(&self, path: &Path) -> Result<OpenFixture, HarnessError> {
        let harness = path.display().to_string();
        let fixture = self.load_file(path).map_err(|e| {
            warn!(harness = %harness, error = %e, "failed to load harness file");
            e
        })?;

        info!(
            harness = %harness,
            tables = ?fixture.tables,
            records = fixture.record_count(),
            "loaded harness file"
        );
        Ok(OpenFixture {
            harness,
            fixture,
            section: 0,
            index: 0,
        })
    }
}

/// Name a matched file the way it was asked for.
///
/// `glob` drops a leading `./` from its matches, so a harness directory of
/// `.` or `./specs` gets it put back.
fn harness_path(harness_dir: &Path, matched: PathBuf) -> PathBuf {
    let dotted = harness_dir.components().next() == Some(Component::CurDir);
    if dotted && !matched.starts_with(Component::CurDir) {
        Path::new(".").join(matched)
    } else {
        matched
    }
}

/// A parsed fixture and the position of the next record to build
struct OpenFixture {
    harness: String,
    fixture: FixtureSet,
    section: usize,
    index: usize,
}

impl OpenFixture {
    fn next_case(&mut self) -> Option<Result<RunnableCase, HarnessError>> {
        loop {
            let group = self.fixture.tests.get(self.section)?;
            let Some(record) = group.data.get(self.index) else {
                self.section += 1;
                self.index = 0;
                continue;
            };
            let (section, index) = (self.section, self.index);
            self.index += 1;

            let case = BrailleTest::from_record(
                &self.harness,
                &self.fixture.tables,
                &group.flags,
                record,
                self.fixture.format,
            );
            return Some(match case {
                Ok(case) => Ok(RunnableCase::new(case)),
                Err(source) => {
                    warn!(
                        harness = %self.harness,
                        section,
                        index,
                        error = %source,
                        "misconfigured test"
                    );
                    Err(HarnessError::Case {
                        harness: self.harness.clone(),
                        section,
                        index,
                        source,
                    })
                }
            });
        }
    }
}

/// Iterator returned by [`FixtureLoader::cases`]
///
/// Holds at most one parsed fixture; cases are built as they are pulled.
pub struct Cases<'a> {
    loader: &'a FixtureLoader,
    sources: VecDeque<FixtureResult<PathBuf>>,
    current: Option<OpenFixture>,
}

impl Iterator for Cases<'_> {
    type Item = Result<RunnableCase, HarnessError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(open) = self.current.as_mut() {
                if let Some(item) = open.next_case() {
                    if let Ok(ref case) = item {
                        debug!(case = %case.description, "expanded case");
                    }
                    return Some(item);
                }
                self.current = None;
            }
            match self.sources.pop_front()? {
                Ok(path) => match self.loader.open(&path) {
                    Ok(open) => self.current = Some(open),
                    Err(e) => return Some(Err(e)),
                },
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
