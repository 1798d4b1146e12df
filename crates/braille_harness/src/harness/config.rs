//! Run configuration
//!
//! Built once by the binary (or a test) and handed to the loader; nothing in
//! the library reads the process environment.

use std::path::{Path, PathBuf};

use super::reporter::ReportStyle;

/// Table search path used when no harness directory was configured
pub const DEFAULT_TABLE_PATH: &str = "../tables,../../tables";

/// File patterns used when no harness files are named explicitly
pub const DEFAULT_PATTERNS: [&str; 2] = ["*_harness.txt", "*_harness.yaml"];

/// Settings for one harness run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Directory fixture patterns are resolved against
    pub harness_dir: PathBuf,
    /// Table search path handed to the engine, if any
    pub table_path: Option<String>,
    /// Explicit fixture patterns; empty means the default discovery
    pub patterns: Vec<String>,
    /// Report rendering style
    pub style: ReportStyle,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl HarnessConfig {
    /// Configuration for fixtures under `harness_dir`
    pub fn new(harness_dir: impl AsRef<Path>) -> Self {
        Self {
            harness_dir: harness_dir.as_ref().to_path_buf(),
            table_path: None,
            patterns: Vec::new(),
            style: ReportStyle::default(),
        }
    }

    /// Resolve the directory and table path the way the command line does.
    ///
    /// Without a harness directory the current directory is used, and the
    /// table path falls back to [`DEFAULT_TABLE_PATH`] unless one was given.
    pub fn from_env_values(harness_dir: Option<PathBuf>, table_path: Option<String>) -> Self {
        match harness_dir {
            Some(dir) => Self::new(dir).with_optional_table_path(table_path),
            None => Self::new(".").with_table_path(
                table_path.unwrap_or_else(|| DEFAULT_TABLE_PATH.to_string()),
            ),
        }
    }

    /// Run only the fixtures matching these patterns
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the report style
    pub fn with_style(mut self, style: ReportStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the table search path
    pub fn with_table_path(mut self, table_path: impl Into<String>) -> Self {
        self.table_path = Some(table_path.into());
        self
    }

    fn with_optional_table_path(mut self, table_path: Option<String>) -> Self {
        self.table_path = table_path;
        self
    }

    /// Patterns to expand, falling back to [`DEFAULT_PATTERNS`]
    pub fn effective_patterns(&self) -> Vec<String> {
        if self.patterns.is_empty() {
            DEFAULT_PATTERNS.iter().map(|p| (*p).to_string()).collect()
        } else {
            self.patterns.clone()
        }
    }
}
