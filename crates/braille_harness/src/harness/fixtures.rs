//! Fixture model - parsed harness files
//!
//! A fixture file names one or more braille tables and groups its test
//! records into sections. Two on-disk forms are understood:
//! - JSON harness files (`*_harness.txt`), the canonical form
//! - YAML test files (`*.yaml`), where each test is an
//!   `[input, output, {options}]` sequence and all tests share one section
//!
//! The two forms spell some fields differently (`xfail: yes`, combined
//! `mode` lists), so a fixture remembers which form it was read from.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// A raw test record or a section's default flags: field name to value.
pub type Record = Map<String, Value>;

/// Errors that can occur when loading fixtures
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Fixture file not found
    #[error("Fixture not found: {path}")]
    NotFound { path: String },

    /// IO error reading fixture
    #[error("IO error reading {path}: {error}")]
    Io { path: String, error: String },

    /// JSON parsing error
    #[error("{path} doesn't look like a harness file: {error}")]
    InvalidJson { path: String, error: String },

    /// YAML parsing error
    #[error("{path} doesn't look like a YAML test file: {error}")]
    InvalidYaml { path: String, error: String },

    /// Fixture declares no tables
    #[error("{path} declares no tables")]
    NoTables { path: String },

    /// A harness file pattern could not be parsed
    #[error("Invalid harness file pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },
}

/// Errors specific to the YAML test file layout
#[derive(Debug, Error)]
pub enum YamlFixtureError {
    /// Not valid YAML, or not the expected top-level layout
    #[error(transparent)]
    Syntax(#[from] serde_yaml::Error),

    /// A test sequence shorter than `[input, output]`
    #[error("test #{number} needs an input and an output")]
    MissingOutput { number: usize },

    /// The third item of a test is not a mapping
    #[error("test #{number}: options must be a mapping, found {found}")]
    OptionsNotMapping { number: usize, found: String },

    /// A test sequence longer than `[input, output, {options}]`
    #[error("test #{number} has more than three items")]
    TooManyItems { number: usize },
}

/// On-disk form a fixture was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixtureFormat {
    /// JSON harness file
    #[default]
    Json,
    /// YAML test file
    Yaml,
}

/// Result type for fixture operations
pub type FixtureResult<T> = Result<T, FixtureError>;

/// `tables` may be a single identifier or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TableList {
    One(String),
    Many(Vec<String>),
}

impl From<TableList> for Vec<String> {
    fn from(list: TableList) -> Self {
        match list {
            TableList::One(table) => vec![table],
            TableList::Many(tables) => tables,
        }
    }
}

fn table_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    TableList::deserialize(deserializer).map(Vec::from)
}

/// One group of test records sharing default flags
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Section {
    /// Default field values applied to every record in the section
    #[serde(default)]
    pub flags: Record,
    /// Test records, in file order
    pub data: Vec<Record>,
}

/// A complete harness file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FixtureSet {
    /// Table identifiers, in the order they are passed to the engine
    #[serde(deserialize_with = "table_list")]
    pub tables: Vec<String>,
    /// Test sections, in file order
    pub tests: Vec<Section>,
    /// Form the fixture was read from
    #[serde(skip)]
    pub format: FixtureFormat,
}

/// YAML test file layout
#[derive(Debug, Deserialize)]
struct YamlFixture {
    #[serde(deserialize_with = "table_list")]
    tables: Vec<String>,
    #[serde(default)]
    flags: Record,
    tests: Vec<Vec<Value>>,
}

impl FixtureSet {
    /// Parse a JSON harness file.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse a YAML test file into a single-section fixture.
    pub fn from_yaml(yaml: &str) -> Result<Self, YamlFixtureError> {
        let raw: YamlFixture = serde_yaml::from_str(yaml)?;
        let data = raw
            .tests
            .into_iter()
            .enumerate()
            .map(|(index, test)| yaml_record(index, test))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            tables: raw.tables,
            tests: vec![Section {
                flags: raw.flags,
                data,
            }],
            format: FixtureFormat::Yaml,
        })
    }

    /// Read and parse a fixture file, choosing the format by extension.
    ///
    /// `.yaml` and `.yml` files are read as YAML, everything else as JSON.
    pub fn load(path: &Path) -> FixtureResult<Self> {
        let path_str = path.display().to_string();

        if !path.exists() {
            return Err(FixtureError::NotFound { path: path_str });
        }

        let content = fs::read_to_string(path).map_err(|e| FixtureError::Io {
            path: path_str.clone(),
            error: e.to_string(),
        })?;

        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml");

        let fixture = if is_yaml {
            Self::from_yaml(&content).map_err(|e| FixtureError::InvalidYaml {
                path: path_str.clone(),
                error: e.to_string(),
            })?
        } else {
            Self::from_json(&content).map_err(|e| FixtureError::InvalidJson {
                path: path_str.clone(),
                error: e.to_string(),
            })?
        };

        if fixture.tables.is_empty() {
            return Err(FixtureError::NoTables { path: path_str });
        }

        Ok(fixture)
    }

    /// Total number of test records across all sections
    pub fn record_count(&self) -> usize {
        self.tests.iter().map(|section| section.data.len()).sum()
    }
}

/// Convert one `[input, output, {options}]` YAML test into a record.
fn yaml_record(index: usize, test: Vec<Value>) -> Result<Record, YamlFixtureError> {
    let number = index + 1;
    let mut items = test.into_iter();
    let (Some(input), Some(output)) = (items.next(), items.next()) else {
        return Err(YamlFixtureError::MissingOutput { number });
    };

    let mut record = Record::new();
    record.insert("input".to_string(), input);
    record.insert("output".to_string(), output);

    match items.next() {
        None => {}
        Some(Value::Object(options)) => record.extend(options),
        Some(other) => {
            return Err(YamlFixtureError::OptionsNotMapping {
                number,
                found: other.to_string(),
            });
        }
    }

    if items.next().is_some() {
        return Err(YamlFixtureError::TooManyItems { number });
    }

    Ok(record)
}
