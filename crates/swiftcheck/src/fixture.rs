//! Fixture Store
//!
//! Loads the JSON test-data file into an ordered, immutable list of
//! [`TestCase`]s. A missing file, malformed JSON, or a record without
//! `TC ID`/`Input`/`Expected output` aborts the load. Records whose id has no
//! known category prefix are skipped with a warning.

use crate::category::Category;
use crate::result::{SwiftError, SwiftResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Raw record as stored in the fixture file.
///
/// Only `TC ID`, `Input` and `Expected output` drive a run; the remaining
/// fields are maintenance metadata and are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Record id, category-prefixed
    #[serde(rename = "TC ID", default)]
    pub tc_id: Option<String>,
    /// Short description of the case
    #[serde(rename = "Test case name", default)]
    pub test_case_name: Option<String>,
    /// S / M / L style length bucket
    #[serde(rename = "Input length type", default)]
    pub input_length_type: Option<String>,
    /// Singlish input
    #[serde(rename = "Input", default)]
    pub input: Option<String>,
    /// Expected Sinhala output
    #[serde(rename = "Expected output", default)]
    pub expected_output: Option<String>,
    /// Last recorded output from the page
    #[serde(rename = "Actual output", default)]
    pub actual_output: Option<String>,
    /// Recorded status
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    /// Why the status holds
    #[serde(rename = "Justification", default)]
    pub justification: Option<String>,
    /// Coverage note
    #[serde(rename = "What is covered by the test", default)]
    pub coverage_note: Option<String>,
}

/// A single fixture-driven test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    /// Category-prefixed id, e.g. `Pos_Fun_0001`
    pub id: String,
    /// Category derived from the id at load time
    pub category: Category,
    /// Singlish input to type
    pub input: String,
    /// Expected converted output
    pub expected_output: String,
    /// Optional descriptive name from the fixture
    pub name: Option<String>,
}

impl TestCase {
    /// Create a test case, deriving its category from the id
    ///
    /// # Errors
    ///
    /// Returns [`SwiftError::UnknownCategory`] when the id has no known prefix.
    pub fn new(
        id: impl Into<String>,
        input: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> SwiftResult<Self> {
        let id = id.into();
        let category = Category::from_id(&id).ok_or_else(|| SwiftError::UnknownCategory {
            id: id.clone(),
        })?;
        Ok(Self {
            id,
            category,
            input: input.into(),
            expected_output: expected_output.into(),
            name: None,
        })
    }

    /// Title shown in progress output and reports
    #[must_use]
    pub fn title(&self) -> String {
        let verb = match self.category {
            Category::Positive => "Verify transliteration for",
            Category::Negative => "Test robustness for",
            Category::Ui => "Verify real-time conversion for",
        };
        format!("{} - {verb}: \"{}\"", self.id, self.input)
    }

    /// `Ok(None)` for a complete record whose id has no known prefix
    fn from_raw(index: usize, raw: &RawRecord) -> SwiftResult<Option<Self>> {
        let field = |value: &Option<String>, name: &'static str| {
            value
                .clone()
                .ok_or(SwiftError::FixtureMissingField { index, field: name })
        };
        let id = field(&raw.tc_id, "TC ID")?;
        let input = field(&raw.input, "Input")?;
        let expected_output = field(&raw.expected_output, "Expected output")?;
        let Some(category) = Category::from_id(&id) else {
            tracing::warn!(index, id = %id, "skipping fixture record with unknown id prefix");
            return Ok(None);
        };
        Ok(Some(Self {
            id,
            category,
            input,
            expected_output,
            name: raw.test_case_name.clone(),
        }))
    }
}

/// Ordered, immutable collection of fixture records
#[derive(Debug, Clone)]
pub struct FixtureStore {
    path: PathBuf,
    records: Vec<RawRecord>,
    cases: Vec<TestCase>,
}

impl FixtureStore {
    /// Load and validate a fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, is not a JSON array of
    /// records, or any record is incomplete.
    pub fn load(path: impl AsRef<Path>) -> SwiftResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SwiftError::FixtureRead {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&json, path)?;
        tracing::info!(
            path = %path.display(),
            records = store.len(),
            "loaded fixture file"
        );
        Ok(store)
    }

    /// Parse fixture JSON that came from `path`
    ///
    /// # Errors
    ///
    /// Same conditions as [`FixtureStore::load`], minus the file read.
    pub fn from_json_str(json: &str, path: impl AsRef<Path>) -> SwiftResult<Self> {
        let path = path.as_ref().to_path_buf();
        let records: Vec<RawRecord> =
            serde_json::from_str(json).map_err(|e| SwiftError::FixtureParse {
                path: path.clone(),
                message: e.to_string(),
            })?;
        let cases = records
            .iter()
            .enumerate()
            .map(|(index, raw)| TestCase::from_raw(index, raw))
            .collect::<SwiftResult<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();
        Ok(Self {
            path,
            records,
            cases,
        })
    }

    /// Source path of the fixture
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All test cases in file order
    #[must_use]
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Raw records in file order, including metadata
    #[must_use]
    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Test cases of one category, in file order
    #[must_use]
    pub fn by_category(&self, category: Category) -> Vec<&TestCase> {
        self.cases
            .iter()
            .filter(|c| c.category == category)
            .collect()
    }

    /// Number of records per category
    #[must_use]
    pub fn counts(&self) -> BTreeMap<Category, usize> {
        let mut counts: BTreeMap<Category, usize> =
            Category::ALL.iter().map(|c| (*c, 0)).collect();
        for case in &self.cases {
            *counts.entry(case.category).or_default() += 1;
        }
        counts
    }

    /// Look up a case by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// Total number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether the fixture has no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
