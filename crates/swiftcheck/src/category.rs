//! Test categories and the id-prefix convention.
//!
//! `Category::from_id` is the only place the prefix convention is read.
//! Fixture loading attaches the result to each record, and the runner and
//! reporter consume that field.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Id prefix for positive functional records
pub const POSITIVE_PREFIX: &str = "Pos_Fun_";

/// Id prefix for negative functional records
pub const NEGATIVE_PREFIX: &str = "Neg_";

/// Id prefix for UI records
pub const UI_PREFIX: &str = "Pos_UI_";

/// Category of a fixture record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Valid Singlish that must convert exactly
    Positive,
    /// Messy or incorrect input that documents robustness
    Negative,
    /// Real-time conversion and interface behaviour
    Ui,
}

impl Category {
    /// All categories in report order
    pub const ALL: [Self; 3] = [Self::Positive, Self::Negative, Self::Ui];

    /// Derive the category from a `TC ID`
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        if id.starts_with(UI_PREFIX) {
            Some(Self::Ui)
        } else if id.starts_with(POSITIVE_PREFIX) {
            Some(Self::Positive)
        } else if id.starts_with(NEGATIVE_PREFIX) {
            Some(Self::Negative)
        } else {
            None
        }
    }

    /// Id prefix for this category
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Positive => POSITIVE_PREFIX,
            Self::Negative => NEGATIVE_PREFIX,
            Self::Ui => UI_PREFIX,
        }
    }

    /// Suite name used in titles and artifacts
    #[must_use]
    pub const fn suite_name(self) -> &'static str {
        match self {
            Self::Positive => "positive-functional",
            Self::Negative => "negative-functional",
            Self::Ui => "ui",
        }
    }

    /// Screenshot tag used when a record fails
    #[must_use]
    pub const fn screenshot_tag(self) -> &'static str {
        match self {
            Self::Positive => "FAIL",
            Self::Negative => "NEGATIVE",
            Self::Ui => "UI",
        }
    }

    /// Human-readable title of the suite
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Positive => "Positive Functional Tests - Singlish to Sinhala Transliteration",
            Self::Negative => "Negative Functional Tests - Robustness Validation",
            Self::Ui => "UI Behavior Tests - Real-time Conversion & Usability",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suite_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pos" | "positive" | "positive-functional" => Ok(Self::Positive),
            "neg" | "negative" | "negative-functional" => Ok(Self::Negative),
            "ui" => Ok(Self::Ui),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}
