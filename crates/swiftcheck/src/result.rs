//! Result and error types for swiftcheck.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for swiftcheck operations
pub type SwiftResult<T> = Result<T, SwiftError>;

/// Errors that can occur while loading fixtures or driving the page
#[derive(Debug, Error)]
pub enum SwiftError {
    /// Fixture file could not be read
    #[error("Failed to read fixture file {path}: {source}")]
    FixtureRead {
        /// Fixture path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Fixture file is not a valid JSON array of records
    #[error("Fixture file {path} is not valid: {message}")]
    FixtureParse {
        /// Fixture path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// A record is missing one of the required fields
    #[error("Fixture record #{index} is missing required field '{field}'")]
    FixtureMissingField {
        /// Zero-based record index
        index: usize,
        /// Missing field name
        field: &'static str,
    },

    /// A record id carries none of the known category prefixes
    #[error("Fixture record '{id}' has no known category prefix")]
    UnknownCategory {
        /// Offending id
        id: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("{operation} timed out after {ms}ms")]
    Timeout {
        /// What was being waited on
        operation: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Script evaluation error
    #[error("Script evaluation failed: {message}")]
    EvaluationError {
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    InputError {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    ConfigError {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SwiftError {
    /// Create a timeout error for an operation
    #[must_use]
    pub fn timeout(operation: impl Into<String>, ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            ms,
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }

    /// Whether this error aborts the whole run rather than a single test
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::FixtureRead { .. }
                | Self::FixtureParse { .. }
                | Self::FixtureMissingField { .. }
                | Self::UnknownCategory { .. }
                | Self::BrowserLaunchError { .. }
                | Self::ConfigError { .. }
        )
    }
}
