//! Run configuration.
//!
//! [`RunConfig`] gathers everything a run needs. It can be built in code with
//! the `with_*` methods or loaded from a YAML file (`swiftcheck.yaml`); the
//! CLI layers its flags on top.

use crate::browser::BrowserConfig;
use crate::driver::PageSource;
use crate::page::DEFAULT_BASE_URL;
use crate::reporter::ExpectedCounts;
use crate::result::{SwiftError, SwiftResult};
use crate::scenario::{NegativePolicy, ScenarioRunner};
use crate::wait::Timings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default fixture location
pub const DEFAULT_FIXTURE_PATH: &str = "test-data/sample_D1.json";

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "swiftcheck.yaml";

/// Retries used when running under CI
pub const CI_RETRIES: u32 = 2;

/// Where run artifacts are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    /// Root of the dated screenshot folders
    pub screenshots_dir: PathBuf,
    /// JSON results file
    pub results_json: PathBuf,
    /// HTML report
    pub html_report: PathBuf,
    /// JUnit XML report
    pub junit_xml: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            screenshots_dir: PathBuf::from("screenshots"),
            results_json: PathBuf::from("test-results/results.json"),
            html_report: PathBuf::from("report/index.html"),
            junit_xml: PathBuf::from("test-results/junit.xml"),
        }
    }
}

impl ArtifactPaths {
    /// Same layout rooted at `dir`
    #[must_use]
    pub fn rooted_at(dir: &Path) -> Self {
        let defaults = Self::default();
        Self {
            screenshots_dir: dir.join(defaults.screenshots_dir),
            results_json: dir.join(defaults.results_json),
            html_report: dir.join(defaults.html_report),
            junit_xml: dir.join(defaults.junit_xml),
        }
    }
}

/// Configuration of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Page under test
    pub base_url: String,
    /// Fixture file
    pub fixture: PathBuf,
    /// Settle delays and timeouts
    pub timings: Timings,
    /// Tests in flight at once; `None` uses the available parallelism
    pub workers: Option<usize>,
    /// Retries for a failed test
    pub retries: u32,
    /// Verdict for negative mismatches
    pub negative_policy: NegativePolicy,
    /// Extra UI steps: key-by-key typing and the Clear button
    pub realtime_checks: bool,
    /// Counts checked by the requirements table
    pub expected: ExpectedCounts,
    /// Artifact locations
    pub artifacts: ArtifactPaths,
    /// Browser launch settings
    pub browser: BrowserConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fixture: PathBuf::from(DEFAULT_FIXTURE_PATH),
            timings: Timings::default(),
            workers: None,
            retries: 0,
            negative_policy: NegativePolicy::default(),
            realtime_checks: false,
            expected: ExpectedCounts::default(),
            artifacts: ArtifactPaths::default(),
            browser: BrowserConfig::default(),
        }
    }
}

impl RunConfig {
    /// Parse a YAML config; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns [`SwiftError::ConfigError`] for invalid YAML or unknown keys.
    pub fn from_yaml_str(yaml: &str) -> SwiftResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| SwiftError::ConfigError {
            message: e.to_string(),
        })
    }

    /// Load a YAML config file
    ///
    /// # Errors
    ///
    /// Returns [`SwiftError::ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> SwiftResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| SwiftError::ConfigError {
            message: format!("{}: {e}", path.display()),
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Apply CI defaults: [`CI_RETRIES`] retries and a single worker
    #[must_use]
    pub fn with_ci(mut self, ci: bool) -> Self {
        if ci {
            self.retries = CI_RETRIES;
            self.workers = Some(1);
        }
        self
    }

    /// Set the fixture path
    #[must_use]
    pub fn with_fixture(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixture = path.into();
        self
    }

    /// Set the target URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the timings
    #[must_use]
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Set the worker count
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set the retry count
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the negative policy
    #[must_use]
    pub const fn with_negative_policy(mut self, policy: NegativePolicy) -> Self {
        self.negative_policy = policy;
        self
    }

    /// Set the artifact paths
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: ArtifactPaths) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Set the browser settings
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Worker count after resolving the default
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, usize::from))
            .max(1)
    }

    /// Build a scenario runner over `source`
    #[must_use]
    pub fn runner<S: PageSource>(&self, source: S) -> ScenarioRunner<S> {
        ScenarioRunner::new(source)
            .with_url(self.base_url.clone())
            .with_timings(self.timings.clone())
            .with_retries(self.retries)
            .with_workers(self.effective_workers())
            .with_negative_policy(self.negative_policy)
            .with_screenshot_dir(self.artifacts.screenshots_dir.clone())
            .with_realtime_checks(self.realtime_checks)
    }
}

/// Whether the `CI` environment variable is set to a non-empty value
#[must_use]
pub fn ci_from_env() -> bool {
    std::env::var_os("CI").is_some_and(|v| !v.is_empty())
}
