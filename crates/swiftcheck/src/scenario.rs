//! Scenario Runner
//!
//! Drives one fresh page per fixture record through the fixed interaction
//! sequence and turns what it observes into a [`TestOutcome`]. A failure
//! only ever ends its own test case.

use crate::category::Category;
use crate::driver::PageSource;
use crate::fixture::TestCase;
use crate::page::{Responsiveness, TranslatorPage, DEFAULT_BASE_URL};
use crate::result::{SwiftError, SwiftResult};
use crate::wait::{self, Timings};
use futures::StreamExt;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// How a negative-category mismatch affects the verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativePolicy {
    /// A mismatch fails the test, same as positive records
    #[default]
    Strict,
    /// A mismatch is recorded and the test passes
    Document,
}

impl fmt::Display for NegativePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "strict",
            Self::Document => "document",
        })
    }
}

impl FromStr for NegativePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "document" => Ok(Self::Document),
            other => Err(format!("unknown negative policy '{other}'")),
        }
    }
}

/// What one execution observed on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionResult {
    /// Trimmed output text
    pub actual_output: String,
    /// Whether it equals the expected output exactly
    pub is_match: bool,
    /// Probe result, `None` when the test ended before probing
    pub responsiveness: Option<Responsiveness>,
}

/// Verdict of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
}

/// Why a test failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// Output differs from the expected output
    Mismatch {
        /// Expected output
        expected: String,
        /// Observed output
        actual: String,
    },
    /// Responsiveness probe did not pass
    Unresponsive {
        /// Probe result
        responsiveness: Responsiveness,
    },
    /// Output was not empty after the initial clear
    NotEmptyBeforeTyping {
        /// Observed output
        actual: String,
    },
    /// Output was not empty after clearing at the end
    NotClearedAfterClear {
        /// Observed output
        actual: String,
    },
    /// Key-by-key typing produced no output
    NoRealTimeConversion,
    /// Output was not empty after pressing the Clear button
    NotClearedByButton {
        /// Observed output
        actual: String,
    },
    /// The test exceeded its time budget
    TimedOut {
        /// Budget in milliseconds
        ms: u64,
    },
    /// A page or driver error
    Error {
        /// Error message
        message: String,
    },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch { expected, actual } => {
                write!(f, "expected {expected:?} but got {actual:?}")
            }
            Self::Unresponsive { responsiveness } => match responsiveness {
                Responsiveness::Unresponsive { element } => {
                    write!(f, "page unresponsive: {element} not visible")
                }
                Responsiveness::ProbeFailed { message } => {
                    write!(f, "responsiveness probe failed: {message}")
                }
                Responsiveness::Responsive => f.write_str("page unresponsive"),
            },
            Self::NotEmptyBeforeTyping { actual } => {
                write!(f, "output not empty before typing: {actual:?}")
            }
            Self::NotClearedAfterClear { actual } => {
                write!(f, "output not cleared after clear: {actual:?}")
            }
            Self::NoRealTimeConversion => f.write_str("no output while typing"),
            Self::NotClearedByButton { actual } => {
                write!(f, "output not cleared by the Clear button: {actual:?}")
            }
            Self::TimedOut { ms } => write!(f, "test timed out after {ms}ms"),
            Self::Error { message } => f.write_str(message),
        }
    }
}

impl From<SwiftError> for Failure {
    fn from(e: SwiftError) -> Self {
        Self::Error {
            message: e.to_string(),
        }
    }
}

/// Result of running one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestOutcome {
    /// Test case id
    pub id: String,
    /// Display title
    pub title: String,
    /// Category, when known
    pub category: Option<Category>,
    /// Verdict
    pub status: TestStatus,
    /// Failure reason of the final attempt
    pub failure: Option<Failure>,
    /// What the final attempt observed
    pub interaction: Option<InteractionResult>,
    /// Negative mismatch recorded under [`NegativePolicy::Document`]
    pub documented_mismatch: bool,
    /// Screenshot captured on mismatch
    pub screenshot: Option<PathBuf>,
    /// Wall time of the final attempt
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Number of attempts made
    pub attempts: u32,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

impl TestOutcome {
    /// Passing outcome for `case`
    #[must_use]
    pub fn passed(case: &TestCase) -> Self {
        Self {
            id: case.id.clone(),
            title: case.title(),
            category: Some(case.category),
            status: TestStatus::Passed,
            failure: None,
            interaction: None,
            documented_mismatch: false,
            screenshot: None,
            duration: Duration::ZERO,
            attempts: 1,
        }
    }

    /// Failing outcome for `case`
    #[must_use]
    pub fn failed(case: &TestCase, failure: Failure) -> Self {
        Self {
            status: TestStatus::Failed,
            failure: Some(failure),
            ..Self::passed(case)
        }
    }

    /// Whether the test passed
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Selects which records run
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    categories: Vec<Category>,
    grep: Option<Regex>,
}

impl CaseFilter {
    /// Accept every record
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a category; repeatable
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        if !self.categories.contains(&category) {
            self.categories.push(category);
        }
        self
    }

    /// Only records whose title matches `pattern`
    ///
    /// # Errors
    ///
    /// Returns [`SwiftError::ConfigError`] for an invalid regex.
    pub fn with_grep(mut self, pattern: &str) -> SwiftResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| SwiftError::ConfigError {
            message: format!("invalid grep pattern: {e}"),
        })?;
        self.grep = Some(regex);
        Ok(self)
    }

    /// Whether `case` is selected
    #[must_use]
    pub fn matches(&self, case: &TestCase) -> bool {
        let category_ok = self.categories.is_empty() || self.categories.contains(&case.category);
        let grep_ok = self
            .grep
            .as_ref()
            .map_or(true, |re| re.is_match(&case.title()));
        category_ok && grep_ok
    }

    /// Selected records in fixture order
    #[must_use]
    pub fn select(&self, cases: &[TestCase]) -> Vec<TestCase> {
        cases.iter().filter(|c| self.matches(c)).cloned().collect()
    }
}

/// Runs test cases against pages from a [`PageSource`]
#[derive(Debug)]
pub struct ScenarioRunner<S> {
    source: S,
    url: String,
    timings: Timings,
    retries: u32,
    workers: usize,
    negative_policy: NegativePolicy,
    screenshot_dir: PathBuf,
    realtime_checks: bool,
}

impl<S: PageSource> ScenarioRunner<S> {
    /// Runner with one worker, no retries and default timings
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            url: DEFAULT_BASE_URL.to_string(),
            timings: Timings::default(),
            retries: 0,
            workers: 1,
            negative_policy: NegativePolicy::default(),
            screenshot_dir: PathBuf::from("screenshots"),
            realtime_checks: false,
        }
    }

    /// Set the target URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the timings
    #[must_use]
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Re-run a failed test up to `retries` more times
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Number of tests in flight at once
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the negative policy
    #[must_use]
    pub const fn with_negative_policy(mut self, policy: NegativePolicy) -> Self {
        self.negative_policy = policy;
        self
    }

    /// Set the screenshot root directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// After the UI clear check, also type key by key and use the Clear
    /// button
    #[must_use]
    pub const fn with_realtime_checks(mut self, enabled: bool) -> Self {
        self.realtime_checks = enabled;
        self
    }

    /// Page source
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Give the page source back
    pub fn into_source(self) -> S {
        self.source
    }

    /// Run `cases` and hand each outcome to `on_outcome` as it completes.
    ///
    /// Outcomes are returned in fixture order.
    pub async fn run<F>(&self, cases: &[TestCase], mut on_outcome: F) -> Vec<TestOutcome>
    where
        F: FnMut(&TestOutcome),
    {
        tracing::info!(
            tests = cases.len(),
            workers = self.workers,
            retries = self.retries,
            "starting run"
        );
        let mut stream = futures::stream::iter(cases.iter().enumerate())
            .map(|(index, case)| async move { (index, self.run_case(case).await) })
            .buffer_unordered(self.workers);

        let mut results = Vec::with_capacity(cases.len());
        while let Some((index, outcome)) = stream.next().await {
            on_outcome(&outcome);
            results.push((index, outcome));
        }
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, outcome)| outcome).collect()
    }

    /// Run one case, retrying on failure
    pub async fn run_case(&self, case: &TestCase) -> TestOutcome {
        let mut attempt = 1;
        loop {
            let mut outcome = self.run_attempt(case).await;
            outcome.attempts = attempt;
            if outcome.is_passed() || attempt > self.retries {
                tracing::info!(
                    id = %case.id,
                    status = ?outcome.status,
                    attempts = attempt,
                    "test finished"
                );
                return outcome;
            }
            tracing::warn!(
                id = %case.id,
                attempt,
                failure = ?outcome.failure,
                "test failed, retrying on a fresh page"
            );
            attempt += 1;
        }
    }

    async fn run_attempt(&self, case: &TestCase) -> TestOutcome {
        let start = Instant::now();
        let page = match self.source.new_page().await {
            Ok(page) => page,
            Err(e) => {
                let mut outcome = TestOutcome::failed(case, e.into());
                outcome.duration = start.elapsed();
                return outcome;
            }
        };
        let translator = TranslatorPage::new(page)
            .with_url(self.url.clone())
            .with_timings(self.timings.clone())
            .with_screenshot_dir(self.screenshot_dir.clone());

        let mut outcome = TestOutcome::passed(case);
        let budget = self.timings.test_timeout();
        let steps = self.drive(&translator, case, &mut outcome);
        match tokio::time::timeout(budget, steps).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                outcome.status = TestStatus::Failed;
                outcome.failure = Some(e.into());
            }
            Err(_) => {
                outcome.status = TestStatus::Failed;
                outcome.failure = Some(Failure::TimedOut {
                    ms: self.timings.test_timeout_ms,
                });
            }
        }
        if let Err(e) = translator.close().await {
            tracing::debug!(id = %case.id, error = %e, "closing page failed");
        }
        outcome.duration = start.elapsed();
        outcome
    }

    /// The interaction sequence. Assertion failures are written to
    /// `outcome`; page errors are returned.
    async fn drive<D: crate::driver::PageDriver>(
        &self,
        page: &TranslatorPage<D>,
        case: &TestCase,
        outcome: &mut TestOutcome,
    ) -> SwiftResult<()> {
        let fail = |outcome: &mut TestOutcome, failure: Failure| {
            outcome.status = TestStatus::Failed;
            outcome.failure = Some(failure);
        };

        page.navigate().await?;
        page.clear_input().await?;

        if case.category == Category::Ui {
            let initial = page.get_output().await?;
            if !initial.is_empty() {
                fail(outcome, Failure::NotEmptyBeforeTyping { actual: initial });
                return Ok(());
            }
        }

        page.type_input(&case.input).await?;
        let settle = match case.category {
            Category::Ui => self.timings.ui_settle(),
            Category::Positive | Category::Negative => self.timings.functional_settle(),
        };
        wait::settle(settle).await;

        let actual = page.get_output().await?;
        let is_match = actual == case.expected_output;
        outcome.interaction = Some(InteractionResult {
            actual_output: actual.clone(),
            is_match,
            responsiveness: None,
        });

        if !is_match {
            tracing::warn!(
                id = %case.id,
                category = %case.category,
                input = %case.input,
                expected = %case.expected_output,
                actual = %actual,
                "output mismatch"
            );
            let name = format!("{}-{}", case.category.screenshot_tag(), case.id);
            match page.take_screenshot(&name).await {
                Ok(path) => outcome.screenshot = Some(path),
                Err(e) => tracing::warn!(id = %case.id, error = %e, "screenshot failed"),
            }
            let documented =
                case.category == Category::Negative && self.negative_policy == NegativePolicy::Document;
            if !documented {
                fail(
                    outcome,
                    Failure::Mismatch {
                        expected: case.expected_output.clone(),
                        actual,
                    },
                );
                return Ok(());
            }
            outcome.documented_mismatch = true;
        }

        let responsiveness = page.is_responsive().await;
        if let Some(interaction) = outcome.interaction.as_mut() {
            interaction.responsiveness = Some(responsiveness.clone());
        }
        if !responsiveness.is_responsive() {
            fail(outcome, Failure::Unresponsive { responsiveness });
            return Ok(());
        }

        if case.category == Category::Ui {
            page.clear_input().await?;
            wait::settle(self.timings.clear_settle()).await;
            let cleared = page.get_output().await?;
            if !cleared.is_empty() {
                fail(outcome, Failure::NotClearedAfterClear { actual: cleared });
                return Ok(());
            }
            if self.realtime_checks {
                self.check_realtime(page, case, outcome).await?;
            }
        }
        Ok(())
    }

    async fn check_realtime<D: crate::driver::PageDriver>(
        &self,
        page: &TranslatorPage<D>,
        case: &TestCase,
        outcome: &mut TestOutcome,
    ) -> SwiftResult<()> {
        if !page.verify_real_time_conversion(&case.input).await {
            outcome.status = TestStatus::Failed;
            outcome.failure = Some(Failure::NoRealTimeConversion);
            return Ok(());
        }
        page.press_clear_button().await?;
        let actual = page.get_output().await?;
        if !actual.is_empty() {
            outcome.status = TestStatus::Failed;
            outcome.failure = Some(Failure::NotClearedByButton { actual });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::{MockBrowser, MockElement};

    fn browser() -> MockBrowser {
        MockBrowser::new()
            .with_word("mama", "මම")
            .with_word("gedhara", "ගෙදර")
            .with_word("yanavaa", "යනවා")
    }

    fn runner(source: MockBrowser, dir: &std::path::Path) -> ScenarioRunner<MockBrowser> {
        ScenarioRunner::new(source)
            .with_timings(Timings::instant())
            .with_screenshot_dir(dir)
    }

    fn case(id: &str, input: &str, expected: &str) -> TestCase {
        TestCase::new(id, input, expected).unwrap()
    }

    mod policy_tests {
        use super::*;

        #[test]
        fn test_default_is_strict() {
            assert_eq!(NegativePolicy::default(), NegativePolicy::Strict);
        }

        #[test]
        fn test_parse() {
            assert_eq!(
                "Document".parse::<NegativePolicy>(),
                Ok(NegativePolicy::Document)
            );
            assert!("lenient".parse::<NegativePolicy>().is_err());
        }
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn test_category_filter() {
            let cases = vec![
                case("Pos_Fun_0001", "mama", "මම"),
                case("Neg_Fun_0001", "MaMa", "මම"),
            ];
            let selected = CaseFilter::all()
                .with_category(Category::Negative)
                .select(&cases);
            assert_eq!(selected.len(), 1);
            assert_eq!(selected[0].id, "Neg_Fun_0001");
        }

        #[test]
        fn test_grep_matches_title() {
            let filter = CaseFilter::all().with_grep("Pos_Fun_000[12]").unwrap();
            assert!(filter.matches(&case("Pos_Fun_0002", "a", "අ")));
            assert!(!filter.matches(&case("Pos_Fun_0003", "a", "අ")));
        }

        #[test]
        fn test_invalid_grep() {
            let err = CaseFilter::all().with_grep("(").unwrap_err();
            assert!(matches!(err, SwiftError::ConfigError { .. }));
        }
    }

    mod positive_tests {
        use super::*;

        #[tokio::test]
        async fn test_matching_output_passes() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser(), dir.path());
            let outcome = runner
                .run_case(&case("Pos_Fun_0001", "mama gedhara yanavaa", "මම ගෙදර යනවා"))
                .await;
            assert!(outcome.is_passed(), "{:?}", outcome.failure);
            let interaction = outcome.interaction.unwrap();
            assert!(interaction.is_match);
            assert_eq!(interaction.responsiveness, Some(Responsiveness::Responsive));
            assert!(outcome.screenshot.is_none());
        }

        #[tokio::test]
        async fn test_mismatch_fails_with_screenshot() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser(), dir.path());
            let outcome = runner
                .run_case(&case("Pos_Fun_0002", "mama", "මං"))
                .await;
            assert_eq!(outcome.status, TestStatus::Failed);
            assert_eq!(
                outcome.failure,
                Some(Failure::Mismatch {
                    expected: "මං".into(),
                    actual: "මම".into()
                })
            );
            let shot = outcome.screenshot.unwrap();
            assert!(shot.ends_with("FAIL-Pos_Fun_0002.png"));
            assert!(shot.exists());
        }

        #[tokio::test]
        async fn test_unresponsive_page_fails() {
            let dir = tempfile::tempdir().unwrap();
            let source = browser().with_hidden(MockElement::Input);
            let runner = runner(source, dir.path());
            let outcome = runner.run_case(&case("Pos_Fun_0003", "mama", "මම")).await;
            assert!(matches!(
                outcome.failure,
                Some(Failure::Unresponsive { .. })
            ));
        }

        #[tokio::test]
        async fn test_driver_error_while_reading_output_fails_test() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser().with_probe_error("detached"), dir.path());
            let outcome = runner.run_case(&case("Pos_Fun_0004", "", "")).await;
            assert_eq!(outcome.status, TestStatus::Failed);
            assert!(matches!(outcome.failure, Some(Failure::Error { .. })));
        }

        #[tokio::test]
        async fn test_failed_responsiveness_check_is_unresponsive_failure() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser().with_late_visibility_error("detached"), dir.path());
            let outcome = runner.run_case(&case("Pos_Fun_0005", "mama", "මම")).await;
            assert_eq!(outcome.status, TestStatus::Failed);
            match outcome.failure {
                Some(Failure::Unresponsive {
                    responsiveness: Responsiveness::ProbeFailed { message },
                }) => assert!(message.contains("detached")),
                other => panic!("unexpected failure: {other:?}"),
            }
            let interaction = outcome.interaction.unwrap();
            assert!(interaction.is_match);
            assert!(matches!(
                interaction.responsiveness,
                Some(Responsiveness::ProbeFailed { .. })
            ));
        }
    }

    mod negative_tests {
        use super::*;

        #[tokio::test]
        async fn test_strict_policy_fails_mismatch() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser(), dir.path());
            let outcome = runner.run_case(&case("Neg_Fun_0001", "MaMa", "මම")).await;
            assert_eq!(outcome.status, TestStatus::Failed);
            assert!(outcome
                .screenshot
                .unwrap()
                .ends_with("NEGATIVE-Neg_Fun_0001.png"));
        }

        #[tokio::test]
        async fn test_document_policy_passes_mismatch() {
            let dir = tempfile::tempdir().unwrap();
            let runner =
                runner(browser(), dir.path()).with_negative_policy(NegativePolicy::Document);
            let outcome = runner.run_case(&case("Neg_Fun_0001", "MaMa", "මම")).await;
            assert!(outcome.is_passed());
            assert!(outcome.documented_mismatch);
            assert!(outcome.screenshot.is_some());
        }

        #[tokio::test]
        async fn test_document_policy_does_not_cover_positive() {
            let dir = tempfile::tempdir().unwrap();
            let runner =
                runner(browser(), dir.path()).with_negative_policy(NegativePolicy::Document);
            let outcome = runner.run_case(&case("Pos_Fun_0001", "MaMa", "මම")).await;
            assert_eq!(outcome.status, TestStatus::Failed);
        }
    }

    mod ui_tests {
        use super::*;

        #[tokio::test]
        async fn test_ui_lifecycle_passes() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser(), dir.path());
            let outcome = runner
                .run_case(&case("Pos_UI_0001", "mama gedhara yanavaa", "මම ගෙදර යනවා"))
                .await;
            assert!(outcome.is_passed(), "{:?}", outcome.failure);
        }

        #[tokio::test]
        async fn test_ui_output_not_empty_before_typing() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser().with_blank_output("ready"), dir.path());
            let outcome = runner
                .run_case(&case("Pos_UI_0001", "mama gedhara yanavaa", "මම ගෙදර යනවා"))
                .await;
            assert_eq!(
                outcome.failure,
                Some(Failure::NotEmptyBeforeTyping {
                    actual: "ready".into()
                })
            );
            assert!(outcome.interaction.is_none());
        }

        #[tokio::test]
        async fn test_ui_output_not_cleared_after_clear() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser().with_sticky_output(), dir.path());
            let outcome = runner
                .run_case(&case("Pos_UI_0001", "mama gedhara yanavaa", "මම ගෙදර යනවා"))
                .await;
            assert_eq!(
                outcome.failure,
                Some(Failure::NotClearedAfterClear {
                    actual: "මම ගෙදර යනවා".into()
                })
            );
            assert!(outcome.interaction.unwrap().is_match);
        }

        #[tokio::test]
        async fn test_sticky_output_does_not_affect_functional_cases() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser().with_sticky_output(), dir.path());
            let outcome = runner.run_case(&case("Pos_Fun_0001", "mama", "මම")).await;
            assert!(outcome.is_passed(), "{:?}", outcome.failure);
        }

        #[tokio::test]
        async fn test_realtime_checks_pass_on_live_page() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser(), dir.path()).with_realtime_checks(true);
            let outcome = runner
                .run_case(&case("Pos_UI_0001", "mama gedhara yanavaa", "මම ගෙදර යනවා"))
                .await;
            assert!(outcome.is_passed(), "{:?}", outcome.failure);
        }

        #[tokio::test]
        async fn test_realtime_checks_need_output_while_typing() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser(), dir.path()).with_realtime_checks(true);
            let outcome = runner.run_case(&case("Pos_UI_0003", "", "")).await;
            assert_eq!(outcome.failure, Some(Failure::NoRealTimeConversion));
        }

        #[tokio::test]
        async fn test_realtime_checks_catch_inert_clear_button() {
            let dir = tempfile::tempdir().unwrap();
            let source = browser().with_inert_clear_button();
            let runner = runner(source, dir.path()).with_realtime_checks(true);
            let outcome = runner
                .run_case(&case("Pos_UI_0001", "mama gedhara yanavaa", "මම ගෙදර යනවා"))
                .await;
            assert_eq!(
                outcome.failure,
                Some(Failure::NotClearedByButton {
                    actual: "මම ගෙදර යනවා".into()
                })
            );
        }

        #[tokio::test]
        async fn test_realtime_checks_skip_functional_cases() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser(), dir.path()).with_realtime_checks(true);
            let outcome = runner.run_case(&case("Pos_Fun_0001", "", "")).await;
            assert!(outcome.is_passed(), "{:?}", outcome.failure);
        }

        #[tokio::test]
        async fn test_ui_mismatch_uses_ui_tag() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser(), dir.path());
            let outcome = runner.run_case(&case("Pos_UI_0002", "mama", "x")).await;
            assert_eq!(outcome.status, TestStatus::Failed);
            assert!(outcome.screenshot.unwrap().ends_with("UI-Pos_UI_0002.png"));
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigation_error_fails_only_that_test() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser().with_failing_pages(1), dir.path());
            let cases = vec![
                case("Pos_Fun_0001", "mama", "මම"),
                case("Pos_Fun_0002", "gedhara", "ගෙදර"),
            ];
            let outcomes = runner.run(&cases, |_| {}).await;
            assert_eq!(outcomes.len(), 2);
            assert_eq!(outcomes[0].status, TestStatus::Failed);
            assert!(matches!(outcomes[0].failure, Some(Failure::Error { .. })));
            assert!(outcomes[1].is_passed());
        }

        #[tokio::test]
        async fn test_retry_recovers_on_fresh_page() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser().with_failing_pages(1), dir.path()).with_retries(2);
            let outcome = runner.run_case(&case("Pos_Fun_0001", "mama", "මම")).await;
            assert!(outcome.is_passed());
            assert_eq!(outcome.attempts, 2);
            assert_eq!(runner.source().pages_opened(), 2);
        }

        #[tokio::test]
        async fn test_retries_exhausted() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser().with_navigation_error("offline"), dir.path())
                .with_retries(1);
            let outcome = runner.run_case(&case("Pos_Fun_0001", "mama", "මම")).await;
            assert_eq!(outcome.status, TestStatus::Failed);
            assert_eq!(outcome.attempts, 2);
        }

        #[tokio::test]
        async fn test_outcomes_in_fixture_order_with_workers() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner(browser(), dir.path()).with_workers(4);
            let cases: Vec<TestCase> = (1..=6)
                .map(|i| case(&format!("Pos_Fun_{i:04}"), "mama", "මම"))
                .collect();
            let mut seen = 0;
            let outcomes = runner.run(&cases, |_| seen += 1).await;
            assert_eq!(seen, 6);
            let ids: Vec<_> = outcomes.iter().map(|o| o.id.clone()).collect();
            let expected: Vec<_> = cases.iter().map(|c| c.id.clone()).collect();
            assert_eq!(ids, expected);
            assert!(outcomes.iter().all(TestOutcome::is_passed));
        }

        #[tokio::test]
        async fn test_timeout_fails_test() {
            let dir = tempfile::tempdir().unwrap();
            let timings = Timings::instant().with_test_timeout(20).with_type_settle(500);
            let runner = runner(browser(), dir.path()).with_timings(timings);
            let outcome = runner.run_case(&case("Pos_Fun_0001", "mama", "මම")).await;
            assert_eq!(outcome.failure, Some(Failure::TimedOut { ms: 20 }));
        }
    }
}
