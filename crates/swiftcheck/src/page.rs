//! Page Adapter for the transliteration page.
//!
//! [`TranslatorPage`] wraps a [`PageDriver`] and exposes the handful of
//! semantic operations the scenarios need. All side effects go through the
//! driver handed to [`TranslatorPage::new`].

use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::{SwiftError, SwiftResult};
use crate::wait::{self, LoadState, Timings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default target URL
pub const DEFAULT_BASE_URL: &str = "https://www.swifttranslator.com/";

/// CSS selector of the Singlish input
pub const INPUT_SELECTOR: &str = "textarea[placeholder*=\"Singlish\"]";

/// CSS selector of the Sinhala output region
pub const OUTPUT_SELECTOR: &str = "div.whitespace-pre-wrap.overflow-y-auto.flex-grow.bg-slate-50";

/// Element contract of the hosted page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocators {
    /// Singlish input textarea
    pub input: Locator,
    /// Sinhala output region
    pub output: Locator,
    /// Clear button
    pub clear_button: Locator,
}

impl Default for PageLocators {
    fn default() -> Self {
        Self {
            input: Locator::new(INPUT_SELECTOR),
            output: Locator::new(OUTPUT_SELECTOR),
            clear_button: Locator::new("button").with_text("Clear"),
        }
    }
}

/// Outcome of the responsiveness probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Responsiveness {
    /// Input and output are both visible
    Responsive,
    /// An element stayed hidden for the whole probe window
    Unresponsive {
        /// Which element: `input` or `output`
        element: String,
    },
    /// The driver errored while probing
    ProbeFailed {
        /// Driver error
        message: String,
    },
}

impl Responsiveness {
    /// Whether the page passed the probe
    #[must_use]
    pub const fn is_responsive(&self) -> bool {
        matches!(self, Self::Responsive)
    }
}

/// Page object for the transliteration page
#[derive(Debug)]
pub struct TranslatorPage<D> {
    driver: D,
    locators: PageLocators,
    timings: Timings,
    url: String,
    screenshot_dir: PathBuf,
}

impl<D: PageDriver> TranslatorPage<D> {
    /// Wrap a driver with the default URL, locators and timings
    #[must_use]
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            locators: PageLocators::default(),
            timings: Timings::default(),
            url: DEFAULT_BASE_URL.to_string(),
            screenshot_dir: PathBuf::from("screenshots"),
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

    /// Set the screenshot root directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Element contract in use
    #[must_use]
    pub const fn locators(&self) -> &PageLocators {
        &self.locators
    }

    /// Timings in use
    #[must_use]
    pub const fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Give the driver back
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Load the target URL and wait for the network to go idle
    ///
    /// # Errors
    ///
    /// Returns navigation and timeout errors from the driver.
    pub async fn navigate(&self) -> SwiftResult<()> {
        tracing::debug!(url = %self.url, "navigating");
        self.driver
            .goto(&self.url, LoadState::NetworkIdle, &self.timings)
            .await
    }

    /// Focus the input, select everything and delete it
    ///
    /// # Errors
    ///
    /// Returns driver errors.
    pub async fn clear_input(&self) -> SwiftResult<()> {
        let input = &self.locators.input;
        self.driver.click(input).await?;
        self.driver.select_all(input).await?;
        self.driver.press_key(input, "Backspace").await?;
        wait::settle(self.timings.clear_settle()).await;
        Ok(())
    }

    /// Clear the input, fill it with `text` and wait for the conversion
    ///
    /// # Errors
    ///
    /// Returns driver errors.
    pub async fn type_input(&self, text: &str) -> SwiftResult<()> {
        self.clear_input().await?;
        self.driver.fill(&self.locators.input, text).await?;
        wait::settle(self.timings.type_settle()).await;
        Ok(())
    }

    /// Wait for the output to be visible and read its trimmed text
    ///
    /// # Errors
    ///
    /// Returns [`SwiftError::Timeout`] when the output never becomes
    /// visible, or driver errors.
    pub async fn get_output(&self) -> SwiftResult<String> {
        let output = &self.locators.output;
        wait::wait_until(
            "wait for output to be visible",
            self.timings.action_timeout(),
            self.timings.poll_interval(),
            || self.driver.is_visible(output),
        )
        .await?;
        let text = self.driver.text_content(output).await?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    /// Probe that the input and output are visible.
    ///
    /// Each element gets the probe timeout. Never fails; errors become
    /// [`Responsiveness::ProbeFailed`].
    pub async fn is_responsive(&self) -> Responsiveness {
        let probes = [("input", &self.locators.input), ("output", &self.locators.output)];
        for (element, locator) in probes {
            let timeout = self.timings.probe_timeout();
            let operation = format!("probe {element}");
            let probe = wait::wait_until(
                &operation,
                timeout,
                self.timings.poll_interval(),
                || self.driver.is_visible(locator),
            );
            // A driver call that hangs must not outlive the probe window
            match tokio::time::timeout(timeout.saturating_mul(2), probe).await {
                Ok(Ok(())) => {}
                Ok(Err(SwiftError::Timeout { .. })) => {
                    return Responsiveness::Unresponsive {
                        element: element.to_string(),
                    }
                }
                Ok(Err(e)) => {
                    return Responsiveness::ProbeFailed {
                        message: e.to_string(),
                    }
                }
                Err(_) => {
                    return Responsiveness::ProbeFailed {
                        message: format!("{element} probe did not return"),
                    }
                }
            }
        }
        Responsiveness::Responsive
    }

    /// Capture a full-page screenshot to
    /// `<screenshot_dir>/test_run_<YYYYMMDD>/<name>.png`
    ///
    /// # Errors
    ///
    /// Returns screenshot or filesystem errors.
    pub async fn take_screenshot(&self, name: &str) -> SwiftResult<PathBuf> {
        let bytes = self.driver.screenshot(true).await?;
        let dir = run_folder(&self.screenshot_dir);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{name}.png"));
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), "saved screenshot");
        Ok(path)
    }

    /// Type `input` key by key and report whether output appeared with no
    /// submit action. Any error counts as `false`.
    pub async fn verify_real_time_conversion(&self, input: &str) -> bool {
        let attempt = async {
            self.clear_input().await?;
            self.driver
                .type_text(&self.locators.input, input, self.timings.key_delay())
                .await?;
            self.get_output().await
        };
        match attempt.await {
            Ok(output) => !output.is_empty(),
            Err(e) => {
                tracing::debug!(error = %e, "real-time conversion check failed");
                false
            }
        }
    }

    /// Press the page's Clear button and wait the clear settle delay
    ///
    /// # Errors
    ///
    /// Returns driver errors.
    pub async fn press_clear_button(&self) -> SwiftResult<()> {
        self.driver.click(&self.locators.clear_button).await?;
        wait::settle(self.timings.clear_settle()).await;
        Ok(())
    }

    /// Close the underlying page
    ///
    /// # Errors
    ///
    /// Returns driver errors.
    pub async fn close(&self) -> SwiftResult<()> {
        self.driver.close().await
    }
}

/// Dated per-run screenshot folder under `root`
#[must_use]
pub fn run_folder(root: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d");
    root.join(format!("test_run_{stamp}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};

    fn page_with(driver: MockDriver) -> TranslatorPage<MockDriver> {
        TranslatorPage::new(driver).with_timings(Timings::instant())
    }

    fn translator() -> TranslatorPage<MockDriver> {
        page_with(
            MockDriver::new()
                .with_word("mama", "මම")
                .with_word("gedhara", "ගෙදර")
                .with_word("yanavaa", "යනවා"),
        )
    }

    mod locator_contract_tests {
        use super::*;

        #[test]
        fn test_default_locators() {
            let locators = PageLocators::default();
            assert_eq!(locators.input.to_string(), INPUT_SELECTOR);
            assert_eq!(locators.output.to_string(), OUTPUT_SELECTOR);
            assert_eq!(
                locators.clear_button.to_string(),
                "button:has-text(\"Clear\")"
            );
        }
    }

    mod interaction_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigate_uses_network_idle() {
            let page = translator();
            page.navigate().await.unwrap();
            assert!(page
                .driver()
                .history()
                .contains(&format!("goto:{DEFAULT_BASE_URL}:networkidle")));
        }

        #[tokio::test]
        async fn test_type_input_then_read() {
            let page = translator();
            page.type_input("mama gedhara yanavaa").await.unwrap();
            assert_eq!(page.get_output().await.unwrap(), "මම ගෙදර යනවා");
        }

        #[tokio::test]
        async fn test_type_input_replaces_previous_text() {
            let page = translator();
            page.type_input("gedhara").await.unwrap();
            page.type_input("mama").await.unwrap();
            assert_eq!(page.driver().input_text(), "mama");
        }

        #[tokio::test]
        async fn test_clear_twice_leaves_output_empty() {
            let page = translator();
            page.type_input("mama").await.unwrap();
            page.clear_input().await.unwrap();
            assert_eq!(page.get_output().await.unwrap(), "");
            page.clear_input().await.unwrap();
            assert_eq!(page.get_output().await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_empty_input_gives_empty_output() {
            let page = translator();
            page.type_input("").await.unwrap();
            assert_eq!(page.get_output().await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_output_is_trimmed() {
            let page = page_with(MockDriver::new().with_phrase("x", "  ක  "));
            page.type_input("x").await.unwrap();
            assert_eq!(page.get_output().await.unwrap(), "ක");
        }

        #[tokio::test]
        async fn test_hidden_output_times_out() {
            let page = page_with(MockDriver::new().with_hidden(MockElement::Output));
            let err = page.get_output().await.unwrap_err();
            assert!(matches!(err, SwiftError::Timeout { .. }));
        }

        #[tokio::test]
        async fn test_clear_button() {
            let page = translator();
            page.type_input("mama").await.unwrap();
            page.press_clear_button().await.unwrap();
            assert_eq!(page.get_output().await.unwrap(), "");
        }
    }

    mod responsiveness_tests {
        use super::*;

        #[tokio::test]
        async fn test_responsive_after_conversion() {
            let page = translator();
            page.type_input("mama").await.unwrap();
            assert_eq!(page.is_responsive().await, Responsiveness::Responsive);
        }

        #[tokio::test]
        async fn test_hidden_input_is_unresponsive() {
            let page = page_with(MockDriver::new().with_hidden(MockElement::Input));
            assert_eq!(
                page.is_responsive().await,
                Responsiveness::Unresponsive {
                    element: "input".into()
                }
            );
        }

        #[tokio::test]
        async fn test_closed_page_is_not_responsive() {
            let page = translator();
            page.close().await.unwrap();
            let result = page.is_responsive().await;
            assert!(matches!(result, Responsiveness::ProbeFailed { .. }));
            assert!(!result.is_responsive());
        }
    }

    mod real_time_tests {
        use super::*;

        #[tokio::test]
        async fn test_key_by_key_typing_converts() {
            let page = translator();
            assert!(page.verify_real_time_conversion("mama gedhara").await);
            assert!(page.driver().was_called("type_text"));
        }

        #[tokio::test]
        async fn test_errors_map_to_false() {
            let page = page_with(MockDriver::new().with_hidden(MockElement::Output));
            assert!(!page.verify_real_time_conversion("mama").await);
        }
    }

    mod screenshot_tests {
        use super::*;

        #[tokio::test]
        async fn test_screenshot_lands_in_dated_folder() {
            let dir = tempfile::tempdir().unwrap();
            let page = translator().with_screenshot_dir(dir.path());
            let path = page.take_screenshot("FAIL-Pos_Fun_0001").await.unwrap();
            assert!(path.ends_with("FAIL-Pos_Fun_0001.png"));
            let folder = path.parent().unwrap().file_name().unwrap().to_string_lossy();
            assert!(folder.starts_with("test_run_"));
            assert_eq!(folder.len(), "test_run_".len() + 8);
            assert_eq!(std::fs::read(&path).unwrap(), crate::driver::MOCK_PNG);
        }
    }
}
