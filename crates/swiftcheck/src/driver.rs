//! PageDriver - Abstract Browser Automation Trait
//!
//! The page adapter drives a [`PageDriver`]; the scenario runner opens one
//! page per test from a [`PageSource`]. Two implementations exist:
//!
//! - `ChromiumPage` / `Browser` (feature `browser`) - real CDP via chromiumoxide
//! - [`MockDriver`] / [`MockBrowser`] - an in-memory transliteration page for
//!   unit tests

use crate::locator::Locator;
use crate::page::PageLocators;
use crate::result::{SwiftError, SwiftResult};
use crate::wait::{LoadState, Timings};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Element-level operations on a single browser page
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL and wait for `load_state`
    async fn goto(&self, url: &str, load_state: LoadState, timings: &Timings) -> SwiftResult<()>;

    /// Whether the element is attached and visible
    async fn is_visible(&self, locator: &Locator) -> SwiftResult<bool>;

    /// The element's text content, `None` when it is not attached
    async fn text_content(&self, locator: &Locator) -> SwiftResult<Option<String>>;

    /// Click the element (focuses inputs)
    async fn click(&self, locator: &Locator) -> SwiftResult<()>;

    /// Select all content of an input element
    async fn select_all(&self, locator: &Locator) -> SwiftResult<()>;

    /// Press a named key (e.g. `Backspace`) on the element
    async fn press_key(&self, locator: &Locator, key: &str) -> SwiftResult<()>;

    /// Replace the input's content in one step
    async fn fill(&self, locator: &Locator, text: &str) -> SwiftResult<()>;

    /// Type text key by key with a delay between keystrokes
    async fn type_text(&self, locator: &Locator, text: &str, delay: Duration) -> SwiftResult<()>;

    /// Capture a PNG screenshot
    async fn screenshot(&self, full_page: bool) -> SwiftResult<Vec<u8>>;

    /// Current page URL
    async fn current_url(&self) -> SwiftResult<String>;

    /// Close the page
    async fn close(&self) -> SwiftResult<()>;
}

/// Opens fresh, isolated pages
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Page type produced by this source
    type Page: PageDriver + 'static;

    /// Open a new page
    async fn new_page(&self) -> SwiftResult<Self::Page>;
}

// ============================================================================
// Mock Implementation
// ============================================================================

/// PNG signature returned by mock screenshots
pub const MOCK_PNG: &[u8] = &[137, 80, 78, 71, 13, 10, 26, 10];

/// Elements the mock page knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockElement {
    /// Singlish input textarea
    Input,
    /// Sinhala output region
    Output,
    /// Clear button
    ClearButton,
}

/// Shared behaviour of mock pages
#[derive(Debug, Clone, Default)]
struct MockBehavior {
    /// Whole-input conversions, checked first
    phrases: HashMap<String, String>,
    /// Word conversions, applied per whitespace-separated word
    words: HashMap<String, String>,
    hidden: Vec<MockElement>,
    probe_error: Option<String>,
    /// Visibility checks fail once the output text has been read
    late_visibility_error: Option<String>,
    navigation_error: Option<String>,
    /// Output shown while the input is blank
    blank_output: String,
    /// Output keeps its last non-empty text after the input is cleared
    sticky_output: bool,
    /// Clicking the Clear button does nothing
    inert_clear_button: bool,
}

impl MockBehavior {
    fn convert(&self, input: &str) -> String {
        if input.trim().is_empty() {
            return String::new();
        }
        if let Some(out) = self.phrases.get(input) {
            return out.clone();
        }
        input
            .split(' ')
            .map(|word| self.words.get(word).map_or(word, String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Default)]
struct MockState {
    url: String,
    input: String,
    selected: bool,
    focused: bool,
    closed: bool,
    output_read: bool,
    last_output: String,
    history: Vec<String>,
}

impl MockState {
    fn output(&mut self, behavior: &MockBehavior) -> String {
        let converted = behavior.convert(&self.input);
        if !converted.is_empty() {
            self.last_output.clone_from(&converted);
            return converted;
        }
        if behavior.sticky_output && !self.last_output.is_empty() {
            return self.last_output.clone();
        }
        behavior.blank_output.clone()
    }
}

/// In-memory transliteration page for unit testing.
///
/// The output region shows the conversion of the current input as soon as
/// the input changes, like the hosted page does.
#[derive(Debug)]
pub struct MockDriver {
    locators: PageLocators,
    behavior: Arc<MockBehavior>,
    state: Mutex<MockState>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Create a mock page with the default locators and no conversions
    #[must_use]
    pub fn new() -> Self {
        Self::from_behavior(PageLocators::default(), Arc::new(MockBehavior::default()))
    }

    fn from_behavior(locators: PageLocators, behavior: Arc<MockBehavior>) -> Self {
        Self {
            locators,
            behavior,
            state: Mutex::new(MockState {
                url: String::from("about:blank"),
                ..MockState::default()
            }),
        }
    }

    /// Register a whole-input conversion
    #[must_use]
    pub fn with_phrase(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        let _ = Arc::make_mut(&mut self.behavior)
            .phrases
            .insert(input.into(), output.into());
        self
    }

    /// Register a single-word conversion
    #[must_use]
    pub fn with_word(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        let _ = Arc::make_mut(&mut self.behavior)
            .words
            .insert(input.into(), output.into());
        self
    }

    /// Make an element report as not visible
    #[must_use]
    pub fn with_hidden(mut self, element: MockElement) -> Self {
        Arc::make_mut(&mut self.behavior).hidden.push(element);
        self
    }

    /// Current input text
    #[must_use]
    pub fn input_text(&self) -> String {
        self.lock().input.clone()
    }

    /// Call history for verification
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(method))
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only means a test thread panicked mid-call
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn element(&self, locator: &Locator) -> SwiftResult<MockElement> {
        if *locator == self.locators.input {
            Ok(MockElement::Input)
        } else if *locator == self.locators.output {
            Ok(MockElement::Output)
        } else if *locator == self.locators.clear_button {
            Ok(MockElement::ClearButton)
        } else {
            Err(SwiftError::page(format!("no element matches {locator}")))
        }
    }

    fn record(&self, call: String) -> SwiftResult<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        if state.closed {
            return Err(SwiftError::page("Target page has been closed"));
        }
        state.history.push(call);
        Ok(state)
    }

    fn require_input(&self, locator: &Locator) -> SwiftResult<()> {
        match self.element(locator)? {
            MockElement::Input => Ok(()),
            other => Err(SwiftError::InputError {
                message: format!("{other:?} is not editable"),
            }),
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str, load_state: LoadState, _timings: &Timings) -> SwiftResult<()> {
        let mut state = self.record(format!("goto:{url}:{load_state}"))?;
        if let Some(message) = &self.behavior.navigation_error {
            return Err(SwiftError::NavigationError {
                url: url.to_string(),
                message: message.clone(),
            });
        }
        state.url = url.to_string();
        state.input.clear();
        state.selected = false;
        Ok(())
    }

    async fn is_visible(&self, locator: &Locator) -> SwiftResult<bool> {
        let element = self.element(locator)?;
        let state = self.record(format!("is_visible:{element:?}"))?;
        let late = self
            .behavior
            .late_visibility_error
            .as_ref()
            .filter(|_| state.output_read);
        if let Some(message) = self.behavior.probe_error.as_ref().or(late) {
            return Err(SwiftError::EvaluationError {
                message: message.clone(),
            });
        }
        Ok(!self.behavior.hidden.contains(&element))
    }

    async fn text_content(&self, locator: &Locator) -> SwiftResult<Option<String>> {
        let element = self.element(locator)?;
        let mut state = self.record(format!("text_content:{element:?}"))?;
        Ok(match element {
            MockElement::Input => Some(state.input.clone()),
            MockElement::Output => {
                state.output_read = true;
                Some(state.output(&self.behavior))
            }
            MockElement::ClearButton => Some(String::from("Clear")),
        })
    }

    async fn click(&self, locator: &Locator) -> SwiftResult<()> {
        let element = self.element(locator)?;
        let mut state = self.record(format!("click:{element:?}"))?;
        match element {
            MockElement::Input => {
                state.focused = true;
                state.selected = false;
            }
            MockElement::ClearButton if !self.behavior.inert_clear_button => {
                state.input.clear();
                state.selected = false;
            }
            MockElement::ClearButton => {}
            MockElement::Output => {}
        }
        Ok(())
    }

    async fn select_all(&self, locator: &Locator) -> SwiftResult<()> {
        self.require_input(locator)?;
        let mut state = self.record(String::from("select_all"))?;
        state.selected = true;
        Ok(())
    }

    async fn press_key(&self, locator: &Locator, key: &str) -> SwiftResult<()> {
        self.require_input(locator)?;
        let mut state = self.record(format!("press_key:{key}"))?;
        match key {
            "Backspace" | "Delete" => {
                if state.selected {
                    state.input.clear();
                } else {
                    let _ = state.input.pop();
                }
                state.selected = false;
            }
            other => {
                return Err(SwiftError::InputError {
                    message: format!("unsupported key '{other}'"),
                })
            }
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> SwiftResult<()> {
        self.require_input(locator)?;
        let mut state = self.record(format!("fill:{text}"))?;
        state.input = text.to_string();
        state.selected = false;
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, text: &str, delay: Duration) -> SwiftResult<()> {
        self.require_input(locator)?;
        drop(self.record(format!("type_text:{text}"))?);
        for ch in text.chars() {
            {
                let mut state = self.lock();
                if state.selected {
                    state.input.clear();
                    state.selected = false;
                }
                state.input.push(ch);
            }
            crate::wait::settle(delay).await;
        }
        Ok(())
    }

    async fn screenshot(&self, full_page: bool) -> SwiftResult<Vec<u8>> {
        let _state = self.record(format!("screenshot:{full_page}"))?;
        Ok(MOCK_PNG.to_vec())
    }

    async fn current_url(&self) -> SwiftResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn close(&self) -> SwiftResult<()> {
        let mut state = self.lock();
        state.history.push(String::from("close"));
        state.closed = true;
        Ok(())
    }
}

/// Source of [`MockDriver`] pages sharing one behaviour
#[derive(Debug, Default)]
pub struct MockBrowser {
    locators: PageLocators,
    behavior: Arc<MockBehavior>,
    pages_opened: AtomicUsize,
    failing_pages: AtomicUsize,
}

impl MockBrowser {
    /// Create a mock browser with no conversions
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a whole-input conversion for every page
    #[must_use]
    pub fn with_phrase(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        let _ = Arc::make_mut(&mut self.behavior)
            .phrases
            .insert(input.into(), output.into());
        self
    }

    /// Register a single-word conversion for every page
    #[must_use]
    pub fn with_word(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        let _ = Arc::make_mut(&mut self.behavior)
            .words
            .insert(input.into(), output.into());
        self
    }

    /// Hide an element on every page
    #[must_use]
    pub fn with_hidden(mut self, element: MockElement) -> Self {
        Arc::make_mut(&mut self.behavior).hidden.push(element);
        self
    }

    /// Make every visibility check fail at the driver level
    #[must_use]
    pub fn with_probe_error(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.behavior).probe_error = Some(message.into());
        self
    }

    /// Make visibility checks fail once a page's output has been read
    #[must_use]
    pub fn with_late_visibility_error(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.behavior).late_visibility_error = Some(message.into());
        self
    }

    /// Text the output region shows while the input is blank
    #[must_use]
    pub fn with_blank_output(mut self, text: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.behavior).blank_output = text.into();
        self
    }

    /// Keep the last conversion on screen after the input is cleared
    #[must_use]
    pub fn with_sticky_output(mut self) -> Self {
        Arc::make_mut(&mut self.behavior).sticky_output = true;
        self
    }

    /// Make the Clear button ignore clicks
    #[must_use]
    pub fn with_inert_clear_button(mut self) -> Self {
        Arc::make_mut(&mut self.behavior).inert_clear_button = true;
        self
    }

    /// Make every navigation fail
    #[must_use]
    pub fn with_navigation_error(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.behavior).navigation_error = Some(message.into());
        self
    }

    /// Make the first `count` opened pages fail navigation
    #[must_use]
    pub fn with_failing_pages(self, count: usize) -> Self {
        self.failing_pages.store(count, Ordering::SeqCst);
        self
    }

    /// Number of pages opened so far
    #[must_use]
    pub fn pages_opened(&self) -> usize {
        self.pages_opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for MockBrowser {
    type Page = MockDriver;

    async fn new_page(&self) -> SwiftResult<MockDriver> {
        let _ = self.pages_opened.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_pages
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let behavior = if failing {
            let mut behavior = (*self.behavior).clone();
            behavior.navigation_error = Some(String::from("net::ERR_CONNECTION_RESET"));
            Arc::new(behavior)
        } else {
            Arc::clone(&self.behavior)
        };
        Ok(MockDriver::from_behavior(self.locators.clone(), behavior))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page() -> MockDriver {
        MockDriver::new()
            .with_word("mama", "මම")
            .with_word("gedhara", "ගෙදර")
            .with_word("yanavaa", "යනවා")
    }

    mod conversion_tests {
        use super::*;

        #[test]
        fn test_word_conversion() {
            let behavior = page().behavior;
            assert_eq!(behavior.convert("mama gedhara yanavaa"), "මම ගෙදර යනවා");
        }

        #[test]
        fn test_unknown_words_pass_through() {
            let behavior = page().behavior;
            assert_eq!(behavior.convert("mama Zoom"), "මම Zoom");
        }

        #[test]
        fn test_blank_input_converts_to_nothing() {
            let behavior = page().behavior;
            assert_eq!(behavior.convert(""), "");
            assert_eq!(behavior.convert("   "), "");
        }

        #[test]
        fn test_phrase_wins_over_words() {
            let behavior = page().with_phrase("mama", "මං").behavior;
            assert_eq!(behavior.convert("mama"), "මං");
        }
    }

    mod async_driver_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_then_read_output() {
            let driver = page();
            let locators = PageLocators::default();
            driver.fill(&locators.input, "mama yanavaa").await.unwrap();
            let out = driver.text_content(&locators.output).await.unwrap();
            assert_eq!(out.as_deref(), Some("මම යනවා"));
            assert!(driver.was_called("fill"));
        }

        #[tokio::test]
        async fn test_select_all_then_backspace_clears() {
            let driver = page();
            let locators = PageLocators::default();
            driver.fill(&locators.input, "mama").await.unwrap();
            driver.select_all(&locators.input).await.unwrap();
            driver.press_key(&locators.input, "Backspace").await.unwrap();
            assert_eq!(driver.input_text(), "");
        }

        #[tokio::test]
        async fn test_backspace_without_selection_removes_one_char() {
            let driver = page();
            let locators = PageLocators::default();
            driver.fill(&locators.input, "mama").await.unwrap();
            driver.press_key(&locators.input, "Backspace").await.unwrap();
            assert_eq!(driver.input_text(), "mam");
        }

        #[tokio::test]
        async fn test_type_text_appends() {
            let driver = page();
            let locators = PageLocators::default();
            driver
                .type_text(&locators.input, "mama", Duration::ZERO)
                .await
                .unwrap();
            assert_eq!(driver.input_text(), "mama");
        }

        #[tokio::test]
        async fn test_output_is_not_editable() {
            let driver = page();
            let locators = PageLocators::default();
            let err = driver.fill(&locators.output, "x").await.unwrap_err();
            assert!(matches!(err, SwiftError::InputError { .. }));
        }

        #[tokio::test]
        async fn test_unknown_locator() {
            let driver = page();
            let err = driver
                .is_visible(&Locator::new("#nope"))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("#nope"));
        }

        #[tokio::test]
        async fn test_closed_page_rejects_calls() {
            let driver = page();
            driver.close().await.unwrap();
            let locators = PageLocators::default();
            assert!(driver.click(&locators.input).await.is_err());
        }

        #[tokio::test]
        async fn test_screenshot_is_png() {
            let bytes = page().screenshot(true).await.unwrap();
            assert_eq!(bytes, MOCK_PNG);
        }
    }

    mod mock_browser_tests {
        use super::*;

        #[tokio::test]
        async fn test_pages_are_isolated() {
            let browser = MockBrowser::new().with_word("mama", "මම");
            let locators = PageLocators::default();
            let first = browser.new_page().await.unwrap();
            let second = browser.new_page().await.unwrap();
            first.fill(&locators.input, "mama").await.unwrap();
            assert_eq!(second.input_text(), "");
            assert_eq!(browser.pages_opened(), 2);
        }

        #[tokio::test]
        async fn test_sticky_output_survives_clear() {
            let browser = MockBrowser::new().with_word("mama", "මම").with_sticky_output();
            let locators = PageLocators::default();
            let page = browser.new_page().await.unwrap();
            page.fill(&locators.input, "mama").await.unwrap();
            let _ = page.text_content(&locators.output).await.unwrap();
            page.fill(&locators.input, "").await.unwrap();
            let out = page.text_content(&locators.output).await.unwrap();
            assert_eq!(out.as_deref(), Some("මම"));
        }

        #[tokio::test]
        async fn test_blank_output_shown_for_empty_input() {
            let browser = MockBrowser::new().with_blank_output("ready");
            let locators = PageLocators::default();
            let page = browser.new_page().await.unwrap();
            let out = page.text_content(&locators.output).await.unwrap();
            assert_eq!(out.as_deref(), Some("ready"));
        }

        #[tokio::test]
        async fn test_late_visibility_error_arms_after_output_read() {
            let browser = MockBrowser::new().with_late_visibility_error("detached");
            let locators = PageLocators::default();
            let page = browser.new_page().await.unwrap();
            assert!(page.is_visible(&locators.output).await.unwrap());
            let _ = page.text_content(&locators.output).await.unwrap();
            assert!(page.is_visible(&locators.input).await.is_err());
        }

        #[tokio::test]
        async fn test_inert_clear_button_keeps_input() {
            let browser = MockBrowser::new().with_inert_clear_button();
            let locators = PageLocators::default();
            let page = browser.new_page().await.unwrap();
            page.fill(&locators.input, "mama").await.unwrap();
            page.click(&locators.clear_button).await.unwrap();
            assert_eq!(page.input_text(), "mama");
        }

        #[tokio::test]
        async fn test_failing_pages_then_recovery() {
            let browser = MockBrowser::new().with_failing_pages(1);
            let timings = Timings::instant();
            let first = browser.new_page().await.unwrap();
            assert!(first
                .goto("https://example.com", LoadState::NetworkIdle, &timings)
                .await
                .is_err());
            let second = browser.new_page().await.unwrap();
            second
                .goto("https://example.com", LoadState::NetworkIdle, &timings)
                .await
                .unwrap();
            assert_eq!(second.current_url().await.unwrap(), "https://example.com");
        }
    }
}
