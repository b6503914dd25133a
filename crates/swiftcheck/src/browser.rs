//! Browser control for the transliteration page.
//!
//! With the `browser` feature this module launches Chromium over the Chrome
//! `DevTools` Protocol (chromiumoxide) and exposes it as a [`PageSource`]
//! whose pages implement [`PageDriver`]. Without the feature only
//! [`BrowserConfig`] is available and runs use the in-memory driver.
//!
//! [`PageSource`]: crate::driver::PageSource
//! [`PageDriver`]: crate::driver::PageDriver

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            user_agent: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set user agent
    #[must_use]
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::cast_possible_wrap)]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{PageDriver, PageSource};
    use crate::locator::Locator;
    use crate::result::{SwiftError, SwiftResult};
    use crate::wait::{self, InflightRequests, LoadState, Timings};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use chromiumoxide::cdp::browser_protocol::network::{
        EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
    };
    use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
    use chromiumoxide::cdp::browser_protocol::target::{
        CreateBrowserContextParams, CreateTargetParams,
    };
    use chromiumoxide::element::Element;
    use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
    use futures::{stream, StreamExt};
    use serde::de::DeserializeOwned;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;
    use tokio::time::Instant;

    fn page_error(e: impl std::fmt::Display) -> SwiftError {
        SwiftError::page(e.to_string())
    }

    /// Blank page opened inside `context`
    fn isolated_target(context: &BrowserContextId) -> SwiftResult<CreateTargetParams> {
        CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context.clone())
            .build()
            .map_err(SwiftError::page)
    }

    fn png_capture(full_page: bool) -> ScreenshotParams {
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(full_page)
            .build()
    }

    /// Deserialize an evaluation result where JS `null` or `undefined` means `None`
    fn optional_value<T: DeserializeOwned>(
        value: Option<&serde_json::Value>,
    ) -> SwiftResult<Option<T>> {
        match value {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| SwiftError::EvaluationError {
                    message: e.to_string(),
                }),
        }
    }

    enum NetworkEvent {
        Started(String),
        Done(String),
    }

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
        pages_opened: AtomicUsize,
    }

    impl Browser {
        /// Launch a new browser instance
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> SwiftResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            if let Some(ref ua) = config.user_agent {
                builder = builder.arg(format!("--user-agent={ua}"));
            }

            let cdp_config = builder
                .build()
                .map_err(|message| SwiftError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                SwiftError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(
                headless = config.headless,
                width = config.viewport_width,
                height = config.viewport_height,
                "launched chromium"
            );

            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
                pages_opened: AtomicUsize::new(0),
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Number of pages opened so far
        #[must_use]
        pub fn pages_opened(&self) -> usize {
            self.pages_opened.load(Ordering::SeqCst)
        }

        async fn open_isolated(&self) -> SwiftResult<(CdpPage, BrowserContextId)> {
            let context = self
                .inner
                .lock()
                .await
                .create_browser_context(CreateBrowserContextParams::default())
                .await
                .map_err(page_error)?;
            let opened = async {
                let target = isolated_target(&context)?;
                self.inner.lock().await.new_page(target).await.map_err(page_error)
            }
            .await;
            match opened {
                Ok(page) => Ok((page, context)),
                Err(e) => {
                    self.dispose(context).await;
                    Err(e)
                }
            }
        }

        async fn prepare(&self, page: &CdpPage) -> SwiftResult<NetworkTracker> {
            let network = track_requests(page).await?;
            let metrics = SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(self.config.viewport_width))
                .height(i64::from(self.config.viewport_height))
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(SwiftError::page);
            let applied = match metrics {
                Ok(metrics) => page.execute(metrics).await.map_err(page_error).map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = applied {
                network.task.abort();
                return Err(e);
            }
            Ok(network)
        }

        async fn dispose(&self, context: BrowserContextId) {
            if let Err(e) = self.inner.lock().await.dispose_browser_context(context).await {
                tracing::debug!(error = %e, "disposing browser context failed");
            }
        }

        /// Close the browser
        pub async fn close(self) -> SwiftResult<()> {
            {
                let mut browser = self.inner.lock().await;
                let _ = browser.close().await.map_err(page_error)?;
                let _ = browser.wait().await;
            }
            self.handle.abort();
            Ok(())
        }
    }

    #[async_trait]
    impl PageSource for Browser {
        type Page = ChromiumPage;

        /// Each page gets its own browser context, so no cookies or
        /// storage leak between tests.
        async fn new_page(&self) -> SwiftResult<ChromiumPage> {
            let (inner, context) = self.open_isolated().await?;
            let network = match self.prepare(&inner).await {
                Ok(network) => network,
                Err(e) => {
                    self.dispose(context).await;
                    return Err(e);
                }
            };
            let _ = self.pages_opened.fetch_add(1, Ordering::SeqCst);
            Ok(ChromiumPage {
                inner,
                browser: Arc::clone(&self.inner),
                context,
                network,
            })
        }
    }

    /// Requests in flight on `page`, fed by network events until the page closes
    async fn track_requests(page: &CdpPage) -> SwiftResult<NetworkTracker> {
        let sent = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(page_error)?
            .map(|e| NetworkEvent::Started(e.request_id.inner().clone()));
        let finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(page_error)?
            .map(|e| NetworkEvent::Done(e.request_id.inner().clone()));
        let failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(page_error)?
            .map(|e| NetworkEvent::Done(e.request_id.inner().clone()));

        let requests = Arc::new(Mutex::new(InflightRequests::new(Instant::now())));
        let shared = Arc::clone(&requests);
        let mut events = stream::select(sent, stream::select(finished, failed));
        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let mut requests = shared.lock().await;
                match event {
                    NetworkEvent::Started(id) => requests.started(id),
                    NetworkEvent::Done(id) => requests.finished(&id, Instant::now()),
                }
            }
        });
        Ok(NetworkTracker { requests, task })
    }

    #[derive(Debug)]
    struct NetworkTracker {
        requests: Arc<Mutex<InflightRequests>>,
        task: JoinHandle<()>,
    }

    /// A browser page with real CDP connection, alone in its browser context
    #[derive(Debug)]
    pub struct ChromiumPage {
        inner: CdpPage,
        browser: Arc<Mutex<CdpBrowser>>,
        context: BrowserContextId,
        network: NetworkTracker,
    }

    impl ChromiumPage {
        async fn eval<T: DeserializeOwned>(&self, expression: String) -> SwiftResult<T> {
            self.inner
                .evaluate(expression)
                .await
                .map_err(|e| SwiftError::EvaluationError {
                    message: e.to_string(),
                })?
                .into_value::<T>()
                .map_err(|e| SwiftError::EvaluationError {
                    message: e.to_string(),
                })
        }

        async fn eval_optional<T: DeserializeOwned>(&self, expression: String) -> SwiftResult<Option<T>> {
            let result = self
                .inner
                .evaluate(expression)
                .await
                .map_err(|e| SwiftError::EvaluationError {
                    message: e.to_string(),
                })?;
            optional_value(result.value())
        }

        async fn element(&self, locator: &Locator) -> SwiftResult<Element> {
            let css = locator.selector().as_css().ok_or_else(|| SwiftError::InputError {
                message: format!("{locator} cannot receive keyboard input"),
            })?;
            self.inner
                .find_element(css)
                .await
                .map_err(|e| SwiftError::InputError {
                    message: format!("{locator}: {e}"),
                })
        }

        /// Run `body` with `el` bound to the element; fails when it is absent
        async fn with_element(&self, locator: &Locator, body: &str) -> SwiftResult<()> {
            let script = format!(
                "(() => {{ const el = {}; if (!el) return false; {body} return true; }})()",
                locator.selector().to_query()
            );
            if self.eval::<bool>(script).await? {
                Ok(())
            } else {
                Err(SwiftError::InputError {
                    message: format!("no element matches {locator}"),
                })
            }
        }

        async fn wait_for_ready_state(&self, state: LoadState, timings: &Timings) -> SwiftResult<()> {
            let accepted = state.ready_states();
            wait::wait_until(
                &format!("wait for {state}"),
                timings.navigation_timeout(),
                timings.poll_interval(),
                || async move {
                    let ready: String = self.eval(String::from("document.readyState")).await?;
                    Ok(accepted.contains(&ready.as_str()))
                },
            )
            .await
        }

        async fn wait_for_network_idle(&self, timings: &Timings) -> SwiftResult<()> {
            let idle_for = timings.network_idle();
            let requests = &self.network.requests;
            requests.lock().await.restart_quiet(Instant::now());
            wait::wait_until(
                "wait for networkidle",
                timings.navigation_timeout(),
                timings.poll_interval().max(Duration::from_millis(1)),
                || async move { Ok(requests.lock().await.is_idle(Instant::now(), idle_for)) },
            )
            .await
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumPage {
        async fn goto(&self, url: &str, load_state: LoadState, timings: &Timings) -> SwiftResult<()> {
            let navigation = tokio::time::timeout(timings.navigation_timeout(), self.inner.goto(url))
                .await
                .map_err(|_| SwiftError::timeout(format!("navigate to {url}"), timings.navigation_timeout_ms))?;
            let _ = navigation.map_err(|e| SwiftError::NavigationError {
                url: url.to_string(),
                message: e.to_string(),
            })?;

            self.wait_for_ready_state(load_state, timings).await?;
            if load_state == LoadState::NetworkIdle {
                self.wait_for_network_idle(timings).await?;
            }
            tracing::debug!(url, %load_state, "page loaded");
            Ok(())
        }

        async fn is_visible(&self, locator: &Locator) -> SwiftResult<bool> {
            self.eval(locator.selector().to_visibility_query()).await
        }

        async fn text_content(&self, locator: &Locator) -> SwiftResult<Option<String>> {
            self.eval_optional(locator.selector().to_text_query()).await
        }

        async fn click(&self, locator: &Locator) -> SwiftResult<()> {
            if locator.selector().as_css().is_some() {
                let element = self.element(locator).await?;
                let _ = element.click().await.map_err(|e| SwiftError::InputError {
                    message: e.to_string(),
                })?;
                Ok(())
            } else {
                self.with_element(locator, "el.click();").await
            }
        }

        async fn select_all(&self, locator: &Locator) -> SwiftResult<()> {
            self.with_element(locator, "el.focus(); if (el.select) { el.select(); }")
                .await
        }

        async fn press_key(&self, locator: &Locator, key: &str) -> SwiftResult<()> {
            let element = self.element(locator).await?;
            let _ = element
                .press_key(key)
                .await
                .map_err(|e| SwiftError::InputError {
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn fill(&self, locator: &Locator, text: &str) -> SwiftResult<()> {
            let value = serde_json::to_string(text)?;
            let body = format!(
                "el.focus(); \
                 const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value').set; \
                 setter.call(el, {value}); \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }}));"
            );
            self.with_element(locator, &body).await
        }

        async fn type_text(&self, locator: &Locator, text: &str, delay: Duration) -> SwiftResult<()> {
            let element = self.element(locator).await?;
            let mut buf = [0u8; 4];
            for ch in text.chars() {
                let _ = element
                    .type_str(ch.encode_utf8(&mut buf))
                    .await
                    .map_err(|e| SwiftError::InputError {
                        message: e.to_string(),
                    })?;
                wait::settle(delay).await;
            }
            Ok(())
        }

        async fn screenshot(&self, full_page: bool) -> SwiftResult<Vec<u8>> {
            self.inner
                .screenshot(png_capture(full_page))
                .await
                .map_err(|e| SwiftError::ScreenshotError {
                    message: e.to_string(),
                })
        }

        async fn current_url(&self) -> SwiftResult<String> {
            let url = self.inner.url().await.map_err(page_error)?;
            Ok(url.unwrap_or_else(|| String::from("about:blank")))
        }

        async fn close(&self) -> SwiftResult<()> {
            self.network.task.abort();
            let closed = self.inner.clone().close().await.map_err(page_error);
            let browser = self.browser.lock().await;
            browser
                .dispose_browser_context(self.context.clone())
                .await
                .map_err(page_error)?;
            closed
        }
    }

    #[cfg(test)]
    #[allow(clippy::unwrap_used)]
    mod tests {
        use super::*;

        #[test]
        fn test_pages_open_in_their_own_context() {
            let context = BrowserContextId::new("ctx-1");
            let target = isolated_target(&context).unwrap();
            assert_eq!(target.url, "about:blank");
            assert_eq!(target.browser_context_id, Some(context));
        }

        #[test]
        fn test_capture_covers_whole_page() {
            let params = png_capture(true);
            assert_eq!(params.full_page, Some(true));
            assert_eq!(params.cdp_params.format, Some(CaptureScreenshotFormat::Png));
        }

        #[test]
        fn test_null_text_is_absent() {
            let null = serde_json::Value::Null;
            assert_eq!(optional_value::<String>(Some(&null)).unwrap(), None);
            assert_eq!(optional_value::<String>(None).unwrap(), None);
        }

        #[test]
        fn test_text_value_is_present() {
            let text = serde_json::json!("මම");
            assert_eq!(
                optional_value::<String>(Some(&text)).unwrap(),
                Some("මම".to_string())
            );
        }

        #[test]
        fn test_wrong_type_is_evaluation_error() {
            let number = serde_json::json!(3);
            let err = optional_value::<String>(Some(&number)).unwrap_err();
            assert!(matches!(err, SwiftError::EvaluationError { .. }));
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Browser, ChromiumPage};
