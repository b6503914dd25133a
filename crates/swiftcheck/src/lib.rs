//! swiftcheck: fixture-driven end-to-end checks for a Singlish-to-Sinhala
//! transliteration page.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SWIFTCHECK Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Fixture    │    │ Scenario   │    │ Translator │            │
//! │   │ Store      │───►│ Runner     │───►│ Page       │──► page    │
//! │   │ (JSON)     │    │            │    │ (driver)   │            │
//! │   └────────────┘    └─────┬──────┘    └────────────┘            │
//! │                           ▼                                     │
//! │                    ┌────────────┐                               │
//! │                    │ Aggregator │──► summary / JSON / HTML /    │
//! │                    │            │    JUnit                      │
//! │                    └────────────┘                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Real browser control needs the `browser` feature (chromiumoxide). Every
//! layer above the driver also runs against [`MockDriver`], an in-memory
//! page used by the unit tests.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod browser;
mod category;
mod config;
mod driver;
mod fixture;
mod locator;
mod page;
mod reporter;
mod result;
mod scenario;
mod wait;

pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{Browser, ChromiumPage};
pub use category::{Category, NEGATIVE_PREFIX, POSITIVE_PREFIX, UI_PREFIX};
pub use config::{
    ci_from_env, ArtifactPaths, RunConfig, CI_RETRIES, DEFAULT_CONFIG_FILE, DEFAULT_FIXTURE_PATH,
};
pub use driver::{MockBrowser, MockDriver, MockElement, PageDriver, PageSource, MOCK_PNG};
pub use fixture::{FixtureStore, RawRecord, TestCase};
pub use locator::{Locator, Selector};
pub use page::{
    run_folder, PageLocators, Responsiveness, TranslatorPage, DEFAULT_BASE_URL, INPUT_SELECTOR,
    OUTPUT_SELECTOR,
};
pub use reporter::{Aggregator, CategoryTally, ExpectedCounts, RunSummary};
pub use result::{SwiftError, SwiftResult};
pub use scenario::{
    CaseFilter, Failure, InteractionResult, NegativePolicy, ScenarioRunner, TestOutcome,
    TestStatus,
};
pub use wait::{settle, wait_until, InflightRequests, LoadState, Timings};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        Aggregator, Category, FixtureStore, PageDriver, PageSource, RunConfig, RunSummary,
        ScenarioRunner, SwiftError, SwiftResult, TestCase, TestOutcome, Timings, TranslatorPage,
    };
}
