//! Command implementations

use crate::commands::{CategoryArg, ListArgs, RunArgs, ValidateArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{render_listing, ProgressReporter};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use swiftcheck::{
    ci_from_env, ArtifactPaths, CaseFilter, Category, FixtureStore, RunConfig, RunSummary,
    DEFAULT_CONFIG_FILE,
};

/// Load the run configuration: defaults, then the config file, then CI
/// overrides. Command-line flags are applied by the caller.
pub fn resolve_config(explicit: Option<&Path>) -> CliResult<RunConfig> {
    let config = match explicit {
        Some(path) => RunConfig::load(path)?,
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                RunConfig::load(&default)?
            } else {
                RunConfig::default()
            }
        }
    };
    Ok(config.with_ci(ci_from_env()))
}

/// Apply `run` flags on top of a resolved configuration
#[must_use]
pub fn apply_run_args(mut config: RunConfig, args: &RunArgs) -> RunConfig {
    if let Some(ref fixture) = args.fixture {
        config.fixture.clone_from(fixture);
    }
    if let Some(ref url) = args.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(workers) = args.workers {
        config.workers = Some(workers);
    }
    if let Some(retries) = args.retries {
        config.retries = retries;
    }
    if let Some(policy) = args.negative_policy {
        config.negative_policy = policy.into();
    }
    if let Some(ref dir) = args.output {
        config.artifacts = ArtifactPaths::rooted_at(dir);
    }
    if args.realtime_checks {
        config.realtime_checks = true;
    }
    if args.headed {
        config.browser.headless = false;
    }
    if args.no_sandbox {
        config.browser.sandbox = false;
    }
    if let Some(ref path) = args.chromium {
        config.browser.chromium_path = Some(path.clone());
    }
    config
}

fn case_filter(categories: &[CategoryArg], grep: Option<&str>) -> CliResult<CaseFilter> {
    let mut filter = categories
        .iter()
        .fold(CaseFilter::all(), |f, c| f.with_category(Category::from(*c)));
    if let Some(pattern) = grep {
        filter = filter.with_grep(pattern)?;
    }
    Ok(filter)
}

/// Runs CLI commands
#[derive(Debug)]
pub struct TestRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl TestRunner {
    /// Create a new test runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// `list`: print records grouped by category
    pub fn list(&self, args: &ListArgs) -> CliResult<()> {
        let mut config = resolve_config(args.config.as_deref())?;
        if let Some(ref fixture) = args.fixture {
            config.fixture.clone_from(fixture);
        }
        let store = FixtureStore::load(&config.fixture)?;
        let filter = case_filter(&args.category, None)?;
        let selected: Vec<_> = store.cases().iter().filter(|c| filter.matches(c)).collect();

        if args.json {
            let json = serde_json::to_string_pretty(&selected)
                .map_err(|e| CliError::report_generation(e.to_string()))?;
            println!("{json}");
        } else {
            print!("{}", render_listing(&selected));
        }
        Ok(())
    }

    /// `validate`: load the fixture and compare counts with the expectation
    pub fn validate(&self, args: &ValidateArgs) -> CliResult<()> {
        let mut config = resolve_config(args.config.as_deref())?;
        if let Some(ref fixture) = args.fixture {
            config.fixture.clone_from(fixture);
        }
        let store = FixtureStore::load(&config.fixture)?;

        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = store
            .cases()
            .iter()
            .filter(|c| !seen.insert(c.id.as_str()))
            .map(|c| c.id.as_str())
            .collect();

        let counts = store.counts();
        let mut problems = Vec::new();
        for category in Category::ALL {
            let actual = counts.get(&category).copied().unwrap_or_default();
            let expected = config.expected.for_category(category);
            let status = if actual == expected { "PASS" } else { "FAIL" };
            println!(
                "{:<22} required {expected:>3}  actual {actual:>3}  {status}",
                category.suite_name()
            );
            if actual != expected {
                problems.push(format!("{category}: expected {expected}, found {actual}"));
            }
        }
        let total_status = if store.len() == config.expected.total() {
            "COMPLETE"
        } else {
            "MISSING"
        };
        println!(
            "{:<22} required {:>3}  actual {:>3}  {total_status}",
            "total",
            config.expected.total(),
            store.len()
        );

        if !duplicates.is_empty() {
            problems.push(format!("duplicate ids: {}", duplicates.join(", ")));
        }
        if problems.is_empty() {
            self.reporter
                .info(&format!("{} is valid", config.fixture.display()));
            Ok(())
        } else {
            Err(CliError::validation(problems.join("; ")))
        }
    }

    /// `run`: drive the live page and write the reports
    pub async fn run(&mut self, args: &RunArgs) -> CliResult<()> {
        let config = apply_run_args(resolve_config(args.config.as_deref())?, args);
        let store = FixtureStore::load(&config.fixture)?;
        let filter = case_filter(&args.category, args.grep.as_deref())?;
        let cases = filter.select(store.cases());
        if cases.is_empty() {
            return Err(CliError::invalid_argument(
                "no fixture records match the selection",
            ));
        }
        self.reporter.info(&format!(
            "running {} of {} records from {}",
            cases.len(),
            store.len(),
            config.fixture.display()
        ));

        let summary = self.execute(&config, &cases).await?;

        print!("{}", summary.render_summary());
        self.write_artifacts(&config, &summary)?;
        self.reporter.verdict(&summary);

        if summary.all_passed() {
            Ok(())
        } else {
            Err(CliError::TestsFailed {
                failed: summary.overall.failed,
                total: summary.overall.total(),
            })
        }
    }

    #[cfg(feature = "browser")]
    async fn execute(
        &mut self,
        config: &RunConfig,
        cases: &[swiftcheck::TestCase],
    ) -> CliResult<RunSummary> {
        use swiftcheck::{Aggregator, Browser};

        let browser = Browser::launch(config.browser.clone()).await?;
        let runner = config.runner(browser);

        self.reporter
            .start_progress(cases.len() as u64, "checking transliterations");
        let started = std::time::Instant::now();
        let reporter = &self.reporter;
        let outcomes = runner.run(cases, |outcome| reporter.outcome(outcome)).await;
        self.reporter.finish();

        let mut aggregator = Aggregator::new(config.expected);
        for outcome in &outcomes {
            aggregator.record(outcome);
        }

        if let Err(e) = runner.into_source().close().await {
            tracing::warn!(error = %e, "closing browser failed");
        }
        Ok(aggregator.finish(started.elapsed()))
    }

    #[cfg(not(feature = "browser"))]
    #[allow(clippy::unused_async)]
    async fn execute(
        &mut self,
        _config: &RunConfig,
        _cases: &[swiftcheck::TestCase],
    ) -> CliResult<RunSummary> {
        Err(CliError::config(
            "browser support not enabled. Rebuild with --features browser",
        ))
    }

    fn write_artifacts(&self, config: &RunConfig, summary: &RunSummary) -> CliResult<()> {
        let paths = &config.artifacts;
        summary
            .write_json(&paths.results_json)
            .map_err(|e| CliError::report_generation(e.to_string()))?;
        summary
            .generate_html(&paths.html_report)
            .map_err(|e| CliError::report_generation(e.to_string()))?;
        summary
            .generate_junit(&paths.junit_xml)
            .map_err(|e| CliError::report_generation(e.to_string()))?;
        self.reporter.info(&format!(
            "reports written to {}, {} and {}",
            paths.results_json.display(),
            paths.html_report.display(),
            paths.junit_xml.display()
        ));
        let failures = summary.failures();
        if let Some(shot) = failures.iter().find_map(|o| o.screenshot.as_ref()) {
            if let Some(dir) = shot.parent() {
                self.reporter
                    .warning(&format!("failure screenshots in {}", dir.display()));
            }
        }
        Ok(())
    }
}
