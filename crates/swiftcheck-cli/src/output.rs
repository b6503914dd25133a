//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use swiftcheck::{Category, RunSummary, TestCase, TestOutcome};

/// Progress reporter for test execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar for multiple tests
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Report one finished test and advance the bar
    pub fn outcome(&self, outcome: &TestOutcome) {
        if outcome.is_passed() {
            let note = if outcome.documented_mismatch {
                " (mismatch documented)"
            } else {
                ""
            };
            self.success(&format!("{}{note}", outcome.title));
        } else {
            let reason = outcome
                .failure
                .as_ref()
                .map_or_else(String::new, |f| format!(": {f}"));
            self.failure(&format!("{}{reason}", outcome.title));
        }
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn line(&self, text: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.println(text),
            None => {
                let _ = self.term.write_line(text);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print the final one-line verdict
    pub fn verdict(&self, summary: &RunSummary) {
        if self.quiet && summary.all_passed() {
            return;
        }
        let status = if summary.all_passed() { "PASSED" } else { "FAILED" };
        let status = if self.use_color {
            let s = if summary.all_passed() {
                Style::new().green().bold()
            } else {
                Style::new().red().bold()
            };
            s.apply_to(status).to_string()
        } else {
            status.to_string()
        };
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!("{status} {}", summary.one_line()));
    }
}

/// Render fixture records grouped by category
#[must_use]
pub fn render_listing(cases: &[&TestCase]) -> String {
    let mut groups: BTreeMap<Category, Vec<&TestCase>> = BTreeMap::new();
    for case in cases {
        groups.entry(case.category).or_default().push(case);
    }

    let mut out = String::new();
    for (category, members) in &groups {
        out.push_str(&format!("{} ({})\n", category.title(), members.len()));
        for case in members {
            let name = case.name.as_deref().unwrap_or("");
            out.push_str(&format!("  {:<14} {:<40} {}\n", case.id, case.input, name));
        }
        out.push('\n');
    }
    out.push_str(&format!("{} records\n", cases.len()));
    out
}
