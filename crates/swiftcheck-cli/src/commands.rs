//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use swiftcheck::{Category, NegativePolicy};

/// swiftcheck: fixture-driven checks of the SwiftTranslator Singlish-to-Sinhala page
#[derive(Parser, Debug)]
#[command(name = "swiftcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (summary and failures only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the fixture against the live page
    Run(RunArgs),

    /// List fixture records by category
    List(ListArgs),

    /// Check the fixture loads and has the expected counts
    Validate(ValidateArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Fixture file (JSON array of records)
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Only run these categories (repeatable)
    #[arg(long, value_enum)]
    pub category: Vec<CategoryArg>,

    /// Only run tests whose title matches this regex
    #[arg(short, long)]
    pub grep: Option<String>,

    /// Number of tests in flight at once
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Retries for a failed test
    #[arg(long)]
    pub retries: Option<u32>,

    /// Verdict for negative-category mismatches
    #[arg(long, value_enum)]
    pub negative_policy: Option<PolicyArg>,

    /// Also check key-by-key conversion and the Clear button on UI records
    #[arg(long)]
    pub realtime_checks: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the Chromium sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Chromium executable
    #[arg(long, env = "CHROME_PATH")]
    pub chromium: Option<String>,

    /// Page under test
    #[arg(long)]
    pub base_url: Option<String>,

    /// Root directory for screenshots and reports
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (defaults to ./swiftcheck.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug, Default)]
pub struct ListArgs {
    /// Fixture file (JSON array of records)
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Only list these categories (repeatable)
    #[arg(long, value_enum)]
    pub category: Vec<CategoryArg>,

    /// Print records as JSON
    #[arg(long)]
    pub json: bool,

    /// Config file (defaults to ./swiftcheck.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Default)]
pub struct ValidateArgs {
    /// Fixture file (JSON array of records)
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Config file (defaults to ./swiftcheck.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Test category argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryArg {
    /// Positive functional records (`Pos_Fun_`)
    #[value(alias = "positive")]
    Pos,
    /// Negative functional records (`Neg_`)
    #[value(alias = "negative")]
    Neg,
    /// UI records (`Pos_UI_`)
    Ui,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Pos => Self::Positive,
            CategoryArg::Neg => Self::Negative,
            CategoryArg::Ui => Self::Ui,
        }
    }
}

/// Negative policy argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    /// Mismatch fails the test
    Strict,
    /// Mismatch is recorded and the test passes
    Document,
}

impl From<PolicyArg> for NegativePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Strict => Self::Strict,
            PolicyArg::Document => Self::Document,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    mod run_args_tests {
        use super::*;

        #[test]
        fn test_run_defaults() {
            let cli = Cli::try_parse_from(["swiftcheck", "run"]).unwrap();
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert!(args.fixture.is_none());
            assert!(args.category.is_empty());
            assert!(!args.headed);
        }

        #[test]
        fn test_run_flags() {
            let cli = Cli::try_parse_from([
                "swiftcheck",
                "-vv",
                "run",
                "--fixture",
                "data.json",
                "--category",
                "neg",
                "--category",
                "ui",
                "-j",
                "4",
                "--retries",
                "1",
                "--negative-policy",
                "document",
                "--grep",
                "Neg_Fun_000[1-3]",
                "--headed",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 2);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.fixture, Some(PathBuf::from("data.json")));
            assert_eq!(args.category, vec![CategoryArg::Neg, CategoryArg::Ui]);
            assert_eq!(args.workers, Some(4));
            assert_eq!(args.retries, Some(1));
            assert_eq!(args.negative_policy, Some(PolicyArg::Document));
            assert!(args.headed);
        }

        #[test]
        fn test_category_alias() {
            let cli =
                Cli::try_parse_from(["swiftcheck", "list", "--category", "positive"]).unwrap();
            let Commands::List(args) = cli.command else {
                panic!("expected list");
            };
            assert_eq!(Category::from(args.category[0]), Category::Positive);
        }

        #[test]
        fn test_bad_policy_rejected() {
            assert!(
                Cli::try_parse_from(["swiftcheck", "run", "--negative-policy", "lenient"]).is_err()
            );
        }
    }

    mod global_args_tests {
        use super::*;

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = Cli::try_parse_from([
                "swiftcheck",
                "validate",
                "-q",
                "--color",
                "never",
                "--log-format",
                "json",
            ])
            .unwrap();
            assert!(cli.quiet);
            assert!(matches!(cli.color, ColorArg::Never));
            assert!(matches!(cli.log_format, LogFormatArg::Json));
        }
    }
}
