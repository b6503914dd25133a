//! swiftcheck: checks the SwiftTranslator Singlish-to-Sinhala page
//!
//! ## Usage
//!
//! ```bash
//! swiftcheck run                          # Run every fixture record
//! swiftcheck run --category neg -j 2      # Negative records, two at a time
//! swiftcheck run --grep 'Pos_Fun_00(0|1)' # Filter by title
//! swiftcheck list --category ui           # Show fixture records
//! swiftcheck validate                     # Check fixture counts
//! ```

use clap::Parser;
use std::process::ExitCode;
use swiftcheck_cli::{
    init_logging, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, LogFormat,
    TestRunner, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::TestsFailed { failed, total }) => {
            tracing::info!(failed, total, "run finished with failures");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(&config);

    let mut runner = TestRunner::new(config);
    match cli.command {
        Commands::Run(args) => {
            let rt = tokio::runtime::Runtime::new()
                .map_err(|e| CliError::config(format!("failed to create runtime: {e}")))?;
            rt.block_on(runner.run(&args))
        }
        Commands::List(args) => runner.list(&args),
        Commands::Validate(args) => runner.validate(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    let log_format: LogFormat = cli.log_format.into();

    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_format(log_format)
}
