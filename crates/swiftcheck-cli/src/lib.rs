//! swiftcheck CLI library
//!
//! Command-line front end for the swiftcheck suite: `run` drives the live
//! page, `list` prints the fixture, `validate` checks its counts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod runner;

pub use commands::{
    CategoryArg, Cli, ColorArg, Commands, ListArgs, LogFormatArg, PolicyArg, RunArgs,
    ValidateArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::{env_filter, init_logging};
pub use output::{render_listing, ProgressReporter};
pub use runner::{apply_run_args, resolve_config, TestRunner};
