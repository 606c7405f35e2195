//! Pagewire CLI Library
//!
//! Command-line front end for the Pagewire harness: lint page files, inspect
//! test data, decode credentials and check a live session.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;

#[cfg(feature = "webdriver")]
pub use commands::CheckArgs;
pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, DataArgs, DecryptArgs, LintArgs, OutputFormat, ParseArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
