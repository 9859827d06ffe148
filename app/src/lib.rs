//! # primstage app
//!
//! The `primstage` command line front end: argument parsing, configuration,
//! command dispatch and report formatting.

pub mod args;
pub mod commands;
pub mod config;
pub mod report;

pub use args::{Cli, Command};
pub use commands::{run, CliError};
pub use config::Config;
