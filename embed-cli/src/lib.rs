//! # embed-cli
//!
//! Command-line front end over `embedding-router`: argument parsing, env config, JSON output.

pub mod cli;

pub use cli::{provider_config, summarize, Cli, Commands, InputArgs};
