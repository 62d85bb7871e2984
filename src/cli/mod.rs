//! Command-line interface for goalplan
//!
//! - `args`: clap argument definitions
//! - `run`: entry point, configuration, and error reporting
//! - `commands`: command implementations and output rendering

pub mod args;
mod commands;
mod run;

pub use args::{Cli, Commands, GoalCommands};
pub use run::run;
