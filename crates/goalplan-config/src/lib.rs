//! Configuration management for goalplan
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > environment > file > defaults. The TOML file supports `[defaults]`,
//! `[llm]` (with `[llm.gemini]` / `[llm.anthropic]`), and `[store]` sections.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use goalplan_utils::types::ConfigSource;
pub use model::*;
pub use discovery::{ENV_HOME, ENV_MODEL, ENV_PROVIDER};
