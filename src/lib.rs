//! goalplan - turn a wish into a plan with an LLM
//!
//! goalplan asks a language model for three artifacts about a user's goal:
//! clarifying questions, a phased goal breakdown, and an implementation
//! plan. Model output is unreliable, so every response goes through the same
//! normalization pipeline before it is trusted:
//!
//! 1. strip a markdown code fence ([`extraction::extract`]),
//! 2. parse leniently with an ordered list of strategies ([`extraction::TolerantParser`]),
//! 3. validate required fields per artifact ([`validation::SchemaValidator`]),
//! 4. repair questions field by field, or fall back to a default set.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! goalplan goal create --wish "Run a marathon" --outcome "Finish under 4 hours"
//! goalplan questions 1
//! goalplan breakdown 1 --answers answers.json
//! goalplan plan 1 --json
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use goalplan::{ArtifactGenerator, Config, GeneratorSettings};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::builder().provider("gemini").build()?;
//! let backend = goalplan::llm::from_config(&config)?;
//! let generator = ArtifactGenerator::new(Arc::from(backend), GeneratorSettings::from_config(&config));
//!
//! let questions = generator.generate_questions("Run a marathon", "Finish under 4 hours").await;
//! for q in &questions.questions {
//!     println!("{}", q.question);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Stable Public API
//!
//! - [`ArtifactGenerator`] and [`GeneratorSettings`] - one-shot artifact generation
//! - [`GoalService`] - goal workflow over a [`GoalStore`]
//! - [`Config`] and [`ConfigBuilder`] - configuration management
//! - [`GoalplanError`] - library error type
//! - [`ExitCode`] - CLI exit codes
//!
//! Member crates are re-exported as modules and are not covered by semver
//! stability guarantees.

pub use goalplan_engine::{ArtifactGenerator, GeneratorSettings, GoalService};

/// Configuration with discovery and precedence: CLI > environment > config
/// file > defaults. Use [`Config::builder()`] for programmatic setup.
pub use goalplan_config::{CliArgs, Config, ConfigBuilder};

/// Library-level error type; [`GoalplanError::display_for_user`] renders it
/// with context and suggestions, [`GoalplanError::to_exit_code`] maps it to
/// an [`ExitCode`].
pub use goalplan_utils::error::{ErrorCategory, GenerationError, GoalplanError, UserFriendlyError};

pub use goalplan_utils::exit_codes::ExitCode;

pub use goalplan_model::{
    AnswerEntry, GoalBreakdown, GoalRecord, ImplementationPlan, NewGoal, Question, QuestionSet,
};
pub use goalplan_store::{FsGoalStore, GoalStore, MemoryGoalStore};

#[doc(hidden)]
pub use goalplan_config as config;
#[doc(hidden)]
pub use goalplan_extraction as extraction;
#[doc(hidden)]
pub use goalplan_llm as llm;
#[doc(hidden)]
pub use goalplan_model as model;
#[doc(hidden)]
pub use goalplan_prompt_template as prompt;
#[doc(hidden)]
pub use goalplan_store as store;
#[doc(hidden)]
pub use goalplan_utils::{error, exit_codes, logging, types};
#[doc(hidden)]
pub use goalplan_validation as validation;

// CLI internals, exported for the binary and white-box tests
#[doc(hidden)]
pub mod cli;
