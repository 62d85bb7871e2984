//! CLI argument definitions and parsing structures

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// goalplan - turn a wish into a plan with an LLM
#[derive(Parser, Debug)]
#[command(name = "goalplan")]
#[command(about = "Turn a wish into clarifying questions, a phased breakdown and an implementation plan")]
#[command(long_about = r#"
goalplan asks an LLM to turn a wish and a desired outcome into clarifying
questions, a staged goal breakdown, and an implementation plan. Model output
is extracted, parsed leniently, validated, and stored per user.

EXAMPLES:
  # Record a goal
  goalplan goal create --wish "Learn to sail" --outcome "Cross the channel"

  # Ask for clarifying questions
  goalplan questions 1

  # Break the goal down using your answers (JSON list or map)
  goalplan breakdown 1 --answers answers.json --phases 4

  # Generate the implementation plan
  goalplan plan 1 --json

CONFIGURATION:
  Precedence: CLI flags > environment > config file > defaults
  The config file is discovered by searching upward from CWD for .goalplan/config.toml
  API keys are read from GEMINI_API_KEY or ANTHROPIC_API_KEY
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// User whose goals are addressed
    #[arg(long, global = true, env = "GOALPLAN_USER", default_value = "local")]
    pub user: String,

    /// LLM provider (gemini or anthropic)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model to use for LLM calls
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Reject breakdowns that do not have the requested number of phases
    #[arg(long, global = true)]
    pub strict_phases: bool,

    /// Directory holding goal records
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Print machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, list, show or delete goals
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Generate clarifying questions for a goal
    Questions {
        /// Goal id
        id: u64,
    },

    /// Generate a goal breakdown from answers and store both
    Breakdown {
        /// Goal id
        id: u64,

        /// JSON file with the answers, as a list of {question, answer} or a map
        #[arg(long)]
        answers: PathBuf,

        /// Number of phases to ask for
        #[arg(long)]
        phases: Option<usize>,
    },

    /// Generate a new breakdown from the stored answers
    Regenerate {
        /// Goal id
        id: u64,

        /// Number of phases to ask for
        #[arg(long)]
        phases: usize,
    },

    /// Generate the implementation plan for the stored breakdown
    Plan {
        /// Goal id
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// Record a new goal
    Create(CreateGoal),

    /// List your goals
    List,

    /// Show a goal with its stored artifacts
    Show {
        /// Goal id
        id: u64,
    },

    /// Delete a goal
    Delete {
        /// Goal id
        id: u64,
    },
}

#[derive(Args, Debug)]
pub struct CreateGoal {
    /// What you want
    #[arg(long)]
    pub wish: String,

    /// What reaching it looks like
    #[arg(long)]
    pub outcome: String,
}
