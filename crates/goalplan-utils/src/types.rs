//! Shared enums used across the goalplan crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three artifacts the generator produces from model output.
///
/// Serializes to snake_case strings: `"questions"`, `"breakdown"`,
/// `"implementation_plan"`.
///
/// # Example
///
/// ```rust
/// use goalplan_utils::types::ArtifactKind;
///
/// assert_eq!(ArtifactKind::Breakdown.as_str(), "breakdown");
/// assert_eq!(ArtifactKind::parse("implementation_plan"), Some(ArtifactKind::ImplementationPlan));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Clarifying questions for a new goal.
    Questions,
    /// Staged goal breakdown (goal summary plus phases).
    Breakdown,
    /// Dimensions, options and actions derived from a breakdown.
    ImplementationPlan,
}

impl ArtifactKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Questions => "questions",
            Self::Breakdown => "breakdown",
            Self::ImplementationPlan => "implementation_plan",
        }
    }

    /// Human-readable label used in user-facing messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Questions => "question set",
            Self::Breakdown => "goal breakdown",
            Self::ImplementationPlan => "implementation plan",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "questions" => Some(Self::Questions),
            "breakdown" => Some(Self::Breakdown),
            "implementation_plan" | "plan" => Some(Self::ImplementationPlan),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stages of a single generation call.
///
/// A call moves `Prompted -> Called -> Extracted -> Parsed -> Validated ->
/// (Repaired) -> Done`. Failures are reported together with the stage that
/// was being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Prompted,
    Called,
    Extracted,
    Parsed,
    Validated,
    Repaired,
    Done,
}

impl GenerationStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prompted => "prompted",
            Self::Called => "called",
            Self::Extracted => "extracted",
            Self::Parsed => "parsed",
            Self::Validated => "validated",
            Self::Repaired => "repaired",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of a configuration value.
///
/// Precedence, highest first: CLI arguments > environment > config file >
/// programmatic overrides > built-in defaults.
///
/// # Example
///
/// ```rust
/// use goalplan_utils::types::ConfigSource;
///
/// let json = serde_json::to_string(&ConfigSource::Env).unwrap();
/// assert_eq!(json, r#""env""#);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value read from an environment variable.
    Env,
    /// Value loaded from configuration file.
    Config,
    /// Value provided programmatically (e.g., `Config::builder()`).
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cli => "cli",
            Self::Env => "env",
            Self::Config => "config",
            Self::Programmatic => "programmatic",
            Self::Default => "default",
        };
        f.write_str(s)
    }
}
