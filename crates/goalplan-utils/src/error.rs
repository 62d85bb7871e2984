use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::logging::truncate_for_log;
use crate::types::{ArtifactKind, GenerationStage};

/// Maximum number of characters of attempted text kept on a [`ParseError`].
pub const PARSE_ERROR_SNIPPET_CHARS: usize = 200;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `GoalplanError` is the error returned by goal workflow operations. It
/// provides:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with context and suggestions
/// - Mapping to CLI exit codes for consistent error reporting
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration errors, LLM misconfiguration |
/// | 3 | Goal not found |
/// | 4 | Missing prerequisite (answers or breakdown not stored yet) |
/// | 5 | Model output malformed or missing required fields |
/// | 10 | LLM request timed out |
/// | 70 | LLM service unavailable |
/// | 1 | Other errors |
///
/// # Example
///
/// ```rust
/// use goalplan_utils::error::{GoalplanError, StoreError};
/// use goalplan_utils::exit_codes::ExitCode;
///
/// let err = GoalplanError::Store(StoreError::NotFound {
///     user_id: "alice".to_string(),
///     goal_id: 7,
/// });
/// assert_eq!(err.to_exit_code(), ExitCode::GOAL_NOT_FOUND);
/// assert!(err.display_for_user().contains("Suggestions:"));
/// ```
///
/// Library code returns `GoalplanError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum GoalplanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM backend error: {0}")]
    Llm(#[from] LlmError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Goal store error: {0}")]
    Store(#[from] StoreError),

    #[error("Goal {goal_id} is not ready: {requirement}")]
    MissingPrerequisite { goal_id: u64, requirement: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    LlmIntegration,
    Generation,
    Storage,
    Workflow,
    ResourceLimits,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::LlmIntegration => write!(f, "LLM Integration"),
            Self::Generation => write!(f, "Generation"),
            Self::Storage => write!(f, "Storage"),
            Self::Workflow => write!(f, "Workflow"),
            Self::ResourceLimits => write!(f, "Resource Limits"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::MissingRequired(key) => {
                format!("Required configuration '{key}' is missing")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files must be valid TOML with optional [defaults], [llm] and [store] sections."
                    .to_string(),
            ),
            Self::MissingRequired(_) => None,
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' configuration option has specific format requirements."
            )),
            Self::NotFound { .. } | Self::DiscoveryFailed { .. } => Some(
                "goalplan searches for .goalplan/config.toml starting from the current directory upward."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax using a TOML validator".to_string(),
                "Remove unknown keys; see the documented sections".to_string(),
            ],
            Self::MissingRequired(key) => vec![format!(
                "Add '{key}' to .goalplan/config.toml or pass it on the command line"
            )],
            Self::InvalidValue { key, .. } => match key.as_str() {
                "provider" | "llm.provider" => vec![
                    "Use 'gemini' or 'anthropic' as the provider".to_string(),
                ],
                "phase_count" => vec!["Use a phase count between 1 and 12".to_string()],
                "request_timeout_secs" => {
                    vec!["Use a positive number of seconds (e.g., 120)".to_string()]
                }
                _ => vec![
                    "Check the documentation for valid values for this option".to_string(),
                    "Remove the option to use the default value".to_string(),
                ],
            },
            Self::NotFound { .. } => vec![
                "Create .goalplan/config.toml in your project root".to_string(),
                "Use CLI flags instead of a configuration file".to_string(),
            ],
            Self::DiscoveryFailed { .. } => vec![
                "Check file permissions in the current directory and its parents".to_string(),
                "Use --config <path> to specify the configuration file explicitly".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Errors that can occur during LLM backend operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Transport-level failure (HTTP connectivity, unexpected 4xx)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403, missing API key)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    /// Invocation timed out
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// The provider answered without any text
    #[error("Provider {provider} returned an empty response")]
    EmptyResponse { provider: String },

    /// Configuration error
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Unsupported feature or provider
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl UserFriendlyError for LlmError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(msg) => format!("LLM transport error: {msg}"),
            Self::ProviderAuth(msg) => format!("LLM provider authentication failed: {msg}"),
            Self::ProviderQuota(msg) => format!("LLM provider quota exceeded: {msg}"),
            Self::ProviderOutage(msg) => format!("LLM provider service outage: {msg}"),
            Self::Timeout { duration } => {
                format!("LLM invocation timed out after {duration:?}")
            }
            Self::EmptyResponse { provider } => {
                format!("LLM provider '{provider}' returned no text")
            }
            Self::Misconfiguration(msg) => format!("LLM configuration error: {msg}"),
            Self::Unsupported(msg) => format!("LLM feature not supported: {msg}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Transport(_) => {
                Some("Transport errors occur when the LLM provider cannot be reached.".to_string())
            }
            Self::ProviderAuth(_) => Some(
                "Authentication errors indicate missing or invalid API keys.".to_string(),
            ),
            Self::ProviderQuota(_) => Some(
                "Quota errors occur when rate limits or usage limits are exceeded.".to_string(),
            ),
            Self::ProviderOutage(_) | Self::EmptyResponse { .. } => {
                Some("Provider outages are temporary service disruptions.".to_string())
            }
            Self::Timeout { .. } => Some(
                "Timeouts occur when a model request takes longer than the configured limit."
                    .to_string(),
            ),
            Self::Misconfiguration(_) | Self::Unsupported(_) => Some(
                "Configuration errors indicate missing or invalid LLM provider settings."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Transport(_) => vec![
                "Verify network connectivity".to_string(),
                "Try running with --verbose to see detailed error information".to_string(),
            ],
            Self::ProviderAuth(_) => vec![
                "Check that the required API key environment variable is set".to_string(),
                "Verify the API key is valid and not expired".to_string(),
            ],
            Self::ProviderQuota(_) | Self::ProviderOutage(_) | Self::EmptyResponse { .. } => vec![
                "Wait a few minutes and try again".to_string(),
                "Check the provider's status page for known issues".to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Increase request_timeout_secs in .goalplan/config.toml".to_string(),
                "Check your internet connection".to_string(),
            ],
            Self::Misconfiguration(_) | Self::Unsupported(_) => vec![
                "Check the [llm] section in .goalplan/config.toml".to_string(),
                "Use --provider gemini or --provider anthropic".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::ProviderAuth(_) | Self::Misconfiguration(_) | Self::Unsupported(_) => {
                ErrorCategory::Configuration
            }
            Self::ProviderQuota(_) => ErrorCategory::ResourceLimits,
            Self::Transport(_)
            | Self::ProviderOutage(_)
            | Self::Timeout { .. }
            | Self::EmptyResponse { .. } => ErrorCategory::LlmIntegration,
        }
    }
}

/// No parse strategy could turn the model text into structured data.
///
/// Carries the name of the last strategy tried, its error message, and the
/// text it attempted (truncated to [`PARSE_ERROR_SNIPPET_CHARS`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no parse strategy succeeded (last tried: {strategy}): {message}")]
pub struct ParseError {
    pub strategy: &'static str,
    pub message: String,
    pub attempted: String,
}

impl ParseError {
    #[must_use]
    pub fn new(strategy: &'static str, message: impl Into<String>, attempted: &str) -> Self {
        Self {
            strategy,
            message: message.into(),
            attempted: truncate_for_log(attempted, PARSE_ERROR_SNIPPET_CHARS),
        }
    }
}

/// Structural violation found by the schema validator.
///
/// `path` is the dotted path of the containing object (`""` for the root,
/// `phases[1].exit_criteria` for nested entries) and `field` the name of the
/// missing or malformed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The value at `path` should be an object
    NotAnObject { path: String },
    /// A required key is absent
    MissingField { path: String, field: String },
    /// A key is present with the wrong shape
    WrongType {
        path: String,
        field: String,
        expected: &'static str,
    },
    /// A list that must have at least one element is empty
    EmptyList { path: String, field: String },
    /// Produced phase count differs from the requested one
    PhaseCountMismatch { expected: usize, actual: usize },
    /// Checked data still failed to convert into its typed form
    Shape { message: String },
}

impl ValidationError {
    /// Full dotted path of the offending field, e.g. `goal.completion_criteria.validation_methods`.
    #[must_use]
    pub fn field_path(&self) -> String {
        match self {
            Self::NotAnObject { path } => display_path(path).to_string(),
            Self::MissingField { path, field }
            | Self::WrongType { path, field, .. }
            | Self::EmptyList { path, field } => join_path(path, field),
            Self::PhaseCountMismatch { .. } => "phases".to_string(),
            Self::Shape { .. } => display_path("").to_string(),
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

fn join_path(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject { path } => {
                write!(f, "expected an object at {}", display_path(path))
            }
            Self::MissingField { path, field } => write!(
                f,
                "missing required field '{field}' at {}",
                display_path(path)
            ),
            Self::WrongType {
                path,
                field,
                expected,
            } => write!(
                f,
                "field '{field}' at {} must be {expected}",
                display_path(path)
            ),
            Self::EmptyList { path, field } => write!(
                f,
                "field '{field}' at {} must not be empty",
                display_path(path)
            ),
            Self::PhaseCountMismatch { expected, actual } => {
                write!(f, "expected {expected} phases but the model produced {actual}")
            }
            Self::Shape { message } => write!(f, "unexpected structure: {message}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Caller-visible failure of a breakdown or implementation-plan generation.
///
/// The questions flow never produces one of these; it falls back to the
/// default question set instead.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("AI service unavailable while generating the {}, please retry later: {source}", .kind.label())]
    UpstreamUnavailable {
        kind: ArtifactKind,
        #[source]
        source: LlmError,
    },

    #[error("The generated {} was malformed, please retry: {source}", .kind.label())]
    MalformedOutput {
        kind: ArtifactKind,
        #[source]
        source: ParseError,
    },

    #[error("The generated {} is incomplete: {source}", .kind.label())]
    InvalidOutput {
        kind: ArtifactKind,
        #[source]
        source: ValidationError,
    },

    #[error("Could not build the {} prompt: {reason}", .kind.label())]
    Prompt { kind: ArtifactKind, reason: String },
}

impl GenerationError {
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::UpstreamUnavailable { kind, .. }
            | Self::MalformedOutput { kind, .. }
            | Self::InvalidOutput { kind, .. }
            | Self::Prompt { kind, .. } => *kind,
        }
    }

    /// The pipeline stage that was being attempted when the call failed.
    #[must_use]
    pub fn stage(&self) -> GenerationStage {
        match self {
            Self::Prompt { .. } => GenerationStage::Prompted,
            Self::UpstreamUnavailable { .. } => GenerationStage::Called,
            Self::MalformedOutput { .. } => GenerationStage::Parsed,
            Self::InvalidOutput { .. } => GenerationStage::Validated,
        }
    }

    /// Whether an immediate retry has a reasonable chance of succeeding.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::MalformedOutput { .. } | Self::InvalidOutput { .. } => true,
            Self::UpstreamUnavailable { source, .. } => !matches!(
                source,
                LlmError::ProviderAuth(_) | LlmError::Misconfiguration(_) | LlmError::Unsupported(_)
            ),
            Self::Prompt { .. } => false,
        }
    }
}

impl UserFriendlyError for GenerationError {
    fn user_message(&self) -> String {
        match self {
            Self::UpstreamUnavailable { .. } => {
                "AI service unavailable, please retry later".to_string()
            }
            Self::MalformedOutput { kind, .. } => {
                format!("The generated {} was malformed, please retry", kind.label())
            }
            Self::InvalidOutput { kind, source } => match source {
                ValidationError::MissingField { .. } => format!(
                    "The generated {} is missing required field {}",
                    kind.label(),
                    source.field_path()
                ),
                _ => format!("The generated {} is invalid: {source}", kind.label()),
            },
            Self::Prompt { kind, reason } => {
                format!("Could not build the {} prompt: {reason}", kind.label())
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::UpstreamUnavailable { source, .. } => Some(source.user_message()),
            Self::MalformedOutput { source, .. } => Some(format!(
                "Last parse attempt ({}) failed: {}",
                source.strategy, source.message
            )),
            Self::InvalidOutput { .. } => Some(
                "Model output is checked against the expected structure before it is stored."
                    .to_string(),
            ),
            Self::Prompt { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UpstreamUnavailable { source, .. } => {
                let mut suggestions = source.suggestions();
                if self.is_retryable() {
                    suggestions.push("Retry the command in a few moments".to_string());
                }
                suggestions
            }
            Self::MalformedOutput { .. } | Self::InvalidOutput { .. } => vec![
                "Run the same command again; model output varies between attempts".to_string(),
                "Run with --verbose to log the raw model response".to_string(),
            ],
            Self::Prompt { .. } => vec!["Check the stored goal data with 'goal show'".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::UpstreamUnavailable { source, .. } => source.category(),
            _ => ErrorCategory::Generation,
        }
    }
}

/// Goal record persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Goal {goal_id} not found for user {user_id}")]
    NotFound { user_id: String, goal_id: u64 },

    #[error("Invalid user id '{user_id}': {reason}")]
    InvalidUserId { user_id: String, reason: String },

    #[error("Goal record at {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("Goal store I/O failed at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write goal record: {0}")]
    Write(String),
}

impl UserFriendlyError for StoreError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { goal_id, .. } => format!("Goal {goal_id} does not exist"),
            Self::InvalidUserId { user_id, reason } => {
                format!("User id '{user_id}' cannot be used: {reason}")
            }
            Self::Corrupt { path, .. } => {
                format!("Stored goal record {} could not be read", path.display())
            }
            Self::Io { path, source } => {
                format!("Could not access {}: {source}", path.display())
            }
            Self::Write(reason) => format!("Could not save the goal: {reason}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::NotFound { user_id, .. } => {
                Some(format!("Goals are scoped to a user; looked up as '{user_id}'."))
            }
            Self::Corrupt { reason, .. } => Some(reason.clone()),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { .. } => vec![
                "List your goals with 'goalplan goal list'".to_string(),
                "Check the --user flag or GOALPLAN_USER".to_string(),
            ],
            Self::InvalidUserId { .. } => {
                vec!["Use letters, digits, '-', '_' or '.' in user ids".to_string()]
            }
            Self::Corrupt { .. } => vec![
                "Delete the goal and create it again".to_string(),
            ],
            Self::Io { .. } | Self::Write(_) => vec![
                "Check permissions on the state directory".to_string(),
                "Set GOALPLAN_HOME to a writable directory".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Storage
    }
}

impl UserFriendlyError for GoalplanError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Llm(err) => err.user_message(),
            Self::Generation(err) => err.user_message(),
            Self::Store(err) => err.user_message(),
            Self::MissingPrerequisite { goal_id, requirement } => {
                format!("Goal {goal_id} is not ready: {requirement}")
            }
            Self::Io(err) => format!("File system operation failed: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Llm(err) => err.context(),
            Self::Generation(err) => err.context(),
            Self::Store(err) => err.context(),
            Self::MissingPrerequisite { .. } => Some(
                "Goals move through questions, then breakdown, then implementation plan."
                    .to_string(),
            ),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Llm(err) => err.suggestions(),
            Self::Generation(err) => err.suggestions(),
            Self::Store(err) => err.suggestions(),
            Self::MissingPrerequisite { goal_id, .. } => vec![
                format!("Run 'goalplan breakdown {goal_id} --answers <file>' first"),
                format!("Inspect the goal with 'goalplan goal show {goal_id}'"),
            ],
            Self::Io(_) => vec!["Check file permissions and free disk space".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(err) => err.category(),
            Self::Llm(err) => err.category(),
            Self::Generation(err) => err.category(),
            Self::Store(err) => err.category(),
            Self::MissingPrerequisite { .. } => ErrorCategory::Workflow,
            Self::Io(_) => ErrorCategory::Storage,
        }
    }
}

impl GoalplanError {
    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// ```text
    /// Error: <user message>
    ///
    /// Context: <context if available>
    ///
    /// Suggestions:
    ///   • <suggestion 1>
    /// ```
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        fn llm_exit_code(err: &LlmError) -> ExitCode {
            match err {
                LlmError::Timeout { .. } => ExitCode::LLM_TIMEOUT,
                LlmError::Misconfiguration(_) | LlmError::Unsupported(_) => ExitCode::CLI_ARGS,
                LlmError::Transport(_)
                | LlmError::ProviderAuth(_)
                | LlmError::ProviderQuota(_)
                | LlmError::ProviderOutage(_)
                | LlmError::EmptyResponse { .. } => ExitCode::LLM_UNAVAILABLE,
            }
        }

        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Llm(err) => llm_exit_code(err),
            Self::Generation(err) => match err {
                GenerationError::UpstreamUnavailable { source, .. } => llm_exit_code(source),
                GenerationError::MalformedOutput { .. } | GenerationError::InvalidOutput { .. } => {
                    ExitCode::MALFORMED_OUTPUT
                }
                GenerationError::Prompt { .. } => ExitCode::INTERNAL,
            },
            Self::Store(StoreError::NotFound { .. }) => ExitCode::GOAL_NOT_FOUND,
            Self::Store(StoreError::InvalidUserId { .. }) => ExitCode::CLI_ARGS,
            Self::MissingPrerequisite { .. } => ExitCode::MISSING_PREREQUISITE,
            Self::Store(_) | Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}
