//! Exit code constants for the goalplan CLI.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `GOAL_NOT_FOUND` | Goal id unknown for this user |
//! | 4 | `MISSING_PREREQUISITE` | Earlier workflow step not completed |
//! | 5 | `MALFORMED_OUTPUT` | Model output malformed or incomplete |
//! | 10 | `LLM_TIMEOUT` | Model request timed out |
//! | 70 | `LLM_UNAVAILABLE` | Model service unavailable |

/// Exit codes matching the documented exit code table.
///
/// The numeric values are part of the CLI contract.
///
/// # Example
///
/// ```rust
/// use goalplan_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::MALFORMED_OUTPUT.as_i32(), 5);
/// assert_eq!(ExitCode::SUCCESS, ExitCode::from_i32(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Goal not found for the requesting user
    pub const GOAL_NOT_FOUND: ExitCode = ExitCode(3);

    /// Answers or breakdown required by the command are not stored yet
    pub const MISSING_PREREQUISITE: ExitCode = ExitCode(4);

    /// Model output could not be parsed or failed validation
    pub const MALFORMED_OUTPUT: ExitCode = ExitCode(5);

    /// Model request exceeded its timeout
    pub const LLM_TIMEOUT: ExitCode = ExitCode(10);

    /// Model service unreachable, rejected the request, or returned nothing
    pub const LLM_UNAVAILABLE: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
