//! CLI entry point and dispatch logic
//!
//! `run()` parses arguments, discovers configuration, sets up logging and
//! the tokio runtime, dispatches the command, and owns all error output.

use clap::Parser;

use goalplan_config::{CliArgs, Config};
use goalplan_llm::redact_error_message;
use goalplan_utils::error::{ConfigError, GoalplanError};
use goalplan_utils::exit_codes::ExitCode;
use goalplan_utils::logging::{init_tracing, init_tracing_json};

use super::args::Cli;
use super::commands::{self, CommandContext};

/// Main CLI execution function.
///
/// Prints every error itself and returns the exit code; `main` only exits.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        provider: cli.provider.clone(),
        model: cli.model.clone(),
        request_timeout_secs: cli.timeout,
        phase_count: None,
        strict_phase_count: cli.strict_phases.then_some(true),
        state_dir: cli.state_dir.clone(),
        verbose: cli.verbose.then_some(true),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let err = err.downcast::<GoalplanError>().unwrap_or_else(|other| {
                GoalplanError::Config(ConfigError::InvalidFile(format!("{other:#}")))
            });
            return Err(report(&err));
        }
    };

    let logging = if cli.log_json {
        init_tracing_json(config.verbose())
    } else {
        init_tracing(config.verbose())
    };
    if let Err(e) = logging {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let ctx = CommandContext {
        config,
        user: cli.user,
        json: cli.json,
    };
    let result = rt.block_on(commands::dispatch(&ctx, cli.command));

    if let Err(error) = result {
        if let Some(goalplan_error) = error.downcast_ref::<GoalplanError>() {
            return Err(report(goalplan_error));
        }
        eprintln!("Error: {}", redact_error_message(&format!("{error:#}")));
        eprintln!("\nRun with --verbose for more detail.");
        return Err(ExitCode::INTERNAL);
    }

    Ok(())
}

fn report(err: &GoalplanError) -> ExitCode {
    eprint!("{}", redact_error_message(&err.display_for_user()));
    err.to_exit_code()
}
