//! Structured logging setup and helpers built on `tracing`.

use tracing::{Level, span};
use tracing_subscriber::{EnvFilter, fmt, fmt::format::FmtSpan, prelude::*};

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("goalplan=debug,info")
            } else {
                EnvFilter::try_new("goalplan=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing with a compact human-readable format on stderr.
///
/// `RUST_LOG` takes precedence over the built-in filter. With `verbose`
/// the filter drops to debug for goalplan crates and span close events are
/// logged, which reports per-generation timing.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = default_filter(verbose);

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Initialize tracing with newline-delimited JSON records on stderr.
pub fn init_tracing_json(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true),
        )
        .try_init()?;
    Ok(())
}

/// Span wrapping one generation call.
#[must_use]
pub fn generation_span(kind: &str) -> tracing::Span {
    span!(Level::INFO, "generation", kind = %kind)
}

/// Span wrapping one goal workflow operation.
#[must_use]
pub fn goal_span(operation: &str, user_id: &str, goal_id: Option<u64>) -> tracing::Span {
    span!(
        Level::INFO,
        "goal",
        operation = %operation,
        user_id = %user_id,
        goal_id = ?goal_id,
    )
}

/// Cut `text` to at most `max_chars` characters, appending `...` when cut.
///
/// Counts characters, not bytes, so multi-byte text never splits mid-codepoint.
#[must_use]
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
