//! LLM backend abstraction for multi-provider support
//!
//! All providers implement the `LlmBackend` trait, so the artifact generator
//! works with any provider without knowing implementation details.

mod anthropic_backend;
mod gemini_backend;
mod http_client;
#[cfg(any(test, feature = "test-utils"))]
mod test_support;
mod types;

pub use goalplan_utils::error::LlmError;
pub use types::{LlmBackend, LlmInvocation, LlmResult, Message, Role};

#[cfg(any(test, feature = "test-utils"))]
pub use test_support::{ScriptedBackend, ScriptedReply};

pub use http_client::redact_error_message;

use anthropic_backend::AnthropicBackend;
use gemini_backend::GeminiBackend;

use goalplan_config::{Config, SUPPORTED_PROVIDERS};

/// Create an LLM backend from configuration.
///
/// API keys are read from the process environment.
///
/// # Errors
///
/// Returns `LlmError::Unsupported` if the provider is unknown, and
/// `LlmError::Misconfiguration` if provider-specific configuration (such as
/// the API key) is missing.
pub fn from_config(config: &Config) -> Result<Box<dyn LlmBackend>, LlmError> {
    from_config_with_env(config, &|key| std::env::var(key).ok())
}

/// [`from_config`] with an explicit environment lookup.
///
/// # Errors
///
/// Same as [`from_config`].
pub fn from_config_with_env(
    config: &Config,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<Box<dyn LlmBackend>, LlmError> {
    let provider = config.provider();
    tracing::debug!(provider, model = %config.model(), "Constructing LLM backend");

    match provider {
        "gemini" => Ok(Box::new(GeminiBackend::new_from_config(config, env)?)),
        "anthropic" => Ok(Box::new(AnthropicBackend::new_from_config(config, env)?)),
        unknown => Err(LlmError::Unsupported(format!(
            "Unknown LLM provider '{unknown}'. Supported providers: {}.",
            SUPPORTED_PROVIDERS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_keys(key: &str) -> Option<String> {
        matches!(key, "GEMINI_API_KEY" | "ANTHROPIC_API_KEY").then(|| "test-key".to_string())
    }

    #[test]
    fn default_provider_is_gemini() {
        let config = Config::minimal_for_testing();
        assert!(from_config_with_env(&config, &with_keys).is_ok());
    }

    #[test]
    fn anthropic_is_selectable() {
        let mut config = Config::minimal_for_testing();
        config.llm.provider = Some("anthropic".to_string());
        assert!(from_config_with_env(&config, &with_keys).is_ok());
    }

    #[test]
    fn unknown_provider_is_unsupported() {
        let mut config = Config::minimal_for_testing();
        config.llm.provider = Some("openrouter".to_string());
        match from_config_with_env(&config, &with_keys) {
            Err(LlmError::Unsupported(msg)) => {
                assert!(msg.contains("openrouter"));
                assert!(msg.contains("gemini, anthropic"));
            }
            Err(other) => panic!("expected Unsupported, got {other:?}"),
            Ok(_) => panic!("expected Unsupported"),
        }
    }

    #[test]
    fn missing_key_is_misconfiguration() {
        let config = Config::minimal_for_testing();
        assert!(matches!(
            from_config_with_env(&config, &|_| None),
            Err(LlmError::Misconfiguration(_))
        ));
    }
}
