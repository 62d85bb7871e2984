use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use goalplan_utils::types::ConfigSource;

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const DEFAULT_PHASE_COUNT: usize = 3;
pub const MAX_PHASE_COUNT: usize = 12;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Providers the LLM factory knows how to build.
pub const SUPPORTED_PROVIDERS: [&str; 2] = ["gemini", "anthropic"];

/// Configuration for goalplan operations.
///
/// Build it with [`Config::discover()`] for CLI semantics (file discovery,
/// environment, CLI overrides) or with [`Config::builder()`] for
/// deterministic programmatic setups.
///
/// # Example
///
/// ```rust,no_run
/// use goalplan_config::{CliArgs, Config};
///
/// let config = Config::discover(&CliArgs::default())?;
/// println!("provider: {}", config.provider());
/// println!("phases: {}", config.phase_count());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    /// Where each effective value came from.
    #[serde(skip)]
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[defaults]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Model name; overrides the provider section's model.
    pub model: Option<String>,
    pub request_timeout_secs: Option<u64>,
    /// Phases requested from the model for a breakdown.
    pub phase_count: Option<usize>,
    /// Reject breakdowns whose phase count differs from the request.
    pub strict_phase_count: Option<bool>,
    pub verbose: Option<bool>,
}

/// `[llm]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `gemini` (default) or `anthropic`
    pub provider: Option<String>,
    pub gemini: Option<ProviderConfig>,
    pub anthropic: Option<ProviderConfig>,
}

/// `[llm.gemini]` / `[llm.anthropic]` sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Name of the environment variable holding the API key.
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

/// `[store]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub state_dir: Option<PathBuf>,
}

impl Config {
    /// Create a minimal Config for testing purposes
    pub fn minimal_for_testing() -> Self {
        Self::default()
    }

    /// Effective provider name.
    #[must_use]
    pub fn provider(&self) -> &str {
        self.llm.provider.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    /// Section for the named provider, if configured.
    #[must_use]
    pub fn provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        match provider {
            "gemini" => self.llm.gemini.as_ref(),
            "anthropic" => self.llm.anthropic.as_ref(),
            _ => None,
        }
    }

    /// Model for the active provider.
    ///
    /// Precedence: `[defaults].model` (including CLI and env overrides), then
    /// the provider section's `model`, then the provider's built-in default.
    #[must_use]
    pub fn model(&self) -> String {
        let provider = self.provider();
        self.defaults
            .model
            .clone()
            .or_else(|| self.provider_config(provider).and_then(|p| p.model.clone()))
            .unwrap_or_else(|| default_model_for(provider).to_string())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.defaults
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.defaults.phase_count.unwrap_or(DEFAULT_PHASE_COUNT)
    }

    #[must_use]
    pub fn strict_phase_count(&self) -> bool {
        self.defaults.strict_phase_count.unwrap_or(false)
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    /// Directory holding goal records.
    ///
    /// Falls back to `<data dir>/goalplan`, or `.goalplan/state` when the
    /// platform has no data directory.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.store.state_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("goalplan"))
                .unwrap_or_else(|| PathBuf::from(".goalplan").join("state"))
        })
    }

    /// Source of a configuration key, `Default` when untracked.
    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .copied()
            .unwrap_or(ConfigSource::Default)
    }
}

/// Built-in model for a provider.
#[must_use]
pub fn default_model_for(provider: &str) -> &'static str {
    match provider {
        "anthropic" => DEFAULT_ANTHROPIC_MODEL,
        _ => DEFAULT_GEMINI_MODEL,
    }
}

/// Built-in API key variable for a provider.
#[must_use]
pub fn default_api_key_env_for(provider: &str) -> &'static str {
    match provider {
        "anthropic" => DEFAULT_ANTHROPIC_API_KEY_ENV,
        _ => DEFAULT_GEMINI_API_KEY_ENV,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_gemini() {
        let config = Config::minimal_for_testing();
        assert_eq!(config.provider(), "gemini");
        assert_eq!(config.model(), DEFAULT_GEMINI_MODEL);
        assert_eq!(config.phase_count(), 3);
        assert!(!config.strict_phase_count());
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert_eq!(config.source_of("model"), ConfigSource::Default);
    }

    #[test]
    fn model_precedence() {
        let mut config = Config::minimal_for_testing();
        config.llm.provider = Some("anthropic".to_string());
        assert_eq!(config.model(), DEFAULT_ANTHROPIC_MODEL);

        config.llm.anthropic = Some(ProviderConfig {
            model: Some("claude-sonnet".to_string()),
            ..ProviderConfig::default()
        });
        assert_eq!(config.model(), "claude-sonnet");

        config.defaults.model = Some("override".to_string());
        assert_eq!(config.model(), "override");
    }

    #[test]
    fn explicit_state_dir_wins() {
        let mut config = Config::minimal_for_testing();
        config.store.state_dir = Some(PathBuf::from("/tmp/goals"));
        assert_eq!(config.state_dir(), PathBuf::from("/tmp/goals"));
    }
}
