use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use goalplan_utils::error::GoalplanError;

use super::{Config, ConfigSource, Defaults, LlmConfig, ProviderConfig, StoreConfig};

impl Config {
    /// Start a programmatic configuration that ignores files and environment.
    ///
    /// ```rust
    /// use goalplan_config::Config;
    ///
    /// let config = Config::builder()
    ///     .provider("anthropic")
    ///     .phase_count(4)
    ///     .build()
    ///     .expect("valid configuration");
    /// assert_eq!(config.phase_count(), 4);
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Fluent builder for [`Config`].
///
/// Values set here are attributed to [`ConfigSource::Programmatic`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    defaults: Defaults,
    llm: LlmConfig,
    store: StoreConfig,
    touched: Vec<&'static str>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.llm.provider = Some(provider.into());
        self.touched.push("provider");
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.defaults.model = Some(model.into());
        self.touched.push("model");
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.defaults.request_timeout_secs = Some(timeout.as_secs());
        self.touched.push("request_timeout_secs");
        self
    }

    #[must_use]
    pub fn phase_count(mut self, count: usize) -> Self {
        self.defaults.phase_count = Some(count);
        self.touched.push("phase_count");
        self
    }

    #[must_use]
    pub fn strict_phase_count(mut self, strict: bool) -> Self {
        self.defaults.strict_phase_count = Some(strict);
        self.touched.push("strict_phase_count");
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.defaults.verbose = Some(verbose);
        self.touched.push("verbose");
        self
    }

    #[must_use]
    pub fn state_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.state_dir = Some(path.into());
        self.touched.push("state_dir");
        self
    }

    #[must_use]
    pub fn gemini(mut self, section: ProviderConfig) -> Self {
        self.llm.gemini = Some(section);
        self
    }

    #[must_use]
    pub fn anthropic(mut self, section: ProviderConfig) -> Self {
        self.llm.anthropic = Some(section);
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<Config, GoalplanError> {
        let source_attribution: HashMap<String, ConfigSource> = self
            .touched
            .into_iter()
            .map(|key| (key.to_string(), ConfigSource::Programmatic))
            .collect();

        let config = Config {
            defaults: self.defaults,
            llm: self.llm,
            store: self.store,
            source_attribution,
        };
        config.validate()?;
        Ok(config)
    }
}
