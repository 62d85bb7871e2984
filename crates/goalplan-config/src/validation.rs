use goalplan_utils::error::{ConfigError, GoalplanError};

use super::{Config, MAX_PHASE_COUNT, ProviderConfig, SUPPORTED_PROVIDERS};

fn invalid(key: &str, value: impl Into<String>) -> GoalplanError {
    GoalplanError::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    })
}

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), GoalplanError> {
        let provider = self.provider();
        if !SUPPORTED_PROVIDERS.contains(&provider) {
            return Err(invalid(
                "provider",
                format!(
                    "'{provider}' is not supported (expected one of: {})",
                    SUPPORTED_PROVIDERS.join(", ")
                ),
            ));
        }

        if self.defaults.request_timeout_secs == Some(0) {
            return Err(invalid("request_timeout_secs", "must be greater than 0"));
        }

        if let Some(count) = self.defaults.phase_count {
            if count == 0 || count > MAX_PHASE_COUNT {
                return Err(invalid(
                    "phase_count",
                    format!("{count} is outside 1..={MAX_PHASE_COUNT}"),
                ));
            }
        }

        if let Some(model) = &self.defaults.model {
            if model.trim().is_empty() {
                return Err(invalid("model", "must not be empty"));
            }
        }

        for (name, section) in [
            ("gemini", self.llm.gemini.as_ref()),
            ("anthropic", self.llm.anthropic.as_ref()),
        ] {
            if let Some(section) = section {
                validate_provider_section(name, section)?;
            }
        }

        Ok(())
    }
}

fn validate_provider_section(name: &str, section: &ProviderConfig) -> Result<(), GoalplanError> {
    if let Some(temperature) = section.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(invalid(
                &format!("llm.{name}.temperature"),
                format!("{temperature} is outside 0.0..=2.0"),
            ));
        }
    }
    if section.max_tokens == Some(0) {
        return Err(invalid(
            &format!("llm.{name}.max_tokens"),
            "must be greater than 0",
        ));
    }
    if let Some(url) = &section.base_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid(
                &format!("llm.{name}.base_url"),
                format!("'{url}' must start with http:// or https://"),
            ));
        }
    }
    Ok(())
}
