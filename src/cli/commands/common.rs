//! Shared state for command handlers.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use goalplan_config::Config;
use goalplan_engine::{ArtifactGenerator, GeneratorSettings, GoalService};
use goalplan_model::{AnswerEntry, answers_from_value};
use goalplan_store::FsGoalStore;
use goalplan_utils::error::{ConfigError, GoalplanError};

/// Effective configuration plus the per-invocation flags every command needs.
pub struct CommandContext {
    pub config: Config,
    pub user: String,
    pub json: bool,
}

impl CommandContext {
    pub fn store(&self) -> Result<FsGoalStore, GoalplanError> {
        let state_dir = self.config.state_dir();
        debug!(state_dir = %state_dir.display(), "opening goal store");
        Ok(FsGoalStore::new(state_dir)?)
    }

    /// Goal service backed by the configured LLM provider. Fails when the
    /// provider's API key is not set.
    pub fn service(&self) -> Result<GoalService<FsGoalStore>, GoalplanError> {
        let backend = goalplan_llm::from_config(&self.config)?;
        let generator =
            ArtifactGenerator::new(Arc::from(backend), GeneratorSettings::from_config(&self.config));
        Ok(GoalService::new(self.store()?, generator)
            .with_default_phase_count(self.config.phase_count()))
    }
}

/// Load answers from a JSON file holding a list of `{question, answer}`
/// entries, an indexed map of such entries, or a `question -> answer` map.
pub fn read_answers(path: &Path) -> Result<Vec<AnswerEntry>, GoalplanError> {
    let invalid = |reason: String| {
        GoalplanError::Config(ConfigError::InvalidValue {
            key: "answers".to_string(),
            value: format!("{}: {reason}", path.display()),
        })
    };

    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    answers_from_value(&value).map_err(invalid)
}
