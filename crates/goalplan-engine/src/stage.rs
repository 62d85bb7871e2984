use goalplan_utils::types::{ArtifactKind, GenerationStage};
use tracing::{debug, warn};

/// Tracks the stage of one generation call and logs every transition.
///
/// Stages only move forward. A failure is recorded against the stage that
/// was being attempted, i.e. the one after the last completed stage.
#[derive(Debug)]
pub(crate) struct StageTracker {
    kind: ArtifactKind,
    completed: Option<GenerationStage>,
}

impl StageTracker {
    pub(crate) fn new(kind: ArtifactKind) -> Self {
        Self {
            kind,
            completed: None,
        }
    }

    /// Record that `stage` completed.
    pub(crate) fn advance(&mut self, stage: GenerationStage) {
        debug_assert!(
            self.completed.is_none_or(|prev| prev < stage),
            "stage {stage} after {:?}",
            self.completed
        );
        debug!(kind = %self.kind, stage = %stage, "generation stage reached");
        self.completed = Some(stage);
    }

    /// Record a terminal failure while attempting `stage`.
    pub(crate) fn fail(&self, stage: GenerationStage, reason: &str) {
        warn!(
            kind = %self.kind,
            stage = %stage,
            last_completed = ?self.completed.map(GenerationStage::as_str),
            reason,
            "generation failed"
        );
    }

    #[cfg(test)]
    pub(crate) fn completed(&self) -> Option<GenerationStage> {
        self.completed
    }
}
