use chrono::Utc;
use goalplan_config::{DEFAULT_PHASE_COUNT, MAX_PHASE_COUNT};
use goalplan_model::{AnswerEntry, GoalRecord, ImplementationPlan, NewGoal, QuestionSet};
use goalplan_store::GoalStore;
use goalplan_utils::error::{ConfigError, GoalplanError};
use goalplan_utils::logging::goal_span;
use tracing::{Instrument, info};

use crate::generator::ArtifactGenerator;

const NEEDS_ANSWERS: &str = "answer the questions first";
const NEEDS_BREAKDOWN: &str = "generate a goal breakdown first";

/// Goal workflow on top of a store and a generator.
///
/// Goals are always looked up under the calling user, so another user's
/// goal id is `GoalNotFound`. Artifacts are saved only after they were
/// generated successfully; a failed generation leaves the record untouched.
pub struct GoalService<S> {
    store: S,
    generator: ArtifactGenerator,
    default_phase_count: usize,
}

impl<S: GoalStore> GoalService<S> {
    #[must_use]
    pub fn new(store: S, generator: ArtifactGenerator) -> Self {
        Self {
            store,
            generator,
            default_phase_count: DEFAULT_PHASE_COUNT,
        }
    }

    /// Phase count used when a call does not ask for one.
    #[must_use]
    pub fn with_default_phase_count(mut self, phase_count: usize) -> Self {
        self.default_phase_count = phase_count;
        self
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create_goal(&self, user_id: &str, goal: NewGoal) -> Result<GoalRecord, GoalplanError> {
        let _span = goal_span("create", user_id, None).entered();
        let record = self.store.create(user_id, goal, Utc::now())?;
        info!(goal_id = record.id, "goal created");
        Ok(record)
    }

    pub fn list_goals(&self, user_id: &str) -> Result<Vec<GoalRecord>, GoalplanError> {
        Ok(self.store.list(user_id)?)
    }

    pub fn get_goal(&self, user_id: &str, goal_id: u64) -> Result<GoalRecord, GoalplanError> {
        Ok(self.store.get(user_id, goal_id)?)
    }

    pub fn delete_goal(&self, user_id: &str, goal_id: u64) -> Result<(), GoalplanError> {
        let _span = goal_span("delete", user_id, Some(goal_id)).entered();
        self.store.delete(user_id, goal_id)?;
        info!("goal deleted");
        Ok(())
    }

    /// Clarifying questions for a stored goal. Only a missing goal fails.
    pub async fn questions(&self, user_id: &str, goal_id: u64) -> Result<QuestionSet, GoalplanError> {
        let record = self.store.get(user_id, goal_id)?;
        Ok(self
            .generator
            .generate_questions(&record.wish, &record.outcome)
            .instrument(goal_span("questions", user_id, Some(goal_id)))
            .await)
    }

    /// Generate a breakdown from fresh answers and store both.
    ///
    /// A previously stored implementation plan no longer matches the new
    /// breakdown and is dropped.
    pub async fn breakdown(
        &self,
        user_id: &str,
        goal_id: u64,
        answers: Vec<AnswerEntry>,
        phase_count: Option<usize>,
    ) -> Result<GoalRecord, GoalplanError> {
        let record = self.store.get(user_id, goal_id)?;
        self.store_breakdown(record, answers, phase_count)
            .instrument(goal_span("breakdown", user_id, Some(goal_id)))
            .await
    }

    /// Generate a new breakdown from the answers already stored.
    pub async fn regenerate_breakdown(
        &self,
        user_id: &str,
        goal_id: u64,
        phase_count: Option<usize>,
    ) -> Result<GoalRecord, GoalplanError> {
        let record = self.store.get(user_id, goal_id)?;
        let Some(answers) = record.questions_answers.clone() else {
            return Err(missing(goal_id, NEEDS_ANSWERS));
        };
        self.store_breakdown(record, answers, phase_count)
            .instrument(goal_span("regenerate", user_id, Some(goal_id)))
            .await
    }

    /// Generate and store the implementation plan for the stored breakdown.
    pub async fn implementation_plan(
        &self,
        user_id: &str,
        goal_id: u64,
    ) -> Result<ImplementationPlan, GoalplanError> {
        let mut record = self.store.get(user_id, goal_id)?;
        let Some(breakdown) = record.goal_breakdown.as_ref() else {
            return Err(missing(goal_id, NEEDS_BREAKDOWN));
        };

        let plan = self
            .generator
            .generate_implementation_plan(breakdown)
            .instrument(goal_span("plan", user_id, Some(goal_id)))
            .await?;

        record.implementation_plan = Some(plan.clone());
        record.updated_at = Utc::now();
        self.store.save(&record)?;
        Ok(plan)
    }

    async fn store_breakdown(
        &self,
        mut record: GoalRecord,
        answers: Vec<AnswerEntry>,
        phase_count: Option<usize>,
    ) -> Result<GoalRecord, GoalplanError> {
        let phase_count = self.resolve_phase_count(phase_count)?;
        let breakdown = self
            .generator
            .generate_goal_breakdown(&record.wish, &record.outcome, &answers, phase_count)
            .await?;

        record.questions_answers = Some(answers);
        record.goal_breakdown = Some(breakdown);
        record.implementation_plan = None;
        record.updated_at = Utc::now();
        self.store.save(&record)?;
        info!(phases = record.goal_breakdown.as_ref().map_or(0, |b| b.phases.len()), "breakdown stored");
        Ok(record)
    }

    fn resolve_phase_count(&self, requested: Option<usize>) -> Result<usize, GoalplanError> {
        let phase_count = requested.unwrap_or(self.default_phase_count);
        if !(1..=MAX_PHASE_COUNT).contains(&phase_count) {
            return Err(ConfigError::InvalidValue {
                key: "phase_count".to_string(),
                value: format!("{phase_count} (must be between 1 and {MAX_PHASE_COUNT})"),
            }
            .into());
        }
        Ok(phase_count)
    }
}

fn missing(goal_id: u64, requirement: &str) -> GoalplanError {
    GoalplanError::MissingPrerequisite {
        goal_id,
        requirement: requirement.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorSettings;
    use goalplan_llm::ScriptedBackend;
    use goalplan_store::MemoryGoalStore;
    use goalplan_utils::error::{GenerationError, StoreError};
    use serde_json::json;
    use std::sync::Arc;

    fn breakdown_text(phases: usize) -> String {
        let phases: Vec<_> = (0..phases)
            .map(|i| {
                json!({
                    "id": format!("x{i}"),
                    "name": format!("Stage {i}"),
                    "focus_dimensions": [],
                    "milestones": [],
                    "exit_criteria": {"skills_checklist": [], "practical_tasks": []}
                })
            })
            .collect();
        json!({
            "goal": {
                "description": "d",
                "completion_criteria": {
                    "must_have_skills": [], "must_complete_tasks": [], "validation_methods": []
                }
            },
            "phases": phases
        })
        .to_string()
    }

    fn plan_text() -> String {
        json!({
            "dimensions": [{
                "id": "d1", "name": "n", "why": "w", "phase": "p1",
                "options": [{"id": "o1", "name": "n", "difficulty": 1, "time_cost": "1h", "actions": ["a"]}]
            }]
        })
        .to_string()
    }

    fn service(backend: &ScriptedBackend) -> GoalService<MemoryGoalStore> {
        let generator = ArtifactGenerator::new(Arc::new(backend.clone()), GeneratorSettings::default());
        GoalService::new(MemoryGoalStore::new(), generator)
    }

    fn new_goal() -> NewGoal {
        NewGoal {
            wish: "Learn to sail".to_string(),
            outcome: "Cross the channel".to_string(),
        }
    }

    #[tokio::test]
    async fn full_workflow_stores_artifacts() {
        let backend = ScriptedBackend::with_texts([breakdown_text(3), plan_text()]);
        let service = service(&backend);
        let goal = service.create_goal("alice", new_goal()).unwrap();

        let answers = vec![AnswerEntry::new("Experience?", "None")];
        let record = service.breakdown("alice", goal.id, answers.clone(), None).await.unwrap();
        assert_eq!(record.questions_answers.as_deref(), Some(answers.as_slice()));
        assert_eq!(record.goal_breakdown.unwrap().phase_ids(), vec!["p1", "p2", "p3"]);

        let plan = service.implementation_plan("alice", goal.id).await.unwrap();
        let stored = service.get_goal("alice", goal.id).unwrap();
        assert_eq!(stored.implementation_plan, Some(plan));
        assert_eq!(stored.stage_label(), "planned");
    }

    #[tokio::test]
    async fn plan_requires_breakdown() {
        let backend = ScriptedBackend::new();
        let service = service(&backend);
        let goal = service.create_goal("alice", new_goal()).unwrap();

        let err = service.implementation_plan("alice", goal.id).await.unwrap_err();
        assert!(matches!(
            err,
            GoalplanError::MissingPrerequisite { ref requirement, .. } if requirement == NEEDS_BREAKDOWN
        ));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn regenerate_requires_answers() {
        let backend = ScriptedBackend::new();
        let service = service(&backend);
        let goal = service.create_goal("alice", new_goal()).unwrap();

        let err = service.regenerate_breakdown("alice", goal.id, Some(4)).await.unwrap_err();
        assert!(matches!(
            err,
            GoalplanError::MissingPrerequisite { ref requirement, .. } if requirement == NEEDS_ANSWERS
        ));
    }

    #[tokio::test]
    async fn regenerate_reuses_answers_and_drops_stale_plan() {
        let backend = ScriptedBackend::with_texts([breakdown_text(3), plan_text(), breakdown_text(5)]);
        let service = service(&backend);
        let goal = service.create_goal("alice", new_goal()).unwrap();
        let answers = vec![AnswerEntry::new("Boat?", "Rented")];
        service.breakdown("alice", goal.id, answers.clone(), None).await.unwrap();
        service.implementation_plan("alice", goal.id).await.unwrap();

        let record = service.regenerate_breakdown("alice", goal.id, Some(5)).await.unwrap();
        assert_eq!(record.goal_breakdown.unwrap().phases.len(), 5);
        assert_eq!(record.questions_answers, Some(answers));
        assert!(record.implementation_plan.is_none());
        assert!(backend.calls()[2].messages[1].content.contains("Answer: Rented"));
    }

    #[tokio::test]
    async fn failed_generation_leaves_record_untouched() {
        let backend = ScriptedBackend::with_texts(["no json here"]);
        let service = service(&backend);
        let goal = service.create_goal("alice", new_goal()).unwrap();

        let err = service
            .breakdown("alice", goal.id, vec![AnswerEntry::new("q", "a")], None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GoalplanError::Generation(GenerationError::MalformedOutput { .. })
        ));
        assert_eq!(service.get_goal("alice", goal.id).unwrap(), goal);
    }

    #[tokio::test]
    async fn goals_are_scoped_by_user() {
        let backend = ScriptedBackend::new();
        let service = service(&backend);
        let goal = service.create_goal("alice", new_goal()).unwrap();

        let err = service.questions("bob", goal.id).await.unwrap_err();
        assert!(matches!(err, GoalplanError::Store(StoreError::NotFound { .. })));
        assert!(service.list_goals("bob").unwrap().is_empty());
    }

    #[tokio::test]
    async fn questions_never_fail_for_existing_goal() {
        let backend = ScriptedBackend::new();
        let service = service(&backend);
        let goal = service.create_goal("alice", new_goal()).unwrap();

        let set = service.questions("alice", goal.id).await.unwrap();
        assert_eq!(set, goalplan_validation::questions::default_questions());
    }

    #[tokio::test]
    async fn out_of_range_phase_count_is_rejected_before_calling_model() {
        let backend = ScriptedBackend::new();
        let service = service(&backend);
        let goal = service.create_goal("alice", new_goal()).unwrap();

        for phases in [0, MAX_PHASE_COUNT + 1] {
            let err = service
                .breakdown("alice", goal.id, Vec::new(), Some(phases))
                .await
                .unwrap_err();
            assert!(matches!(err, GoalplanError::Config(ConfigError::InvalidValue { .. })));
        }
        assert_eq!(backend.call_count(), 0);
    }
}
