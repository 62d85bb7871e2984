//! Goal workflow against the file-backed store, with scripted model output.

use std::sync::Arc;

use goalplan::error::StoreError;
use goalplan::llm::{LlmError, ScriptedBackend};
use goalplan::{
    AnswerEntry, ArtifactGenerator, ExitCode, FsGoalStore, GeneratorSettings, GoalService,
    GoalplanError, NewGoal,
};
use serde_json::json;
use tempfile::TempDir;

fn breakdown_text(phases: usize) -> String {
    let phases: Vec<_> = (0..phases)
        .map(|i| {
            json!({
                "id": format!("phase-{i}"),
                "name": format!("Phase {i}"),
                "focus_dimensions": ["endurance"],
                "milestones": [{"name": "10k run"}],
                "exit_criteria": {"skills_checklist": ["pacing"], "practical_tasks": []},
                "notes": "extra keys are kept"
            })
        })
        .collect();
    format!(
        "```json\n{}\n```",
        json!({
            "goal": {
                "description": "Run a marathon",
                "completion_criteria": {
                    "must_have_skills": ["pacing"],
                    "must_complete_tasks": ["a half marathon"],
                    "validation_methods": []
                }
            },
            "phases": phases
        })
    )
}

fn plan_text() -> String {
    "{\n  \"dimensions\": [\n    {\n      \"id\": \"d1\", \"name\": \"Endurance\", \"why\": \"distance\", \"phase\": \"p1\",\n      \
     \"options\": [{\"id\": \"o1\", \"name\": \"Long runs\", \"difficulty\": 3, \"time_cost\": \"4h/week\",\n      \
     \"actions\": [\"Run 15k on Sunday\",],},], // weekly\n    },\n  ],\n}"
        .to_string()
}

fn service(temp: &TempDir, backend: &ScriptedBackend) -> GoalService<FsGoalStore> {
    let store = FsGoalStore::new(temp.path()).unwrap();
    let generator = ArtifactGenerator::new(Arc::new(backend.clone()), GeneratorSettings::default());
    GoalService::new(store, generator)
}

fn marathon() -> NewGoal {
    NewGoal {
        wish: "Run a marathon".to_string(),
        outcome: "Finish under 4 hours".to_string(),
    }
}

#[tokio::test]
async fn goal_moves_through_every_stage_and_persists() {
    let temp = TempDir::new().unwrap();
    let backend = ScriptedBackend::with_texts([breakdown_text(3), plan_text()]);
    let service = service(&temp, &backend);

    let goal = service.create_goal("alice", marathon()).unwrap();
    assert_eq!(goal.stage_label(), "new");

    let questions = service.questions("alice", goal.id).await.unwrap();
    assert_eq!(questions.len(), 3, "exhausted backend falls back to defaults");

    let answers = vec![
        AnswerEntry::new("How far can you run today?", "5k"),
        AnswerEntry::new("How many days a week?", "3"),
    ];
    let record = service
        .breakdown("alice", goal.id, answers.clone(), Some(3))
        .await
        .unwrap();
    let breakdown = record.goal_breakdown.as_ref().unwrap();
    assert_eq!(breakdown.phase_ids(), ["p1", "p2", "p3"]);
    assert_eq!(breakdown.phases[0].extra["notes"], "extra keys are kept");

    let plan = service.implementation_plan("alice", goal.id).await.unwrap();
    assert_eq!(plan.dimensions[0].options[0].actions, ["Run 15k on Sunday"]);

    // A fresh store over the same directory sees everything
    let reopened = FsGoalStore::new(temp.path()).unwrap();
    let stored = goalplan::GoalStore::get(&reopened, "alice", goal.id).unwrap();
    assert_eq!(stored.questions_answers, Some(answers));
    assert_eq!(stored.implementation_plan, Some(plan));
    assert_eq!(stored.stage_label(), "planned");
    assert!(stored.updated_at >= stored.created_at);
}

#[tokio::test]
async fn prerequisites_are_enforced() {
    let temp = TempDir::new().unwrap();
    let backend = ScriptedBackend::new();
    let service = service(&temp, &backend);
    let goal = service.create_goal("alice", marathon()).unwrap();

    let err = service.implementation_plan("alice", goal.id).await.unwrap_err();
    assert_eq!(err.to_exit_code(), ExitCode::MISSING_PREREQUISITE);
    assert!(err.to_string().contains("generate a goal breakdown first"));

    let err = service.regenerate_breakdown("alice", goal.id, Some(2)).await.unwrap_err();
    assert_eq!(err.to_exit_code(), ExitCode::MISSING_PREREQUISITE);
    assert!(err.to_string().contains("answer the questions first"));

    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn unknown_and_foreign_goals_are_not_found() {
    let temp = TempDir::new().unwrap();
    let backend = ScriptedBackend::new();
    let service = service(&temp, &backend);
    let goal = service.create_goal("alice", marathon()).unwrap();

    for (user, id) in [("alice", goal.id + 1), ("bob", goal.id)] {
        let err = service.get_goal(user, id).unwrap_err();
        assert!(matches!(err, GoalplanError::Store(StoreError::NotFound { .. })));
        assert_eq!(err.to_exit_code(), ExitCode::GOAL_NOT_FOUND);
    }

    service.delete_goal("alice", goal.id).unwrap();
    assert!(service.list_goals("alice").unwrap().is_empty());
}

#[tokio::test]
async fn upstream_failures_map_to_service_exit_codes() {
    let temp = TempDir::new().unwrap();
    let backend = ScriptedBackend::new();
    backend.push_error(LlmError::Timeout {
        duration: std::time::Duration::from_secs(120),
    });
    backend.push_error(LlmError::ProviderOutage("503 Service Unavailable".to_string()));
    backend.push_text("The model wrote prose instead of JSON.");
    let service = service(&temp, &backend);
    let goal = service.create_goal("alice", marathon()).unwrap();
    let answers = vec![AnswerEntry::new("q", "a")];

    let mut codes = Vec::new();
    for _ in 0..3 {
        let err = service
            .breakdown("alice", goal.id, answers.clone(), None)
            .await
            .unwrap_err();
        assert!(err.display_for_user().starts_with("Error: "));
        codes.push(err.to_exit_code());
    }
    assert_eq!(
        codes,
        [ExitCode::LLM_TIMEOUT, ExitCode::LLM_UNAVAILABLE, ExitCode::MALFORMED_OUTPUT]
    );

    let stored = service.get_goal("alice", goal.id).unwrap();
    assert!(stored.questions_answers.is_none(), "answers are stored only with a breakdown");
}
