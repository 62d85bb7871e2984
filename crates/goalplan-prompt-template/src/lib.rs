//! Prompt construction for the three generated artifacts.
//!
//! Every builder is a pure function: the same inputs always produce the same
//! prompt text. Each prompt prescribes the exact JSON shape the validator
//! expects and asks for a single JSON object without surrounding prose.

use goalplan_model::{AnswerEntry, GoalBreakdown};
use goalplan_utils::types::ArtifactKind;

/// System instruction sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = "You are a goal planning assistant. You help people turn a wish \
into a concrete, staged plan. You always answer with a single valid JSON object and nothing else.";

const JSON_ONLY: &str = "Respond with one JSON object only. Do not wrap it in prose. \
Do not add comments or trailing commas.";

/// Arguments for [`build_prompt`].
#[derive(Debug, Clone, Copy)]
pub enum PromptArgs<'a> {
    Questions {
        wish: &'a str,
        outcome: &'a str,
    },
    Breakdown {
        wish: &'a str,
        outcome: &'a str,
        answers: &'a [AnswerEntry],
        phase_count: usize,
    },
    ImplementationPlan {
        breakdown: &'a GoalBreakdown,
    },
}

impl PromptArgs<'_> {
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Questions { .. } => ArtifactKind::Questions,
            Self::Breakdown { .. } => ArtifactKind::Breakdown,
            Self::ImplementationPlan { .. } => ArtifactKind::ImplementationPlan,
        }
    }
}

/// Build the prompt for any artifact kind.
///
/// # Errors
///
/// Fails only when the breakdown embedded in an implementation-plan prompt
/// cannot be serialized.
pub fn build_prompt(args: PromptArgs<'_>) -> Result<String, serde_json::Error> {
    match args {
        PromptArgs::Questions { wish, outcome } => Ok(question_prompt(wish, outcome)),
        PromptArgs::Breakdown {
            wish,
            outcome,
            answers,
            phase_count,
        } => Ok(breakdown_prompt(wish, outcome, answers, phase_count)),
        PromptArgs::ImplementationPlan { breakdown } => implementation_plan_prompt(breakdown),
    }
}

#[must_use]
pub fn question_prompt(wish: &str, outcome: &str) -> String {
    format!(
        r#"A user wants to reach a goal.

Wish: {wish}
Desired outcome: {outcome}

Analyse the goal and ask 3 to 5 clarifying questions that reveal the user's
current state, available resources, constraints, and motivation.

Return JSON with this structure:
{{
  "analysis": {{
    "goal_summary": "one sentence summary of the goal",
    "key_concerns": ["concern the questions should resolve"]
  }},
  "questions": [
    {{
      "id": "1",
      "question": "the question to ask",
      "purpose": "why this question matters",
      "expected_insight": "what the answer should tell us"
    }}
  ]
}}

{JSON_ONLY}"#
    )
}

/// Render answers as `Question: ... / Answer: ...` pairs separated by blank lines.
#[must_use]
pub fn format_answers(answers: &[AnswerEntry]) -> String {
    if answers.is_empty() {
        return "(no answers provided)".to_string();
    }
    answers
        .iter()
        .map(|a| format!("Question: {}\nAnswer: {}", a.question, a.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[must_use]
pub fn breakdown_prompt(
    wish: &str,
    outcome: &str,
    answers: &[AnswerEntry],
    phase_count: usize,
) -> String {
    let answers = format_answers(answers);
    format!(
        r#"Break the following goal into exactly {phase_count} sequential phases.

Wish: {wish}
Desired outcome: {outcome}

The user answered these clarifying questions:
{answers}

Return JSON with this structure:
{{
  "goal": {{
    "description": "precise description of the end state",
    "completion_criteria": {{
      "must_have_skills": ["skill required at the end"],
      "must_complete_tasks": ["task that proves completion"],
      "validation_methods": ["how completion is verified"]
    }}
  }},
  "phases": [
    {{
      "id": "p1",
      "name": "phase name",
      "focus_dimensions": ["area this phase develops"],
      "milestones": [{{"title": "milestone", "description": "what is achieved"}}],
      "exit_criteria": {{
        "skills_checklist": ["skill mastered before moving on"],
        "practical_tasks": ["task completed before moving on"]
      }}
    }}
  ]
}}

The "phases" list must contain exactly {phase_count} entries, ordered from first to last.
{JSON_ONLY}"#
    )
}

/// # Errors
///
/// Fails when the breakdown cannot be serialized to JSON.
pub fn implementation_plan_prompt(breakdown: &GoalBreakdown) -> Result<String, serde_json::Error> {
    let breakdown_json = serde_json::to_string_pretty(breakdown)?;
    Ok(format!(
        r#"Here is a staged goal breakdown:
{breakdown_json}

Design an implementation plan for it. Identify the dimensions (skill areas or
facets) the user must work on. For each dimension offer alternative options,
each with concrete actions the user can start today. Tag every dimension with
the id of the phase (such as "p1") where it matters most.

Return JSON with this structure:
{{
  "dimensions": [
    {{
      "id": "d1",
      "name": "dimension name",
      "why": "why this dimension matters for the goal",
      "phase": "p1",
      "options": [
        {{
          "id": "d1o1",
          "name": "option name",
          "difficulty": 3,
          "time_cost": "estimated time, e.g. 5 hours/week",
          "actions": ["first concrete action", "second concrete action"]
        }}
      ]
    }}
  ]
}}

Every dimension needs at least one option and every option at least one action.
Difficulty is a number from 1 (easy) to 5 (hard).
{JSON_ONLY}"#
    ))
}
