use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::de::{de_string_like, de_string_list};

/// Staged goal breakdown. Phase ids are always `p1..pN` in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalBreakdown {
    pub goal: GoalSpec,
    pub phases: Vec<Phase>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSpec {
    #[serde(deserialize_with = "de_string_like")]
    pub description: String,
    pub completion_criteria: CompletionCriteria,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The three criteria lists. Each may be empty but all three are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionCriteria {
    pub must_have_skills: Vec<Value>,
    pub must_complete_tasks: Vec<Value>,
    pub validation_methods: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    #[serde(deserialize_with = "de_string_like")]
    pub id: String,
    #[serde(deserialize_with = "de_string_like")]
    pub name: String,
    #[serde(deserialize_with = "de_string_list")]
    pub focus_dimensions: Vec<String>,
    pub milestones: Vec<Value>,
    pub exit_criteria: ExitCriteria,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitCriteria {
    pub skills_checklist: Vec<Value>,
    pub practical_tasks: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GoalBreakdown {
    #[must_use]
    pub fn phase_ids(&self) -> Vec<&str> {
        self.phases.iter().map(|p| p.id.as_str()).collect()
    }

    #[must_use]
    pub fn phase(&self, id: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.id == id)
    }
}
