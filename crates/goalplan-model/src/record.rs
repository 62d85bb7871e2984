use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnswerEntry, GoalBreakdown, ImplementationPlan};

/// Input for creating a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGoal {
    pub wish: String,
    pub outcome: String,
}

/// A goal as persisted per user, with whatever artifacts have been generated so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: u64,
    pub user_id: String,
    pub wish: String,
    pub outcome: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub questions_answers: Option<Vec<AnswerEntry>>,
    #[serde(default)]
    pub goal_breakdown: Option<GoalBreakdown>,
    #[serde(default)]
    pub implementation_plan: Option<ImplementationPlan>,
}

impl GoalRecord {
    #[must_use]
    pub fn new(id: u64, user_id: impl Into<String>, goal: NewGoal, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            wish: goal.wish,
            outcome: goal.outcome,
            created_at: now,
            updated_at: now,
            questions_answers: None,
            goal_breakdown: None,
            implementation_plan: None,
        }
    }

    /// Short status label for listings.
    #[must_use]
    pub fn stage_label(&self) -> &'static str {
        if self.implementation_plan.is_some() {
            "planned"
        } else if self.goal_breakdown.is_some() {
            "broken down"
        } else if self.questions_answers.is_some() {
            "answered"
        } else {
            "new"
        }
    }
}
