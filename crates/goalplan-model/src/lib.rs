//! Artifact shapes produced by the generator and the goal record that stores them.
//!
//! Model-authored content that has no fixed structure (milestones, skills,
//! tasks) stays as `serde_json::Value`; only the fields the pipeline checks
//! are typed. Unknown keys on breakdown objects are kept in `extra` maps so
//! nothing the model produced is lost on a save/load cycle.

mod answers;
mod breakdown;
pub mod de;
mod plan;
mod questions;
mod record;

pub use answers::{AnswerEntry, answers_from_value};
pub use breakdown::{CompletionCriteria, ExitCriteria, GoalBreakdown, GoalSpec, Phase};
pub use plan::{Dimension, ImplementationPlan, PlanOption};
pub use questions::{Question, QuestionSet};
pub use record::{GoalRecord, NewGoal};
