//! Repair of model-generated question sets.
//!
//! Unlike breakdowns and plans, a question set is never rejected: missing
//! fields get fixed defaults, non-object entries are dropped, and when
//! nothing usable remains the caller falls back to [`default_questions`].

use std::collections::HashSet;

use goalplan_model::de::scalar_to_string;
use goalplan_model::{Question, QuestionSet};
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const DEFAULT_QUESTION: &str = "Please describe your thoughts";
pub const DEFAULT_PURPOSE: &str = "Learn more details";
pub const DEFAULT_EXPECTED_INSIGHT: &str = "Capture the user's specific thinking";

/// The canned three-question set used whenever generation cannot produce one.
#[must_use]
pub fn default_questions() -> QuestionSet {
    QuestionSet::new(vec![
        Question::new(
            "1",
            "What is your understanding of this goal?",
            "Make sure we share the same understanding of the goal",
            "Learn how you concretely picture the goal",
        ),
        Question::new(
            "2",
            "What is the main challenge you currently face in this direction?",
            "Identify potential obstacles",
            "Understand the specific difficulties to overcome",
        ),
        Question::new(
            "3",
            "Within what time frame do you hope to achieve this goal?",
            "Set a time frame",
            "Understand your time expectations",
        ),
    ])
}

/// Why a parsed response could not yield questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Neither `questions` nor `analysis.key_concerns` present.
    QuestionsMissing,
    /// `questions` present but not a list.
    QuestionsNotAList,
    /// Every entry was dropped, or the list was empty.
    NoUsableQuestions,
}

impl FallbackReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QuestionsMissing => "questions_missing",
            Self::QuestionsNotAList => "questions_not_a_list",
            Self::NoUsableQuestions => "no_usable_questions",
        }
    }
}

fn text_of(value: &Value) -> String {
    scalar_to_string(value).unwrap_or_else(|| value.to_string())
}

/// One question entry per concern, using a fixed template.
#[must_use]
pub fn questions_from_concerns(concerns: &[Value]) -> Vec<Value> {
    concerns
        .iter()
        .enumerate()
        .map(|(i, concern)| {
            let concern = text_of(concern);
            let mut entry = Map::new();
            entry.insert("id".to_string(), Value::String((i + 1).to_string()));
            entry.insert(
                "question".to_string(),
                Value::String(format!("About \"{concern}\", what is your specific situation?")),
            );
            entry.insert(
                "purpose".to_string(),
                Value::String(format!("Learn details about {concern}")),
            );
            entry.insert(
                "expected_insight".to_string(),
                Value::String(format!(
                    "Capture the user's specific situation regarding {concern}"
                )),
            );
            Value::Object(entry)
        })
        .collect()
}

fn field_or(entry: &Map<String, Value>, field: &str, default: impl FnOnce() -> String) -> String {
    entry
        .get(field)
        .and_then(scalar_to_string)
        .unwrap_or_else(default)
}

fn unique_id(position: usize, seen: &HashSet<String>) -> String {
    let base = position.to_string();
    if !seen.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{position}-{n}"))
        .find(|candidate| !seen.contains(candidate))
        .unwrap_or(base)
}

/// Repair a list of question entries.
///
/// Non-object entries are dropped. Missing `id` becomes the entry's 1-based
/// position; missing `question`, `purpose` and `expected_insight` get the
/// fixed defaults. A duplicate id is re-keyed so ids stay unique.
#[must_use]
pub fn repair(entries: &[Value]) -> Vec<Question> {
    let mut seen = HashSet::new();
    let mut repaired = Vec::with_capacity(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        let Value::Object(entry) = entry else {
            warn!(index = i, "dropping question entry that is not an object");
            continue;
        };
        let position = i + 1;

        let mut id = field_or(entry, "id", || position.to_string());
        if seen.contains(&id) {
            let replacement = unique_id(position, &seen);
            debug!(duplicate = %id, replacement = %replacement, "re-keying duplicate question id");
            id = replacement;
        }
        seen.insert(id.clone());

        repaired.push(Question {
            id,
            question: field_or(entry, "question", || DEFAULT_QUESTION.to_string()),
            purpose: field_or(entry, "purpose", || DEFAULT_PURPOSE.to_string()),
            expected_insight: field_or(entry, "expected_insight", || {
                DEFAULT_EXPECTED_INSIGHT.to_string()
            }),
        });
    }

    repaired
}

/// Build a question set from a parsed model response.
///
/// Uses `questions` when present, otherwise synthesizes from
/// `analysis.key_concerns`. The model's `analysis` block is kept.
pub fn repair_question_set(root: &Map<String, Value>) -> Result<QuestionSet, FallbackReason> {
    let analysis = root.get("analysis").cloned();

    let entries = match root.get("questions") {
        Some(Value::Array(list)) => list.clone(),
        Some(_) => return Err(FallbackReason::QuestionsNotAList),
        None => {
            let concerns = analysis
                .as_ref()
                .and_then(|a| a.get("key_concerns"))
                .and_then(Value::as_array)
                .ok_or(FallbackReason::QuestionsMissing)?;
            debug!(count = concerns.len(), "synthesizing questions from key concerns");
            questions_from_concerns(concerns)
        }
    };

    let questions = repair(&entries);
    if questions.is_empty() {
        return Err(FallbackReason::NoUsableQuestions);
    }
    Ok(QuestionSet::new(questions).with_analysis(analysis))
}
