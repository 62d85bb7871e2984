use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single clarifying question. All four fields are populated after repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    pub purpose: String,
    pub expected_insight: String,
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        purpose: impl Into<String>,
        expected_insight: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            purpose: purpose.into(),
            expected_insight: expected_insight.into(),
        }
    }
}

/// Ordered questions for a goal, plus the model's optional analysis block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
    pub questions: Vec<Question>,
}

impl QuestionSet {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            analysis: None,
            questions,
        }
    }

    #[must_use]
    pub fn with_analysis(mut self, analysis: Option<Value>) -> Self {
        self.analysis = analysis;
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
