use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::de::scalar_to_string;

/// One answered clarifying question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question: String,
    pub answer: String,
}

impl AnswerEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Normalize user-supplied answers into an ordered list.
///
/// Accepts a list of `{question, answer}` objects, or a map whose values are
/// either `{question, answer}` objects (keyed by position, `"1"`, `"2"`, ...)
/// or plain answers keyed by their question. A missing or null `question`
/// or `answer` becomes an empty string. Map entries come out in numeric key
/// order when every key is a number, otherwise in key order.
///
/// # Errors
///
/// Returns a description of the first entry that has none of these shapes.
pub fn answers_from_value(value: &Value) -> Result<Vec<AnswerEntry>, String> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(entry) => entry_from_object(entry, &format!("answer {}", i + 1)),
                _ => Err(format!(
                    "answer {} must be an object with 'question' and 'answer' fields",
                    i + 1
                )),
            })
            .collect(),
        Value::Object(map) => {
            let mut keyed: Vec<(&String, &Value)> = map.iter().collect();
            if keyed.iter().all(|(k, _)| k.parse::<u64>().is_ok()) {
                keyed.sort_by_key(|(k, _)| k.parse::<u64>().unwrap_or(u64::MAX));
            }
            keyed
                .into_iter()
                .map(|(key, value)| match value {
                    Value::Object(entry) => entry_from_object(entry, &format!("answer '{key}'")),
                    scalar => scalar_to_string(scalar)
                        .map(|a| AnswerEntry::new(key.clone(), a))
                        .ok_or_else(|| format!("answer to '{key}' must be a string or an object")),
                })
                .collect()
        }
        other => Err(format!(
            "answers must be a list or a map, got {}",
            match other {
                Value::Null => "null",
                Value::Bool(_) => "a boolean",
                Value::Number(_) => "a number",
                _ => "a string",
            }
        )),
    }
}

fn entry_from_object(entry: &Map<String, Value>, label: &str) -> Result<AnswerEntry, String> {
    let field = |name: &str| match entry.get(name) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(value) => scalar_to_string(value)
            .ok_or_else(|| format!("{label}: '{name}' must be a string")),
    };
    Ok(AnswerEntry::new(field("question")?, field("answer")?))
}
