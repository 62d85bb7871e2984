use std::borrow::Cow;

use goalplan_utils::error::ParseError;
use goalplan_utils::logging::truncate_for_log;
use goalplan_utils::types::ArtifactKind;
use serde_json::{Map, Value};
use tracing::debug;

use crate::repair::{brace_slice, remove_trailing_commas, strip_line_comments};

/// One way of turning model text into a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Parse the text as-is.
    Strict,
    /// Collapse newlines and parse the span from the first `{` to the last `}`.
    BraceSlice,
    /// Drop `//` comments and blank lines, then parse.
    CommentStripped,
    /// Drop comments, remove trailing commas before `]`/`}`, then parse.
    CommentStrippedTrailingCommas,
}

impl ParseStrategy {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::BraceSlice => "brace_slice",
            Self::CommentStripped => "comment_stripped",
            Self::CommentStrippedTrailingCommas => "trailing_comma_fixup",
        }
    }

    /// The text this strategy hands to the strict parser, or `None` when the
    /// strategy cannot apply (no braces to slice between).
    fn prepare(self, text: &str) -> Option<Cow<'_, str>> {
        match self {
            Self::Strict => Some(Cow::Borrowed(text)),
            Self::BraceSlice => brace_slice(text).map(Cow::Owned),
            Self::CommentStripped => Some(Cow::Owned(strip_line_comments(text))),
            Self::CommentStrippedTrailingCommas => Some(Cow::Owned(remove_trailing_commas(
                &strip_line_comments(text),
            ))),
        }
    }

    /// Run this strategy alone. Only a JSON object counts as success.
    pub fn attempt(self, text: &str) -> Result<Map<String, Value>, ParseError> {
        let Some(candidate) = self.prepare(text) else {
            return Err(ParseError::new(
                self.name(),
                "no '{' ... '}' span found",
                text,
            ));
        };
        match serde_json::from_str::<Value>(&candidate) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ParseError::new(
                self.name(),
                format!("expected a JSON object, found {}", json_type_name(&other)),
                &candidate,
            )),
            Err(e) => Err(ParseError::new(self.name(), e.to_string(), &candidate)),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Successful parse together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub value: Map<String, Value>,
    pub strategy: ParseStrategy,
}

/// Ordered list of parse strategies, tried until one succeeds.
///
/// ```rust
/// use goalplan_extraction::{ParseStrategy, TolerantParser};
/// use goalplan_utils::types::ArtifactKind;
///
/// let parser = TolerantParser::for_kind(ArtifactKind::ImplementationPlan);
/// let parsed = parser.parse("{\n\"dimensions\": [1, 2,], // two\n}").unwrap();
/// assert_eq!(parsed.strategy, ParseStrategy::CommentStrippedTrailingCommas);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TolerantParser {
    strategies: Vec<ParseStrategy>,
}

impl TolerantParser {
    #[must_use]
    pub fn new(strategies: Vec<ParseStrategy>) -> Self {
        Self { strategies }
    }

    /// Strict parse, then brace slicing.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![ParseStrategy::Strict, ParseStrategy::BraceSlice])
    }

    /// All strategies, including comment stripping and trailing-comma repair.
    #[must_use]
    pub fn lenient() -> Self {
        Self::new(vec![
            ParseStrategy::Strict,
            ParseStrategy::BraceSlice,
            ParseStrategy::CommentStripped,
            ParseStrategy::CommentStrippedTrailingCommas,
        ])
    }

    /// Implementation plans get the comment and comma repairs; the other
    /// artifacts stop after brace slicing.
    #[must_use]
    pub fn for_kind(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::ImplementationPlan => Self::lenient(),
            ArtifactKind::Questions | ArtifactKind::Breakdown => Self::standard(),
        }
    }

    #[must_use]
    pub fn strategies(&self) -> &[ParseStrategy] {
        &self.strategies
    }

    /// Try each strategy in order and return the first object parsed.
    ///
    /// # Errors
    ///
    /// When every strategy fails, returns the error of the last one tried,
    /// carrying the (truncated) text it attempted.
    pub fn parse(&self, text: &str) -> Result<Parsed, ParseError> {
        let mut last_error = None;

        for &strategy in &self.strategies {
            match strategy.attempt(text) {
                Ok(value) => {
                    debug!(strategy = strategy.name(), "parsed model output");
                    return Ok(Parsed { value, strategy });
                }
                Err(err) => {
                    debug!(
                        strategy = strategy.name(),
                        error = %err.message,
                        "parse strategy failed"
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ParseError::new("none", "no parse strategies configured", &truncate_for_log(text, 200))
        }))
    }
}

impl Default for TolerantParser {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn strict_json_uses_first_strategy() {
        let parsed = TolerantParser::standard().parse(r#"{"a": 1}"#).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Strict);
        assert_eq!(Value::Object(parsed.value), json!({"a": 1}));
    }

    #[test]
    fn prose_wrapped_json_is_brace_sliced() {
        let text = "Here you go:\n{\"questions\": [\n{\"id\": \"1\"}\n]}\nHope this helps.";
        let parsed = TolerantParser::standard().parse(text).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::BraceSlice);
        assert_eq!(parsed.value["questions"][0]["id"], json!("1"));
    }

    #[test]
    fn raw_newlines_inside_strings_are_recovered_by_collapsing() {
        let text = "{\"description\": \"line one\nline two\"}";
        let parsed = TolerantParser::standard().parse(text).unwrap();
        assert_eq!(parsed.value["description"], json!("line one line two"));
    }

    #[test]
    fn comments_are_only_stripped_for_implementation_plans() {
        let text = "{\n// plan\n\"dimensions\": []\n}";
        assert!(TolerantParser::for_kind(ArtifactKind::Breakdown).parse(text).is_err());
        let parsed = TolerantParser::for_kind(ArtifactKind::ImplementationPlan)
            .parse(text)
            .unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::CommentStripped);
    }

    #[test]
    fn trailing_commas_are_fixed_last() {
        let text = "{\n\"dimensions\": [\n{\"id\": \"d1\", \"options\": [],},\n],\n}";
        let parsed = TolerantParser::lenient().parse(text).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::CommentStrippedTrailingCommas);
        assert_eq!(
            Value::Object(parsed.value),
            json!({"dimensions": [{"id": "d1", "options": []}]})
        );
    }

    #[test]
    fn failure_reports_last_strategy_and_text() {
        let err = TolerantParser::lenient().parse("{ not json at all ").unwrap_err();
        assert_eq!(err.strategy, "trailing_comma_fixup");
        assert!(err.attempted.contains("not json"));
        assert!(!err.message.is_empty());
    }

    #[test]
    fn non_object_json_is_rejected() {
        let err = TolerantParser::standard().parse("[1, 2, 3]").unwrap_err();
        assert_eq!(err.strategy, "brace_slice");
        let err = ParseStrategy::Strict.attempt("[1]").unwrap_err();
        assert!(err.message.contains("an array"));
    }

    #[test]
    fn empty_strategy_list_fails_cleanly() {
        let err = TolerantParser::new(Vec::new()).parse("{}").unwrap_err();
        assert_eq!(err.strategy, "none");
    }

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-zA-Z0-9 ,:{}\\[\\]/]{0,12}".prop_map(Value::String),
        ]
    }

    fn json_object() -> impl Strategy<Value = Value> {
        let value = json_leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,8}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        });
        prop::collection::btree_map("[a-z_]{1,8}", value, 0..5)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    }

    /// Pretty-print with a trailing comma after the last element of every
    /// non-empty array and object.
    fn with_trailing_commas(value: &Value) -> String {
        match value {
            Value::Array(items) if !items.is_empty() => {
                let inner: Vec<String> = items.iter().map(with_trailing_commas).collect();
                format!("[\n{},\n]", inner.join(",\n"))
            }
            Value::Object(map) if !map.is_empty() => {
                let inner: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{}: {}", Value::String(k.clone()), with_trailing_commas(v)))
                    .collect();
                format!("{{\n{},\n}}", inner.join(",\n"))
            }
            other => other.to_string(),
        }
    }

    proptest! {
        #[test]
        fn fenced_json_parses_like_its_contents(value in json_object(), pretty in any::<bool>()) {
            let body = if pretty {
                serde_json::to_string_pretty(&value).unwrap()
            } else {
                serde_json::to_string(&value).unwrap()
            };
            let raw = format!("```json\n{body}\n```");

            let direct = TolerantParser::lenient().parse(&body).unwrap();
            let via_fence = TolerantParser::lenient().parse(extract(&raw)).unwrap();
            prop_assert_eq!(direct.value, via_fence.value);
        }

        #[test]
        fn trailing_commas_are_recovered(value in json_object()) {
            let text = with_trailing_commas(&value);
            let parsed = TolerantParser::lenient().parse(&text).unwrap();
            prop_assert_eq!(Value::Object(parsed.value), value);
        }

        #[test]
        fn parser_never_panics(text in ".{0,200}") {
            let _ = TolerantParser::lenient().parse(&text);
        }
    }
}
