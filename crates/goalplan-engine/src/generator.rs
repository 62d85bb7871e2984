//! The artifact generator: prompt, model call, extraction, parsing,
//! validation and (for questions) repair, in that order.

use std::sync::Arc;
use std::time::Duration;

use goalplan_config::{Config, DEFAULT_REQUEST_TIMEOUT_SECS};
use goalplan_extraction::{ExtractionOutcome, TolerantParser, extract_with_outcome};
use goalplan_llm::{LlmBackend, LlmInvocation, Message};
use goalplan_model::{AnswerEntry, GoalBreakdown, ImplementationPlan, QuestionSet};
use goalplan_prompt_template::{PromptArgs, SYSTEM_PROMPT, build_prompt};
use goalplan_utils::error::{GenerationError, LlmError, ParseError};
use goalplan_utils::logging::{generation_span, truncate_for_log};
use goalplan_utils::types::{ArtifactKind, GenerationStage};
use goalplan_validation::SchemaValidator;
use goalplan_validation::questions::{default_questions, repair_question_set};
use serde_json::{Map, Value};
use tracing::{Instrument, debug, info, warn};

use crate::stage::StageTracker;

/// Characters of raw model output kept in debug logs.
const RAW_LOG_CHARS: usize = 500;

/// Per-generator settings, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    /// Model passed to the backend; empty selects the backend default.
    pub model: String,
    pub timeout: Duration,
    /// Reject breakdowns whose phase count differs from the request.
    pub strict_phase_count: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            model: String::new(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            strict_phase_count: false,
        }
    }
}

impl GeneratorSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model(),
            timeout: config.request_timeout(),
            strict_phase_count: config.strict_phase_count(),
        }
    }
}

/// Turns prompts into validated artifacts through an injected LLM backend.
///
/// Questions never fail: any failure yields the default question set.
/// Breakdowns and implementation plans fail with a [`GenerationError`]
/// naming the stage that went wrong.
///
/// The generator holds no mutable state, so concurrent calls are independent.
#[derive(Clone)]
pub struct ArtifactGenerator {
    backend: Arc<dyn LlmBackend>,
    settings: GeneratorSettings,
    validator: SchemaValidator,
}

impl ArtifactGenerator {
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>, settings: GeneratorSettings) -> Self {
        let validator = SchemaValidator::new().with_strict_phase_count(settings.strict_phase_count);
        Self {
            backend,
            settings,
            validator,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Clarifying questions for a wish and desired outcome.
    pub async fn generate_questions(&self, wish: &str, outcome: &str) -> QuestionSet {
        let kind = ArtifactKind::Questions;
        async {
            let mut tracker = StageTracker::new(kind);

            let data = match self
                .prompt_call_parse(PromptArgs::Questions { wish, outcome }, &mut tracker)
                .await
            {
                Ok(data) => data,
                Err(err) => {
                    tracker.fail(err.stage(), &err.to_string());
                    info!("using default questions");
                    return default_questions();
                }
            };

            match repair_question_set(&data) {
                Ok(set) => {
                    tracker.advance(GenerationStage::Repaired);
                    tracker.advance(GenerationStage::Done);
                    info!(count = set.len(), "questions generated");
                    set
                }
                Err(reason) => {
                    tracker.fail(GenerationStage::Repaired, reason.as_str());
                    info!("using default questions");
                    default_questions()
                }
            }
        }
        .instrument(generation_span(kind.as_str()))
        .await
    }

    /// Staged breakdown of a goal into (nominally) `phase_count` phases.
    ///
    /// Phase ids in the result are always `p1..pN`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] when the model is unreachable, its output
    /// cannot be parsed, or the parsed output is missing required fields.
    pub async fn generate_goal_breakdown(
        &self,
        wish: &str,
        outcome: &str,
        answers: &[AnswerEntry],
        phase_count: usize,
    ) -> Result<GoalBreakdown, GenerationError> {
        let kind = ArtifactKind::Breakdown;
        async {
            let mut tracker = StageTracker::new(kind);
            let args = PromptArgs::Breakdown {
                wish,
                outcome,
                answers,
                phase_count,
            };

            let result = match self.prompt_call_parse(args, &mut tracker).await {
                Ok(data) => self
                    .validator
                    .breakdown(data, phase_count)
                    .map_err(|source| GenerationError::InvalidOutput { kind, source }),
                Err(err) => Err(err),
            };

            finish(&mut tracker, result, |b| {
                info!(phases = b.phases.len(), "goal breakdown generated");
            })
        }
        .instrument(generation_span(kind.as_str()))
        .await
    }

    /// Implementation plan (dimensions, options, actions) for a breakdown.
    ///
    /// # Errors
    ///
    /// As for [`Self::generate_goal_breakdown`]; there is no default plan.
    pub async fn generate_implementation_plan(
        &self,
        breakdown: &GoalBreakdown,
    ) -> Result<ImplementationPlan, GenerationError> {
        let kind = ArtifactKind::ImplementationPlan;
        async {
            let mut tracker = StageTracker::new(kind);

            let result = match self
                .prompt_call_parse(PromptArgs::ImplementationPlan { breakdown }, &mut tracker)
                .await
            {
                Ok(data) => self
                    .validator
                    .implementation_plan(data)
                    .map_err(|source| GenerationError::InvalidOutput { kind, source }),
                Err(err) => Err(err),
            };

            finish(&mut tracker, result, |plan| {
                info!(
                    dimensions = plan.dimensions.len(),
                    options = plan.option_count(),
                    "implementation plan generated"
                );
            })
        }
        .instrument(generation_span(kind.as_str()))
        .await
    }

    /// Shared front half of every generation: build the prompt, call the
    /// model, extract and parse the response.
    async fn prompt_call_parse(
        &self,
        args: PromptArgs<'_>,
        tracker: &mut StageTracker,
    ) -> Result<Map<String, Value>, GenerationError> {
        let kind = args.kind();

        let prompt = build_prompt(args).map_err(|e| GenerationError::Prompt {
            kind,
            reason: e.to_string(),
        })?;
        tracker.advance(GenerationStage::Prompted);

        let raw = self
            .call_model(kind, prompt)
            .await
            .map_err(|source| GenerationError::UpstreamUnavailable { kind, source })?;
        tracker.advance(GenerationStage::Called);

        let extracted = extract_with_outcome(&raw);
        if extracted.outcome == ExtractionOutcome::Ambiguous {
            warn!(kind = %kind, "unbalanced code fence in model output, parsing it as is");
        }
        tracker.advance(GenerationStage::Extracted);

        let parsed = TolerantParser::for_kind(kind)
            .parse(extracted.text)
            .map_err(|source: ParseError| GenerationError::MalformedOutput { kind, source })?;
        tracker.advance(GenerationStage::Parsed);
        debug!(kind = %kind, strategy = parsed.strategy.name(), "model output parsed");

        Ok(parsed.value)
    }

    async fn call_model(&self, kind: ArtifactKind, prompt: String) -> Result<String, LlmError> {
        let invocation = LlmInvocation::new(
            kind,
            self.settings.model.clone(),
            self.settings.timeout,
            vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)],
        );

        let result = self.backend.invoke(invocation).await?;
        if result.raw_response.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: result.provider,
            });
        }

        debug!(
            provider = %result.provider,
            model = %result.model_used,
            chars = result.raw_response.chars().count(),
            response = %truncate_for_log(&result.raw_response, RAW_LOG_CHARS),
            "model responded"
        );
        Ok(result.raw_response)
    }
}

/// Close out a breakdown or plan generation: mark it validated and done,
/// or log the failure.
fn finish<T>(
    tracker: &mut StageTracker,
    result: Result<T, GenerationError>,
    on_success: impl FnOnce(&T),
) -> Result<T, GenerationError> {
    match &result {
        Ok(value) => {
            tracker.advance(GenerationStage::Validated);
            tracker.advance(GenerationStage::Done);
            on_success(value);
        }
        Err(err) => tracker.fail(err.stage(), &err.to_string()),
    }
    result
}
