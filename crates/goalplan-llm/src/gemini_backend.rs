//! Google Gemini HTTP backend
//!
//! Talks to the `generateContent` endpoint of the Generative Language API.

use crate::http_client::HttpClient;
use crate::types::{LlmBackend, LlmInvocation, LlmResult, Message, Role};
use async_trait::async_trait;
use goalplan_config::{Config, default_api_key_env_for};
use goalplan_utils::error::LlmError;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROVIDER: &str = "gemini";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: 8192,
            temperature: 0.7,
        }
    }
}

#[derive(Clone)]
pub(crate) struct GeminiBackend {
    client: HttpClient,
    base_url: String,
    api_key: String,
    default_model: String,
    default_params: GenerationParams,
}

impl GeminiBackend {
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the HTTP client cannot be constructed
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        default_model: String,
        default_params: GenerationParams,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            default_model,
            default_params,
        })
    }

    /// Build from `[llm.gemini]`, reading the key from the configured env var.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` when the API key variable is unset.
    pub fn new_from_config(
        config: &Config,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, LlmError> {
        let section = config.llm.gemini.clone().unwrap_or_default();
        let api_key_env = section
            .api_key_env
            .as_deref()
            .unwrap_or(default_api_key_env_for(PROVIDER));

        let api_key = env(api_key_env).filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            LlmError::Misconfiguration(format!(
                "Gemini API key not found in environment variable '{api_key_env}'. \
                 Set this variable or configure a different api_key_env in [llm.gemini]."
            ))
        })?;

        let defaults = GenerationParams::default();
        let params = GenerationParams {
            max_output_tokens: section.max_tokens.unwrap_or(defaults.max_output_tokens),
            temperature: section
                .temperature
                .map_or(defaults.temperature, |t| t as f32),
        };

        Self::new(api_key, section.base_url, config.model(), params)
    }

    fn resolve_params(&self, inv: &LlmInvocation) -> (String, GenerationParams) {
        let model = if inv.model.is_empty() {
            self.default_model.clone()
        } else {
            inv.model.clone()
        };

        let max_output_tokens = inv
            .metadata
            .get("max_tokens")
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(self.default_params.max_output_tokens);

        let temperature = inv
            .metadata
            .get("temperature")
            .and_then(serde_json::Value::as_f64)
            .map_or(self.default_params.temperature, |v| v as f32);

        (
            model,
            GenerationParams {
                max_output_tokens,
                temperature,
            },
        )
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent?key={}",
            self.base_url, self.api_key
        )
    }

    /// System messages go to `systemInstruction`; the rest become `contents`
    /// with Gemini's `user` / `model` roles.
    fn convert_messages(messages: &[Message]) -> (Option<GeminiContent>, Vec<GeminiContent>) {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for msg in messages {
            let part = GeminiPart {
                text: Some(msg.content.clone()),
            };
            match msg.role {
                Role::System => system_parts.push(part),
                Role::User => contents.push(GeminiContent {
                    role: Some("user".to_string()),
                    parts: vec![part],
                }),
                Role::Assistant => contents.push(GeminiContent {
                    role: Some("model".to_string()),
                    parts: vec![part],
                }),
            }
        }

        let system = (!system_parts.is_empty()).then_some(GeminiContent {
            role: None,
            parts: system_parts,
        });
        (system, contents)
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        let (model, params) = self.resolve_params(&inv);

        debug!(
            provider = PROVIDER,
            kind = %inv.kind,
            model = %model,
            max_output_tokens = params.max_output_tokens,
            temperature = params.temperature,
            timeout_secs = inv.timeout.as_secs(),
            "Invoking Gemini backend"
        );

        let (system_instruction, contents) = Self::convert_messages(&inv.messages);
        let request_body = GeminiRequest {
            contents,
            system_instruction,
            generation_config: GeminiGenerationConfig {
                max_output_tokens: params.max_output_tokens,
                temperature: params.temperature,
            },
        };

        let request = self
            .client
            .post(&self.endpoint(&model))
            .header("content-type", "application/json")
            .json(&request_body);

        let response = self
            .client
            .execute_with_retry(request, inv.timeout, PROVIDER)
            .await?;

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to parse Gemini response: {e}")))?;

        let content = body.first_candidate_text();
        if content.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: PROVIDER.to_string(),
            });
        }

        let mut result = LlmResult::new(content, PROVIDER, model);
        if let Some(usage) = body.usage_metadata {
            result.tokens_input = usage.prompt_token_count;
            result.tokens_output = usage.candidates_token_count;
        }

        debug!(
            provider = PROVIDER,
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "Gemini invocation completed"
        );

        Ok(result)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate.
    fn first_candidate_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use goalplan_config::ProviderConfig;
    use goalplan_utils::types::ArtifactKind;
    use serde_json::json;
    use std::time::Duration;

    fn backend() -> GeminiBackend {
        GeminiBackend::new(
            "test-key".to_string(),
            Some("https://example.test/v1beta/".to_string()),
            "gemini-1.5-flash".to_string(),
            GenerationParams {
                max_output_tokens: 1024,
                temperature: 0.5,
            },
        )
        .unwrap()
    }

    fn invocation(model: &str) -> LlmInvocation {
        LlmInvocation::new(
            ArtifactKind::Questions,
            model,
            Duration::from_secs(30),
            vec![],
        )
    }

    #[test]
    fn resolve_params_uses_defaults_and_overrides() {
        let backend = backend();
        let (model, params) = backend.resolve_params(&invocation(""));
        assert_eq!(model, "gemini-1.5-flash");
        assert_eq!(params.max_output_tokens, 1024);

        let inv = invocation("gemini-2.0-pro")
            .with_metadata("max_tokens", json!(2048))
            .with_metadata("temperature", json!(0.1));
        let (model, params) = backend.resolve_params(&inv);
        assert_eq!(model, "gemini-2.0-pro");
        assert_eq!(params.max_output_tokens, 2048);
        assert!((params.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        assert_eq!(
            backend().endpoint("m"),
            "https://example.test/v1beta/models/m:generateContent?key=test-key"
        );
    }

    #[test]
    fn convert_messages_maps_roles() {
        let (system, contents) = GeminiBackend::convert_messages(&[
            Message::system("be terse"),
            Message::user("hi"),
            Message::assistant("hello"),
        ]);
        let system = system.unwrap();
        assert_eq!(system.parts[0].text.as_deref(), Some("be terse"));
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role.as_deref(), Some("user"));
        assert_eq!(contents[1].role.as_deref(), Some("model"));
    }

    #[test]
    fn request_body_uses_camel_case() {
        let (system_instruction, contents) =
            GeminiBackend::convert_messages(&[Message::user("hi")]);
        let body = serde_json::to_value(GeminiRequest {
            contents,
            system_instruction,
            generation_config: GeminiGenerationConfig {
                max_output_tokens: 10,
                temperature: 0.5,
            },
        })
        .unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 10);
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn response_text_concatenates_first_candidate_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": "1}"}]}},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
        }))
        .unwrap();
        assert_eq!(response.first_candidate_text(), "{\"a\":1}");

        let empty: GeminiResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
        assert_eq!(empty.first_candidate_text(), "");
    }

    #[test]
    fn missing_api_key_is_misconfiguration() {
        let mut config = Config::minimal_for_testing();
        config.llm.gemini = Some(ProviderConfig {
            api_key_env: Some("GOALPLAN_TEST_GEMINI_KEY".to_string()),
            ..ProviderConfig::default()
        });

        match GeminiBackend::new_from_config(&config, &|_| None) {
            Err(LlmError::Misconfiguration(msg)) => {
                assert!(msg.contains("GOALPLAN_TEST_GEMINI_KEY"));
                assert!(msg.contains("not found"));
            }
            Err(other) => panic!("expected Misconfiguration, got {other:?}"),
            Ok(_) => panic!("expected Misconfiguration, got a backend"),
        }
    }

    #[test]
    fn config_supplies_model_and_params() {
        let mut config = Config::minimal_for_testing();
        config.llm.gemini = Some(ProviderConfig {
            model: Some("gemini-2.0-flash".to_string()),
            max_tokens: Some(512),
            temperature: Some(0.25),
            ..ProviderConfig::default()
        });
        let env = |key: &str| (key == "GEMINI_API_KEY").then(|| "k".to_string());

        let backend = GeminiBackend::new_from_config(&config, &env).unwrap();
        assert_eq!(backend.default_model, "gemini-2.0-flash");
        assert_eq!(backend.default_params.max_output_tokens, 512);
        assert_eq!(backend.base_url, DEFAULT_BASE_URL);
    }
}
