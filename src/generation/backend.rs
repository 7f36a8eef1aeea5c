//! Text generation backends.
//!
//! `GeminiBackend` talks to the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{classify_failure, FailureKind, GenerationError};

/// Per-call generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Structured-output schema. Gemma models reject it, so it is omitted
    /// for them and the prompt alone asks for JSON.
    pub response_schema: Option<Value>,
}

impl GenerationOptions {
    pub fn for_model(model: &str, schema: Value) -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 2048,
            response_schema: if model.starts_with("gemma") {
                None
            } else {
                Some(schema)
            },
        }
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one prompt against `model` and return the raw response text.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError>;
}

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// API key goes in a header, never in the URL.
    fn request(&self, model: &str, body: &GenerateContentRequest<'_>) -> reqwest::RequestBuilder {
        self.client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_output_tokens,
                response_mime_type: options
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json"),
                response_schema: options.response_schema.as_ref(),
            },
        };

        let response = self
            .request(model, &body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport {
                model: model.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match classify_failure(status.as_u16(), &message) {
                FailureKind::Quota => GenerationError::Quota {
                    model: model.to_string(),
                    message,
                },
                FailureKind::NotFound => GenerationError::ModelNotFound {
                    model: model.to_string(),
                },
                FailureKind::Overloaded => GenerationError::Overloaded {
                    model: model.to_string(),
                },
                FailureKind::Other => GenerationError::Http {
                    model: model.to_string(),
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|e| GenerationError::Transport {
                model: model.to_string(),
                message: format!("invalid response body: {}", e),
            })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse {
                model: model.to_string(),
            });
        }
        Ok(text)
    }
}
