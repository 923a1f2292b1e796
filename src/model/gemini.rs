//! Direct client for the Gemini `generateContent` REST endpoint.
//!
//! The request carries one `user` turn whose parts mirror [`ModelRequest`]
//! exactly: `{text}`, `{inline_data: {mime_type, data}}`, `{text}`. Gemini
//! rejects empty text parts, so those are dropped from the wire body.

use super::{ModelReply, ModelRequest, RequestPart, VisionModel};
use crate::config::EvaluatorConfig;
use crate::error::AtsError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Gemini backend.
#[derive(Clone)]
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: Option<f32>,
}

impl GeminiModel {
    /// Build from a validated config. Fails when no API key is set.
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self, AtsError> {
        config.require_credential()?;
        let api_key = config.api_key.clone().unwrap_or_default();

        let mut builder = Client::builder();
        if let Some(secs) = config.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AtsError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: config.model_id().to_string(),
            base_url: config.gemini_base_url.clone(),
            temperature: config.temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl VisionModel for GeminiModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, AtsError> {
        let body = build_body(request, self.temperature);
        debug!("POST {} ({} parts)", self.endpoint(), body.contents[0].parts.len());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AtsError::ModelInvocation {
                message: if e.is_timeout() {
                    format!("request to {} timed out", self.model)
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AtsError::ModelInvocation {
                message: format!("reading response body: {e}"),
            })?;

        if !status.is_success() {
            warn!("Gemini returned HTTP {}", status.as_u16());
            return Err(AtsError::ModelInvocation {
                message: error_message(status.as_u16(), &text),
            });
        }

        parse_reply(&text)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<usize>,
    candidates_token_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    status: Option<String>,
}

// ── Mapping ──────────────────────────────────────────────────────────────────

fn build_body(request: &ModelRequest, temperature: Option<f32>) -> GenerateRequest<'_> {
    let parts = request
        .parts
        .iter()
        .filter_map(|part| match part {
            RequestPart::Text(t) if t.is_empty() => None,
            RequestPart::Text(t) => Some(Part::Text { text: t }),
            RequestPart::Image(img) => Some(Part::InlineData {
                inline_data: InlineData {
                    mime_type: &img.mime_type,
                    data: img.to_base64(),
                },
            }),
        })
        .collect();

    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        generation_config: temperature.map(|temperature| GenerationConfig { temperature }),
    }
}

fn parse_reply(body: &str) -> Result<ModelReply, AtsError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| AtsError::ModelInvocation {
            message: format!("unexpected response body: {e}"),
        })?;

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(AtsError::ModelInvocation {
            message: format!("model returned no reply ({reason})"),
        });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "unknown".to_string());
        return Err(AtsError::ModelInvocation {
            message: format!("model returned an empty reply (finish reason: {reason})"),
        });
    }

    let usage = parsed.usage_metadata;
    Ok(ModelReply {
        text,
        input_tokens: usage.as_ref().and_then(|u| u.prompt_token_count),
        output_tokens: usage.as_ref().and_then(|u| u.candidates_token_count),
    })
}

fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => match env.error.status {
            Some(s) => format!("HTTP {status} {s}: {}", env.error.message),
            None => format!("HTTP {status}: {}", env.error.message),
        },
        Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => format!("HTTP {status}: {}", body.trim()),
    }
}
