//! Adapter from [`VisionModel`] to an `edgequake_llm` provider.
//!
//! Chat APIs have no notion of an image sitting between two texts, so the
//! ordered parts are folded into user messages: text accumulates into the
//! current message, images attach to it, and text arriving after an image
//! starts the next message. `[text, image, text]` therefore becomes
//! `user("text" + image)`, `user("text")`.

use super::{ModelReply, ModelRequest, RequestPart, VisionModel};
use crate::config::EvaluatorConfig;
use crate::error::AtsError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Backend backed by any edgequake-llm provider.
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    model: String,
    options: CompletionOptions,
    timeout: Option<Duration>,
}

impl ProviderModel {
    /// Wrap an already-constructed provider.
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            options: CompletionOptions::default(),
            timeout: None,
        }
    }

    /// Create the provider named in `config.provider_name` via
    /// [`ProviderFactory::create_llm_provider`], which reads that provider's
    /// own API key from the environment.
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self, AtsError> {
        let name = config.provider_name.as_deref().ok_or_else(|| {
            AtsError::InvalidConfig("no provider name configured".into())
        })?;
        let model = config.model.as_deref().ok_or_else(|| {
            AtsError::InvalidConfig(format!("provider '{name}' needs an explicit model id"))
        })?;

        let provider = ProviderFactory::create_llm_provider(name, model).map_err(|e| {
            AtsError::ProviderNotConfigured {
                provider: name.to_string(),
                hint: format!("{e}"),
            }
        })?;

        Ok(Self {
            provider,
            model: model.to_string(),
            options: CompletionOptions {
                temperature: config.temperature,
                ..Default::default()
            },
            timeout: config.api_timeout_secs.map(Duration::from_secs),
        })
    }
}

#[async_trait]
impl VisionModel for ProviderModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, AtsError> {
        let messages = to_messages(request);
        debug!("{} chat messages for {}", messages.len(), self.model);

        let call = self.provider.chat(&messages, Some(&self.options));
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                AtsError::ModelInvocation {
                    message: format!("request to {} timed out after {}s", self.model, limit.as_secs()),
                }
            })?,
            None => call.await,
        };

        let response = result.map_err(|e| AtsError::ModelInvocation {
            message: format!("{e}"),
        })?;

        Ok(ModelReply {
            text: response.content,
            input_tokens: Some(response.prompt_tokens as usize),
            output_tokens: Some(response.completion_tokens as usize),
        })
    }
}

fn to_messages(request: &ModelRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::new();
    let mut text = String::new();
    let mut images: Vec<ImageData> = Vec::new();

    for part in &request.parts {
        match part {
            RequestPart::Text(t) => {
                if !images.is_empty() {
                    flush(&mut messages, &mut text, &mut images);
                }
                if t.is_empty() {
                    continue;
                }
                if !text.is_empty() {
                    text.push_str("\n\n");
                }
                text.push_str(t);
            }
            RequestPart::Image(img) => {
                images.push(
                    ImageData::new(img.to_base64(), img.mime_type.as_str()).with_detail("high"),
                );
            }
        }
    }
    flush(&mut messages, &mut text, &mut images);
    messages
}

fn flush(messages: &mut Vec<ChatMessage>, text: &mut String, images: &mut Vec<ImageData>) {
    if text.is_empty() && images.is_empty() {
        return;
    }
    messages.push(ChatMessage::user_with_images(
        text.as_str(),
        std::mem::take(images),
    ));
    text.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::PreviewImage;

    fn preview() -> PreviewImage {
        PreviewImage {
            bytes: vec![0xFF, 0xD8, 0xFF],
            mime_type: "image/jpeg".into(),
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn text_image_text_becomes_two_messages() {
        let req = ModelRequest::new()
            .text("instruction")
            .image(preview())
            .text("job description");
        assert_eq!(to_messages(&req).len(), 2);
    }

    #[test]
    fn empty_context_is_dropped() {
        let req = ModelRequest::new().text("instruction").image(preview()).text("");
        assert_eq!(to_messages(&req).len(), 1);
    }

    #[test]
    fn from_config_requires_provider_name() {
        let config = EvaluatorConfig::default();
        assert!(matches!(
            ProviderModel::from_config(&config),
            Err(AtsError::InvalidConfig(_))
        ));
    }
}
