//! Model backends: the seam between the dispatcher and a remote VLM.
//!
//! [`VisionModel`] takes an ordered list of text and image parts and returns
//! the reply text. Two implementations ship with the crate:
//!
//! * [`GeminiModel`]: the default. Calls the Gemini `generateContent` REST
//!   endpoint directly so the part order (text, image, text) is sent exactly
//!   as built.
//! * [`ProviderModel`]: adapts any `edgequake_llm` provider (OpenAI,
//!   Anthropic, Ollama, …) for users who select `--provider`.
//!
//! Tests plug in their own implementation to observe calls without a network.

pub mod gemini;
pub mod provider;

pub use gemini::GeminiModel;
pub use provider::ProviderModel;

use crate::error::AtsError;
use crate::output::PreviewImage;
use async_trait::async_trait;

/// One part of a model request.
#[derive(Debug, Clone)]
pub enum RequestPart {
    Text(String),
    Image(PreviewImage),
}

/// Ordered, multimodal request for a single completion.
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    pub parts: Vec<RequestPart>,
}

impl ModelRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(RequestPart::Text(text.into()));
        self
    }

    pub fn image(mut self, image: PreviewImage) -> Self {
        self.parts.push(RequestPart::Image(image));
        self
    }
}

/// Raw reply from a backend.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub text: String,
    pub input_tokens: Option<usize>,
    pub output_tokens: Option<usize>,
}

/// A vision-capable text generator.
///
/// `generate` makes exactly one remote call and never retries; any failure
/// is returned as [`AtsError::ModelInvocation`].
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Identifier of the model requests are sent to.
    fn model_id(&self) -> &str;

    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, AtsError>;
}
