//! Evaluation dispatch: one prompt, one image, one context string, one call.
//!
//! The request is always `[instruction, image, job description]` in that
//! order. There is no retry: a failed call is returned to the user as-is.

use crate::error::AtsError;
use crate::model::{ModelRequest, VisionModel};
use crate::output::{ModelResponse, PreviewImage};
use crate::prompts::PromptTemplate;
use std::time::Instant;
use tracing::{debug, warn};

/// Build the ordered request for `template`.
pub fn build_request(
    template: PromptTemplate,
    preview: &PreviewImage,
    context: &str,
) -> ModelRequest {
    ModelRequest::new()
        .text(template.text())
        .image(preview.clone())
        .text(context)
}

/// Send one evaluation request and wait for the full reply.
pub async fn dispatch(
    model: &dyn VisionModel,
    template: PromptTemplate,
    preview: &PreviewImage,
    context: &str,
) -> Result<ModelResponse, AtsError> {
    let request = build_request(template, preview, context);
    let start = Instant::now();

    let reply = model.generate(&request).await.map_err(|e| {
        warn!("{:?} dispatch to {} failed — {}", template, model.model_id(), e);
        match e {
            AtsError::ModelInvocation { .. } => e,
            other => AtsError::ModelInvocation {
                message: other.to_string(),
            },
        }
    })?;

    let duration = start.elapsed();
    debug!(
        "{:?}: {:?} input tokens, {:?} output tokens, {:?}",
        template, reply.input_tokens, reply.output_tokens, duration
    );

    Ok(ModelResponse {
        text: reply.text,
        model: model.model_id().to_string(),
        input_tokens: reply.input_tokens,
        output_tokens: reply.output_tokens,
        duration_ms: duration.as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RequestPart;

    #[test]
    fn request_is_instruction_image_context() {
        let preview = PreviewImage {
            bytes: vec![1],
            mime_type: "image/jpeg".into(),
            width: 1,
            height: 1,
        };
        let req = build_request(PromptTemplate::FormatCritique, &preview, "Senior DS role");
        assert_eq!(req.parts.len(), 3);
        assert!(
            matches!(req.parts[0], RequestPart::Text(ref t) if t == PromptTemplate::FormatCritique.text())
        );
        assert!(matches!(req.parts[1], RequestPart::Image(ref i) if *i == preview));
        assert!(matches!(req.parts[2], RequestPart::Text(ref t) if t == "Senior DS role"));
    }
}
