//! Interaction entry points.
//!
//! One call to [`evaluate`] is one user action, start to finish:
//!
//! ```text
//! DocumentCheck ─(none)─▶ MissingInput
//!       │
//!  Extracting ─▶ Extracted ─▶ Dispatching ─▶ Completed ─▶ [ParsingVerdict] ─▶ Done
//! ```
//!
//! Nothing carries over between calls: the preview is re-rendered every time,
//! even for the same resume.

use crate::action::Action;
use crate::config::EvaluatorConfig;
use crate::error::AtsError;
use crate::model::{GeminiModel, ProviderModel, VisionModel};
use crate::output::{EvaluationOutcome, EvaluationStats, PreviewImage};
use crate::pipeline::input::UploadedDocument;
use crate::pipeline::{encode, llm, render, verdict};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Render page 1 of `document` into a JPEG preview.
///
/// # Errors
/// - [`AtsError::DocumentRender`] for anything that is not a readable PDF
///   (checked by signature before pdfium is loaded)
/// - [`AtsError::PdfiumBinding`] if the pdfium library cannot be found
pub async fn extract_preview(
    document: &UploadedDocument,
    config: &EvaluatorConfig,
) -> Result<PreviewImage, AtsError> {
    if !document.has_pdf_magic() {
        let head: Vec<u8> = document.bytes().iter().take(4).copied().collect();
        return Err(AtsError::DocumentRender {
            name: document.name().to_string(),
            detail: format!("not a PDF (first bytes: {:?})", head),
        });
    }

    let image = render::render_first_page(document, config).await?;
    encode::encode_preview(&image, config.jpeg_quality).map_err(|e| AtsError::DocumentRender {
        name: document.name().to_string(),
        detail: format!("image encoding failed: {}", e),
    })
}

/// Run one action against a resume and job description.
///
/// The document check happens first: with no document (or an empty one)
/// this returns [`AtsError::MissingInput`] without rendering anything or
/// calling `model`.
pub async fn evaluate(
    action: Action,
    document: Option<&UploadedDocument>,
    job_description: &str,
    model: &dyn VisionModel,
    config: &EvaluatorConfig,
) -> Result<EvaluationOutcome, AtsError> {
    let total_start = Instant::now();

    let document = match document {
        Some(doc) if !doc.is_empty() => doc,
        _ => {
            warn!("{}: no resume supplied", action);
            return Err(AtsError::MissingInput);
        }
    };
    info!("{}: extracting preview from {}", action, document.name());

    let render_start = Instant::now();
    let preview = extract_preview(document, config).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    debug!("{}: preview ready in {}ms", action, render_duration_ms);

    info!("{}: dispatching to {}", action, model.model_id());
    let response = llm::dispatch(model, action.template(), &preview, job_description).await?;

    let verdict = if action.wants_verdict() {
        let v = verdict::parse_verdict(&response.text);
        info!("{}: verdict {:?}", action, v);
        Some(v)
    } else {
        None
    };

    let stats = EvaluationStats {
        render_duration_ms,
        model_duration_ms: response.duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        preview_bytes: preview.len(),
        preview_width: preview.width,
        preview_height: preview.height,
        input_tokens: response.input_tokens,
        output_tokens: response.output_tokens,
    };

    Ok(EvaluationOutcome {
        action,
        heading: action.heading().to_string(),
        response: response.text,
        model: response.model,
        verdict,
        stats,
    })
}

/// Pick the backend for `config`, from most-specific to least-specific:
///
/// 1. a pre-built `config.backend`
/// 2. a named edgequake-llm provider (`config.provider_name`)
/// 3. the Gemini REST backend, which needs `GOOGLE_API_KEY`
pub fn resolve_model(config: &EvaluatorConfig) -> Result<Arc<dyn VisionModel>, AtsError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }
    if config.provider_name.is_some() {
        return Ok(Arc::new(ProviderModel::from_config(config)?));
    }
    Ok(Arc::new(GeminiModel::from_config(config)?))
}

/// A resolved backend plus the config it was built from.
///
/// Built once at startup so a missing credential fails before any input is
/// read; each [`run`](Evaluator::run) is then an independent interaction.
#[derive(Clone)]
pub struct Evaluator {
    model: Arc<dyn VisionModel>,
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn from_config(config: EvaluatorConfig) -> Result<Self, AtsError> {
        let model = resolve_model(&config)?;
        Ok(Self { model, config })
    }

    pub fn with_model(model: Arc<dyn VisionModel>, config: EvaluatorConfig) -> Self {
        Self { model, config }
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub async fn run(
        &self,
        action: Action,
        document: Option<&UploadedDocument>,
        job_description: &str,
    ) -> Result<EvaluationOutcome, AtsError> {
        evaluate(
            action,
            document,
            job_description,
            self.model.as_ref(),
            &self.config,
        )
        .await
    }
}
