//! Interaction-level tests with a counting in-process model.
//!
//! No network. Tests that need a real PDF render bind pdfium at runtime and
//! print SKIP when the library is not available.

use async_trait::async_trait;
use ats_resume_expert::pipeline::render::bind_pdfium;
use ats_resume_expert::{
    dispatch, evaluate, extract_preview, Action, AtsError, Evaluator, EvaluatorConfig,
    MatchVerdict, ModelReply, ModelRequest, PreviewImage, PromptTemplate, RequestPart,
    UploadedDocument, VisionModel,
};
use pdfium_render::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

// ── Fake model ───────────────────────────────────────────────────────────────

struct FakeModel {
    reply: Result<String, String>,
    calls: AtomicUsize,
    last: Mutex<Option<ModelRequest>>,
}

impl FakeModel {
    fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> ModelRequest {
        self.last.lock().unwrap().clone().expect("no request recorded")
    }
}

#[async_trait]
impl VisionModel for FakeModel {
    fn model_id(&self) -> &str {
        "fake-vlm"
    }

    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, AtsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());
        match &self.reply {
            Ok(text) => Ok(ModelReply {
                text: text.clone(),
                input_tokens: Some(1200),
                output_tokens: Some(80),
            }),
            // Not already a ModelInvocation, so dispatch has to wrap it.
            Err(msg) => Err(AtsError::Internal(msg.clone())),
        }
    }
}

fn preview() -> PreviewImage {
    PreviewImage {
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        mime_type: "image/jpeg".into(),
        width: 10,
        height: 14,
    }
}

/// Log to the test harness's captured output; `RUST_LOG` picks the level.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Build a blank PDF whose first page is `first` and whose remaining
/// `pages - 1` pages are `rest`, or `None` when pdfium is unavailable.
fn pdf_with_pages(
    first: PdfPagePaperSize,
    rest: PdfPagePaperSize,
    pages: usize,
) -> Option<Vec<u8>> {
    let pdfium = match bind_pdfium(None) {
        Ok(p) => p,
        Err(e) => {
            println!("SKIP — pdfium not available: {e}");
            return None;
        }
    };
    let mut document = pdfium.create_new_pdf().ok()?;
    for i in 0..pages {
        let size = if i == 0 { first } else { rest };
        document.pages_mut().create_page_at_end(size).ok()?;
    }
    let bytes = document.save_to_bytes().ok();
    bytes
}

/// `pages` blank A4 portrait pages.
fn blank_pdf(pages: usize) -> Option<Vec<u8>> {
    pdf_with_pages(PdfPagePaperSize::a4(), PdfPagePaperSize::a4(), pages)
}

// ── Missing input ────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_document_never_calls_model() {
    let model = FakeModel::replying("85%");
    let config = EvaluatorConfig::default();

    for action in Action::ALL {
        let err = evaluate(action, None, "Data Scientist", &model, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, AtsError::MissingInput), "{action}: {err:?}");
        assert!(err.is_user_correctable());
    }
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn empty_upload_is_missing_input() {
    let model = FakeModel::replying("85%");
    let doc = UploadedDocument::new("cv.pdf", Vec::new());
    let err = evaluate(
        Action::Evaluate,
        Some(&doc),
        "",
        &model,
        &EvaluatorConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AtsError::MissingInput));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn non_pdf_upload_fails_before_dispatch() {
    let model = FakeModel::replying("85%");
    let doc = UploadedDocument::new("cv.pdf", b"\x89PNG\r\n\x1a\n....".to_vec());
    let err = evaluate(
        Action::Match,
        Some(&doc),
        "role",
        &model,
        &EvaluatorConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AtsError::DocumentRender { ref name, .. } if name == "cv.pdf"));
    assert_eq!(model.calls(), 0);
}

// ── Dispatch ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dispatch_sends_instruction_image_context() {
    let model = FakeModel::replying("Strengths: Python. Weaknesses: none.");
    let image = preview();

    let resp = dispatch(&model, PromptTemplate::Evaluation, &image, "Senior Data Scientist")
        .await
        .unwrap();

    assert_eq!(model.calls(), 1);
    assert_eq!(resp.text, "Strengths: Python. Weaknesses: none.");
    assert_eq!(resp.model, "fake-vlm");
    assert_eq!(resp.input_tokens, Some(1200));

    let req = model.last_request();
    assert_eq!(req.parts.len(), 3);
    match (&req.parts[0], &req.parts[1], &req.parts[2]) {
        (RequestPart::Text(a), RequestPart::Image(img), RequestPart::Text(c)) => {
            assert_eq!(a, PromptTemplate::Evaluation.text());
            assert_eq!(*img, image);
            assert_eq!(c, "Senior Data Scientist");
        }
        other => panic!("unexpected part order: {other:?}"),
    }
}

#[tokio::test]
async fn dispatch_passes_empty_context_through() {
    let model = FakeModel::replying("ok");
    dispatch(&model, PromptTemplate::ProjectSuggestions, &preview(), "")
        .await
        .unwrap();
    let req = model.last_request();
    assert!(matches!(req.parts[2], RequestPart::Text(ref t) if t.is_empty()));
}

#[tokio::test]
async fn dispatch_failure_is_model_invocation() {
    let model = FakeModel::failing("quota exceeded");
    let err = dispatch(&model, PromptTemplate::MatchPercentage, &preview(), "role")
        .await
        .unwrap_err();
    assert!(
        matches!(err, AtsError::ModelInvocation { ref message } if message.contains("quota exceeded"))
    );
    // One attempt only.
    assert_eq!(model.calls(), 1);
}

// ── Full interactions (pdfium-gated) ─────────────────────────────────────────

#[tokio::test]
async fn match_flow_produces_verdict() {
    init_tracing();
    let Some(pdf) = blank_pdf(1) else { return };
    let doc = UploadedDocument::new("cv.pdf", pdf);
    let model = Arc::new(FakeModel::replying(
        "Percentage match: 85%\nMissing keywords: Spark",
    ));
    let evaluator = Evaluator::with_model(model.clone(), EvaluatorConfig::default());

    let outcome = evaluator
        .run(Action::Match, Some(&doc), "Spark, MLOps")
        .await
        .unwrap();

    assert_eq!(model.calls(), 1);
    assert_eq!(outcome.verdict, Some(MatchVerdict::Accepted { percentage: 85 }));
    assert_eq!(outcome.heading, Action::Match.heading());
    assert_eq!(outcome.model, "fake-vlm");
    assert!(outcome.stats.preview_bytes > 0);

    let req = model.last_request();
    assert!(matches!(req.parts[0], RequestPart::Text(ref t) if t == PromptTemplate::MatchPercentage.text()));
    assert!(matches!(req.parts[1], RequestPart::Image(ref i) if i.mime_type == "image/jpeg"));
}

#[tokio::test]
async fn non_match_actions_have_no_verdict() {
    let Some(pdf) = blank_pdf(1) else { return };
    let doc = UploadedDocument::new("cv.pdf", pdf);
    // A percentage in the reply must not produce a verdict outside Match.
    let model = Arc::new(FakeModel::replying("Formatting is 40% cleaner with bullets."));
    let evaluator = Evaluator::with_model(model.clone(), EvaluatorConfig::default());

    for action in [Action::Evaluate, Action::Format, Action::Projects] {
        let outcome = evaluator.run(action, Some(&doc), "").await.unwrap();
        assert_eq!(outcome.verdict, None, "{action}");
    }
    assert_eq!(model.calls(), 3);
}

#[tokio::test]
async fn only_first_page_is_rendered() {
    init_tracing();
    let portrait = PdfPagePaperSize::a4();
    let landscape = PdfPagePaperSize::a4().landscape();
    // Page 1 differs in orientation from every later page, so the preview's
    // shape shows which page was rendered.
    let (Some(short), Some(long)) = (
        pdf_with_pages(portrait, landscape, 2),
        pdf_with_pages(portrait, landscape, 20),
    ) else {
        return;
    };
    let config = EvaluatorConfig::default();

    let a = extract_preview(&UploadedDocument::new("short.pdf", short), &config)
        .await
        .unwrap();
    let b = extract_preview(&UploadedDocument::new("long.pdf", long), &config)
        .await
        .unwrap();

    for p in [&a, &b] {
        assert!(p.height > p.width, "expected portrait page 1, got {p:?}");
        assert!(p.width <= config.max_rendered_pixels);
        assert!(p.height <= config.max_rendered_pixels);
    }
    assert_eq!((a.width, a.height), (b.width, b.height));
    assert_eq!(a.mime_type, "image/jpeg");
}

#[tokio::test]
async fn landscape_first_page_gives_landscape_preview() {
    init_tracing();
    let Some(pdf) = pdf_with_pages(
        PdfPagePaperSize::a4().landscape(),
        PdfPagePaperSize::a4(),
        20,
    ) else {
        return;
    };
    let doc = UploadedDocument::new("cv.pdf", pdf);
    let preview = extract_preview(&doc, &EvaluatorConfig::default())
        .await
        .unwrap();
    assert!(
        preview.width > preview.height,
        "expected landscape page 1, got {preview:?}"
    );
}

#[tokio::test]
async fn truncated_pdf_is_render_error() {
    init_tracing();
    if bind_pdfium(None).is_err() {
        println!("SKIP — pdfium not available");
        return;
    }
    let doc = UploadedDocument::new("broken.pdf", b"%PDF-1.7\n1 0 obj << /Type".to_vec());
    let model = FakeModel::replying("85%");
    let err = evaluate(
        Action::Match,
        Some(&doc),
        "role",
        &model,
        &EvaluatorConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AtsError::DocumentRender { .. }), "{err:?}");
    assert_eq!(model.calls(), 0);
}
