//! # ats-resume-expert
//!
//! Resume feedback from Vision Language Models (VLMs).
//!
//! Paste a job description, hand over a resume PDF, pick an action, and get
//! the model's feedback: a strengths/weaknesses review, an ATS match
//! percentage with an accept/reject verdict, formatting suggestions, or
//! better project ideas.
//!
//! ## Pipeline Overview
//!
//! ```text
//! resume.pdf
//!  │
//!  ├─ 1. Check   no resume → MissingInput, before any work
//!  ├─ 2. Render  page 1 only, via pdfium (spawn_blocking)
//!  ├─ 3. Encode  RGB → JPEG PreviewImage
//!  ├─ 4. VLM     [prompt, image, job description] → one call, no retry
//!  └─ 5. Verdict match action only: first `N%` ≥ 80 → accepted
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ats_resume_expert::{load_document, Action, Evaluator, EvaluatorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GOOGLE_API_KEY; fails fast if it is missing.
//!     let evaluator = Evaluator::from_config(EvaluatorConfig::from_env()?)?;
//!     let resume = load_document("resume.pdf", 120).await?;
//!     let outcome = evaluator
//!         .run(Action::Match, Some(&resume), "Senior Data Scientist, Spark, MLOps")
//!         .await?;
//!     println!("{}", outcome.response);
//!     if let Some(verdict) = outcome.verdict {
//!         println!("{}", verdict.message());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ats-expert` binary (clap + anyhow + tracing-subscriber + dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod action;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use action::Action;
pub use config::{EvaluatorConfig, EvaluatorConfigBuilder, DEFAULT_MODEL};
pub use error::AtsError;
pub use evaluate::{evaluate, extract_preview, resolve_model, Evaluator};
pub use model::{GeminiModel, ModelReply, ModelRequest, ProviderModel, RequestPart, VisionModel};
pub use output::{EvaluationOutcome, EvaluationStats, MatchVerdict, ModelResponse, PreviewImage};
pub use pipeline::input::{load_document, UploadedDocument};
pub use pipeline::llm::dispatch;
pub use pipeline::verdict::{parse_verdict, MATCH_THRESHOLD};
pub use prompts::PromptTemplate;
