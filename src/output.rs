//! Values produced by an evaluation: the preview image, the model reply, the
//! match verdict and the assembled outcome.

use crate::action::Action;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compressed image of a resume's first page.
///
/// Built fresh by [`crate::extract_preview`] on every call and owned by the
/// request that made it.
#[derive(Clone, PartialEq, Eq)]
pub struct PreviewImage {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Media type of `bytes`, e.g. `"image/jpeg"`.
    pub mime_type: String,
    /// Pixel width of the rendered page.
    pub width: u32,
    /// Pixel height of the rendered page.
    pub height: u32,
}

impl PreviewImage {
    /// Base64 (standard alphabet, padded) view of the image bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for PreviewImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewImage")
            .field("mime_type", &self.mime_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// Text returned by the model for one dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Free-form reply. Only the match prompt asks for any structure.
    pub text: String,
    /// Model that produced the reply.
    pub model: String,
    /// Prompt tokens, when the backend reports them.
    pub input_tokens: Option<usize>,
    /// Completion tokens, when the backend reports them.
    pub output_tokens: Option<usize>,
    /// Wall-clock duration of the call.
    pub duration_ms: u64,
}

/// Accept/reject classification derived from a match reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum MatchVerdict {
    /// First percentage found was at or above the threshold.
    Accepted { percentage: u32 },
    /// First percentage found was below the threshold.
    Rejected { percentage: u32 },
    /// No `N%` anywhere in the reply.
    Indeterminate,
}

impl MatchVerdict {
    /// The percentage the verdict was derived from, if any.
    pub fn percentage(&self) -> Option<u32> {
        match self {
            MatchVerdict::Accepted { percentage } | MatchVerdict::Rejected { percentage } => {
                Some(*percentage)
            }
            MatchVerdict::Indeterminate => None,
        }
    }

    /// Banner text shown to the user.
    pub fn message(&self) -> String {
        match self {
            MatchVerdict::Accepted { percentage } => format!(
                "Match Score: {percentage}% — Great! You're likely to be shortlisted."
            ),
            MatchVerdict::Rejected { percentage } => format!(
                "Match Score: {percentage}% — Rejected. Consider improving your resume."
            ),
            MatchVerdict::Indeterminate => {
                "Couldn't extract the match percentage. Please review the job/resume input."
                    .to_string()
            }
        }
    }
}

/// Timing and size figures for one interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationStats {
    pub render_duration_ms: u64,
    pub model_duration_ms: u64,
    pub total_duration_ms: u64,
    pub preview_bytes: usize,
    pub preview_width: u32,
    pub preview_height: u32,
    pub input_tokens: Option<usize>,
    pub output_tokens: Option<usize>,
}

/// Everything one action produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub action: Action,
    pub heading: String,
    pub response: String,
    pub model: String,
    /// Present only for [`Action::Match`].
    pub verdict: Option<MatchVerdict>,
    pub stats: EvaluationStats,
}
