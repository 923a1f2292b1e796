//! Instruction prompts sent ahead of the resume image.
//!
//! There are exactly four, one per [`PromptTemplate`] variant. Each is sent
//! verbatim as the first part of the request; the job description follows the
//! image as the last part.

use serde::{Deserialize, Serialize};

/// Strengths-and-weaknesses review against the job description.
pub const EVALUATION_PROMPT: &str = "You are an experienced Data Scientist. Review the resume based on the job description. Highlight strengths and weaknesses.";

/// ATS-style match. The reply is expected (not guaranteed) to lead with `N%`.
pub const MATCH_PERCENTAGE_PROMPT: &str = "You are a skilled ATS. Give the % match of the resume with the job description. Also list missing keywords and overall evaluation.";

/// Layout and structure critique.
pub const FORMAT_CRITIQUE_PROMPT: &str = "You are a resume consultant. Suggest improvements in formatting, layout, and structure for a data science role.";

/// Project ideas aligned with the role.
pub const PROJECT_SUGGESTIONS_PROMPT: &str = "You are a resume expert. Suggest better project ideas aligned with the job description and role.";

/// One of the four fixed instruction prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptTemplate {
    Evaluation,
    MatchPercentage,
    FormatCritique,
    ProjectSuggestions,
}

impl PromptTemplate {
    /// Every template, in display order.
    pub const ALL: [PromptTemplate; 4] = [
        PromptTemplate::Evaluation,
        PromptTemplate::MatchPercentage,
        PromptTemplate::FormatCritique,
        PromptTemplate::ProjectSuggestions,
    ];

    /// The instruction text for this template.
    pub fn text(self) -> &'static str {
        match self {
            PromptTemplate::Evaluation => EVALUATION_PROMPT,
            PromptTemplate::MatchPercentage => MATCH_PERCENTAGE_PROMPT,
            PromptTemplate::FormatCritique => FORMAT_CRITIQUE_PROMPT,
            PromptTemplate::ProjectSuggestions => PROJECT_SUGGESTIONS_PROMPT,
        }
    }
}
