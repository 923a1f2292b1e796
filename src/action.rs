//! The four user actions and their lookup to prompts and display copy.
//!
//! One `Action` is chosen per interaction; everything that used to depend on
//! "which button fired" hangs off it.

use crate::prompts::PromptTemplate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user-selected action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Resume evaluation: strengths and weaknesses.
    Evaluate,
    /// ATS match percentage plus a derived verdict.
    Match,
    /// Formatting suggestions.
    Format,
    /// Better project ideas.
    Projects,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Evaluate, Action::Match, Action::Format, Action::Projects];

    /// Prompt sent for this action.
    pub fn template(self) -> PromptTemplate {
        match self {
            Action::Evaluate => PromptTemplate::Evaluation,
            Action::Match => PromptTemplate::MatchPercentage,
            Action::Format => PromptTemplate::FormatCritique,
            Action::Projects => PromptTemplate::ProjectSuggestions,
        }
    }

    /// Whether the reply is parsed into a [`crate::output::MatchVerdict`].
    pub fn wants_verdict(self) -> bool {
        self == Action::Match
    }

    /// Heading printed above the model reply.
    pub fn heading(self) -> &'static str {
        match self {
            Action::Evaluate => "Resume Evaluation",
            Action::Match => "ATS Match Result",
            Action::Format => "Format Suggestions",
            Action::Projects => "Project Recommendations",
        }
    }

    /// Spinner message while the model is working.
    pub fn progress_message(self) -> &'static str {
        match self {
            Action::Evaluate => "Analyzing resume…",
            Action::Match => "Calculating ATS Match…",
            Action::Format => "Evaluating resume format…",
            Action::Projects => "Analyzing projects…",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Evaluate => "evaluate",
            Action::Match => "match",
            Action::Format => "format",
            Action::Projects => "projects",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "evaluate" | "evaluation" => Ok(Action::Evaluate),
            "match" => Ok(Action::Match),
            "format" => Ok(Action::Format),
            "projects" | "project" => Ok(Action::Projects),
            other => Err(format!(
                "unknown action '{other}' (expected evaluate, match, format or projects)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn each_action_has_its_own_template() {
        let templates: HashSet<PromptTemplate> = Action::ALL.iter().map(|a| a.template()).collect();
        assert_eq!(templates.len(), Action::ALL.len());
    }

    #[test]
    fn only_match_wants_verdict() {
        let with_verdict: Vec<Action> = Action::ALL
            .into_iter()
            .filter(|a| a.wants_verdict())
            .collect();
        assert_eq!(with_verdict, vec![Action::Match]);
    }

    #[test]
    fn parse_round_trips_display() {
        for a in Action::ALL {
            assert_eq!(a.to_string().parse::<Action>().unwrap(), a);
        }
        assert_eq!(" Project ".parse::<Action>().unwrap(), Action::Projects);
        assert!("summarize".parse::<Action>().is_err());
    }
}
