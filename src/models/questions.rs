//! The fixed catalog of standard questions plus one optional custom
//! question. Selections are keyed by question text, so a custom question
//! that duplicates a standard one collapses to a single entry.

use serde::{Deserialize, Serialize};

/// Standard medical questions offered for every analysis.
pub const STANDARD_QUESTIONS: [&str; 5] = [
    "What abnormalities can be seen in this image?",
    "Is there any pathology visible?",
    "What might be the diagnosis based on this image?",
    "Are there any concerning features in this image?",
    "What is the main finding in this image?",
];

/// The question used by the one-click "quick analysis" path.
pub const QUICK_DIAGNOSIS_QUESTION: &str = STANDARD_QUESTIONS[2];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Selected standard questions, in the order the user picked them.
    #[serde(default)]
    pub selected: Vec<String>,
    /// Zero-or-one free-form question, appended after the standard ones.
    #[serde(default)]
    pub custom: Option<String>,
}

impl QuestionSet {
    /// Quick analysis: exactly the diagnosis question.
    pub fn quick() -> Self {
        Self {
            selected: vec![QUICK_DIAGNOSIS_QUESTION.to_string()],
            custom: None,
        }
    }

    /// All questions to ask, in order, deduplicated by exact text.
    pub fn ordered(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.selected.len() + 1);
        for q in self
            .selected
            .iter()
            .chain(self.custom.iter())
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
        {
            if !out.iter().any(|seen| seen == q) {
                out.push(q.to_string());
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.ordered().is_empty()
    }
}
