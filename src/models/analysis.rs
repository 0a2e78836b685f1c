//! Results of one analysis run: the ordered question/answer map and the
//! narrative explanation with its provenance.

use serde::{Deserialize, Serialize};

/// Question → answer map that preserves insertion order for display.
///
/// Backed by a Vec of pairs: lookups are linear, which is fine for a
/// handful of questions per run. Re-inserting an existing question
/// replaces the answer in place and keeps the original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VqaResults(Vec<(String, String)>);

impl VqaResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        let question = question.into();
        let answer = answer.into();
        match self.0.iter_mut().find(|(q, _)| *q == question) {
            Some((_, a)) => *a = answer,
            None => self.0.push((question, answer)),
        }
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(q, _)| q == question)
            .map(|(_, a)| a.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for VqaResults {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut results = Self::new();
        for (q, a) in iter {
            results.insert(q, a);
        }
        results
    }
}

/// Which path produced the narrative text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationSource {
    /// Remote text-generation service response that passed the quality gate.
    Remote,
    /// Deterministic rule-based generator.
    Fallback,
}

/// Narrative explanation of the VQA findings. Exactly one source per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub text: String,
    pub source: ExplanationSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let mut r = VqaResults::new();
        r.insert("b", "2");
        r.insert("a", "1");
        r.insert("c", "3");
        let keys: Vec<&str> = r.iter().map(|(q, _)| q).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let mut r = VqaResults::new();
        r.insert("q1", "old");
        r.insert("q2", "other");
        r.insert("q1", "new");
        assert_eq!(r.len(), 2);
        assert_eq!(r.get("q1"), Some("new"));
        let keys: Vec<&str> = r.iter().map(|(q, _)| q).collect();
        assert_eq!(keys, vec!["q1", "q2"]);
    }
}
