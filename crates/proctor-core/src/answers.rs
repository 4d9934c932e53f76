//! In-memory answer storage for a running session.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::AnswerValue;

/// Holds the current answer for each question in a session.
///
/// Membership in the map is the only signal that a question was answered:
/// `Choice(0)` and `Text("")` are stored answers, never collapsed into
/// "unanswered". The store performs no shape validation of values against
/// question kinds; that is the caller's concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerStore {
    entries: HashMap<String, AnswerValue>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the answer for a question.
    pub fn set(&mut self, question_id: impl Into<String>, value: AnswerValue) {
        self.entries.insert(question_id.into(), value);
    }

    /// The stored answer, if any.
    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.entries.get(question_id)
    }

    /// Whether an entry exists for this question. Explicit map membership,
    /// never a truthiness check on the value.
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.entries.contains_key(question_id)
    }

    /// Number of answered questions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned copy of the current answers, frozen into a `Submission`.
    pub fn snapshot(&self) -> HashMap<String, AnswerValue> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_until_set() {
        let mut store = AnswerStore::new();
        assert!(!store.is_answered("q1"));
        assert!(store.get("q1").is_none());

        store.set("q1", AnswerValue::Choice(0));
        assert!(store.is_answered("q1"));
        assert_eq!(store.get("q1"), Some(&AnswerValue::Choice(0)));
    }

    #[test]
    fn zero_index_and_empty_text_count_as_answered() {
        let mut store = AnswerStore::new();
        store.set("choice", AnswerValue::Choice(0));
        store.set("essay", AnswerValue::Text(String::new()));
        assert!(store.is_answered("choice"));
        assert!(store.is_answered("essay"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn set_overwrites() {
        let mut store = AnswerStore::new();
        store.set("q1", AnswerValue::Choice(0));
        store.set("q1", AnswerValue::Choice(2));
        assert_eq!(store.get("q1"), Some(&AnswerValue::Choice(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn snapshot_is_detached() {
        let mut store = AnswerStore::new();
        store.set("q1", AnswerValue::Text("first".into()));
        let snapshot = store.snapshot();

        store.set("q1", AnswerValue::Text("changed".into()));
        assert_eq!(snapshot.get("q1"), Some(&AnswerValue::Text("first".into())));
    }
}
