use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::ids::QuestionId;

//
// ─── ANSWER RECORD ────────────────────────────────────────────────────────────
//

/// Per-question answer history.
///
/// Created lazily on first interaction. Mutated only through [`AnswerRecord::apply`]
/// and [`AnswerRecord::clear_attempt`], which keep two invariants:
/// - `is_favorite == is_in_wrong_book` after every write;
/// - `wrong_count` never decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    question_id: QuestionId,
    #[serde(default)]
    is_correct: bool,
    #[serde(default)]
    is_answered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_answer: Option<String>,
    #[serde(default)]
    is_favorite: bool,
    #[serde(default)]
    is_in_wrong_book: bool,
    #[serde(default)]
    is_uncertain: bool,
    #[serde(default)]
    wrong_count: u32,
}

impl AnswerRecord {
    /// Default record for a question that has never been touched.
    #[must_use]
    pub fn new(question_id: QuestionId) -> Self {
        Self {
            question_id,
            is_correct: false,
            is_answered: false,
            selected_answer: None,
            is_favorite: false,
            is_in_wrong_book: false,
            is_uncertain: false,
            wrong_count: 0,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.is_answered
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    #[must_use]
    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    #[must_use]
    pub fn is_in_wrong_book(&self) -> bool {
        self.is_in_wrong_book
    }

    #[must_use]
    pub fn is_uncertain(&self) -> bool {
        self.is_uncertain
    }

    #[must_use]
    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    /// Ever missed and not currently correct.
    #[must_use]
    pub fn is_wrong(&self) -> bool {
        self.wrong_count > 0 && !self.is_correct
    }

    /// Answered in the current pass and matched the key.
    #[must_use]
    pub fn counts_as_correct(&self) -> bool {
        self.is_answered && self.is_correct
    }

    /// Merge a partial update into this record.
    pub fn apply(&mut self, patch: &AnswerPatch) {
        if let Some(answered) = patch.is_answered {
            self.is_answered = answered;
        }
        if let Some(selected) = &patch.selected_answer {
            self.selected_answer.clone_from(selected);
        }
        if let Some(correct) = patch.is_correct {
            self.is_correct = correct;
        }
        if let Some(count) = patch.wrong_count {
            self.wrong_count = self.wrong_count.max(count);
        }
        if let Some(uncertain) = patch.is_uncertain {
            self.is_uncertain = uncertain;
        }

        // The favorite flag wins when both are supplied.
        let coupled = patch
            .is_favorite
            .or(patch.is_in_wrong_book)
            .unwrap_or(self.is_favorite);
        self.is_favorite = coupled;
        self.is_in_wrong_book = coupled;
    }

    /// Forget the current attempt; favorite, wrong count and last correctness survive.
    ///
    /// Returns whether there was an attempt to forget.
    pub fn clear_attempt(&mut self) -> bool {
        let had_attempt = self.is_answered || self.selected_answer.is_some();
        self.is_answered = false;
        self.selected_answer = None;
        had_attempt
    }
}

//
// ─── ANSWER PATCH ─────────────────────────────────────────────────────────────
//

/// Partial update for one [`AnswerRecord`]. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerPatch {
    pub question_id: QuestionId,
    pub is_answered: Option<bool>,
    pub selected_answer: Option<Option<String>>,
    pub is_correct: Option<bool>,
    pub wrong_count: Option<u32>,
    pub is_favorite: Option<bool>,
    pub is_in_wrong_book: Option<bool>,
    pub is_uncertain: Option<bool>,
}

impl AnswerPatch {
    #[must_use]
    pub fn new(question_id: QuestionId) -> Self {
        Self {
            question_id,
            is_answered: None,
            selected_answer: None,
            is_correct: None,
            wrong_count: None,
            is_favorite: None,
            is_in_wrong_book: None,
            is_uncertain: None,
        }
    }

    /// Patch describing a submission; `previous_wrong` is the count before this attempt.
    #[must_use]
    pub fn submission(
        question_id: QuestionId,
        selected: String,
        is_correct: bool,
        previous_wrong: u32,
    ) -> Self {
        let wrong_count = if is_correct {
            previous_wrong
        } else {
            previous_wrong.saturating_add(1)
        };
        Self {
            is_answered: Some(true),
            selected_answer: Some(Some(selected)),
            is_correct: Some(is_correct),
            wrong_count: Some(wrong_count),
            ..Self::new(question_id)
        }
    }

    #[must_use]
    pub fn favorite(question_id: QuestionId, is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Self::new(question_id)
        }
    }

    #[must_use]
    pub fn wrong_book(question_id: QuestionId, in_wrong_book: bool) -> Self {
        Self {
            is_in_wrong_book: Some(in_wrong_book),
            ..Self::new(question_id)
        }
    }

    #[must_use]
    pub fn uncertain(question_id: QuestionId, is_uncertain: bool) -> Self {
        Self {
            is_uncertain: Some(is_uncertain),
            ..Self::new(question_id)
        }
    }
}

//
// ─── SNAPSHOT ─────────────────────────────────────────────────────────────────
//

/// The whole answer map, keyed by question id.
///
/// This is also the persisted document shape: one JSON object per user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSnapshot(HashMap<QuestionId, AnswerRecord>);

impl AnswerSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&AnswerRecord> {
        self.0.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &AnswerRecord)> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_favorite(&self, id: &QuestionId) -> bool {
        self.get(id).is_some_and(AnswerRecord::is_favorite)
    }

    #[must_use]
    pub fn is_wrong(&self, id: &QuestionId) -> bool {
        self.get(id).is_some_and(AnswerRecord::is_wrong)
    }

    /// Merge a patch into the existing or default record and return the result.
    pub fn apply(&mut self, patch: &AnswerPatch) -> AnswerRecord {
        let record = self
            .0
            .entry(patch.question_id.clone())
            .or_insert_with(|| AnswerRecord::new(patch.question_id.clone()));
        record.apply(patch);
        record.clone()
    }

    /// Clear the current attempt on each listed record that exists. Returns how
    /// many records actually changed.
    pub fn clear_attempts<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a QuestionId>,
    {
        ids.into_iter()
            .filter(|id| self.0.get_mut(*id).is_some_and(AnswerRecord::clear_attempt))
            .count()
    }

    /// Delete the listed records outright. Returns how many were present.
    pub fn remove<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a QuestionId>,
    {
        ids.into_iter()
            .filter(|id| self.0.remove(*id).is_some())
            .count()
    }
}

impl FromIterator<AnswerRecord> for AnswerSnapshot {
    fn from_iter<T: IntoIterator<Item = AnswerRecord>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|record| (record.question_id.clone(), record))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qid(raw: &str) -> QuestionId {
        QuestionId::new(raw)
    }

    #[test]
    fn favorite_write_couples_wrong_book() {
        let mut snapshot = AnswerSnapshot::new();
        let record = snapshot.apply(&AnswerPatch::favorite(qid("q1"), true));
        assert!(record.is_favorite());
        assert!(record.is_in_wrong_book());

        let record = snapshot.apply(&AnswerPatch::wrong_book(qid("q1"), false));
        assert!(!record.is_favorite());
        assert!(!record.is_in_wrong_book());
    }

    #[test]
    fn unrelated_write_normalizes_diverged_flags() {
        let raw = r#"{"q1": {"questionId": "q1", "isFavorite": true, "isInWrongBook": false}}"#;
        let mut snapshot: AnswerSnapshot = serde_json::from_str(raw).unwrap();
        let record = snapshot.apply(&AnswerPatch::uncertain(qid("q1"), true));
        assert!(record.is_favorite());
        assert!(record.is_in_wrong_book());
        assert!(record.is_uncertain());
    }

    #[test]
    fn wrong_count_never_decreases() {
        let mut snapshot = AnswerSnapshot::new();
        snapshot.apply(&AnswerPatch::submission(qid("q1"), "A".into(), false, 0));
        snapshot.apply(&AnswerPatch::submission(qid("q1"), "B".into(), false, 1));
        let mut stale = AnswerPatch::new(qid("q1"));
        stale.wrong_count = Some(0);
        let record = snapshot.apply(&stale);
        assert_eq!(record.wrong_count(), 2);
    }

    #[test]
    fn correct_submission_keeps_wrong_count() {
        let mut snapshot = AnswerSnapshot::new();
        snapshot.apply(&AnswerPatch::submission(qid("q1"), "A".into(), false, 0));
        let record = snapshot.apply(&AnswerPatch::submission(qid("q1"), "B".into(), true, 1));
        assert_eq!(record.wrong_count(), 1);
        assert!(record.is_correct());
        assert!(!record.is_wrong());
    }

    #[test]
    fn clear_attempt_preserves_history() {
        let mut snapshot = AnswerSnapshot::new();
        snapshot.apply(&AnswerPatch::submission(qid("q1"), "A".into(), false, 0));
        snapshot.apply(&AnswerPatch::favorite(qid("q1"), true));
        assert_eq!(snapshot.clear_attempts([&qid("q1"), &qid("missing")]), 1);
        assert_eq!(snapshot.clear_attempts([&qid("q1")]), 0);

        let record = snapshot.get(&qid("q1")).unwrap();
        assert!(!record.is_answered());
        assert_eq!(record.selected_answer(), None);
        assert_eq!(record.wrong_count(), 1);
        assert!(record.is_favorite());
        assert!(!record.is_correct());
        assert!(snapshot.get(&qid("missing")).is_none());
    }

    #[test]
    fn serializes_camel_case_and_omits_empty_selection() {
        let record = AnswerRecord::new(qid("q1"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["questionId"], "q1");
        assert_eq!(json["wrongCount"], 0);
        assert!(json.get("selectedAnswer").is_none());
    }
}
