use std::sync::Arc;

use quiz_core::model::{AnswerPatch, AnswerRecord, AnswerSnapshot, QuestionId};
use tracing::debug;

use crate::document::JsonDocument;
use crate::repository::KeyValueStore;

pub const USER_ANSWERS_KEY: &str = "@quiz:userAnswers";

/// Persisted question-id → [`AnswerRecord`] map.
///
/// Reads never fail: an unreadable store looks empty. Writes that cannot be
/// persisted are logged and dropped.
pub struct AnswerStore {
    doc: JsonDocument<AnswerSnapshot>,
}

impl AnswerStore {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            doc: JsonDocument::new(USER_ANSWERS_KEY, backend),
        }
    }

    pub async fn get(&self, id: &QuestionId) -> Option<AnswerRecord> {
        self.doc.load().await.get(id).cloned()
    }

    pub async fn get_all(&self) -> AnswerSnapshot {
        self.doc.load().await
    }

    /// Merge a partial record into the stored (or default) entry.
    ///
    /// The favorite and wrong-book flags are cross-applied so both end equal.
    pub async fn set(&self, patch: &AnswerPatch) {
        let persisted = self
            .doc
            .update(|snapshot| {
                snapshot.apply(patch);
                true
            })
            .await;
        debug!(question_id = %patch.question_id, persisted, "answer record merged");
    }

    /// Reset `isAnswered` and `selectedAnswer` on each listed record that exists.
    pub async fn clear_fields(&self, ids: &[QuestionId]) {
        if ids.is_empty() {
            return;
        }
        let persisted = self
            .doc
            .update(|snapshot| snapshot.clear_attempts(ids) > 0)
            .await;
        debug!(count = ids.len(), persisted, "answer attempts cleared");
    }

    /// Delete the listed records entirely.
    pub async fn remove(&self, ids: &[QuestionId]) {
        let persisted = self
            .doc
            .update(|snapshot| snapshot.remove(ids) > 0)
            .await;
        debug!(key = self.doc.key(), count = ids.len(), persisted, "answer records removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BrokenBackend;
    use crate::repository::InMemoryKeyValueStore;

    fn qid(raw: &str) -> QuestionId {
        QuestionId::new(raw)
    }

    fn store() -> (AnswerStore, InMemoryKeyValueStore) {
        let backend = InMemoryKeyValueStore::new();
        (AnswerStore::new(Arc::new(backend.clone())), backend)
    }

    #[tokio::test]
    async fn set_creates_default_then_merges() {
        let (answers, _) = store();
        assert!(answers.get(&qid("q1")).await.is_none());

        answers
            .set(&AnswerPatch::submission(qid("q1"), "A".into(), false, 0))
            .await;
        answers.set(&AnswerPatch::favorite(qid("q1"), true)).await;

        let record = answers.get(&qid("q1")).await.unwrap();
        assert!(record.is_answered());
        assert_eq!(record.selected_answer(), Some("A"));
        assert_eq!(record.wrong_count(), 1);
        assert!(record.is_favorite());
        assert!(record.is_in_wrong_book());
    }

    #[tokio::test]
    async fn every_write_leaves_flags_equal() {
        let (answers, _) = store();
        let patches = [
            AnswerPatch::favorite(qid("q1"), true),
            AnswerPatch::wrong_book(qid("q1"), false),
            AnswerPatch::uncertain(qid("q1"), true),
            AnswerPatch::submission(qid("q1"), "B".into(), true, 0),
            AnswerPatch::wrong_book(qid("q1"), true),
        ];
        for patch in &patches {
            answers.set(patch).await;
            let record = answers.get(&qid("q1")).await.unwrap();
            assert_eq!(record.is_favorite(), record.is_in_wrong_book());
        }
    }

    #[tokio::test]
    async fn clear_fields_keeps_history() {
        let (answers, _) = store();
        answers
            .set(&AnswerPatch::submission(qid("q1"), "C".into(), false, 0))
            .await;
        answers.set(&AnswerPatch::favorite(qid("q1"), true)).await;
        let before = answers.get(&qid("q1")).await.unwrap();

        answers.clear_fields(&[qid("q1")]).await;

        let after = answers.get(&qid("q1")).await.unwrap();
        assert!(!after.is_answered());
        assert_eq!(after.selected_answer(), None);
        assert_eq!(after.is_favorite(), before.is_favorite());
        assert_eq!(after.wrong_count(), before.wrong_count());
        assert_eq!(after.is_correct(), before.is_correct());
    }

    #[tokio::test]
    async fn clear_fields_ignores_unknown_ids_and_empty_store() {
        let (answers, backend) = store();
        answers.clear_fields(&[qid("ghost")]).await;
        assert_eq!(backend.get_item(USER_ANSWERS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_fields_leaves_document_alone_when_nothing_changes() {
        let (answers, backend) = store();
        let raw = r#"{ "q1": { "questionId": "q1", "isFavorite": true, "isInWrongBook": true } }"#;
        backend.set_item(USER_ANSWERS_KEY, raw).await.unwrap();

        answers.clear_fields(&[qid("ghost"), qid("q1")]).await;

        assert_eq!(
            backend.get_item(USER_ANSWERS_KEY).await.unwrap().as_deref(),
            Some(raw)
        );
    }

    #[tokio::test]
    async fn remove_deletes_records() {
        let (answers, _) = store();
        answers.set(&AnswerPatch::favorite(qid("q1"), true)).await;
        answers.set(&AnswerPatch::favorite(qid("q2"), true)).await;
        answers.remove(&[qid("q1")]).await;

        let all = answers.get_all().await;
        assert_eq!(all.len(), 1);
        assert!(all.get(&qid("q2")).is_some());
    }

    #[tokio::test]
    async fn interleaved_writes_to_different_questions_are_kept() {
        let (answers, _) = store();
        let a = AnswerPatch::favorite(qid("qa"), true);
        let b = AnswerPatch::submission(qid("qb"), "A".into(), true, 0);
        tokio::join!(answers.set(&a), answers.set(&b));

        let all = answers.get_all().await;
        assert!(all.is_favorite(&qid("qa")));
        assert!(all.get(&qid("qb")).is_some_and(AnswerRecord::is_correct));
    }

    #[tokio::test]
    async fn failing_backend_reads_empty() {
        let answers = AnswerStore::new(Arc::new(BrokenBackend));
        answers.set(&AnswerPatch::favorite(qid("q1"), true)).await;
        assert!(answers.get_all().await.is_empty());
    }
}
