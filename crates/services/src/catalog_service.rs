use serde::Serialize;

use quiz_core::model::{Question, QuestionId, SessionKey};
use storage::Storage;
use tracing::info;

/// Per-category counters shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CategoryStats {
    pub total: usize,
    pub favorite_count: usize,
    pub wrong_count: usize,
    pub answered_count: usize,
    /// Stored standard-quiz progress for the category.
    pub progress: usize,
    pub completed: bool,
}

/// Category-level reads and the bulk purge.
#[derive(Clone)]
pub struct CatalogService {
    storage: Storage,
}

impl CatalogService {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn category_stats(&self, title: &str, questions: &[Question]) -> CategoryStats {
        let snapshot = self.storage.answers.get_all().await;
        let mut stats = CategoryStats {
            total: questions.len(),
            progress: self
                .storage
                .progress
                .get(&SessionKey::main(title))
                .await
                .unwrap_or(0),
            completed: self.storage.completed.is_completed(title).await,
            ..CategoryStats::default()
        };

        for record in questions.iter().filter_map(|q| snapshot.get(q.id())) {
            if record.is_favorite() {
                stats.favorite_count += 1;
            }
            if record.is_wrong() {
                stats.wrong_count += 1;
            }
            if record.is_answered() {
                stats.answered_count += 1;
            }
        }
        stats
    }

    /// Delete every trace of a category: answer records, progress in all modes,
    /// and the completion flag.
    pub async fn purge_category(&self, title: &str, question_ids: &[QuestionId]) {
        self.storage.answers.remove(question_ids).await;
        self.storage.progress.remove_title(title).await;
        self.storage.completed.clear(title).await;
        info!(title, questions = question_ids.len(), "category purged");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerPatch, OptionLetter, QuestionKind, ViewMode};

    fn question(id: &str) -> Question {
        Question::new(
            id,
            QuestionKind::SingleChoice,
            "stem",
            &[(OptionLetter::A, "yes"), (OptionLetter::B, "no")],
            "A",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn stats_count_flags_within_the_category() {
        let storage = Storage::in_memory();
        let catalog = CatalogService::new(storage.clone());
        let questions = vec![question("q1"), question("q2"), question("q3")];

        storage
            .answers
            .set(&AnswerPatch::submission(QuestionId::new("q1"), "B".into(), false, 0))
            .await;
        storage
            .answers
            .set(&AnswerPatch::favorite(QuestionId::new("q2"), true))
            .await;
        storage
            .answers
            .set(&AnswerPatch::favorite(QuestionId::new("outside"), true))
            .await;
        storage.progress.set(&SessionKey::main("Law"), 2).await;
        storage.completed.mark_completed("Law").await;

        let stats = catalog.category_stats("Law", &questions).await;
        assert_eq!(
            stats,
            CategoryStats {
                total: 3,
                favorite_count: 1,
                wrong_count: 1,
                answered_count: 1,
                progress: 2,
                completed: true,
            }
        );
    }

    #[tokio::test]
    async fn purge_removes_records_progress_and_completion() {
        let storage = Storage::in_memory();
        let catalog = CatalogService::new(storage.clone());
        let q1 = QuestionId::new("q1");

        storage.answers.set(&AnswerPatch::favorite(q1.clone(), true)).await;
        storage.progress.set(&SessionKey::main("Law"), 4).await;
        storage
            .progress
            .set(&SessionKey::new(ViewMode::Mock, "Law"), 9)
            .await;
        storage.completed.mark_completed("Law").await;

        catalog.purge_category("Law", &[q1.clone()]).await;

        assert!(storage.answers.get(&q1).await.is_none());
        assert!(storage.progress.get_all().await.is_empty());
        assert!(!storage.completed.is_completed("Law").await);
    }
}
