use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{SeedableRng, rng};

use quiz_core::model::Question;

/// Default number of questions drawn for a mock exam.
pub const DEFAULT_MOCK_SIZE: usize = 50;

/// Draws a uniform sample without replacement for a mock exam.
///
/// Returns at most `size` questions. A `seed` makes the draw reproducible;
/// without one the thread-local generator is used.
#[must_use]
pub fn sample_questions(
    mut questions: Vec<Question>,
    size: usize,
    seed: Option<u64>,
) -> Vec<Question> {
    match seed {
        Some(seed) => questions.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => questions.shuffle(&mut rng()),
    }
    questions.truncate(size);
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{OptionLetter, QuestionKind};
    use std::collections::HashSet;

    fn pool(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                Question::new(
                    format!("q{i}"),
                    QuestionKind::SingleChoice,
                    "stem",
                    &[(OptionLetter::A, "yes"), (OptionLetter::B, "no")],
                    "A",
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn sample_has_no_duplicates_and_respects_size() {
        let picked = sample_questions(pool(120), DEFAULT_MOCK_SIZE, None);
        assert_eq!(picked.len(), DEFAULT_MOCK_SIZE);
        let unique: HashSet<_> = picked.iter().map(|q| q.id().clone()).collect();
        assert_eq!(unique.len(), DEFAULT_MOCK_SIZE);
    }

    #[test]
    fn small_pools_are_returned_whole() {
        let picked = sample_questions(pool(7), DEFAULT_MOCK_SIZE, Some(3));
        assert_eq!(picked.len(), 7);
    }

    #[test]
    fn seeded_samples_are_reproducible() {
        let a = sample_questions(pool(80), 10, Some(42));
        let b = sample_questions(pool(80), 10, Some(42));
        assert_eq!(a, b);
    }
}
