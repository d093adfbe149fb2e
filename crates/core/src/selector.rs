//! Working-list selection for a session.
//!
//! Favorite and wrong-drill sessions filter once and then keep that id set for the
//! lifetime of the session, so a question does not vanish mid-session when it is
//! unfavorited or answered correctly.

use std::collections::HashSet;

use crate::model::{AnswerSnapshot, ModeStrategy, Question, QuestionId, Selection};

/// Question ids fixed at the first computation of a frozen-list session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrozenIds(HashSet<QuestionId>);

impl FrozenIds {
    #[must_use]
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.0.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<QuestionId> for FrozenIds {
    fn from_iter<T: IntoIterator<Item = QuestionId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Compute the ordered list a session presents.
///
/// `frozen` is owned by the calling session. It is filled on the first call for
/// frozen-list modes and consulted instead of `snapshot` afterwards.
#[must_use]
pub fn compute_working_list(
    all: &[Question],
    strategy: ModeStrategy,
    snapshot: &AnswerSnapshot,
    frozen: &mut Option<FrozenIds>,
) -> Vec<Question> {
    match strategy.selection() {
        Selection::PassThrough => all.to_vec(),
        Selection::Frozen(membership) => {
            let ids = frozen.get_or_insert_with(|| {
                all.iter()
                    .map(Question::id)
                    .filter(|id| membership.admits(snapshot, id))
                    .cloned()
                    .collect()
            });
            all.iter().filter(|q| ids.contains(q.id())).cloned().collect()
        }
    }
}
