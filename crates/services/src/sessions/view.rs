use quiz_core::model::{AnswerRecord, OptionLetter, Question, QuestionKind};

/// Presentation state of the question a session is showing.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub question: Question,
    pub kind: QuestionKind,
    pub submitted: bool,
    /// Submitted letters once answered, otherwise the pending multi-choice set.
    pub selected: Vec<OptionLetter>,
    /// `None` until an answer is on record for this visit.
    pub is_correct: Option<bool>,
    pub reveal_answer: bool,
    pub is_favorite: bool,
}

impl QuestionView {
    /// Explanation text, only once the answer may be revealed.
    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        if self.reveal_answer {
            Some(self.question.explanation())
        } else {
            None
        }
    }

    /// Canonical answer key, only once the answer may be revealed.
    #[must_use]
    pub fn answer(&self) -> Option<String> {
        self.reveal_answer.then(|| self.question.canonical_answer())
    }
}

/// Letters recorded in a stored selection string such as `"A,C"`.
pub(crate) fn recorded_letters(record: Option<&AnswerRecord>) -> Vec<OptionLetter> {
    record
        .and_then(AnswerRecord::selected_answer)
        .map(|raw| {
            raw.split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerPatch, QuestionId};

    #[test]
    fn recorded_letters_parse_stored_selection() {
        let mut record = AnswerRecord::new(QuestionId::new("q1"));
        record.apply(&AnswerPatch::submission(
            QuestionId::new("q1"),
            "A,C".into(),
            true,
            0,
        ));
        assert_eq!(
            recorded_letters(Some(&record)),
            vec![OptionLetter::A, OptionLetter::C]
        );
        assert!(recorded_letters(None).is_empty());
    }
}
