use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{OptionLetter, QuestionId, join_letters};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("invalid option letter: {0}")]
    InvalidOption(char),

    #[error("invalid option text: {0:?}")]
    InvalidOptionText(String),

    #[error("question id cannot be empty")]
    EmptyId,
}

//
// ─── QUESTION KIND ────────────────────────────────────────────────────────────
//

/// How answers to a question are taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuestionKind {
    /// One tap submits.
    #[default]
    SingleChoice,
    /// Taps toggle a pending selection; an explicit submit compares it.
    MultiChoice,
    TrueFalse,
    FreeText,
}

impl QuestionKind {
    /// Maps the ingested `type` label onto a kind.
    ///
    /// Both the source-data labels and plain English names are accepted. Unknown
    /// labels fall back to single choice, matching how unlabeled questions behave.
    #[must_use]
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("複選題" | "複選" | "multi" | "multiple") => Self::MultiChoice,
            Some("是非題" | "true_false" | "truefalse") => Self::TrueFalse,
            Some("問答題" | "free_text" | "essay") => Self::FreeText,
            _ => Self::SingleChoice,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SingleChoice => "選擇題",
            Self::MultiChoice => "複選題",
            Self::TrueFalse => "是非題",
            Self::FreeText => "問答題",
        }
    }

    #[must_use]
    pub fn is_multi(self) -> bool {
        matches!(self, Self::MultiChoice)
    }
}

//
// ─── METADATA ─────────────────────────────────────────────────────────────────
//

/// Descriptive fields carried through from ingestion. The engine never branches on them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(rename = "L1", default, skip_serializing_if = "Option::is_none")]
    pub l1: Option<String>,
    #[serde(rename = "L2", default, skip_serializing_if = "Option::is_none")]
    pub l2: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_img: Option<bool>,
    #[serde(rename = "Ex", default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    #[serde(rename = "Va", default, skip_serializing_if = "Option::is_none")]
    pub value_note: Option<String>,
    #[serde(rename = "Dif", default, skip_serializing_if = "Option::is_none")]
    pub difficulty_note: Option<String>,
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// An immutable practice item.
///
/// The serialized field names follow the normalized question documents produced by
/// ingestion, so question files can be deserialized directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    type_label: Option<String>,
    #[serde(rename = "Q", default)]
    stem: String,
    #[serde(rename = "A", default)]
    option_a: String,
    #[serde(rename = "B", default)]
    option_b: String,
    #[serde(rename = "C", default)]
    option_c: String,
    #[serde(rename = "D", default)]
    option_d: String,
    #[serde(rename = "E", default, skip_serializing_if = "Option::is_none")]
    option_e: Option<String>,
    #[serde(rename = "Ans", default)]
    answer: String,
    #[serde(rename = "Exp", default)]
    explanation: String,
    #[serde(rename = "testName", default, skip_serializing_if = "Option::is_none")]
    test_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(default)]
    series_no: String,
    #[serde(rename = "questionNumber", default)]
    question_number: u32,
    #[serde(flatten)]
    meta: QuestionMeta,
}

impl Question {
    /// Build a question from its essential parts.
    ///
    /// `options` may list any subset of `A..=E`; empty texts are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyId` when `id` is blank.
    pub fn new(
        id: impl Into<String>,
        kind: QuestionKind,
        stem: impl Into<String>,
        options: &[(OptionLetter, &str)],
        answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(QuestionError::EmptyId);
        }

        let mut question = Self {
            id: QuestionId::new(id),
            type_label: Some(kind.label().to_string()),
            stem: stem.into(),
            option_a: String::new(),
            option_b: String::new(),
            option_c: String::new(),
            option_d: String::new(),
            option_e: None,
            answer: answer.into(),
            explanation: String::new(),
            test_name: None,
            subject: None,
            series_no: String::new(),
            question_number: 0,
            meta: QuestionMeta::default(),
        };
        for (letter, text) in options {
            let text = (*text).to_string();
            match letter {
                OptionLetter::A => question.option_a = text,
                OptionLetter::B => question.option_b = text,
                OptionLetter::C => question.option_c = text,
                OptionLetter::D => question.option_d = text,
                OptionLetter::E => question.option_e = Some(text),
            }
        }
        Ok(question)
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        QuestionKind::from_label(self.type_label.as_deref())
    }

    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn test_name(&self) -> Option<&str> {
        self.test_name.as_deref()
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    #[must_use]
    pub fn series_no(&self) -> &str {
        &self.series_no
    }

    #[must_use]
    pub fn question_number(&self) -> u32 {
        self.question_number
    }

    #[must_use]
    pub fn meta(&self) -> &QuestionMeta {
        &self.meta
    }

    /// Text of one option slot, if present and non-blank.
    #[must_use]
    pub fn option_text(&self, letter: OptionLetter) -> Option<&str> {
        let text = match letter {
            OptionLetter::A => self.option_a.as_str(),
            OptionLetter::B => self.option_b.as_str(),
            OptionLetter::C => self.option_c.as_str(),
            OptionLetter::D => self.option_d.as_str(),
            OptionLetter::E => self.option_e.as_deref().unwrap_or_default(),
        };
        (!text.trim().is_empty()).then_some(text)
    }

    /// Present option letters, in order.
    #[must_use]
    pub fn options(&self) -> Vec<OptionLetter> {
        OptionLetter::ALL
            .into_iter()
            .filter(|letter| self.option_text(*letter).is_some())
            .collect()
    }

    /// The answer key in canonical form (sorted, comma-joined letters).
    ///
    /// Keys that are not made of option letters are returned trimmed but otherwise
    /// untouched, so they can still be compared verbatim.
    #[must_use]
    pub fn canonical_answer(&self) -> String {
        let parsed: Result<Vec<OptionLetter>, _> = self
            .answer
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse::<OptionLetter>)
            .collect();
        match parsed {
            Ok(letters) if !letters.is_empty() => join_letters(letters),
            _ => self.answer.trim().to_string(),
        }
    }

    /// Whether a stored selection string matches the answer key.
    #[must_use]
    pub fn is_correct(&self, selected: &str) -> bool {
        selected == self.canonical_answer()
    }
}
