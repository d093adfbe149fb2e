use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::question::QuestionError;

/// Stable identifier of a question, unique within a question set.
///
/// Ingested questions use the `{series_no}_{Id}` shape, but the engine treats the
/// value as opaque.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for QuestionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the five option slots a question may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
    E,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
        }
    }

    /// Parses a single letter, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidOption` for anything outside `A..=E`.
    pub fn from_char(c: char) -> Result<Self, QuestionError> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Self::A),
            'B' => Ok(Self::B),
            'C' => Ok(Self::C),
            'D' => Ok(Self::D),
            'E' => Ok(Self::E),
            _ => Err(QuestionError::InvalidOption(c)),
        }
    }
}

impl FromStr for OptionLetter {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => Err(QuestionError::InvalidOptionText(s.to_string())),
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Joins letters into the canonical stored form: sorted, deduplicated, comma-separated.
#[must_use]
pub fn join_letters<I>(letters: I) -> String
where
    I: IntoIterator<Item = OptionLetter>,
{
    let mut sorted: Vec<OptionLetter> = letters.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
        .iter()
        .map(|letter| letter.as_char().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_letters_case_insensitively() {
        assert_eq!("c".parse::<OptionLetter>().unwrap(), OptionLetter::C);
        assert_eq!(OptionLetter::from_char('e').unwrap(), OptionLetter::E);
        assert!(OptionLetter::from_char('F').is_err());
        assert!("AB".parse::<OptionLetter>().is_err());
    }

    #[test]
    fn join_sorts_and_dedups() {
        let joined = join_letters([OptionLetter::C, OptionLetter::A, OptionLetter::C]);
        assert_eq!(joined, "A,C");
    }
}
