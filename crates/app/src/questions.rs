use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use quiz_core::model::Question;

#[derive(Debug)]
pub enum QuestionFileError {
    Read(std::io::Error),
    Parse(serde_json::Error),
    BlankId { position: usize },
    DuplicateId(String),
}

impl fmt::Display for QuestionFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionFileError::Read(err) => write!(f, "cannot read question file: {err}"),
            QuestionFileError::Parse(err) => write!(f, "invalid question file: {err}"),
            QuestionFileError::BlankId { position } => {
                write!(f, "question #{position} has a blank id")
            }
            QuestionFileError::DuplicateId(id) => write!(f, "duplicate question id: {id}"),
        }
    }
}

impl std::error::Error for QuestionFileError {}

/// Read a JSON array of normalized questions.
pub fn load_questions(path: &Path) -> Result<Vec<Question>, QuestionFileError> {
    let raw = std::fs::read_to_string(path).map_err(QuestionFileError::Read)?;
    parse_questions(&raw)
}

/// Parse question JSON; ids must be non-blank and unique within the set.
pub fn parse_questions(raw: &str) -> Result<Vec<Question>, QuestionFileError> {
    let questions: Vec<Question> = serde_json::from_str(raw).map_err(QuestionFileError::Parse)?;

    let mut seen = HashSet::new();
    for (position, question) in questions.iter().enumerate() {
        let id = question.id().as_str();
        if id.trim().is_empty() {
            return Err(QuestionFileError::BlankId {
                position: position + 1,
            });
        }
        if !seen.insert(id) {
            return Err(QuestionFileError::DuplicateId(id.to_string()));
        }
    }
    Ok(questions)
}
