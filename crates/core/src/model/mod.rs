mod answer;
mod ids;
mod mode;
mod question;
mod settings;
mod summary;

pub use answer::{AnswerPatch, AnswerRecord, AnswerSnapshot};
pub use ids::{OptionLetter, QuestionId, join_letters};
pub use mode::{Membership, ModeParseError, ModeStrategy, Selection, SessionKey, ViewMode};
pub use question::{Question, QuestionError, QuestionKind, QuestionMeta};
pub use settings::{FontSize, Theme, UserSettings};
pub use summary::{ScoreSummary, ScoreSummaryError, SessionOutcome};
