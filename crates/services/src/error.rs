//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::ScoreSummaryError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by a running session.
///
/// These report misuse of the session API; persistence failures never surface
/// here because the document stores degrade instead of failing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("session already finished")]
    Finished,
    #[error("answers cannot be submitted in a read-only session")]
    ReadOnly,
    #[error("current question has already been answered")]
    AlreadySubmitted,
    #[error("current question does not take multiple answers")]
    NotMultiChoice,
    #[error("option {0} is not offered by the current question")]
    UnknownOption(char),
    #[error("no option selected")]
    NoSelection,
    #[error(transparent)]
    Summary(#[from] ScoreSummaryError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
