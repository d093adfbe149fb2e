use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreSummaryError {
    #[error("finished_at is before started_at")]
    InvalidTimeRange,

    #[error("correct count ({correct}) exceeds total ({total})")]
    CountMismatch { correct: usize, total: usize },
}

/// Score for a finished, answerable session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSummary {
    correct_count: usize,
    total: usize,
    score: u32,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl ScoreSummary {
    /// Build a summary; the percentage is rounded half away from zero.
    ///
    /// # Errors
    ///
    /// Returns `ScoreSummaryError::CountMismatch` if `correct_count > total`, or
    /// `ScoreSummaryError::InvalidTimeRange` if the session ends before it starts.
    pub fn new(
        correct_count: usize,
        total: usize,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Result<Self, ScoreSummaryError> {
        if finished_at < started_at {
            return Err(ScoreSummaryError::InvalidTimeRange);
        }
        if correct_count > total {
            return Err(ScoreSummaryError::CountMismatch {
                correct: correct_count,
                total,
            });
        }

        Ok(Self {
            correct_count,
            total,
            score: percentage(correct_count, total),
            started_at,
            finished_at,
        })
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Rounded percentage, `0..=100`.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }
}

/// What a session hands back to its launcher on finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Scored(ScoreSummary),
    /// Read-only sessions finish without a score.
    ReviewComplete,
}

impl SessionOutcome {
    #[must_use]
    pub fn summary(&self) -> Option<&ScoreSummary> {
        match self {
            Self::Scored(summary) => Some(summary),
            Self::ReviewComplete => None,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let ratio = correct as f64 / total as f64;
    (ratio * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn score_rounds_to_nearest_percent() {
        let now = fixed_now();
        assert_eq!(ScoreSummary::new(1, 3, now, now).unwrap().score(), 33);
        assert_eq!(ScoreSummary::new(2, 3, now, now).unwrap().score(), 67);
        assert_eq!(ScoreSummary::new(1, 8, now, now).unwrap().score(), 13);
        assert_eq!(ScoreSummary::new(50, 50, now, now).unwrap().score(), 100);
    }

    #[test]
    fn empty_session_scores_zero() {
        let now = fixed_now();
        let summary = ScoreSummary::new(0, 0, now, now).unwrap();
        assert_eq!(summary.score(), 0);
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn rejects_inconsistent_counts() {
        let now = fixed_now();
        let err = ScoreSummary::new(4, 3, now, now).unwrap_err();
        assert_eq!(err, ScoreSummaryError::CountMismatch { correct: 4, total: 3 });
    }

    #[test]
    fn rejects_reversed_time_range() {
        let now = fixed_now();
        let earlier = now - chrono::Duration::seconds(1);
        assert_eq!(
            ScoreSummary::new(0, 1, now, earlier).unwrap_err(),
            ScoreSummaryError::InvalidTimeRange
        );
    }
}
