use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;

use quiz_core::model::{
    AnswerPatch, AnswerRecord, AnswerSnapshot, ModeStrategy, OptionLetter, Question, QuestionId,
    ScoreSummary, SessionKey, SessionOutcome, ViewMode, join_letters,
};
use quiz_core::{Clock, FrozenIds, compute_working_list};
use storage::Storage;
use tracing::{debug, info};

use super::launcher::SessionLaunch;
use super::progress::SessionProgress;
use super::view::{QuestionView, recorded_letters};
use crate::error::SessionError;

//
// ─── STATES ────────────────────────────────────────────────────────────────────
//

/// Where a session stands once [`SessionController::start`] has returned.
///
/// Loading and Ready are passed through inside `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The working list is empty. Terminal.
    Empty,
    Presenting,
    Submitted,
    Finished,
}

/// Result of one answer tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerIntake {
    /// Multi-choice selection changed; nothing has been submitted.
    Pending(Vec<OptionLetter>),
    Submitted { is_correct: bool },
}

/// Result of moving forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Moved(usize),
    Finished(SessionOutcome),
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// One practice session over a working list.
///
/// Owns the index, the in-memory answer snapshot and the frozen id set, and
/// writes answers, progress and completion back to storage as it goes. Store
/// writes never fail from the controller's point of view; the snapshot is
/// updated with the same merge rule so a dropped write loses nothing in-session.
pub struct SessionController {
    title: String,
    strategy: ModeStrategy,
    key: SessionKey,
    questions: Vec<Question>,
    working: Vec<Question>,
    frozen: Option<FrozenIds>,
    snapshot: AnswerSnapshot,
    storage: Storage,
    clock: Clock,
    started_at: DateTime<Utc>,
    index: usize,
    phase: SessionPhase,
    pending: BTreeSet<OptionLetter>,
    outcome: Option<SessionOutcome>,
}

impl SessionController {
    /// Initialize a session and present its first question.
    ///
    /// A non-zero `start_index` is a resume request: the stored progress for the
    /// session key wins when present. Indexes past the end of the working list
    /// restart at 0.
    pub async fn start(launch: SessionLaunch, storage: Storage, clock: Clock) -> Self {
        let SessionLaunch {
            title,
            mode,
            questions,
            start_index,
        } = launch;
        let strategy = mode.strategy();
        let key = SessionKey::new(mode, &title);
        debug!(session = %key, "session loading");

        let mut snapshot = storage.answers.get_all().await;
        let stored = storage.progress.get(&key).await;

        if start_index == 0 && strategy.clears_on_fresh_start() {
            snapshot.clear_attempts(questions.iter().map(Question::id));
        }

        let resume = if strategy.save_progress() && start_index != 0 {
            stored.unwrap_or(start_index)
        } else {
            start_index
        };

        let mut frozen = None;
        let working = compute_working_list(&questions, strategy, &snapshot, &mut frozen);
        let index = if resume >= working.len() { 0 } else { resume };
        debug!(session = %key, total = working.len(), index, "session ready");

        let mut controller = Self {
            title,
            strategy,
            key,
            questions,
            working,
            frozen,
            snapshot,
            storage,
            clock,
            started_at: clock.now(),
            index: 0,
            phase: SessionPhase::Empty,
            pending: BTreeSet::new(),
            outcome: None,
        };

        if controller.working.is_empty() {
            info!(session = %controller.key, "no questions available");
            return controller;
        }

        controller.enter(index).await;
        info!(
            session = %controller.key,
            mode = %mode,
            total = controller.working.len(),
            index,
            "session started"
        );
        controller
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.strategy.mode()
    }

    #[must_use]
    pub fn strategy(&self) -> ModeStrategy {
        self.strategy
    }

    #[must_use]
    pub fn session_key(&self) -> &SessionKey {
        &self.key
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn working_list(&self) -> &[Question] {
        &self.working
    }

    /// In-session answer state, including writes that failed to persist.
    #[must_use]
    pub fn answers(&self) -> &AnswerSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    /// The question on screen, if the session is still running.
    #[must_use]
    pub fn current(&self) -> Option<&Question> {
        match self.phase {
            SessionPhase::Presenting | SessionPhase::Submitted => self.working.get(self.index),
            SessionPhase::Empty | SessionPhase::Finished => None,
        }
    }

    /// Presentation state of the current question.
    #[must_use]
    pub fn view(&self) -> Option<QuestionView> {
        let question = self.current()?;
        let record = self.snapshot.get(question.id());
        let answered = record.is_some_and(AnswerRecord::is_answered);
        let submitted = self.phase == SessionPhase::Submitted;
        let selected = if answered {
            recorded_letters(record)
        } else {
            self.pending.iter().copied().collect()
        };

        Some(QuestionView {
            index: self.index,
            total: self.working.len(),
            question: question.clone(),
            kind: question.kind(),
            submitted,
            selected,
            is_correct: answered.then(|| record.is_some_and(AnswerRecord::is_correct)),
            reveal_answer: (submitted && self.strategy.show_answer_instantly())
                || self.strategy.show_exp_directly(),
            is_favorite: self.snapshot.is_favorite(question.id()),
        })
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let answered = self
            .working
            .iter()
            .filter(|q| {
                self.snapshot
                    .get(q.id())
                    .is_some_and(AnswerRecord::is_answered)
            })
            .count();
        SessionProgress {
            index: self.index,
            total: self.working.len(),
            answered,
            is_complete: self.is_finished(),
        }
    }

    //
    // ─── ANSWER INTAKE ─────────────────────────────────────────────────────────
    //

    /// Tap an option on the current question.
    ///
    /// Single-choice, true/false and free-text questions submit on the first tap.
    /// Multi-choice questions toggle the letter in the pending selection.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ReadOnly` in read-only modes,
    /// `SessionError::AlreadySubmitted` once the question is locked,
    /// `SessionError::UnknownOption` for a letter the question does not offer, and
    /// `SessionError::Empty`/`SessionError::Finished` when nothing is presented.
    pub async fn select(&mut self, letter: OptionLetter) -> Result<AnswerIntake, SessionError> {
        let question = self.answerable()?;
        if !question.options().contains(&letter) {
            return Err(SessionError::UnknownOption(letter.as_char()));
        }

        if question.kind().is_multi() {
            if !self.pending.remove(&letter) {
                self.pending.insert(letter);
            }
            return Ok(AnswerIntake::Pending(self.pending.iter().copied().collect()));
        }

        let selected = join_letters([letter]);
        let is_correct = question.is_correct(&selected);
        let id = question.id().clone();
        self.record_submission(id, selected, is_correct).await;
        Ok(AnswerIntake::Submitted { is_correct })
    }

    /// Submit the pending multi-choice selection. Returns whether it was correct.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotMultiChoice` for other question kinds,
    /// `SessionError::NoSelection` when nothing is pending, plus the intake errors
    /// of [`SessionController::select`].
    pub async fn submit_selection(&mut self) -> Result<bool, SessionError> {
        let question = self.answerable()?;
        if !question.kind().is_multi() {
            return Err(SessionError::NotMultiChoice);
        }
        if self.pending.is_empty() {
            return Err(SessionError::NoSelection);
        }

        let selected = join_letters(self.pending.iter().copied());
        let is_correct = question.is_correct(&selected);
        let id = question.id().clone();
        self.record_submission(id, selected, is_correct).await;
        Ok(is_correct)
    }

    /// Flip the favorite flag of the current question. Returns the new value.
    ///
    /// Allowed in every mode. The working list does not change.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty`/`SessionError::Finished` when nothing is presented.
    pub async fn toggle_favorite(&mut self) -> Result<bool, SessionError> {
        self.ensure_active()?;
        let Some(question) = self.working.get(self.index) else {
            return Err(SessionError::Empty);
        };
        let id = question.id().clone();
        let favorite = !self.snapshot.is_favorite(&id);

        let patch = AnswerPatch::favorite(id, favorite);
        self.snapshot.apply(&patch);
        self.storage.answers.set(&patch).await;
        self.refresh_working_list();

        debug!(
            session = %self.key,
            question_id = %patch.question_id,
            favorite,
            "favorite toggled"
        );
        Ok(favorite)
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Move to the next question, or finish the session from the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty`/`SessionError::Finished` when nothing is
    /// presented, or a scoring error from [`SessionController::finish`].
    pub async fn next(&mut self) -> Result<Navigation, SessionError> {
        self.ensure_active()?;
        if self.index + 1 < self.working.len() {
            self.enter(self.index + 1).await;
            Ok(Navigation::Moved(self.index))
        } else {
            self.finish().await.map(Navigation::Finished)
        }
    }

    /// Move to the previous question; stays put on the first one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty`/`SessionError::Finished` when nothing is presented.
    pub async fn prev(&mut self) -> Result<usize, SessionError> {
        self.ensure_active()?;
        if self.index > 0 {
            self.enter(self.index - 1).await;
        }
        Ok(self.index)
    }

    /// End the session and hand back its outcome.
    ///
    /// Read-only sessions complete without a score and without store writes.
    /// Otherwise the score covers every working-list question currently answered
    /// correctly, progress for the session key returns to 0, attempts are cleared
    /// in modes that clear on finish, and a standard quiz marks its category
    /// completed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty`/`SessionError::Finished` when nothing is
    /// presented.
    pub async fn finish(&mut self) -> Result<SessionOutcome, SessionError> {
        self.ensure_active()?;

        if self.strategy.is_read_only() {
            self.close(SessionOutcome::ReviewComplete);
            info!(session = %self.key, "review complete");
            return Ok(SessionOutcome::ReviewComplete);
        }

        let correct = self
            .working
            .iter()
            .filter(|q| {
                self.snapshot
                    .get(q.id())
                    .is_some_and(AnswerRecord::counts_as_correct)
            })
            .count();
        // A wall clock stepped backwards must not keep the session open.
        let finished_at = self.clock.now().max(self.started_at);
        let summary =
            ScoreSummary::new(correct, self.working.len(), self.started_at, finished_at)?;

        self.storage.progress.set(&self.key, 0).await;

        if self.strategy.clear_on_finish() {
            let ids: Vec<QuestionId> = self.working.iter().map(|q| q.id().clone()).collect();
            self.storage.answers.clear_fields(&ids).await;
            self.snapshot.clear_attempts(&ids);
        }

        if self.strategy.tracks_completion() {
            self.storage.completed.mark_completed(&self.title).await;
        }

        info!(
            session = %self.key,
            correct = summary.correct_count(),
            total = summary.total(),
            score = summary.score(),
            "session finished"
        );
        let outcome = SessionOutcome::Scored(summary);
        self.close(outcome.clone());
        Ok(outcome)
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Empty => Err(SessionError::Empty),
            SessionPhase::Finished => Err(SessionError::Finished),
            SessionPhase::Presenting | SessionPhase::Submitted => Ok(()),
        }
    }

    fn answerable(&self) -> Result<&Question, SessionError> {
        self.ensure_active()?;
        if self.strategy.is_read_only() || !self.strategy.can_answer() {
            return Err(SessionError::ReadOnly);
        }
        if self.phase == SessionPhase::Submitted {
            return Err(SessionError::AlreadySubmitted);
        }
        self.working.get(self.index).ok_or(SessionError::Empty)
    }

    async fn enter(&mut self, index: usize) {
        self.index = index;
        self.pending.clear();

        let answered = self
            .working
            .get(index)
            .and_then(|q| self.snapshot.get(q.id()))
            .is_some_and(AnswerRecord::is_answered);
        self.phase = if answered || self.strategy.show_exp_directly() {
            SessionPhase::Submitted
        } else {
            SessionPhase::Presenting
        };

        if self.strategy.save_progress() {
            self.storage.progress.set(&self.key, index).await;
        }
        debug!(session = %self.key, index, phase = ?self.phase, "question presented");
    }

    async fn record_submission(&mut self, id: QuestionId, selected: String, is_correct: bool) {
        let previous_wrong = self.snapshot.get(&id).map_or(0, AnswerRecord::wrong_count);
        let patch = AnswerPatch::submission(id, selected, is_correct, previous_wrong);
        self.snapshot.apply(&patch);
        self.storage.answers.set(&patch).await;

        self.pending.clear();
        self.phase = SessionPhase::Submitted;
        self.refresh_working_list();

        if self.strategy.tracks_completion() {
            self.storage
                .progress
                .advance(&SessionKey::main(&self.title), self.index + 1)
                .await;
        }
        debug!(
            session = %self.key,
            question_id = %patch.question_id,
            is_correct,
            "answer submitted"
        );
    }

    fn refresh_working_list(&mut self) {
        self.working = compute_working_list(
            &self.questions,
            self.strategy,
            &self.snapshot,
            &mut self.frozen,
        );
    }

    fn close(&mut self, outcome: SessionOutcome) {
        self.phase = SessionPhase::Finished;
        self.pending.clear();
        self.outcome = Some(outcome);
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("key", &self.key)
            .field("phase", &self.phase)
            .field("index", &self.index)
            .field("total", &self.working.len())
            .field("frozen", &self.frozen.as_ref().map(FrozenIds::len))
            .finish_non_exhaustive()
    }
}
