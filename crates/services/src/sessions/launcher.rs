use quiz_core::Clock;
use quiz_core::model::{Question, QuestionId, Selection, SessionKey, ViewMode};
use storage::Storage;
use tracing::{debug, info};

use super::controller::SessionController;
use super::plan::{DEFAULT_MOCK_SIZE, sample_questions};

/// Everything a session needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionLaunch {
    pub title: String,
    pub mode: ViewMode,
    pub questions: Vec<Question>,
    pub start_index: usize,
}

impl SessionLaunch {
    #[must_use]
    pub fn new(title: impl Into<String>, mode: ViewMode, questions: Vec<Question>) -> Self {
        Self {
            title: title.into(),
            mode,
            questions,
            start_index: 0,
        }
    }

    #[must_use]
    pub fn with_start_index(mut self, start_index: usize) -> Self {
        self.start_index = start_index;
        self
    }
}

/// Prepares question lists for a mode and performs the fresh-start cleanup.
#[derive(Clone)]
pub struct SessionLauncher {
    storage: Storage,
    clock: Clock,
    mock_size: usize,
    mock_seed: Option<u64>,
}

impl SessionLauncher {
    #[must_use]
    pub fn new(storage: Storage, clock: Clock) -> Self {
        Self {
            storage,
            clock,
            mock_size: DEFAULT_MOCK_SIZE,
            mock_seed: None,
        }
    }

    /// Number of questions drawn for a mock exam.
    #[must_use]
    pub fn with_mock_size(mut self, mock_size: usize) -> Self {
        self.mock_size = mock_size;
        self
    }

    /// Fix the mock-exam draw; `None` draws from the thread-local generator.
    #[must_use]
    pub fn with_mock_seed(mut self, mock_seed: Option<u64>) -> Self {
        self.mock_seed = mock_seed;
        self
    }

    /// Shape a category's questions for `mode` and settle where the session starts.
    ///
    /// When stored progress for the session key is 0 and the mode clears on a
    /// fresh start, this persists the restart: the category's completion is
    /// cleared (standard quiz only), progress is written as 0, and the attempts of
    /// every question about to be presented are cleared.
    pub async fn prepare(
        &self,
        title: &str,
        mode: ViewMode,
        questions: Vec<Question>,
    ) -> SessionLaunch {
        let strategy = mode.strategy();
        let key = SessionKey::new(mode, title);

        let questions = match strategy.selection() {
            Selection::Frozen(membership) => {
                let snapshot = self.storage.answers.get_all().await;
                questions
                    .into_iter()
                    .filter(|q| membership.admits(&snapshot, q.id()))
                    .collect()
            }
            Selection::PassThrough if mode == ViewMode::Mock => {
                sample_questions(questions, self.mock_size, self.mock_seed)
            }
            Selection::PassThrough => questions,
        };

        let stored = self.storage.progress.get(&key).await.unwrap_or(0);
        if stored == 0 && strategy.clears_on_fresh_start() {
            if strategy.tracks_completion() {
                self.storage.completed.clear(title).await;
            }
            self.storage.progress.set(&key, 0).await;
            let ids: Vec<QuestionId> = questions.iter().map(|q| q.id().clone()).collect();
            self.storage.answers.clear_fields(&ids).await;
            debug!(session = %key, count = ids.len(), "fresh start cleared");
        }

        let start_index = if strategy.save_progress() { stored } else { 0 };
        info!(session = %key, questions = questions.len(), start_index, "session prepared");

        SessionLaunch::new(title, mode, questions).with_start_index(start_index)
    }

    pub async fn start(&self, launch: SessionLaunch) -> SessionController {
        SessionController::start(launch, self.storage.clone(), self.clock).await
    }

    /// [`SessionLauncher::prepare`] followed by [`SessionLauncher::start`].
    pub async fn launch(
        &self,
        title: &str,
        mode: ViewMode,
        questions: Vec<Question>,
    ) -> SessionController {
        let launch = self.prepare(title, mode, questions).await;
        self.start(launch).await
    }
}
