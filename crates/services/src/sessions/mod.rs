mod controller;
mod launcher;
mod plan;
mod progress;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{AnswerIntake, Navigation, SessionController, SessionPhase};
pub use launcher::{SessionLaunch, SessionLauncher};
pub use plan::{DEFAULT_MOCK_SIZE, sample_questions};
pub use progress::SessionProgress;
pub use view::QuestionView;
