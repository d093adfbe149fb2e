use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::answer::AnswerSnapshot;
use crate::model::ids::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown practice mode: {0}")]
pub struct ModeParseError(pub String);

//
// ─── VIEW MODE ────────────────────────────────────────────────────────────────
//

/// Practice mode a session runs in.
///
/// Selects both the question-selection policy and the interaction policy. Behavior is
/// never derived from the tag directly; callers go through [`ViewMode::strategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewMode {
    Quiz,
    Review,
    Favorite,
    Wrong,
    Mock,
}

impl ViewMode {
    pub const ALL: [ViewMode; 5] = [
        Self::Quiz,
        Self::Review,
        Self::Favorite,
        Self::Wrong,
        Self::Mock,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quiz => "QUIZ",
            Self::Review => "REVIEW",
            Self::Favorite => "FAVORITE",
            Self::Wrong => "WRONG",
            Self::Mock => "MOCK",
        }
    }

    /// Behavioral flags for this mode.
    #[must_use]
    pub const fn strategy(self) -> ModeStrategy {
        match self {
            Self::Quiz => ModeStrategy {
                mode: self,
                can_answer: true,
                show_answer_instantly: true,
                show_exp_directly: false,
                save_progress: true,
                is_read_only: false,
                clear_on_finish: false,
                tracks_completion: true,
                selection: Selection::PassThrough,
            },
            Self::Review => ModeStrategy {
                mode: self,
                can_answer: false,
                show_answer_instantly: true,
                show_exp_directly: true,
                save_progress: false,
                is_read_only: true,
                clear_on_finish: false,
                tracks_completion: false,
                selection: Selection::PassThrough,
            },
            Self::Favorite => ModeStrategy {
                mode: self,
                selection: Selection::Frozen(Membership::Favorite),
                ..Self::Mock.strategy()
            },
            Self::Wrong => ModeStrategy {
                mode: self,
                selection: Selection::Frozen(Membership::Wrong),
                ..Self::Mock.strategy()
            },
            Self::Mock => ModeStrategy {
                mode: self,
                can_answer: true,
                show_answer_instantly: true,
                show_exp_directly: false,
                save_progress: true,
                is_read_only: false,
                clear_on_finish: true,
                tracks_completion: false,
                selection: Selection::PassThrough,
            },
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QUIZ" => Ok(Self::Quiz),
            "REVIEW" => Ok(Self::Review),
            "FAVORITE" => Ok(Self::Favorite),
            "WRONG" => Ok(Self::Wrong),
            "MOCK" => Ok(Self::Mock),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

//
// ─── SELECTION POLICY ─────────────────────────────────────────────────────────
//

/// Which questions of a caller-supplied list a mode keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The list is already scoped (or sampled) by the caller.
    PassThrough,
    /// Filter once by membership, then keep that id set for the session.
    Frozen(Membership),
}

/// Membership predicate evaluated against an answer snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Favorite,
    /// Ever missed and not currently correct.
    Wrong,
}

impl Membership {
    #[must_use]
    pub fn admits(self, snapshot: &AnswerSnapshot, id: &QuestionId) -> bool {
        match self {
            Self::Favorite => snapshot.is_favorite(id),
            Self::Wrong => snapshot.is_wrong(id),
        }
    }
}

//
// ─── MODE STRATEGY ────────────────────────────────────────────────────────────
//

/// Behavior flags for a mode, looked up once per session and passed by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeStrategy {
    mode: ViewMode,
    can_answer: bool,
    show_answer_instantly: bool,
    show_exp_directly: bool,
    save_progress: bool,
    is_read_only: bool,
    clear_on_finish: bool,
    tracks_completion: bool,
    selection: Selection,
}

impl ModeStrategy {
    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    #[must_use]
    pub fn can_answer(&self) -> bool {
        self.can_answer
    }

    #[must_use]
    pub fn show_answer_instantly(&self) -> bool {
        self.show_answer_instantly
    }

    #[must_use]
    pub fn show_exp_directly(&self) -> bool {
        self.show_exp_directly
    }

    #[must_use]
    pub fn save_progress(&self) -> bool {
        self.save_progress
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.is_read_only
    }

    #[must_use]
    pub fn clear_on_finish(&self) -> bool {
        self.clear_on_finish
    }

    /// Whether submissions advance the category's main progress and finishing marks
    /// the category completed. Only the standard pass does.
    #[must_use]
    pub fn tracks_completion(&self) -> bool {
        self.tracks_completion
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Whether a fresh start wipes answered state before presenting.
    #[must_use]
    pub fn clears_on_fresh_start(&self) -> bool {
        self.tracks_completion || self.clear_on_finish
    }
}

//
// ─── SESSION KEY ──────────────────────────────────────────────────────────────
//

/// Key under which a session's last-visited index is persisted.
///
/// The category title for the standard pass, `"{MODE}_{title}"` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey(String);

impl SessionKey {
    #[must_use]
    pub fn new(mode: ViewMode, title: &str) -> Self {
        match mode {
            ViewMode::Quiz => Self(title.to_string()),
            other => Self(format!("{}_{title}", other.as_str())),
        }
    }

    /// Key of the standard pass for a category.
    #[must_use]
    pub fn main(title: &str) -> Self {
        Self::new(ViewMode::Quiz, title)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
