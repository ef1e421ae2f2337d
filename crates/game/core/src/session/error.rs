use crate::day::DayError;
use crate::error::{ErrorSeverity, GameError};
use crate::night::SubmissionError;
use crate::roles::{Role, SetupError};
use crate::state::{GamePhase, PlayerId};

/// Errors surfaced by [`super::GameSession`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionError {
    #[error("session has not started")]
    NotStarted,

    #[error("session already started")]
    AlreadyStarted,

    #[error("game is over")]
    GameOver,

    #[error("expected phase {expected}, session is in {actual}")]
    WrongPhase {
        expected: GamePhase,
        actual: GamePhase,
    },

    #[error("waiting for {0}'s last stand")]
    AwaitingLastStand(PlayerId),

    #[error("no last stand is owed by {0}")]
    NoLastStand(PlayerId),

    #[error("last-stand target {0} is not a living player")]
    InvalidShot(PlayerId),

    #[error("{role} must act before this submission")]
    OutOfOrder { role: Role },

    #[error("the day cannot advance until the vote is tallied")]
    DayNotFinished,

    #[error("automated decision for {player} made no progress")]
    Stalled { player: PlayerId },

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Night(#[from] SubmissionError),

    #[error(transparent)]
    Day(#[from] DayError),
}

impl GameError for SessionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            SessionError::Setup(err) => err.severity(),
            SessionError::Night(err) => err.severity(),
            SessionError::Day(err) => err.severity(),
            SessionError::Stalled { .. } => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SessionError::NotStarted => "SESSION_NOT_STARTED",
            SessionError::AlreadyStarted => "SESSION_ALREADY_STARTED",
            SessionError::GameOver => "SESSION_GAME_OVER",
            SessionError::WrongPhase { .. } => "SESSION_WRONG_PHASE",
            SessionError::AwaitingLastStand(_) => "SESSION_AWAITING_LAST_STAND",
            SessionError::NoLastStand(_) => "SESSION_NO_LAST_STAND",
            SessionError::InvalidShot(_) => "SESSION_INVALID_SHOT",
            SessionError::OutOfOrder { .. } => "SESSION_OUT_OF_ORDER",
            SessionError::DayNotFinished => "SESSION_DAY_NOT_FINISHED",
            SessionError::Stalled { .. } => "SESSION_STALLED",
            SessionError::Setup(err) => err.error_code(),
            SessionError::Night(err) => err.error_code(),
            SessionError::Day(err) => err.error_code(),
        }
    }
}
