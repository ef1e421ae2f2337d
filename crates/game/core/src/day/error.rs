use crate::error::{ErrorSeverity, GameError};
use crate::state::PlayerId;

/// Rejected day-phase input. State is unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayError {
    #[error("speeches are not being taken")]
    NotSpeaking,

    #[error("voting is not open")]
    NotVoting,

    #[error("votes are still outstanding")]
    VotesOutstanding,

    #[error("player {0} is not at this table")]
    UnknownPlayer(PlayerId),

    #[error("it is {expected}'s turn to speak, not {actual}'s")]
    NotYourTurn { expected: PlayerId, actual: PlayerId },

    #[error("player {0} already declared a role today")]
    AlreadyDeclared(PlayerId),

    #[error("player {0} is dead")]
    PlayerDead(PlayerId),

    #[error("player {0} already voted today")]
    AlreadyVoted(PlayerId),

    #[error("vote target {0} is dead")]
    TargetDead(PlayerId),
}

impl GameError for DayError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use DayError::*;
        match self {
            NotSpeaking => "DAY_NOT_SPEAKING",
            NotVoting => "DAY_NOT_VOTING",
            VotesOutstanding => "DAY_VOTES_OUTSTANDING",
            UnknownPlayer(_) => "DAY_UNKNOWN_PLAYER",
            NotYourTurn { .. } => "DAY_NOT_YOUR_TURN",
            AlreadyDeclared(_) => "DAY_ALREADY_DECLARED",
            PlayerDead(_) => "DAY_PLAYER_DEAD",
            AlreadyVoted(_) => "DAY_ALREADY_VOTED",
            TargetDead(_) => "DAY_TARGET_DEAD",
        }
    }
}
