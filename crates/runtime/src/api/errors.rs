//! Unified error types surfaced by the runtime API.
//!
//! Wraps rule violations from the session and failures from input providers
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use werewolf_core::{DecisionKind, GameError, GamePhase, PlayerId, SessionError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("input provider not set")]
    ProviderNotSet,

    #[error("input channel closed")]
    InputChannelClosed,

    #[error("scripted input exhausted while waiting for {decision:?}")]
    ScriptExhausted { decision: DecisionKind },

    #[error("answer {answer} does not fit {decision:?}")]
    UnexpectedAnswer {
        decision: DecisionKind,
        answer: &'static str,
    },

    #[error("{player} gave {attempts} invalid answers in a row")]
    TooManyInvalidAnswers { player: PlayerId, attempts: usize },

    #[error("no progress during {phase} of day {day}")]
    NoProgress { phase: GamePhase, day: u32 },
}

impl RuntimeError {
    /// Whether asking the same participant again may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            RuntimeError::Session(err) => err.severity().is_recoverable(),
            RuntimeError::UnexpectedAnswer { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_answer_kind_is_worth_asking_again() {
        let mismatch = RuntimeError::UnexpectedAnswer {
            decision: DecisionKind::Speech,
            answer: "vote",
        };
        assert!(mismatch.is_recoverable());
        assert!(!RuntimeError::InputChannelClosed.is_recoverable());
        assert!(
            !RuntimeError::ScriptExhausted {
                decision: DecisionKind::Vote
            }
            .is_recoverable()
        );
    }
}
