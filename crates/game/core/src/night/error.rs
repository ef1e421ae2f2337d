use crate::error::{ErrorSeverity, GameError};
use crate::roles::Role;
use crate::state::PlayerId;

use super::NightActionKind;

/// Rejected night submission. Nothing is recorded; the same player resubmits.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubmissionError {
    #[error("night actions are no longer being collected")]
    NotCollecting,

    #[error("player {0} is not at this table")]
    UnknownPlayer(PlayerId),

    #[error("player {0} is dead and cannot act")]
    ActorDead(PlayerId),

    #[error("player {actor} ({role}) cannot {action}")]
    WrongRole {
        actor: PlayerId,
        role: Role,
        action: NightActionKind,
    },

    #[error("player {actor} ({role}) has no night ability")]
    NoNightAbility { actor: PlayerId, role: Role },

    #[error("{role} already acted this night")]
    AlreadyActed { role: Role },

    #[error("target {0} is dead")]
    TargetDead(PlayerId),

    #[error("{action} cannot target the acting player")]
    SelfTarget { action: NightActionKind },

    #[error("the {action} potion was already used")]
    PotionSpent { action: NightActionKind },
}

impl GameError for SubmissionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use SubmissionError::*;
        match self {
            NotCollecting => "NIGHT_NOT_COLLECTING",
            UnknownPlayer(_) => "NIGHT_UNKNOWN_PLAYER",
            ActorDead(_) => "NIGHT_ACTOR_DEAD",
            WrongRole { .. } => "NIGHT_WRONG_ROLE",
            NoNightAbility { .. } => "NIGHT_NO_ABILITY",
            AlreadyActed { .. } => "NIGHT_ALREADY_ACTED",
            TargetDead(_) => "NIGHT_TARGET_DEAD",
            SelfTarget { .. } => "NIGHT_SELF_TARGET",
            PotionSpent { .. } => "NIGHT_POTION_SPENT",
        }
    }
}
