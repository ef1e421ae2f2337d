//! Setup-time failures.
//!
//! Everything here is raised before the first night. A session that fails
//! setup stays in `Setup` and nothing is mutated.

use crate::error::{ErrorSeverity, GameError};

use super::Role;

/// Invariant violations detected while building the role pool or roster.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SetupError {
    #[error("player count {requested} is outside {min}..={max}")]
    PlayerCountOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },

    #[error("role catalog holds {catalog} roles but {players} players are seated")]
    CatalogSizeMismatch { catalog: usize, players: usize },

    #[error("role catalog lists {role} more than once")]
    DuplicateRole { role: Role },

    #[error("role catalog has no werewolves")]
    NoWerewolves,

    #[error("role catalog has no village roles")]
    NoVillagers,

    #[error("role {role} is not part of this game's catalog")]
    ForcedRoleUnavailable { role: Role },

    #[error("expected {expected} player names, got {provided}")]
    NameCountMismatch { expected: usize, provided: usize },

    #[error("controlled seat index {index} is out of range for {players} players")]
    ControlledIndexOutOfRange { index: usize, players: usize },
}

impl GameError for SetupError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use SetupError::*;
        match self {
            PlayerCountOutOfRange { .. } => "SETUP_PLAYER_COUNT_OUT_OF_RANGE",
            CatalogSizeMismatch { .. } => "SETUP_CATALOG_SIZE_MISMATCH",
            DuplicateRole { .. } => "SETUP_DUPLICATE_ROLE",
            NoWerewolves => "SETUP_NO_WEREWOLVES",
            NoVillagers => "SETUP_NO_VILLAGERS",
            ForcedRoleUnavailable { .. } => "SETUP_FORCED_ROLE_UNAVAILABLE",
            NameCountMismatch { .. } => "SETUP_NAME_COUNT_MISMATCH",
            ControlledIndexOutOfRange { .. } => "SETUP_CONTROLLED_INDEX_OUT_OF_RANGE",
        }
    }
}
