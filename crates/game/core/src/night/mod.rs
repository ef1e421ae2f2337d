//! Night actions and their simultaneous resolution.
mod actions;
mod error;
mod resolver;

pub use actions::{
    Death, DeathCause, Investigation, NightAction, NightActionKind, NightActionSet, WitchPotions,
};
pub use error::SubmissionError;
pub use resolver::{NightOutcome, NightResolver, NightStage};
