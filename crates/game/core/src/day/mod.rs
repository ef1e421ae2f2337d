//! Daytime: speech ordering, declarations and the elimination vote.
mod cycle;
mod error;
mod speech;
mod vote;

pub use cycle::{DayCycle, DayStage};
pub use error::DayError;
pub use speech::{Accusation, Speech, speech_order};
pub use vote::{VoteOutcome, VoteTally};
