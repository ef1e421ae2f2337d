//! Player identities, the roster and the phase enum.
//!
//! The roster is read freely by the presentation layer but mutated only by
//! the night resolver, the day cycle and the session.
mod ids;
mod player;
mod roster;

pub use ids::{PlayerId, Seat, Winner};
pub use player::Player;
pub use roster::{Lineup, PlayerRoster};

/// Top-level phase. Setup → Night → DaySpeech → DayVoting → (Night | End).
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Setup,
    Night,
    DaySpeech,
    DayVoting,
    End,
}
