//! Automated decision making.
//!
//! Every automated participant decides through a [`DecisionPolicy`]. The
//! session falls back to [`FirstEligiblePolicy`] whenever a policy returns
//! nothing usable or an invalid pick.
mod context;
mod heuristic;
mod simple;

pub use context::DecisionContext;
pub use heuristic::HeuristicPolicy;
pub use simple::FirstEligiblePolicy;

use crate::day::Speech;
use crate::state::PlayerId;

/// Witch's choice for one night. Heal always targets the current victim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WitchDecision {
    pub heal: bool,
    pub poison: Option<PlayerId>,
}

impl WitchDecision {
    pub const PASS: Self = Self {
        heal: false,
        poison: None,
    };
}

/// Per-role decision capability for automated participants.
///
/// `None` means "pass" for optional abilities (kill, investigate) and "no
/// preference" for mandatory ones (vote, last stand), in which case the
/// caller substitutes its fallback.
pub trait DecisionPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn kill_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId>;

    fn investigate_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId>;

    fn witch_decision(&self, ctx: &DecisionContext<'_>) -> WitchDecision;

    fn speech(&self, ctx: &DecisionContext<'_>) -> Speech;

    fn vote_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId>;

    fn last_stand_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId>;
}

/// Policy selector used by configuration.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PolicyKind {
    #[default]
    Heuristic,
    #[strum(to_string = "simple", serialize = "first_eligible")]
    Simple,
}

impl PolicyKind {
    pub fn build(self) -> Box<dyn DecisionPolicy> {
        match self {
            PolicyKind::Heuristic => Box::new(HeuristicPolicy::default()),
            PolicyKind::Simple => Box::new(FirstEligiblePolicy),
        }
    }
}
