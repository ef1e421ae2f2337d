//! Night submissions, the witch's potions and what a night leaves behind.
use crate::roles::Role;
use crate::state::{PlayerId, Seat};

/// Ability-bearing night submissions.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum NightActionKind {
    Kill,
    Heal,
    Poison,
    Investigate,
}

impl NightActionKind {
    /// The only role allowed to submit this kind.
    pub const fn required_role(self) -> Role {
        match self {
            NightActionKind::Kill => Role::Werewolf,
            NightActionKind::Heal | NightActionKind::Poison => Role::Witch,
            NightActionKind::Investigate => Role::Seer,
        }
    }

    /// Whether the submitting player may name themselves. Only the witch's
    /// heal allows it.
    pub const fn allows_self_target(self) -> bool {
        matches!(self, NightActionKind::Heal)
    }
}

/// One night submission from one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NightAction {
    Kill(PlayerId),
    Heal(PlayerId),
    Poison(PlayerId),
    Investigate(PlayerId),
    /// Finish this role's turn without (further) action.
    Pass,
}

impl NightAction {
    pub fn new(kind: NightActionKind, target: PlayerId) -> Self {
        match kind {
            NightActionKind::Kill => NightAction::Kill(target),
            NightActionKind::Heal => NightAction::Heal(target),
            NightActionKind::Poison => NightAction::Poison(target),
            NightActionKind::Investigate => NightAction::Investigate(target),
        }
    }

    /// `None` for [`NightAction::Pass`].
    pub fn kind(&self) -> Option<NightActionKind> {
        match self {
            NightAction::Kill(_) => Some(NightActionKind::Kill),
            NightAction::Heal(_) => Some(NightActionKind::Heal),
            NightAction::Poison(_) => Some(NightActionKind::Poison),
            NightAction::Investigate(_) => Some(NightActionKind::Investigate),
            NightAction::Pass => None,
        }
    }

    pub fn target(&self) -> Option<PlayerId> {
        match *self {
            NightAction::Kill(target)
            | NightAction::Heal(target)
            | NightAction::Poison(target)
            | NightAction::Investigate(target) => Some(target),
            NightAction::Pass => None,
        }
    }
}

/// What was chosen during the current night. Reset every night.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NightActionSet {
    pub kill: Option<PlayerId>,
    pub heal: Option<PlayerId>,
    pub poison: Option<PlayerId>,
    pub investigate: Option<PlayerId>,
    pub investigator: Option<PlayerId>,
}

/// Witch's single-use resources for the whole game.
///
/// `true` means the potion is still in hand. Both may be spent on the same
/// night.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WitchPotions {
    pub heal: bool,
    pub poison: bool,
}

impl WitchPotions {
    pub const fn full() -> Self {
        Self {
            heal: true,
            poison: true,
        }
    }

    pub const fn is_empty(&self) -> bool {
        !self.heal && !self.poison
    }
}

impl Default for WitchPotions {
    fn default() -> Self {
        Self::full()
    }
}

/// Why a player left the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeathCause {
    /// Pack's victim, not healed.
    Killed,
    /// Witch's poison. Ignores the heal.
    Poisoned,
    /// What the table is told about a kill or a poisoning.
    Night,
    Voted,
    Shot { by: PlayerId },
}

/// A single elimination with the seat it freed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Death {
    pub player: PlayerId,
    pub seat: Seat,
    pub role: Role,
    pub cause: DeathCause,
}

/// Seer's private result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Investigation {
    pub night: u32,
    pub seer: PlayerId,
    pub target: PlayerId,
    pub is_werewolf: bool,
}
