use crate::night::NightActionKind;
use crate::roles::Role;
use crate::state::{GamePhase, Player, PlayerId, Seat, Winner};

use super::{DecisionKind, LogEntry};

/// A decision some participant still owes in the current step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingDecision {
    pub player: PlayerId,
    pub kind: DecisionKind,
}

/// Controlled input the session is blocked on.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Awaiting {
    NightAction {
        player: PlayerId,
        role: Role,
        /// Abilities still usable tonight; passing is always allowed.
        kinds: Vec<NightActionKind>,
        /// Shown to the witch only.
        kill_target: Option<PlayerId>,
    },
    Speech {
        player: PlayerId,
    },
    Vote {
        player: PlayerId,
    },
    LastStand {
        player: PlayerId,
    },
}

impl Awaiting {
    pub fn player(&self) -> PlayerId {
        match *self {
            Awaiting::NightAction { player, .. }
            | Awaiting::Speech { player }
            | Awaiting::Vote { player }
            | Awaiting::LastStand { player } => player,
        }
    }
}

/// Public state of one player, as the presentation layer may show it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub seat: Seat,
    pub alive: bool,
    pub controlled: bool,
    pub declared_role: Option<Role>,
    /// Known for the controlled player, and for everybody once the game ends.
    pub revealed_role: Option<Role>,
}

impl PlayerView {
    pub(crate) fn of(player: &Player, reveal: bool) -> Self {
        Self {
            id: player.id(),
            name: player.name().to_owned(),
            seat: player.seat(),
            alive: player.is_alive(),
            controlled: player.is_controlled(),
            declared_role: player.declared_role(),
            revealed_role: (reveal || player.is_controlled()).then(|| player.role()),
        }
    }
}

/// Rendering snapshot handed to the presentation sink.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionView {
    pub phase: GamePhase,
    pub day: u32,
    pub winner: Option<Winner>,
    pub awaiting: Option<Awaiting>,
    /// Sorted by seat.
    pub players: Vec<PlayerView>,
    /// Entries visible to the controlled player.
    pub log: Vec<LogEntry>,
}

impl SessionView {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn controlled(&self) -> Option<&PlayerView> {
        self.players.iter().find(|player| player.controlled)
    }

    /// Living players other than `except`, by seat.
    pub fn alive_others(&self, except: PlayerId) -> impl Iterator<Item = &PlayerView> {
        self.players
            .iter()
            .filter(move |player| player.alive && player.id != except)
    }
}
