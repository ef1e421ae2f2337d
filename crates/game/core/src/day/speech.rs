use crate::roles::Role;
use crate::state::{PlayerId, PlayerRoster, Seat};

/// One speech turn. Text content is opaque to the rules.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Speech {
    pub text: String,
    /// Optional role claim, not necessarily truthful.
    pub declaration: Option<Role>,
    /// Optional public accusation, kept for later reasoning.
    pub accuses: Option<PlayerId>,
}

impl Speech {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn declaring(mut self, role: Role) -> Self {
        self.declaration = Some(role);
        self
    }

    pub fn accusing(mut self, target: PlayerId) -> Self {
        self.accuses = Some(target);
        self
    }
}

/// A public accusation made during a speech.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Accusation {
    pub day: u32,
    pub accuser: PlayerId,
    pub target: PlayerId,
}

/// Speaking order for a day.
///
/// Without an anchor, living players speak by ascending seat. With an anchor
/// (highest seat eliminated in the preceding round) speech starts at the first
/// living seat after it and wraps around through seat 1.
pub fn speech_order(roster: &PlayerRoster, anchor: Option<Seat>) -> Vec<PlayerId> {
    let alive = roster.alive_players(None);
    let Some(anchor) = anchor else {
        return alive.iter().map(|player| player.id()).collect();
    };

    let (before, after): (Vec<_>, Vec<_>) = alive
        .into_iter()
        .partition(|player| player.seat() <= anchor);
    after
        .into_iter()
        .chain(before)
        .map(|player| player.id())
        .collect()
}
