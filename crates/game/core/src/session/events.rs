//! Rolling, sequenced event log.
//!
//! Every state change the session makes is recorded here with a visibility
//! tag. Presentation layers read the public stream plus whatever the
//! controlled player is entitled to see.

use crate::day::VoteOutcome;
use crate::night::{DeathCause, NightActionKind};
use crate::roles::{Role, Team};
use crate::state::{GamePhase, Player, PlayerId, Seat, Winner};

/// Who may read a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    /// Announced to the whole table.
    Public,
    /// Every member of a team, e.g. the pack's own channel.
    Team(Team),
    /// Only the named player, e.g. a seer result or a witch's potion.
    Private(PlayerId),
}

impl Visibility {
    /// Team membership is checked against the player's role, alive or dead.
    pub fn visible_to(&self, player: &Player) -> bool {
        match *self {
            Visibility::Public => true,
            Visibility::Team(team) => player.team() == team,
            Visibility::Private(id) => player.id() == id,
        }
    }
}

/// Which decision a participant owed.
///
/// `Night` carries the role being played, so entries naming it are never
/// public.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecisionKind {
    Night(Role),
    Speech,
    Vote,
    LastStand,
}

/// Everything the session records.
///
/// The event itself carries no audience; the [`Visibility`] on its
/// [`LogEntry`] decides who reads it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameEvent {
    GameStarted {
        players: usize,
        seed: u64,
    },
    RoleAssigned {
        player: PlayerId,
        role: Role,
    },
    PackRevealed {
        wolves: Vec<PlayerId>,
    },
    NightFell {
        night: u32,
    },
    /// Pack and witch learn the victim before the witch decides.
    VictimChosen {
        target: PlayerId,
    },
    PotionUsed {
        witch: PlayerId,
        potion: NightActionKind,
        target: PlayerId,
    },
    Investigated {
        target: PlayerId,
        is_werewolf: bool,
    },
    PeacefulNight,
    /// Night deaths are announced with [`DeathCause::Night`] only.
    PlayerDied {
        player: PlayerId,
        seat: Seat,
        cause: DeathCause,
    },
    LastStandPending {
        hunter: PlayerId,
    },
    HunterShot {
        hunter: PlayerId,
        target: PlayerId,
    },
    /// No living target remained for a pending last stand.
    LastStandLapsed {
        hunter: PlayerId,
    },
    DayBegan {
        day: u32,
        order: Vec<PlayerId>,
    },
    SpeechGiven {
        speaker: PlayerId,
        text: String,
        accuses: Option<PlayerId>,
    },
    RoleDeclared {
        player: PlayerId,
        role: Role,
    },
    VotingOpened,
    VoteCast {
        voter: PlayerId,
        target: PlayerId,
    },
    VoteTallied {
        outcome: VoteOutcome,
    },
    /// A decision owed when the step deadline expired was filled in.
    DecisionTimedOut {
        player: PlayerId,
        decision: DecisionKind,
    },
    GameEnded {
        winner: Winner,
        roles: Vec<(PlayerId, Role)>,
    },
}

/// One recorded event with where and for whom it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    /// Dense from zero; restarts with the session.
    pub seq: u64,
    pub day: u32,
    pub phase: GamePhase,
    pub visibility: Visibility,
    pub event: GameEvent,
}

impl LogEntry {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventLog {
    entries: Vec<LogEntry>,
    next_seq: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(
        &mut self,
        day: u32,
        phase: GamePhase,
        visibility: Visibility,
        event: GameEvent,
    ) -> LogEntry {
        let entry = LogEntry {
            seq: self.next_seq,
            day,
            phase,
            visibility,
            event,
        };
        self.next_seq += 1;
        self.entries.push(entry.clone());
        entry
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries `player` may read, in order.
    pub fn visible_to<'a>(&'a self, player: &'a Player) -> impl Iterator<Item = &'a LogEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.visibility.visible_to(player))
    }

    /// Entries with `seq` or later. Hosts keep the next unread sequence
    /// number as a cursor.
    pub fn since(&self, seq: u64) -> &[LogEntry] {
        let start = self.entries.partition_point(|entry| entry.seq < seq);
        &self.entries[start..]
    }
}
