use crate::day::{Accusation, VoteTally};
use crate::night::{Investigation, WitchPotions};
use crate::roles::{Role, Team};
use crate::state::{Player, PlayerId, PlayerRoster};

/// What one automated participant may know when deciding.
///
/// Built by the session for a single actor. Hidden roles are reachable
/// through `roster` but policies must only rely on the helpers below and on
/// the public fields of each player.
#[derive(Clone, Debug)]
pub struct DecisionContext<'a> {
    pub roster: &'a PlayerRoster,
    pub actor: &'a Player,
    pub day: u32,
    pub seed: u64,
    /// Current victim; only filled for the witch.
    pub kill_target: Option<PlayerId>,
    /// Remaining potions; only meaningful for the witch.
    pub potions: WitchPotions,
    /// The actor's own investigation results.
    pub investigations: Vec<Investigation>,
    /// Accusations made in speeches so far today.
    pub accusations: &'a [Accusation],
    pub tally: Option<&'a VoteTally>,
}

impl<'a> DecisionContext<'a> {
    pub fn actor_id(&self) -> PlayerId {
        self.actor.id()
    }

    /// Living players other than the actor, by seat.
    pub fn others_alive(&self) -> Vec<&'a Player> {
        let actor = self.actor.id();
        self.roster
            .alive_players(None)
            .into_iter()
            .filter(|player| player.id() != actor)
            .collect()
    }

    /// Living pack mates when the actor is a werewolf.
    pub fn teammates(&self) -> Vec<&'a Player> {
        if self.actor.team() != Team::Werewolf {
            return Vec::new();
        }
        self.others_alive()
            .into_iter()
            .filter(|player| player.team() == Team::Werewolf)
            .collect()
    }

    /// Team of `target` if the actor has legitimately learned it.
    ///
    /// Werewolves know each other (and hence everybody else's team); the seer
    /// knows what they investigated.
    pub fn known_team(&self, target: PlayerId) -> Option<Team> {
        if target == self.actor.id() {
            return Some(self.actor.team());
        }
        if self.actor.team() == Team::Werewolf {
            return self.roster.player(target).map(Player::team);
        }
        self.investigations
            .iter()
            .rev()
            .find(|investigation| investigation.target == target)
            .map(|investigation| {
                if investigation.is_werewolf {
                    Team::Werewolf
                } else {
                    Team::Village
                }
            })
    }

    pub fn was_investigated(&self, target: PlayerId) -> bool {
        self.investigations
            .iter()
            .any(|investigation| investigation.target == target)
    }

    pub fn accusations_against(&self, target: PlayerId) -> usize {
        self.accusations
            .iter()
            .filter(|accusation| accusation.target == target)
            .count()
    }

    /// Living players whose latest public claim is `role`.
    pub fn claimants(&self, role: Role) -> Vec<&'a Player> {
        self.roster
            .alive_players(None)
            .into_iter()
            .filter(|player| player.declared_role() == Some(role))
            .collect()
    }

    /// Targets accused by somebody who claims to be the seer.
    pub fn claimed_wolf_reports(&self) -> Vec<PlayerId> {
        self.accusations
            .iter()
            .filter(|accusation| {
                self.roster
                    .player(accusation.accuser)
                    .and_then(Player::declared_role)
                    == Some(Role::Seer)
            })
            .map(|accusation| accusation.target)
            .collect()
    }

    pub fn votes_for(&self, target: PlayerId) -> usize {
        self.tally
            .map(|tally| tally.voters_for(target).len())
            .unwrap_or(0)
    }
}
