//! Authoritative player list, role assignment and win-condition queries.

use crate::rng::{PcgRng, shuffle};
use crate::roles::{Role, RoleCatalog, SetupError, Team};

use super::{Player, PlayerId, Seat, Winner};

const ROLE_SHUFFLE_SALT: u64 = 0x524f_4c45;
const SEAT_SHUFFLE_SALT: u64 = 0x5345_4154;

/// Names at the table in lineup order, plus which entry the human drives.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lineup {
    pub names: Vec<String>,
    pub controlled: usize,
}

impl Lineup {
    pub fn new(names: Vec<String>, controlled: usize) -> Self {
        Self { names, controlled }
    }

    /// `Player 1`..`Player N`, human in the first entry.
    pub fn numbered(players: usize) -> Self {
        Self {
            names: (1..=players).map(|n| format!("Player {n}")).collect(),
            controlled: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Set of players, their roles and their alive/dead status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerRoster {
    players: Vec<Player>,
}

impl PlayerRoster {
    /// Deals the catalog's roles to the lineup and draws a random seat order.
    ///
    /// When `forced` is set the controlled player receives that role and the
    /// remaining pool is shuffled across everybody else. Exact per-role counts
    /// from the catalog are preserved either way.
    pub fn assign_roles(
        lineup: &Lineup,
        catalog: &RoleCatalog,
        forced: Option<Role>,
        seed: u64,
    ) -> Result<Self, SetupError> {
        let players = lineup.len();
        catalog.validate_for(players)?;
        if lineup.controlled >= players {
            return Err(SetupError::ControlledIndexOutOfRange {
                index: lineup.controlled,
                players,
            });
        }

        let mut pool = catalog.pool();
        let mut pinned = None;
        if let Some(role) = forced {
            let index = pool
                .iter()
                .position(|candidate| *candidate == role)
                .ok_or(SetupError::ForcedRoleUnavailable { role })?;
            pinned = Some(pool.remove(index));
        }
        shuffle(&PcgRng, seed, ROLE_SHUFFLE_SALT, &mut pool);

        let mut seats: Vec<u32> = (1..=players as u32).collect();
        shuffle(&PcgRng, seed, SEAT_SHUFFLE_SALT, &mut seats);

        let mut dealt = pool.into_iter();
        let mut roster = Vec::with_capacity(players);
        for (index, name) in lineup.names.iter().enumerate() {
            let controlled = index == lineup.controlled;
            let role = match (controlled, pinned) {
                (true, Some(role)) => role,
                // The pool holds exactly one role per remaining player.
                _ => dealt.next().ok_or(SetupError::CatalogSizeMismatch {
                    catalog: catalog.total(),
                    players,
                })?,
            };
            roster.push(Player::new(
                PlayerId(index as u32 + 1),
                name.clone(),
                Seat(seats[index]),
                role,
                controlled,
            ));
        }

        tracing::debug!(players, ?forced, "roles assigned");
        Ok(Self { players: roster })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id() == id)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id() == id)
    }

    pub fn player_at(&self, seat: Seat) -> Option<&Player> {
        self.players.iter().find(|player| player.seat() == seat)
    }

    pub fn controlled(&self) -> Option<&Player> {
        self.players.iter().find(|player| player.is_controlled())
    }

    /// Players still alive, optionally restricted to one team, by seat.
    pub fn alive_players(&self, team: Option<Team>) -> Vec<&Player> {
        let mut alive: Vec<&Player> = self
            .players
            .iter()
            .filter(|player| player.is_alive())
            .filter(|player| team.is_none_or(|team| player.team() == team))
            .collect();
        alive.sort_by_key(|player| player.seat());
        alive
    }

    pub fn alive_count(&self, team: Team) -> usize {
        self.players
            .iter()
            .filter(|player| player.is_alive() && player.team() == team)
            .count()
    }

    /// Alive holders of `role`, by seat.
    pub fn alive_with_role(&self, role: Role) -> Vec<&Player> {
        let mut holders: Vec<&Player> = self
            .players
            .iter()
            .filter(|player| player.is_alive() && player.role() == role)
            .collect();
        holders.sort_by_key(|player| player.seat());
        holders
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.player(id).is_some_and(Player::is_alive)
    }

    /// Marks a player dead. Returns true only when this call changed anything;
    /// eliminating a dead or unknown player is a no-op.
    pub fn eliminate(&mut self, id: PlayerId) -> bool {
        match self.player_mut(id) {
            Some(player) => player.kill(),
            None => {
                tracing::debug!(%id, "eliminate ignored: unknown player");
                false
            }
        }
    }

    /// Village wins with no wolves left; wolves win once they match or
    /// outnumber the living village team.
    pub fn check_win_condition(&self) -> Option<Winner> {
        let wolves = self.alive_count(Team::Werewolf);
        let village = self.alive_count(Team::Village);

        if wolves == 0 {
            Some(Winner::Village)
        } else if wolves >= village {
            Some(Winner::Werewolf)
        } else {
            None
        }
    }

    pub(crate) fn reset_round_flags(&mut self) {
        for player in &mut self.players {
            player.reset_round();
        }
    }
}
