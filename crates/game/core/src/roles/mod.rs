//! Role identities, team alignment and the per-game role pool.
mod error;

pub use error::SetupError;

/// Coarse alignment used for win-condition checks.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Team {
    Werewolf,
    Village,
}

/// Role dealt to a player for the whole session.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    /// Kills one player each night together with the pack.
    Werewolf,
    /// No ability.
    Villager,
    /// Learns whether one player is a werewolf each night.
    Seer,
    /// One heal and one poison per game.
    Witch,
    /// Takes one player along when eliminated.
    Hunter,
}

impl Role {
    pub const fn team(self) -> Team {
        match self {
            Role::Werewolf => Team::Werewolf,
            Role::Villager | Role::Seer | Role::Witch | Role::Hunter => Team::Village,
        }
    }

    /// Roles that submit something during the night, in resolution order.
    pub const NIGHT_ORDER: [Role; 3] = [Role::Werewolf, Role::Seer, Role::Witch];

    pub const fn acts_at_night(self) -> bool {
        matches!(self, Role::Werewolf | Role::Seer | Role::Witch)
    }

    /// Village roles with an ability; wolves hunt these first.
    pub const fn is_power_role(self) -> bool {
        matches!(self, Role::Seer | Role::Witch | Role::Hunter)
    }
}

/// How the controlled player's role is chosen at start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoleChoice {
    #[default]
    Random,
    Pick(Role),
}

impl RoleChoice {
    pub const fn forced(self) -> Option<Role> {
        match self {
            RoleChoice::Random => None,
            RoleChoice::Pick(role) => Some(role),
        }
    }
}

impl core::str::FromStr for RoleChoice {
    type Err = strum::ParseError;

    /// `random` or any role name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("random") {
            return Ok(RoleChoice::Random);
        }
        s.trim().parse().map(RoleChoice::Pick)
    }
}

/// One entry of a [`RoleCatalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleSlot {
    pub role: Role,
    pub count: usize,
}

impl RoleSlot {
    pub const fn new(role: Role, count: usize) -> Self {
        Self { role, count }
    }
}

/// Fixed role counts for one session.
///
/// Counts never change after the session starts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleCatalog {
    slots: Vec<RoleSlot>,
}

impl RoleCatalog {
    /// Builds a catalog from explicit slots. Zero-count slots are dropped.
    pub fn new(slots: impl IntoIterator<Item = RoleSlot>) -> Result<Self, SetupError> {
        let mut kept: Vec<RoleSlot> = Vec::new();
        for slot in slots {
            if kept.iter().any(|existing| existing.role == slot.role) {
                return Err(SetupError::DuplicateRole { role: slot.role });
            }
            if slot.count > 0 {
                kept.push(slot);
            }
        }

        let catalog = Self { slots: kept };
        if catalog.team_size(Team::Werewolf) == 0 {
            return Err(SetupError::NoWerewolves);
        }
        if catalog.team_size(Team::Village) == 0 {
            return Err(SetupError::NoVillagers);
        }
        Ok(catalog)
    }

    /// The nine-player table: 3 werewolves, 3 villagers, seer, witch, hunter.
    pub fn standard() -> Self {
        Self {
            slots: vec![
                RoleSlot::new(Role::Werewolf, 3),
                RoleSlot::new(Role::Villager, 3),
                RoleSlot::new(Role::Seer, 1),
                RoleSlot::new(Role::Witch, 1),
                RoleSlot::new(Role::Hunter, 1),
            ],
        }
    }

    /// Scales the standard table: a third of the table are werewolves, one of
    /// each power role, villagers fill the remaining seats.
    pub fn for_player_count(players: usize) -> Result<Self, SetupError> {
        use crate::config::GameConfig;

        if !(GameConfig::MIN_PLAYERS..=GameConfig::MAX_PLAYERS).contains(&players) {
            return Err(SetupError::PlayerCountOutOfRange {
                requested: players,
                min: GameConfig::MIN_PLAYERS,
                max: GameConfig::MAX_PLAYERS,
            });
        }

        let werewolves = players / 3;
        let villagers = players - werewolves - 3;
        Self::new([
            RoleSlot::new(Role::Werewolf, werewolves),
            RoleSlot::new(Role::Villager, villagers),
            RoleSlot::new(Role::Seer, 1),
            RoleSlot::new(Role::Witch, 1),
            RoleSlot::new(Role::Hunter, 1),
        ])
    }

    pub fn slots(&self) -> &[RoleSlot] {
        &self.slots
    }

    /// Total number of roles, i.e. the number of seats this catalog fills.
    pub fn total(&self) -> usize {
        self.slots.iter().map(|slot| slot.count).sum()
    }

    pub fn count(&self, role: Role) -> usize {
        self.slots
            .iter()
            .find(|slot| slot.role == role)
            .map_or(0, |slot| slot.count)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.count(role) > 0
    }

    pub fn team_size(&self, team: Team) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.role.team() == team)
            .map(|slot| slot.count)
            .sum()
    }

    /// Flattened pool, one entry per seat, in catalog order.
    pub fn pool(&self) -> Vec<Role> {
        self.slots
            .iter()
            .flat_map(|slot| std::iter::repeat_n(slot.role, slot.count))
            .collect()
    }

    pub fn validate_for(&self, players: usize) -> Result<(), SetupError> {
        if self.total() != players {
            return Err(SetupError::CatalogSizeMismatch {
                catalog: self.total(),
                players,
            });
        }
        Ok(())
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
