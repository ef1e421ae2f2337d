use crate::roles::{RoleCatalog, SetupError};

/// Session rules and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Explicit role pool. `None` derives one from the player count.
    pub catalog: Option<RoleCatalog>,
    /// Budget for each collection step (night actions, one speech, voting).
    pub step_timeout_ms: u64,
    /// When a step deadline expires, also decide on behalf of the controlled
    /// player. A controlled Hunter's last stand is never auto-filled.
    pub auto_fill_controlled: bool,
}

impl GameConfig {
    // ===== player count bounds =====
    pub const MIN_PLAYERS: usize = 6;
    pub const MAX_PLAYERS: usize = 18;
    pub const DEFAULT_PLAYERS: usize = 9;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 30_000;

    pub fn new() -> Self {
        Self {
            catalog: None,
            step_timeout_ms: Self::DEFAULT_STEP_TIMEOUT_MS,
            auto_fill_controlled: true,
        }
    }

    pub fn with_catalog(mut self, catalog: RoleCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_step_timeout_ms(mut self, step_timeout_ms: u64) -> Self {
        self.step_timeout_ms = step_timeout_ms;
        self
    }

    pub fn with_auto_fill_controlled(mut self, enabled: bool) -> Self {
        self.auto_fill_controlled = enabled;
        self
    }

    /// Returns the role pool for `player_count` players.
    pub fn catalog_for(&self, player_count: usize) -> Result<RoleCatalog, SetupError> {
        if !(Self::MIN_PLAYERS..=Self::MAX_PLAYERS).contains(&player_count) {
            return Err(SetupError::PlayerCountOutOfRange {
                requested: player_count,
                min: Self::MIN_PLAYERS,
                max: Self::MAX_PLAYERS,
            });
        }

        match &self.catalog {
            Some(catalog) => {
                catalog.validate_for(player_count)?;
                Ok(catalog.clone())
            }
            None => RoleCatalog::for_player_count(player_count),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
