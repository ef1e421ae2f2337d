//! Client configuration loaded from the process environment.
use std::env;
use std::str::FromStr;

use werewolf_core::{GameConfig, PolicyKind, RoleChoice};
use werewolf_runtime::RuntimeConfig;

/// How log entries are written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything the binary needs to set up one game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub players: usize,
    /// Display name of the controlled player.
    pub name: Option<String>,
    pub role: RoleChoice,
    pub seed: Option<u64>,
    pub step_timeout_ms: u64,
    pub policy: PolicyKind,
    /// Read the controlled player's answers from stdin instead of autoplay.
    pub interactive: bool,
    pub output: OutputFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            players: GameConfig::DEFAULT_PLAYERS,
            name: None,
            role: RoleChoice::Random,
            seed: None,
            step_timeout_ms: GameConfig::DEFAULT_STEP_TIMEOUT_MS,
            policy: PolicyKind::default(),
            interactive: false,
            output: OutputFormat::default(),
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `WEREWOLF_PLAYERS` - Table size (default: 9)
    /// - `WEREWOLF_NAME` - Name of the controlled player (default: `Player 1`)
    /// - `WEREWOLF_ROLE` - `random` or a role name (default: random)
    /// - `WEREWOLF_SEED` - Session seed (default: random)
    /// - `WEREWOLF_STEP_TIMEOUT_MS` - Budget per collection step (default: 30000)
    /// - `WEREWOLF_POLICY` - `heuristic` or `simple` (default: heuristic)
    /// - `WEREWOLF_INTERACTIVE` - Answer from stdin (default: false)
    /// - `WEREWOLF_OUTPUT` - `text` or `json` (default: text)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(players) = parse(&read, "WEREWOLF_PLAYERS") {
            config.players = players;
        }
        config.name = read("WEREWOLF_NAME").map(|name| name.trim().to_owned());
        if let Some(role) = parse(&read, "WEREWOLF_ROLE") {
            config.role = role;
        }
        config.seed = parse(&read, "WEREWOLF_SEED");
        if let Some(timeout) = parse::<u64>(&read, "WEREWOLF_STEP_TIMEOUT_MS") {
            config.step_timeout_ms = timeout.max(1);
        }
        if let Some(policy) = parse(&read, "WEREWOLF_POLICY") {
            config.policy = policy;
        }
        if let Some(interactive) = read("WEREWOLF_INTERACTIVE") {
            config.interactive = parse_flag(&interactive);
        }
        if let Some(output) = parse(&read, "WEREWOLF_OUTPUT") {
            config.output = output;
        }

        config
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        // A human at the keyboard keeps the floor when the clock runs out.
        let game_config = GameConfig::new()
            .with_step_timeout_ms(self.step_timeout_ms)
            .with_auto_fill_controlled(!self.interactive);
        let names = self.name.as_ref().map(|name| {
            let names = std::iter::once(name.clone())
                .chain((2..=self.players).map(|n| format!("Player {n}")))
                .collect();
            (names, 0)
        });

        RuntimeConfig {
            game_config,
            seed: self.seed,
            player_count: self.players,
            role_choice: self.role,
            names,
            ..RuntimeConfig::default()
        }
    }
}

fn parse<T: FromStr>(read: impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = read(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
