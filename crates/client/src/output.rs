//! Minimal log printer for the terminal.
use std::collections::HashMap;

use werewolf_core::{
    DeathCause, GameEvent, LogEntry, NightActionKind, PlayerId, SessionView, VoteOutcome,
};

use crate::config::OutputFormat;

/// Turns log entries into output lines.
pub struct Printer {
    format: OutputFormat,
    names: HashMap<PlayerId, String>,
}

impl Printer {
    pub fn new(format: OutputFormat, view: &SessionView) -> Self {
        let names = view
            .players
            .iter()
            .map(|player| (player.id, player.name.clone()))
            .collect();
        Self { format, names }
    }

    pub fn line(&self, entry: &LogEntry) -> anyhow::Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string(entry)?),
            OutputFormat::Text => Ok(format!(
                "[day {} {}] {}",
                entry.day,
                entry.phase,
                self.describe(&entry.event)
            )),
        }
    }

    fn name(&self, id: PlayerId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn list(&self, ids: &[PlayerId]) -> String {
        ids.iter()
            .map(|id| self.name(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn describe(&self, event: &GameEvent) -> String {
        match event {
            GameEvent::GameStarted { players, seed } => {
                format!("A game for {players} players begins (seed {seed}).")
            }
            GameEvent::RoleAssigned { player, role } => {
                format!("{} is the {role}.", self.name(*player))
            }
            GameEvent::PackRevealed { wolves } => format!("The pack: {}.", self.list(wolves)),
            GameEvent::NightFell { night } => format!("Night {night} falls."),
            GameEvent::VictimChosen { target } => {
                format!("The werewolves chose {}.", self.name(*target))
            }
            GameEvent::PotionUsed {
                witch,
                potion,
                target,
            } => {
                let verb = match potion {
                    NightActionKind::Heal => "healed",
                    NightActionKind::Poison => "poisoned",
                    NightActionKind::Kill | NightActionKind::Investigate => "touched",
                };
                format!("{} {verb} {}.", self.name(*witch), self.name(*target))
            }
            GameEvent::Investigated {
                target,
                is_werewolf,
            } => {
                let verdict = if *is_werewolf { "a werewolf" } else { "not a werewolf" };
                format!("{} is {verdict}.", self.name(*target))
            }
            GameEvent::PeacefulNight => "Nobody died last night.".to_owned(),
            GameEvent::PlayerDied {
                player,
                seat,
                cause,
            } => {
                let how = match cause {
                    DeathCause::Killed | DeathCause::Poisoned | DeathCause::Night => {
                        "died during the night".to_owned()
                    }
                    DeathCause::Voted => "was voted out".to_owned(),
                    DeathCause::Shot { by } => format!("was shot by {}", self.name(*by)),
                };
                format!("{} ({seat}) {how}.", self.name(*player))
            }
            GameEvent::LastStandPending { hunter } => {
                format!("{} reaches for the rifle.", self.name(*hunter))
            }
            GameEvent::HunterShot { hunter, target } => {
                format!("{} shoots {}.", self.name(*hunter), self.name(*target))
            }
            GameEvent::LastStandLapsed { hunter } => {
                format!("{} has nobody left to shoot.", self.name(*hunter))
            }
            GameEvent::DayBegan { day, order } => {
                format!("Day {day}. Speaking order: {}.", self.list(order))
            }
            GameEvent::SpeechGiven {
                speaker,
                text,
                accuses,
            } => {
                let mut line = format!("{}: \"{text}\"", self.name(*speaker));
                if let Some(target) = accuses {
                    line.push_str(&format!(" (accuses {})", self.name(*target)));
                }
                line
            }
            GameEvent::RoleDeclared { player, role } => {
                format!("{} claims to be the {role}.", self.name(*player))
            }
            GameEvent::VotingOpened => "Voting opens.".to_owned(),
            GameEvent::VoteCast { voter, target } => {
                format!("{} votes for {}.", self.name(*voter), self.name(*target))
            }
            GameEvent::VoteTallied { outcome } => match outcome {
                VoteOutcome::Eliminated { player, votes } => {
                    format!("{} is eliminated with {votes} votes.", self.name(*player))
                }
                VoteOutcome::Tie { candidates, votes } => {
                    format!("Tie at {votes} votes between {}.", self.list(candidates))
                }
                VoteOutcome::NoVotes => "No votes were cast.".to_owned(),
            },
            GameEvent::DecisionTimedOut { player, decision } => {
                format!("{} ran out of time ({decision:?}).", self.name(*player))
            }
            GameEvent::GameEnded { winner, roles } => {
                let roles = roles
                    .iter()
                    .map(|(player, role)| format!("{}={role}", self.name(*player)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("The {winner} side wins. Roles: {roles}.")
            }
        }
    }
}
