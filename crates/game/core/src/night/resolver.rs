use std::collections::BTreeSet;

use crate::roles::{Role, Team};
use crate::state::{PlayerId, PlayerRoster, Seat};

use super::{
    Death, DeathCause, Investigation, NightAction, NightActionKind, NightActionSet,
    SubmissionError, WitchPotions,
};

/// Per-night lifecycle: CollectingActions → Resolving → Resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NightStage {
    #[default]
    CollectingActions,
    Resolving,
    Resolved,
}

/// Everything a resolved night produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NightOutcome {
    /// Kill first, then poison.
    pub deaths: Vec<Death>,
    /// Kill target rescued by the heal potion.
    pub saved: Option<PlayerId>,
    pub investigation: Option<Investigation>,
    /// Eliminated hunters owed a last-stand shot, in death order.
    pub last_stands: Vec<PlayerId>,
}

impl NightOutcome {
    pub fn is_peaceful(&self) -> bool {
        self.deaths.is_empty()
    }

    /// Highest seat among this night's deaths.
    pub fn highest_seat(&self) -> Option<Seat> {
        self.deaths.iter().map(|death| death.seat).max()
    }
}

/// Collects one action per eligible role and resolves them together.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NightResolver {
    night: u32,
    stage: NightStage,
    actions: NightActionSet,
    acted: BTreeSet<Role>,
}

impl NightResolver {
    pub fn new(night: u32) -> Self {
        Self {
            night,
            stage: NightStage::CollectingActions,
            actions: NightActionSet::default(),
            acted: BTreeSet::new(),
        }
    }

    pub fn night(&self) -> u32 {
        self.night
    }

    pub fn stage(&self) -> NightStage {
        self.stage
    }

    pub fn actions(&self) -> &NightActionSet {
        &self.actions
    }

    /// The pack's victim so far; shown to the witch before they decide.
    pub fn kill_target(&self) -> Option<PlayerId> {
        self.actions.kill
    }

    pub fn has_acted(&self, role: Role) -> bool {
        self.acted.contains(&role)
    }

    /// Validates and records a submission.
    ///
    /// The first werewolf kill closes the pack's turn; later wolf submissions
    /// are rejected. A potion is spent as soon as its submission is accepted.
    pub fn submit(
        &mut self,
        roster: &PlayerRoster,
        potions: &mut WitchPotions,
        actor: PlayerId,
        action: NightAction,
    ) -> Result<(), SubmissionError> {
        if self.stage != NightStage::CollectingActions {
            return Err(SubmissionError::NotCollecting);
        }

        let player = roster
            .player(actor)
            .ok_or(SubmissionError::UnknownPlayer(actor))?;
        if !player.is_alive() {
            return Err(SubmissionError::ActorDead(actor));
        }
        let role = player.role();

        let Some(kind) = action.kind() else {
            if !role.acts_at_night() {
                return Err(SubmissionError::NoNightAbility { actor, role });
            }
            if !self.acted.insert(role) {
                return Err(SubmissionError::AlreadyActed { role });
            }
            return Ok(());
        };

        if kind.required_role() != role {
            return Err(SubmissionError::WrongRole {
                actor,
                role,
                action: kind,
            });
        }
        if self.acted.contains(&role) {
            return Err(SubmissionError::AlreadyActed { role });
        }

        // Every ability-bearing action carries a target.
        let target = action.target().ok_or(SubmissionError::NotCollecting)?;
        let target_player = roster
            .player(target)
            .ok_or(SubmissionError::UnknownPlayer(target))?;
        if !target_player.is_alive() {
            return Err(SubmissionError::TargetDead(target));
        }
        if target == actor && !kind.allows_self_target() {
            return Err(SubmissionError::SelfTarget { action: kind });
        }

        match kind {
            NightActionKind::Kill => {
                self.actions.kill = Some(target);
                self.acted.insert(Role::Werewolf);
            }
            NightActionKind::Investigate => {
                self.actions.investigate = Some(target);
                self.actions.investigator = Some(actor);
                self.acted.insert(Role::Seer);
            }
            NightActionKind::Heal => {
                if !potions.heal || self.actions.heal.is_some() {
                    return Err(SubmissionError::PotionSpent { action: kind });
                }
                potions.heal = false;
                self.actions.heal = Some(target);
            }
            NightActionKind::Poison => {
                if !potions.poison || self.actions.poison.is_some() {
                    return Err(SubmissionError::PotionSpent { action: kind });
                }
                potions.poison = false;
                self.actions.poison = Some(target);
            }
        }

        if role == Role::Witch && potions.is_empty() {
            self.acted.insert(Role::Witch);
        }

        tracing::debug!(night = self.night, %actor, ?action, "night action recorded");
        Ok(())
    }

    /// Roles with a living holder that still owe a decision, in night order.
    pub fn pending_roles(&self, roster: &PlayerRoster, potions: &WitchPotions) -> Vec<Role> {
        Role::NIGHT_ORDER
            .into_iter()
            .filter(|role| !self.acted.contains(role))
            .filter(|role| !roster.alive_with_role(*role).is_empty())
            .filter(|role| *role != Role::Witch || !potions.is_empty())
            .collect()
    }

    pub fn is_complete(&self, roster: &PlayerRoster, potions: &WitchPotions) -> bool {
        self.pending_roles(roster, potions).is_empty()
    }

    /// Applies the collected actions.
    ///
    /// 1. A heal on the kill target negates the kill.
    /// 2. Poison always lands on a living target.
    /// 3. The investigation yields a private werewolf/not-werewolf answer.
    /// 4. Every eliminated hunter is queued for a last stand.
    pub fn resolve(&mut self, roster: &mut PlayerRoster) -> Result<NightOutcome, SubmissionError> {
        if self.stage != NightStage::CollectingActions {
            return Err(SubmissionError::NotCollecting);
        }
        self.stage = NightStage::Resolving;

        let mut outcome = NightOutcome::default();

        if let Some(victim) = self.actions.kill {
            if self.actions.heal == Some(victim) {
                outcome.saved = Some(victim);
            } else {
                record_death(roster, victim, DeathCause::Killed, &mut outcome.deaths);
            }
        }

        if let Some(target) = self.actions.poison {
            record_death(roster, target, DeathCause::Poisoned, &mut outcome.deaths);
        }

        if let (Some(target), Some(seer)) = (self.actions.investigate, self.actions.investigator) {
            if let Some(player) = roster.player(target) {
                outcome.investigation = Some(Investigation {
                    night: self.night,
                    seer,
                    target,
                    is_werewolf: player.team() == Team::Werewolf,
                });
            }
        }

        outcome.last_stands = outcome
            .deaths
            .iter()
            .filter(|death| death.role == Role::Hunter)
            .map(|death| death.player)
            .collect();

        self.stage = NightStage::Resolved;
        tracing::info!(
            night = self.night,
            deaths = outcome.deaths.len(),
            saved = outcome.saved.is_some(),
            "night resolved"
        );
        Ok(outcome)
    }
}

fn record_death(
    roster: &mut PlayerRoster,
    player: PlayerId,
    cause: DeathCause,
    deaths: &mut Vec<Death>,
) {
    if !roster.eliminate(player) {
        return;
    }
    if let Some(dead) = roster.player(player) {
        deaths.push(Death {
            player,
            seat: dead.seat(),
            role: dead.role(),
            cause,
        });
    }
}
