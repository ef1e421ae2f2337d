use crate::roles::Role;
use crate::state::{PlayerId, PlayerRoster, Seat};

use super::{DayError, Speech, VoteOutcome, VoteTally, speech_order};

/// Speaking(index) → AllSpoken → Voting → Tallied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayStage {
    Speaking { index: usize },
    AllSpoken,
    Voting,
    Tallied,
}

/// Speech ordering, declarations and the vote for one day.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayCycle {
    day: u32,
    order: Vec<PlayerId>,
    stage: DayStage,
    tally: VoteTally,
}

impl DayCycle {
    pub fn new(day: u32, roster: &PlayerRoster, anchor: Option<Seat>) -> Self {
        let order = speech_order(roster, anchor);
        let stage = if order.is_empty() {
            DayStage::AllSpoken
        } else {
            DayStage::Speaking { index: 0 }
        };
        Self {
            day,
            order,
            stage,
            tally: VoteTally::new(),
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn stage(&self) -> DayStage {
        self.stage
    }

    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    pub fn tally(&self) -> &VoteTally {
        &self.tally
    }

    pub fn current_speaker(&self) -> Option<PlayerId> {
        match self.stage {
            DayStage::Speaking { index } => self.order.get(index).copied(),
            _ => None,
        }
    }

    fn expect_speaker(&self, roster: &PlayerRoster, player: PlayerId) -> Result<(), DayError> {
        let expected = self.current_speaker().ok_or(DayError::NotSpeaking)?;
        let speaker = roster
            .player(player)
            .ok_or(DayError::UnknownPlayer(player))?;
        if expected != player {
            return Err(DayError::NotYourTurn {
                expected,
                actual: player,
            });
        }
        if !speaker.is_alive() {
            return Err(DayError::PlayerDead(player));
        }
        Ok(())
    }

    /// Records a role claim for the current speaker. One claim per day.
    pub fn declare(
        &mut self,
        roster: &mut PlayerRoster,
        player: PlayerId,
        role: Role,
    ) -> Result<(), DayError> {
        self.expect_speaker(roster, player)?;
        let speaker = roster
            .player_mut(player)
            .ok_or(DayError::UnknownPlayer(player))?;
        if !speaker.declare(role, self.day) {
            return Err(DayError::AlreadyDeclared(player));
        }
        Ok(())
    }

    /// Takes the current speaker's turn and moves to the next living speaker.
    pub fn submit_speech(
        &mut self,
        roster: &mut PlayerRoster,
        player: PlayerId,
        speech: &Speech,
    ) -> Result<(), DayError> {
        self.expect_speaker(roster, player)?;
        let speaker = roster
            .player_mut(player)
            .ok_or(DayError::UnknownPlayer(player))?;
        if speech.declaration.is_some() && speaker.has_declared_on(self.day) {
            return Err(DayError::AlreadyDeclared(player));
        }
        if let Some(role) = speech.declaration {
            speaker.declare(role, self.day);
        }
        speaker.has_spoken = true;

        self.advance_speaker(roster);
        Ok(())
    }

    fn advance_speaker(&mut self, roster: &PlayerRoster) {
        let DayStage::Speaking { index } = self.stage else {
            return;
        };
        let next = (index + 1..self.order.len()).find(|i| roster.is_alive(self.order[*i]));
        self.stage = match next {
            Some(index) => DayStage::Speaking { index },
            None => DayStage::AllSpoken,
        };
    }

    pub fn open_voting(&mut self) -> Result<(), DayError> {
        if self.stage != DayStage::AllSpoken {
            return Err(DayError::NotSpeaking);
        }
        self.stage = DayStage::Voting;
        Ok(())
    }

    /// Every living player votes once for a living player, themselves included.
    pub fn cast_vote(
        &mut self,
        roster: &mut PlayerRoster,
        voter: PlayerId,
        target: PlayerId,
    ) -> Result<(), DayError> {
        if self.stage != DayStage::Voting {
            return Err(DayError::NotVoting);
        }
        let voter_state = roster.player(voter).ok_or(DayError::UnknownPlayer(voter))?;
        if !voter_state.is_alive() {
            return Err(DayError::PlayerDead(voter));
        }
        if voter_state.has_voted {
            return Err(DayError::AlreadyVoted(voter));
        }
        let target_state = roster
            .player(target)
            .ok_or(DayError::UnknownPlayer(target))?;
        if !target_state.is_alive() {
            return Err(DayError::TargetDead(target));
        }

        self.tally.record(voter, target);
        if let Some(player) = roster.player_mut(voter) {
            player.has_voted = true;
        }
        Ok(())
    }

    /// Living players yet to vote, by seat.
    pub fn pending_voters(&self, roster: &PlayerRoster) -> Vec<PlayerId> {
        if self.stage != DayStage::Voting {
            return Vec::new();
        }
        roster
            .alive_players(None)
            .into_iter()
            .filter(|player| !player.has_voted)
            .map(|player| player.id())
            .collect()
    }

    pub fn tally_votes(&mut self, roster: &PlayerRoster) -> Result<VoteOutcome, DayError> {
        if self.stage != DayStage::Voting {
            return Err(DayError::NotVoting);
        }
        if !self.pending_voters(roster).is_empty() {
            return Err(DayError::VotesOutstanding);
        }
        self.stage = DayStage::Tallied;
        Ok(self.tally.outcome())
    }
}
