use std::collections::BTreeMap;

use crate::state::PlayerId;

/// Result of a tallied vote.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VoteOutcome {
    /// Unique maximum.
    Eliminated { player: PlayerId, votes: usize },
    /// Several candidates share the maximum; nobody leaves.
    Tie { candidates: Vec<PlayerId>, votes: usize },
    /// Nobody was alive to vote.
    NoVotes,
}

/// Candidate → voters in casting order. Reset every day.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoteTally {
    votes: BTreeMap<PlayerId, Vec<PlayerId>>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, voter: PlayerId, target: PlayerId) {
        self.votes.entry(target).or_default().push(voter);
    }

    pub fn voters_for(&self, candidate: PlayerId) -> &[PlayerId] {
        self.votes.get(&candidate).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.votes.values().map(Vec::len).sum()
    }

    pub fn has_voted(&self, voter: PlayerId) -> bool {
        self.votes.values().any(|voters| voters.contains(&voter))
    }

    /// Candidates by vote count, descending; equal counts by id.
    pub fn ranking(&self) -> Vec<(PlayerId, usize)> {
        let mut ranked: Vec<(PlayerId, usize)> = self
            .votes
            .iter()
            .map(|(candidate, voters)| (*candidate, voters.len()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }

    pub fn outcome(&self) -> VoteOutcome {
        let ranked = self.ranking();
        let Some(&(leader, top)) = ranked.first() else {
            return VoteOutcome::NoVotes;
        };

        let candidates: Vec<PlayerId> = ranked
            .iter()
            .take_while(|(_, votes)| *votes == top)
            .map(|(candidate, _)| *candidate)
            .collect();

        if candidates.len() == 1 {
            VoteOutcome::Eliminated {
                player: leader,
                votes: top,
            }
        } else {
            VoteOutcome::Tie {
                candidates,
                votes: top,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> PlayerId {
        PlayerId(n)
    }

    #[test]
    fn unique_maximum_is_eliminated() {
        let mut tally = VoteTally::new();
        for voter in [1, 2, 3] {
            tally.record(id(voter), id(5));
        }
        tally.record(id(4), id(6));
        tally.record(id(5), id(6));
        assert_eq!(
            tally.outcome(),
            VoteOutcome::Eliminated {
                player: id(5),
                votes: 3
            }
        );
    }

    #[test]
    fn shared_maximum_is_a_tie() {
        let mut tally = VoteTally::new();
        for voter in [1, 2, 3] {
            tally.record(id(voter), id(5));
        }
        for voter in [4, 6, 7] {
            tally.record(id(voter), id(6));
        }
        tally.record(id(8), id(1));
        tally.record(id(9), id(2));
        assert_eq!(
            tally.outcome(),
            VoteOutcome::Tie {
                candidates: vec![id(5), id(6)],
                votes: 3
            }
        );
        assert_eq!(tally.voters_for(id(6)), &[id(4), id(6), id(7)]);
    }

    #[test]
    fn empty_tally_has_no_votes() {
        assert_eq!(VoteTally::new().outcome(), VoteOutcome::NoVotes);
    }
}
