use crate::day::Speech;
use crate::roles::Team;
use crate::state::PlayerId;

use super::{DecisionContext, DecisionPolicy, WitchDecision};

/// Lowest eligible seat for everything; the witch never uses a potion.
///
/// Fully deterministic and always valid, which makes it the fallback for
/// timeouts and rejected picks.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstEligiblePolicy;

impl DecisionPolicy for FirstEligiblePolicy {
    fn name(&self) -> &'static str {
        "first_eligible"
    }

    fn kill_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId> {
        ctx.others_alive()
            .into_iter()
            .find(|player| player.team() != Team::Werewolf)
            .map(|player| player.id())
    }

    fn investigate_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId> {
        ctx.others_alive()
            .into_iter()
            .find(|player| !ctx.was_investigated(player.id()))
            .map(|player| player.id())
    }

    fn witch_decision(&self, _ctx: &DecisionContext<'_>) -> WitchDecision {
        WitchDecision::PASS
    }

    fn speech(&self, _ctx: &DecisionContext<'_>) -> Speech {
        Speech::silent()
    }

    fn vote_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId> {
        ctx.others_alive()
            .first()
            .map(|player| player.id())
            .or(Some(ctx.actor_id()))
    }

    fn last_stand_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId> {
        ctx.others_alive().first().map(|player| player.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::night::WitchPotions;
    use crate::roles::{Role, RoleCatalog};
    use crate::state::{Lineup, PlayerRoster, Seat};

    fn roster() -> PlayerRoster {
        PlayerRoster::assign_roles(&Lineup::numbered(9), &RoleCatalog::standard(), None, 17)
            .unwrap()
    }

    fn context<'a>(roster: &'a PlayerRoster, actor: PlayerId) -> DecisionContext<'a> {
        DecisionContext {
            roster,
            actor: roster.player(actor).unwrap(),
            day: 1,
            seed: 17,
            kill_target: None,
            potions: WitchPotions::full(),
            investigations: Vec::new(),
            accusations: &[],
            tally: None,
        }
    }

    #[test]
    fn wolves_kill_lowest_village_seat() {
        let roster = roster();
        let wolf = roster.alive_with_role(Role::Werewolf)[0].id();
        let target = FirstEligiblePolicy
            .kill_target(&context(&roster, wolf))
            .unwrap();

        let lowest_village = roster
            .alive_players(Some(Team::Village))
            .first()
            .unwrap()
            .id();
        assert_eq!(target, lowest_village);
    }

    #[test]
    fn votes_never_self_while_others_live() {
        let roster = roster();
        let first_seat = roster.player_at(Seat(1)).unwrap().id();
        let second_seat = roster.player_at(Seat(2)).unwrap().id();

        assert_eq!(
            FirstEligiblePolicy.vote_target(&context(&roster, first_seat)),
            Some(second_seat)
        );
        assert_eq!(
            FirstEligiblePolicy.vote_target(&context(&roster, second_seat)),
            Some(first_seat)
        );
    }

    #[test]
    fn witch_keeps_potions() {
        let roster = roster();
        let witch = roster.alive_with_role(Role::Witch)[0].id();
        assert_eq!(
            FirstEligiblePolicy.witch_decision(&context(&roster, witch)),
            WitchDecision::PASS
        );
    }
}
