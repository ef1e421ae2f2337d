//! Priority-scoring policy.
//!
//! Each decision scores every eligible target and picks the highest score;
//! ties go to the lower seat. Scores only use information the actor is
//! entitled to: public claims and accusations, the pack's mutual knowledge,
//! the seer's own results and the victim shown to the witch.
//!
//! A small amount of per-target noise, derived from the session seed, keeps
//! identical tables from always producing identical games across seeds
//! while replaying exactly for the same seed.

use crate::day::Speech;
use crate::rng::{PcgRng, RngOracle, compute_seed};
use crate::roles::{Role, Team};
use crate::state::{Player, PlayerId};

use super::{DecisionContext, DecisionPolicy, WitchDecision};

const KILL_CONTEXT: u32 = 1;
const INVESTIGATE_CONTEXT: u32 = 2;
const POISON_CONTEXT: u32 = 3;
const VOTE_CONTEXT: u32 = 4;
const SHOT_CONTEXT: u32 = 5;
const SPEECH_CONTEXT: u32 = 6;

/// Score at or above which the witch spends the heal.
const HEAL_THRESHOLD: i32 = 60;
/// Score at or above which the witch spends the poison.
const POISON_THRESHOLD: i32 = 50;
/// Suspicion at or above which a villager accuses in speech.
const ACCUSE_THRESHOLD: i32 = 40;

#[derive(Clone, Copy, Debug)]
pub struct HeuristicPolicy {
    /// Upper bound of the random bonus added to every score.
    pub noise: u32,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self { noise: 10 }
    }
}

impl HeuristicPolicy {
    pub fn without_noise() -> Self {
        Self { noise: 0 }
    }

    fn jitter(&self, ctx: &DecisionContext<'_>, target: PlayerId, context: u32) -> i32 {
        if self.noise == 0 {
            return 0;
        }
        let seed = compute_seed(
            ctx.seed,
            u64::from(ctx.day),
            ctx.actor_id().0,
            context.wrapping_mul(1_000).wrapping_add(target.0),
        );
        PcgRng.range(seed, 0, self.noise) as i32
    }

    /// Highest score wins; equal scores keep the lower seat.
    fn pick<'a>(
        &self,
        ctx: &DecisionContext<'_>,
        candidates: impl IntoIterator<Item = &'a Player>,
        context: u32,
        score: impl Fn(&Player) -> i32,
    ) -> Option<(PlayerId, i32)> {
        let mut best: Option<(PlayerId, i32)> = None;
        for candidate in candidates {
            let value = score(candidate) + self.jitter(ctx, candidate.id(), context);
            tracing::debug!(
                actor = %ctx.actor_id(),
                candidate = %candidate.id(),
                value,
                context,
                "heuristic score"
            );
            if best.is_none_or(|(_, current)| value > current) {
                best = Some((candidate.id(), value));
            }
        }
        best
    }

    /// Public-information suspicion of `target` from the actor's viewpoint.
    fn suspicion(&self, ctx: &DecisionContext<'_>, target: &Player) -> i32 {
        match ctx.known_team(target.id()) {
            Some(Team::Werewolf) if ctx.actor.team() == Team::Village => return 100,
            Some(Team::Village) if ctx.actor.team() == Team::Village => return -100,
            _ => {}
        }

        let mut score = 0;
        score += 25 * ctx.accusations_against(target.id()) as i32;
        score += 40
            * ctx
                .claimed_wolf_reports()
                .iter()
                .filter(|id| **id == target.id())
                .count() as i32;

        if let Some(claim) = target.declared_role() {
            let rivals = ctx.claimants(claim).len();
            if claim.is_power_role() && rivals > 1 {
                score += 30;
            } else if claim == Role::Seer {
                score -= 20;
            }
        }
        score
    }

    fn pressure(ctx: &DecisionContext<'_>) -> bool {
        let wolves = ctx.roster.alive_count(Team::Werewolf);
        let village = ctx.roster.alive_count(Team::Village);
        village <= wolves + 1
    }

    fn front_seat(player: &Player) -> bool {
        player.seat().0 <= 3
    }
}

impl DecisionPolicy for HeuristicPolicy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn kill_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId> {
        let village: Vec<&Player> = ctx
            .others_alive()
            .into_iter()
            .filter(|player| player.team() != Team::Werewolf)
            .collect();
        let pressure = Self::pressure(ctx);
        let reported: Vec<PlayerId> = ctx.claimed_wolf_reports();

        self.pick(ctx, village, KILL_CONTEXT, |player| {
            let mut score = match player.declared_role() {
                Some(Role::Seer) => 100,
                Some(Role::Witch) => 90,
                Some(Role::Hunter) if pressure => 60,
                Some(Role::Hunter) => -30,
                _ => 20,
            };
            // Players already under suspicion will likely be voted out.
            if reported.contains(&player.id()) {
                score -= 20;
            }
            if Self::front_seat(player) {
                score += 10;
            }
            if ctx.day >= 3 && player.declared_role().is_some() {
                score += 15;
            }
            score
        })
        .map(|(id, _)| id)
    }

    fn investigate_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId> {
        let candidates: Vec<&Player> = ctx
            .others_alive()
            .into_iter()
            .filter(|player| !ctx.was_investigated(player.id()))
            .collect();

        self.pick(ctx, candidates, INVESTIGATE_CONTEXT, |player| {
            let mut score = self.suspicion(ctx, player);
            let seat = player.seat().0;
            if seat <= 3 {
                score += 30;
            } else if seat >= 7 {
                score += 20;
            }
            if ctx.day == 1 && (4..=6).contains(&seat) {
                score += 25;
            }
            if ctx.day >= 3 {
                score += 15;
            }
            score
        })
        .map(|(id, _)| id)
    }

    fn witch_decision(&self, ctx: &DecisionContext<'_>) -> WitchDecision {
        let victim = ctx
            .kill_target
            .and_then(|target| ctx.roster.player(target));

        if ctx.potions.heal
            && let Some(victim) = victim
        {
            let mut score = match victim.declared_role() {
                Some(Role::Seer) => 90,
                Some(Role::Hunter) => 70,
                _ => 30,
            };
            if victim.id() == ctx.actor_id() {
                score += 100;
            }
            if ctx.day == 1 {
                score += 20;
            } else if ctx.day >= 3 && Self::pressure(ctx) {
                score += 40;
            }
            if Self::front_seat(victim) {
                score += 15;
            }
            tracing::debug!(witch = %ctx.actor_id(), victim = %victim.id(), score, "heal score");
            if score >= HEAL_THRESHOLD {
                // A saved night keeps the poison for later.
                return WitchDecision {
                    heal: true,
                    poison: None,
                };
            }
        }

        if !ctx.potions.poison {
            return WitchDecision::PASS;
        }
        let candidates: Vec<&Player> = ctx
            .others_alive()
            .into_iter()
            .filter(|player| Some(player.id()) != ctx.kill_target)
            .collect();
        let poison = self
            .pick(ctx, candidates, POISON_CONTEXT, |player| {
                let mut score = self.suspicion(ctx, player);
                if ctx.day == 1 {
                    score -= 30;
                } else if ctx.day >= 3 {
                    score += 20;
                }
                if let Some(claim @ (Role::Seer | Role::Hunter)) = player.declared_role()
                    && ctx.claimants(claim).len() == 1
                {
                    score -= 50;
                }
                score
            })
            .filter(|(_, score)| *score >= POISON_THRESHOLD)
            .map(|(id, _)| id);

        WitchDecision { heal: false, poison }
    }

    fn speech(&self, ctx: &DecisionContext<'_>) -> Speech {
        let actor = ctx.actor;
        match actor.role() {
            Role::Seer => {
                let found = ctx
                    .investigations
                    .iter()
                    .rev()
                    .find(|investigation| {
                        investigation.is_werewolf && ctx.roster.is_alive(investigation.target)
                    });
                match found {
                    Some(investigation) => {
                        let target = investigation.target;
                        Speech::new(format!("I checked {target} and they are a werewolf."))
                            .declaring(Role::Seer)
                            .accusing(target)
                    }
                    None if ctx.day >= 2 && !ctx.investigations.is_empty() => {
                        Speech::new("My checks so far came back clean.").declaring(Role::Seer)
                    }
                    None => Speech::new("Nothing to report yet."),
                }
            }
            Role::Werewolf => {
                // Counter-claim a lone seer claimant now and then.
                let seers = ctx.claimants(Role::Seer);
                let counter = seers
                    .iter()
                    .find(|player| player.team() == Team::Village)
                    .filter(|_| {
                        seers.len() == 1
                            && self.noise > 0
                            && self.jitter(ctx, actor.id(), SPEECH_CONTEXT) * 2 >= self.noise as i32
                    });
                if let Some(fake) = counter {
                    return Speech::new(format!("I am the real seer and {} is lying.", fake.id()))
                        .declaring(Role::Seer)
                        .accusing(fake.id());
                }

                let mates = ctx.teammates();
                let scapegoat = self.pick(
                    ctx,
                    ctx.others_alive()
                        .into_iter()
                        .filter(|player| !mates.iter().any(|mate| mate.id() == player.id())),
                    SPEECH_CONTEXT,
                    |player| 25 * ctx.accusations_against(player.id()) as i32,
                );
                match scapegoat {
                    Some((target, _)) => {
                        Speech::new(format!("{target} has been acting strangely.")).accusing(target)
                    }
                    None => Speech::silent(),
                }
            }
            _ => {
                let suspect = self.pick(ctx, ctx.others_alive(), SPEECH_CONTEXT, |player| {
                    self.suspicion(ctx, player)
                });
                match suspect {
                    Some((target, score)) if score >= ACCUSE_THRESHOLD => {
                        Speech::new(format!("I do not trust {target}.")).accusing(target)
                    }
                    _ => Speech::new("I have nothing solid yet."),
                }
            }
        }
    }

    fn vote_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId> {
        if ctx.actor.team() == Team::Werewolf {
            let mates = ctx.teammates();
            return self
                .pick(
                    ctx,
                    ctx.others_alive()
                        .into_iter()
                        .filter(|player| !mates.iter().any(|mate| mate.id() == player.id())),
                    VOTE_CONTEXT,
                    |player| {
                        let mut score = 20 * ctx.votes_for(player.id()) as i32;
                        score += 25 * ctx.accusations_against(player.id()) as i32;
                        if player.declared_role() == Some(Role::Seer) {
                            score += 40;
                        }
                        score
                    },
                )
                .map(|(id, _)| id);
        }

        self.pick(ctx, ctx.others_alive(), VOTE_CONTEXT, |player| {
            self.suspicion(ctx, player) + 10 * ctx.votes_for(player.id()) as i32
        })
        .map(|(id, _)| id)
    }

    fn last_stand_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId> {
        let pressure = Self::pressure(ctx);
        self.pick(ctx, ctx.others_alive(), SHOT_CONTEXT, |player| {
            let mut score = self.suspicion(ctx, player);
            match player.declared_role() {
                Some(Role::Seer) if ctx.claimants(Role::Seer).len() == 1 => score -= 80,
                Some(Role::Witch) if ctx.claimants(Role::Witch).len() == 1 => score -= 60,
                _ => {}
            }
            if pressure {
                score += 30;
            }
            if Self::front_seat(player) {
                score += 15;
            }
            score
        })
        .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day::Accusation;
    use crate::night::{Investigation, WitchPotions};
    use crate::roles::RoleCatalog;
    use crate::state::{Lineup, PlayerRoster};

    fn roster() -> PlayerRoster {
        PlayerRoster::assign_roles(&Lineup::numbered(9), &RoleCatalog::standard(), None, 5)
            .unwrap()
    }

    fn first(roster: &PlayerRoster, role: Role) -> PlayerId {
        roster.alive_with_role(role)[0].id()
    }

    fn context<'a>(
        roster: &'a PlayerRoster,
        actor: PlayerId,
        accusations: &'a [Accusation],
    ) -> DecisionContext<'a> {
        DecisionContext {
            roster,
            actor: roster.player(actor).unwrap(),
            day: 2,
            seed: 5,
            kill_target: None,
            potions: WitchPotions::full(),
            investigations: Vec::new(),
            accusations,
            tally: None,
        }
    }

    #[test]
    fn wolves_never_target_the_pack() {
        let roster = roster();
        let policy = HeuristicPolicy::default();
        for wolf in roster.alive_with_role(Role::Werewolf) {
            let target = policy
                .kill_target(&context(&roster, wolf.id(), &[]))
                .unwrap();
            assert_eq!(roster.player(target).unwrap().team(), Team::Village);

            let vote = policy
                .vote_target(&context(&roster, wolf.id(), &[]))
                .unwrap();
            assert_eq!(roster.player(vote).unwrap().team(), Team::Village);
        }
    }

    #[test]
    fn seer_votes_and_accuses_a_found_wolf() {
        let roster = roster();
        let policy = HeuristicPolicy::default();
        let seer = first(&roster, Role::Seer);
        let wolf = first(&roster, Role::Werewolf);

        let mut ctx = context(&roster, seer, &[]);
        ctx.investigations.push(Investigation {
            night: 1,
            seer,
            target: wolf,
            is_werewolf: true,
        });

        assert_eq!(policy.vote_target(&ctx), Some(wolf));
        let speech = policy.speech(&ctx);
        assert_eq!(speech.declaration, Some(Role::Seer));
        assert_eq!(speech.accuses, Some(wolf));
    }

    #[test]
    fn seer_skips_already_checked_players() {
        let roster = roster();
        let policy = HeuristicPolicy::without_noise();
        let seer = first(&roster, Role::Seer);
        let mut ctx = context(&roster, seer, &[]);
        let others: Vec<PlayerId> = ctx.others_alive().iter().map(|p| p.id()).collect();

        for target in &others[..others.len() - 1] {
            ctx.investigations.push(Investigation {
                night: 1,
                seer,
                target: *target,
                is_werewolf: false,
            });
        }
        assert_eq!(policy.investigate_target(&ctx), others.last().copied());
    }

    #[test]
    fn witch_saves_herself() {
        let roster = roster();
        let policy = HeuristicPolicy::without_noise();
        let witch = first(&roster, Role::Witch);
        let mut ctx = context(&roster, witch, &[]);
        ctx.kill_target = Some(witch);

        let decision = policy.witch_decision(&ctx);
        assert!(decision.heal);
        assert_eq!(decision.poison, None);
    }

    #[test]
    fn witch_holds_poison_without_evidence() {
        let roster = roster();
        let policy = HeuristicPolicy::without_noise();
        let witch = first(&roster, Role::Witch);
        let mut ctx = context(&roster, witch, &[]);
        ctx.potions.heal = false;
        ctx.day = 1;

        assert_eq!(policy.witch_decision(&ctx), WitchDecision::PASS);
    }

    #[test]
    fn same_seed_same_choice() {
        let roster = roster();
        let policy = HeuristicPolicy::default();
        let hunter = first(&roster, Role::Hunter);
        let a = policy.last_stand_target(&context(&roster, hunter, &[]));
        let b = policy.last_stand_target(&context(&roster, hunter, &[]));
        assert_eq!(a, b);
        assert_ne!(a, Some(hunter));
    }
}
