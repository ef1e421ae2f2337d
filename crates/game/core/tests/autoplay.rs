use std::collections::BTreeSet;

use werewolf_core::{
    Awaiting, DecisionPolicy, FirstEligiblePolicy, GameConfig, GamePhase, GameSession,
    HeuristicPolicy, NightAction, NightActionKind, PlayerId, Role, RoleCatalog, RoleChoice,
    SessionSetup, Speech, Team,
};

const MAX_STEPS: usize = 1_000;

/// Answers for the controlled player without any policy.
fn answer_controlled(session: &mut GameSession, awaiting: Awaiting) {
    let view = session.view();
    let first_other = |me: PlayerId| view.alive_others(me).next().map(|player| player.id);
    match awaiting {
        Awaiting::NightAction { player, kinds, .. } => {
            let victim = session
                .roster()
                .alive_players(Some(Team::Village))
                .first()
                .map(|p| p.id());
            let action = match victim {
                Some(victim) if kinds.contains(&NightActionKind::Kill) => NightAction::Kill(victim),
                _ => NightAction::Pass,
            };
            session.submit_night_action(player, action).unwrap();
        }
        Awaiting::Speech { player } => {
            session.submit_speech(player, Speech::silent()).unwrap();
        }
        Awaiting::Vote { player } => {
            let target = first_other(player).unwrap_or(player);
            session.cast_vote(player, target).unwrap();
        }
        Awaiting::LastStand { player } => {
            let target = first_other(player).unwrap();
            session.submit_last_stand(player, target).unwrap();
        }
    }
}

/// Plays to the end and checks roster invariants after every step.
fn play_out(session: &mut GameSession, policy: &dyn DecisionPolicy) {
    let counts: Vec<(Role, usize)> = [
        Role::Werewolf,
        Role::Villager,
        Role::Seer,
        Role::Witch,
        Role::Hunter,
    ]
    .into_iter()
    .map(|role| {
        let count = session
            .roster()
            .players()
            .iter()
            .filter(|p| p.role() == role)
            .count();
        (role, count)
    })
    .collect();
    let mut dead: BTreeSet<PlayerId> = BTreeSet::new();

    for _ in 0..MAX_STEPS {
        if session.is_over() {
            break;
        }
        session.run_automated(policy).unwrap();
        if let Some(awaiting) = session.awaiting() {
            answer_controlled(session, awaiting);
        } else if session.can_advance_day() {
            session.advance_day().unwrap();
        }

        for player in session.roster().players() {
            if dead.contains(&player.id()) {
                assert!(!player.is_alive(), "{} came back to life", player.id());
            }
            if !player.is_alive() {
                dead.insert(player.id());
            }
        }
        for (role, count) in &counts {
            let now = session
                .roster()
                .players()
                .iter()
                .filter(|p| p.role() == *role)
                .count();
            assert_eq!(now, *count);
        }
    }

    assert!(session.is_over(), "game did not finish within {MAX_STEPS} steps");
    assert_eq!(session.phase(), GamePhase::End);
    assert_eq!(
        session.winner(),
        session.roster().check_win_condition(),
        "winner must match the final roster"
    );
}

#[test]
fn first_eligible_games_always_finish() {
    for seed in 0..25 {
        let mut session = GameSession::default();
        session
            .start(SessionSetup::new(9, RoleChoice::Random, seed))
            .unwrap();
        play_out(&mut session, &FirstEligiblePolicy);
    }
}

#[test]
fn heuristic_games_always_finish() {
    for seed in 0..25 {
        for choice in [
            RoleChoice::Random,
            RoleChoice::Pick(Role::Werewolf),
            RoleChoice::Pick(Role::Hunter),
        ] {
            let mut session = GameSession::default();
            session
                .start(SessionSetup::new(9, choice, seed))
                .unwrap();
            play_out(&mut session, &HeuristicPolicy::default());
        }
    }
}

#[test]
fn other_table_sizes_finish() {
    for players in [GameConfig::MIN_PLAYERS, 12, GameConfig::MAX_PLAYERS] {
        let catalog = RoleCatalog::for_player_count(players).unwrap();
        let mut session = GameSession::new(GameConfig::new().with_catalog(catalog));
        session
            .start(SessionSetup::new(players, RoleChoice::Random, players as u64))
            .unwrap();
        play_out(&mut session, &HeuristicPolicy::default());
    }
}

#[test]
fn same_seed_replays_identically() {
    let run = |seed: u64| {
        let mut session = GameSession::default();
        session
            .start(SessionSetup::new(9, RoleChoice::Random, seed))
            .unwrap();
        play_out(&mut session, &HeuristicPolicy::default());
        session.log().entries().to_vec()
    };
    assert_eq!(run(1234), run(1234));
}
