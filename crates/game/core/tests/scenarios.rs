use werewolf_core::{
    Awaiting, DecisionContext, DecisionKind, DecisionPolicy, DeathCause, FirstEligiblePolicy,
    GameConfig, GameEvent, GamePhase, GameSession, LogEntry, NightAction, PlayerId, Role,
    RoleChoice, Seat, SessionError, SessionSetup, Speech, Team, Visibility, VoteOutcome,
    WitchDecision, Winner,
};

fn session(seed: u64) -> GameSession {
    let mut session = GameSession::default();
    session
        .start(SessionSetup::new(9, RoleChoice::Pick(Role::Villager), seed))
        .unwrap();
    session
}

fn holders(session: &GameSession, role: Role) -> Vec<PlayerId> {
    session
        .roster()
        .alive_with_role(role)
        .iter()
        .map(|player| player.id())
        .collect()
}

fn holder(session: &GameSession, role: Role) -> PlayerId {
    holders(session, role)[0]
}

fn seat_of(session: &GameSession, player: PlayerId) -> Seat {
    session.roster().player(player).unwrap().seat()
}

/// Seer and witch pass for the rest of the night.
fn quiet_night_finish(session: &mut GameSession) {
    if let Some(seer) = holders(session, Role::Seer).first()
        && session.phase() == GamePhase::Night
    {
        session.submit_night_action(*seer, NightAction::Pass).unwrap();
    }
    if let Some(witch) = holders(session, Role::Witch).first()
        && session.phase() == GamePhase::Night
        && !session.potions().is_empty()
    {
        session.submit_night_action(*witch, NightAction::Pass).unwrap();
    }
}

fn peaceful_night(session: &mut GameSession) {
    let wolf = holder(session, Role::Werewolf);
    session.submit_night_action(wolf, NightAction::Pass).unwrap();
    quiet_night_finish(session);
}

fn speak_all(session: &mut GameSession) {
    while session.phase() == GamePhase::DaySpeech {
        let speaker = session.day_cycle().unwrap().current_speaker().unwrap();
        session.submit_speech(speaker, Speech::silent()).unwrap();
    }
}

/// Every living player votes for `target`; returns the entries of the last vote.
fn unanimous_vote(session: &mut GameSession, target: PlayerId) -> Vec<LogEntry> {
    let voters: Vec<PlayerId> = session
        .roster()
        .alive_players(None)
        .iter()
        .map(|player| player.id())
        .collect();
    let mut last = Vec::new();
    for voter in voters {
        last = session.cast_vote(voter, target).unwrap();
    }
    last
}

#[test]
fn heal_on_the_victim_means_no_death() {
    let mut session = session(11);
    let victim = holders(&session, Role::Villager)[0];
    let wolf = holder(&session, Role::Werewolf);
    let witch = holder(&session, Role::Witch);
    let seer = holder(&session, Role::Seer);

    session
        .submit_night_action(wolf, NightAction::Kill(victim))
        .unwrap();
    session
        .submit_night_action(seer, NightAction::Pass)
        .unwrap();
    session
        .submit_night_action(witch, NightAction::Heal(victim))
        .unwrap();
    let entries = session
        .submit_night_action(witch, NightAction::Pass)
        .unwrap();

    assert!(session.roster().is_alive(victim));
    assert!(
        entries
            .iter()
            .any(|entry| entry.event == GameEvent::PeacefulNight)
    );
    assert_eq!(session.roster().check_win_condition(), None);
    assert_eq!(session.phase(), GamePhase::DaySpeech);
}

#[test]
fn kill_and_poison_both_land_and_the_hunter_shoots_before_day() {
    let mut session = session(23);
    let wolf = holder(&session, Role::Werewolf);
    let witch = holder(&session, Role::Witch);
    let seer = holder(&session, Role::Seer);
    let hunter = holder(&session, Role::Hunter);
    let victim = holders(&session, Role::Villager)[0];

    session
        .submit_night_action(wolf, NightAction::Kill(victim))
        .unwrap();
    session
        .submit_night_action(seer, NightAction::Pass)
        .unwrap();
    session
        .submit_night_action(witch, NightAction::Poison(hunter))
        .unwrap();
    session
        .submit_night_action(witch, NightAction::Pass)
        .unwrap();

    assert!(!session.roster().is_alive(victim));
    assert!(!session.roster().is_alive(hunter));
    assert_eq!(session.phase(), GamePhase::Night);
    assert_eq!(session.last_stands().collect::<Vec<_>>(), vec![hunter]);
    assert_eq!(
        session.submit_night_action(seer, NightAction::Pass),
        Err(SessionError::AwaitingLastStand(hunter))
    );

    let shot = holders(&session, Role::Werewolf)[1];
    assert_eq!(
        session.submit_last_stand(hunter, victim),
        Err(SessionError::InvalidShot(victim))
    );
    let entries = session.submit_last_stand(hunter, shot).unwrap();
    assert!(!session.roster().is_alive(shot));
    assert!(entries.iter().any(|entry| matches!(
        entry.event,
        GameEvent::PlayerDied {
            cause: DeathCause::Shot { by },
            ..
        } if by == hunter
    )));
    assert_eq!(session.phase(), GamePhase::DaySpeech);

    // Speech restarts after the highest seat lost during the night itself;
    // the shot victim does not move the anchor.
    let anchor = seat_of(&session, victim).max(seat_of(&session, hunter));
    let order = session.day_cycle().unwrap().order().to_vec();
    let first_seat = seat_of(&session, order[0]);
    let alive_after: Vec<Seat> = session
        .roster()
        .alive_players(None)
        .iter()
        .map(|player| player.seat())
        .filter(|seat| *seat > anchor)
        .collect();
    match alive_after.first() {
        Some(expected) => assert_eq!(first_seat, *expected),
        None => assert_eq!(first_seat, session.roster().alive_players(None)[0].seat()),
    }
    assert_eq!(order.len(), session.roster().alive_players(None).len());
}

#[test]
fn tied_vote_eliminates_nobody_and_the_night_follows() {
    let mut session = session(37);
    peaceful_night(&mut session);
    speak_all(&mut session);
    assert_eq!(session.phase(), GamePhase::DayVoting);

    let at = |session: &GameSession, seat: u32| session.roster().player_at(Seat(seat)).unwrap().id();
    let voters: Vec<PlayerId> = (1..=9).map(|seat| at(&session, seat)).collect();
    let targets = [5, 5, 5, 6, 6, 6, 1, 2, 3];
    let mut tally = Vec::new();
    for (voter, target) in voters.iter().zip(targets) {
        tally = session.cast_vote(*voter, at(&session, target)).unwrap();
    }

    assert!(tally.iter().any(|entry| matches!(
        &entry.event,
        GameEvent::VoteTallied {
            outcome: VoteOutcome::Tie { votes: 3, .. }
        }
    )));
    assert_eq!(session.roster().alive_players(None).len(), 9);
    assert!(session.can_advance_day());

    session.advance_day().unwrap();
    assert_eq!(session.phase(), GamePhase::Night);
    assert_eq!(session.day(), 2);
    assert!(session.roster().players().iter().all(|p| !p.has_voted));
}

#[test]
fn voting_out_the_last_wolf_ends_the_game_for_the_village() {
    let mut session = session(41);
    let wolves = holders(&session, Role::Werewolf);

    for (index, wolf) in wolves.iter().enumerate() {
        peaceful_night(&mut session);
        speak_all(&mut session);
        unanimous_vote(&mut session, *wolf);
        if index + 1 < wolves.len() {
            assert_eq!(session.roster().check_win_condition(), None);
            session.advance_day().unwrap();
        }
    }

    assert_eq!(session.winner(), Some(Winner::Village));
    assert_eq!(session.phase(), GamePhase::End);

    let anyone = session.roster().alive_players(None)[0].id();
    assert_eq!(
        session.submit_night_action(anyone, NightAction::Pass),
        Err(SessionError::GameOver)
    );
    assert_eq!(session.advance_day(), Err(SessionError::GameOver));
    assert_eq!(
        session.run_automated(&FirstEligiblePolicy),
        Err(SessionError::GameOver)
    );
    assert_eq!(session.winner(), Some(Winner::Village));

    let view = session.view();
    assert!(view.players.iter().all(|player| player.revealed_role.is_some()));
}

#[test]
fn night_kill_reaching_parity_ends_the_game_before_day() {
    let mut session = session(53);
    let villagers = holders(&session, Role::Villager);

    for victim in &villagers[..2] {
        peaceful_night(&mut session);
        speak_all(&mut session);
        unanimous_vote(&mut session, *victim);
        session.advance_day().unwrap();
    }
    assert_eq!(session.roster().alive_count(Team::Village), 4);

    let wolf = holder(&session, Role::Werewolf);
    session
        .submit_night_action(wolf, NightAction::Kill(villagers[2]))
        .unwrap();
    quiet_night_finish(&mut session);

    assert_eq!(session.winner(), Some(Winner::Werewolf));
    assert_eq!(session.phase(), GamePhase::End);
    assert!(session.day_cycle().is_none());
}

#[test]
fn voted_out_hunter_shoots_before_the_day_can_advance() {
    let mut session = session(61);
    let hunter = holder(&session, Role::Hunter);
    peaceful_night(&mut session);
    speak_all(&mut session);
    unanimous_vote(&mut session, hunter);

    assert_eq!(session.advance_day(), Err(SessionError::AwaitingLastStand(hunter)));
    assert!(!session.can_advance_day());

    let wolf = holder(&session, Role::Werewolf);
    session.submit_last_stand(hunter, wolf).unwrap();
    assert!(!session.roster().is_alive(wolf));
    assert!(session.can_advance_day());
    session.advance_day().unwrap();
}

#[test]
fn speech_after_a_vote_restarts_past_the_eliminated_seat() {
    let mut session = session(67);
    let target = holders(&session, Role::Villager)[1];
    peaceful_night(&mut session);
    speak_all(&mut session);
    unanimous_vote(&mut session, target);
    session.advance_day().unwrap();
    peaceful_night(&mut session);

    let anchor = seat_of(&session, target);
    let order = session.day_cycle().unwrap().order().to_vec();
    let seats: Vec<u32> = order.iter().map(|id| seat_of(&session, *id).0).collect();
    let mut expected: Vec<u32> = session
        .roster()
        .alive_players(None)
        .iter()
        .map(|player| player.seat().0)
        .collect();
    let split = expected.partition_point(|seat| *seat <= anchor.0);
    expected.rotate_left(split);
    assert_eq!(seats, expected);
}

#[test]
fn declaration_sticks_for_the_day() {
    let mut session = session(71);
    peaceful_night(&mut session);
    let speaker = session.day_cycle().unwrap().current_speaker().unwrap();

    session.submit_declaration(speaker, Role::Seer).unwrap();
    assert!(matches!(
        session.submit_declaration(speaker, Role::Hunter),
        Err(SessionError::Day(_))
    ));
    session
        .submit_speech(speaker, Speech::new("I checked somebody."))
        .unwrap();
    assert_eq!(
        session.view().player(speaker).unwrap().declared_role,
        Some(Role::Seer)
    );
}

#[test]
fn controlled_hunter_is_never_auto_filled() {
    let config = GameConfig::new()
        .with_step_timeout_ms(500)
        .with_auto_fill_controlled(true);
    let mut session = GameSession::new(config);
    session
        .start(SessionSetup::new(9, RoleChoice::Pick(Role::Hunter), 79))
        .unwrap();
    let hunter = session.roster().controlled().unwrap().id();
    let wolf = holder(&session, Role::Werewolf);

    session
        .submit_night_action(wolf, NightAction::Kill(hunter))
        .unwrap();
    quiet_night_finish(&mut session);
    assert_eq!(session.awaiting(), Some(Awaiting::LastStand { player: hunter }));

    session.arm_deadline(0);
    let entries = session
        .poll_deadline(10_000, &FirstEligiblePolicy, &FirstEligiblePolicy)
        .unwrap();
    assert!(
        !entries
            .iter()
            .any(|entry| matches!(entry.event, GameEvent::HunterShot { .. }))
    );
    assert_eq!(session.awaiting(), Some(Awaiting::LastStand { player: hunter }));
}

/// First eligible picks, but the witch always heals and every speaker talks.
struct Eager;

impl DecisionPolicy for Eager {
    fn name(&self) -> &'static str {
        "eager"
    }

    fn kill_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId> {
        FirstEligiblePolicy.kill_target(ctx)
    }

    fn investigate_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId> {
        FirstEligiblePolicy.investigate_target(ctx)
    }

    fn witch_decision(&self, _ctx: &DecisionContext<'_>) -> WitchDecision {
        WitchDecision {
            heal: true,
            poison: None,
        }
    }

    fn speech(&self, _ctx: &DecisionContext<'_>) -> Speech {
        Speech::new("I have a bad feeling.")
    }

    fn vote_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId> {
        FirstEligiblePolicy.vote_target(ctx)
    }

    fn last_stand_target(&self, ctx: &DecisionContext<'_>) -> Option<PlayerId> {
        FirstEligiblePolicy.last_stand_target(ctx)
    }
}

fn timed_out(entries: &[LogEntry]) -> Vec<(PlayerId, DecisionKind)> {
    entries
        .iter()
        .filter_map(|entry| match entry.event {
            GameEvent::DecisionTimedOut { player, decision } => Some((player, decision)),
            _ => None,
        })
        .collect()
}

fn auto_filled(role: Role, seed: u64) -> GameSession {
    let config = GameConfig::new()
        .with_step_timeout_ms(1_000)
        .with_auto_fill_controlled(true);
    let mut session = GameSession::new(config);
    session
        .start(SessionSetup::new(9, RoleChoice::Pick(role), seed))
        .unwrap();
    session
}

#[test]
fn only_the_late_wolf_is_blamed_and_the_witch_keeps_the_normal_policy() {
    let mut session = auto_filled(Role::Werewolf, 0);
    let me = session.roster().controlled().unwrap().id();
    let witch = holder(&session, Role::Witch);
    session.run_automated(&Eager).unwrap();
    assert_eq!(session.awaiting().map(|awaiting| awaiting.player()), Some(me));

    session.arm_deadline(0);
    let entries = session
        .poll_deadline(5_000, &Eager, &FirstEligiblePolicy)
        .unwrap();

    assert_eq!(
        timed_out(&entries),
        vec![(me, DecisionKind::Night(Role::Werewolf))]
    );
    // The fallback never heals; the witch decided with the normal policy.
    assert!(!session.potions().heal);
    assert!(entries.iter().any(|entry| matches!(
        entry.event,
        GameEvent::PotionUsed { witch: by, .. } if by == witch
    )));
    assert_eq!(session.phase(), GamePhase::DaySpeech);
}

#[test]
fn night_timeouts_stay_private() {
    let mut session = auto_filled(Role::Werewolf, 0);
    let me = session.roster().controlled().unwrap().id();
    session.arm_deadline(0);
    session
        .poll_deadline(5_000, &Eager, &FirstEligiblePolicy)
        .unwrap();

    let blamed = timed_out(session.log().entries());
    assert!(blamed.len() > 1, "the seer was also overdue");
    for entry in session.log().entries() {
        if let GameEvent::DecisionTimedOut { player, .. } = entry.event {
            assert_eq!(entry.visibility, Visibility::Private(player));
        }
    }
    assert_eq!(
        timed_out(&session.view().log),
        vec![(me, DecisionKind::Night(Role::Werewolf))]
    );
}

#[test]
fn later_speakers_are_not_silenced_by_an_early_timeout() {
    let mut session = auto_filled(Role::Villager, 0);
    let me = session.roster().controlled().unwrap().id();
    let wolf = holder(&session, Role::Werewolf);
    session
        .submit_night_action(wolf, NightAction::Pass)
        .unwrap();
    quiet_night_finish(&mut session);
    assert_eq!(session.phase(), GamePhase::DaySpeech);

    let order = session.day_cycle().unwrap().order().to_vec();
    let position = order.iter().position(|id| *id == me).unwrap();
    for speaker in &order[..position] {
        session.submit_speech(*speaker, Speech::silent()).unwrap();
    }
    assert_eq!(session.awaiting(), Some(Awaiting::Speech { player: me }));

    session.arm_deadline(0);
    let entries = session
        .poll_deadline(5_000, &Eager, &FirstEligiblePolicy)
        .unwrap();

    assert_eq!(timed_out(&entries), vec![(me, DecisionKind::Speech)]);
    for entry in &entries {
        if let GameEvent::SpeechGiven { speaker, text, .. } = &entry.event {
            if *speaker == me {
                assert!(text.is_empty());
            } else {
                assert_eq!(text, "I have a bad feeling.");
            }
        }
    }
    assert_eq!(session.phase(), GamePhase::DayVoting);
}

#[test]
fn night_deaths_do_not_say_who_caused_them() {
    let mut session = session(23);
    let wolf = holder(&session, Role::Werewolf);
    let witch = holder(&session, Role::Witch);
    let seer = holder(&session, Role::Seer);
    let victim = holders(&session, Role::Villager)[0];
    let poisoned = holders(&session, Role::Villager)[1];

    session
        .submit_night_action(wolf, NightAction::Kill(victim))
        .unwrap();
    session
        .submit_night_action(seer, NightAction::Pass)
        .unwrap();
    session
        .submit_night_action(witch, NightAction::Poison(poisoned))
        .unwrap();
    session
        .submit_night_action(witch, NightAction::Pass)
        .unwrap();

    let causes: Vec<(PlayerId, DeathCause)> = session
        .log()
        .entries()
        .iter()
        .filter_map(|entry| match entry.event {
            GameEvent::PlayerDied { player, cause, .. } => {
                assert_eq!(entry.visibility, Visibility::Public);
                Some((player, cause))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        causes,
        vec![(victim, DeathCause::Night), (poisoned, DeathCause::Night)]
    );
}

#[test]
fn invalid_submissions_are_rejected_without_side_effects() {
    let mut session = session(83);
    let wolf = holder(&session, Role::Werewolf);
    let seer = holder(&session, Role::Seer);
    let before = session.log().len();

    assert!(matches!(
        session.submit_night_action(seer, NightAction::Kill(wolf)),
        Err(SessionError::Night(_))
    ));
    assert!(matches!(
        session.cast_vote(seer, wolf),
        Err(SessionError::WrongPhase { .. })
    ));
    assert!(matches!(
        session.submit_speech(seer, Speech::silent()),
        Err(SessionError::WrongPhase { .. })
    ));
    assert_eq!(session.log().len(), before);
    assert_eq!(session.night().kill_target(), None);
}
