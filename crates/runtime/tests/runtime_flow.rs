use werewolf_core::{
    Awaiting, DeathCause, GameEvent, GamePhase, HeuristicPolicy, NightAction, PolicyKind, Role,
    RoleChoice, Speech,
};
use werewolf_runtime::{
    Answer, ChannelInputProvider, InputRequest, PolicyInputProvider, Runtime, RuntimeConfig,
    RuntimeError, ScriptedInputProvider,
};

fn config(seed: u64, role_choice: RoleChoice) -> RuntimeConfig {
    RuntimeConfig {
        seed: Some(seed),
        role_choice,
        event_buffer_size: 4_096,
        ..RuntimeConfig::default()
    }
}

#[test]
fn build_requires_an_input_provider() {
    let result = Runtime::builder().build();
    assert!(matches!(result, Err(RuntimeError::ProviderNotSet)));
}

#[tokio::test]
async fn autoplay_runs_to_a_winner() {
    for seed in 0..5 {
        let mut runtime = Runtime::builder()
            .config(config(seed, RoleChoice::Random))
            .provider(PolicyInputProvider::new(HeuristicPolicy::default()))
            .build()
            .unwrap();

        let winner = runtime.run_to_end().await.unwrap();

        let session = runtime.session();
        assert_eq!(session.phase(), GamePhase::End);
        assert_eq!(Some(winner), session.roster().check_win_condition());
        assert!(matches!(
            runtime.step().await,
            Err(RuntimeError::Session(_))
        ));
    }
}

#[tokio::test]
async fn subscribers_only_see_what_the_controlled_player_may_see() {
    let mut runtime = Runtime::builder()
        .config(config(11, RoleChoice::Pick(Role::Villager)))
        .policy_kind(PolicyKind::Simple)
        .provider(PolicyInputProvider::from_kind(PolicyKind::Simple))
        .build()
        .unwrap();
    let mut events = runtime.subscribe_events();

    runtime.run_to_end().await.unwrap();

    let me = runtime.session().roster().controlled().unwrap().clone();
    let mut received = Vec::new();
    while let Ok(entry) = events.try_recv() {
        received.push(entry);
    }

    assert!(!received.is_empty());
    assert!(received.iter().all(|entry| entry.visibility.visible_to(&me)));
    assert!(received.windows(2).all(|pair| pair[0].seq < pair[1].seq));
    // A villager never learns who the pack picked.
    assert!(
        !received
            .iter()
            .any(|entry| matches!(entry.event, GameEvent::VictimChosen { .. }))
    );
    assert!(matches!(
        received.last().map(|entry| &entry.event),
        Some(GameEvent::GameEnded { .. })
    ));
}

#[tokio::test]
async fn subscribers_never_learn_how_a_night_death_happened() {
    let mut night_deaths = 0;
    for seed in 0..6 {
        let mut runtime = Runtime::builder()
            .config(config(seed, RoleChoice::Pick(Role::Villager)))
            .provider(PolicyInputProvider::from_kind(PolicyKind::Heuristic))
            .build()
            .unwrap();
        let mut events = runtime.subscribe_events();
        runtime.run_to_end().await.unwrap();

        while let Ok(entry) = events.try_recv() {
            if let GameEvent::PlayerDied { cause, .. } = entry.event {
                assert!(!matches!(cause, DeathCause::Killed | DeathCause::Poisoned));
                if cause == DeathCause::Night {
                    night_deaths += 1;
                }
            }
            assert!(!matches!(
                entry.event,
                GameEvent::PotionUsed { .. } | GameEvent::DecisionTimedOut { .. }
            ));
        }
    }
    assert!(night_deaths > 0);
}

#[tokio::test]
async fn rejected_answer_is_requested_again() {
    let mut runtime = Runtime::builder()
        .config(config(5, RoleChoice::Pick(Role::Seer)))
        .provider(ScriptedInputProvider::new([
            Answer::Vote(werewolf_core::PlayerId(1)),
            Answer::Night(NightAction::Pass),
        ]))
        .build()
        .unwrap();
    runtime.step().await.unwrap();
    let me = runtime.session().roster().controlled().unwrap().id();

    // The vote does not fit a night prompt; the pass that follows does.
    runtime.step().await.unwrap();
    assert!(!matches!(
        runtime.session().awaiting(),
        Some(Awaiting::NightAction { player, .. }) if player == me
    ));

    let mut runtime = Runtime::builder()
        .config(config(5, RoleChoice::Pick(Role::Seer)))
        .provider(ScriptedInputProvider::new([
            Answer::Night(NightAction::Investigate(me)),
            Answer::Night(NightAction::Pass),
        ]))
        .build()
        .unwrap();
    runtime.step().await.unwrap();
    runtime.step().await.unwrap();

    let session = runtime.session();
    assert!(
        !session
            .log()
            .entries()
            .iter()
            .any(|entry| matches!(entry.event, GameEvent::Investigated { .. }))
    );
    assert!(!matches!(
        session.awaiting(),
        Some(Awaiting::NightAction { player, .. }) if player == me
    ));
}

#[tokio::test]
async fn exhausted_script_surfaces_an_error() {
    let mut runtime = Runtime::builder()
        .config(config(3, RoleChoice::Pick(Role::Seer)))
        .provider(ScriptedInputProvider::default())
        .build()
        .unwrap();
    runtime.step().await.unwrap();

    let err = runtime.step().await.unwrap_err();
    assert!(matches!(err, RuntimeError::ScriptExhausted { .. }));
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn invalid_answers_are_capped() {
    let mut runtime = Runtime::builder()
        .config(RuntimeConfig {
            max_invalid_answers: 3,
            ..config(8, RoleChoice::Pick(Role::Seer))
        })
        .provider(ScriptedInputProvider::new(
            std::iter::repeat_n(Answer::Night(NightAction::Kill(werewolf_core::PlayerId(2))), 3),
        ))
        .build()
        .unwrap();
    runtime.step().await.unwrap();

    let err = runtime.step().await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::TooManyInvalidAnswers { attempts: 3, .. }
    ));
}

#[tokio::test]
async fn channel_provider_plays_a_full_game() {
    let (provider, mut channel) = ChannelInputProvider::new(8);
    let answerer = tokio::spawn(async move {
        let mut rejections = 0usize;
        while let Some(request) = channel.requests.recv().await {
            let (view, awaiting) = match request {
                InputRequest::Prompt { view, awaiting } => (view, awaiting),
                InputRequest::Rejected { .. } => {
                    rejections += 1;
                    continue;
                }
            };
            let me = awaiting.player();
            let first_other = view
                .alive_others(me)
                .next()
                .map(|player| player.id)
                .unwrap_or(me);
            let answer = match awaiting {
                Awaiting::NightAction { .. } => Answer::Night(NightAction::Pass),
                Awaiting::Speech { .. } => Answer::Speech(Speech::new("I am a simple hunter.")),
                Awaiting::Vote { .. } => Answer::Vote(first_other),
                Awaiting::LastStand { .. } => Answer::LastStand(first_other),
            };
            if channel.answers.send(answer).await.is_err() {
                break;
            }
        }
        rejections
    });

    let mut runtime = Runtime::builder()
        .config(config(21, RoleChoice::Pick(Role::Hunter)))
        .provider(provider)
        .build()
        .unwrap();
    let winner = runtime.run_to_end().await.unwrap();
    assert_eq!(Some(winner), runtime.session().winner());

    drop(runtime);
    assert_eq!(answerer.await.unwrap(), 0);
}

#[tokio::test]
async fn mismatched_channel_answer_is_requested_again() {
    let (provider, mut channel) = ChannelInputProvider::new(8);
    let answerer = tokio::spawn(async move {
        let mut rejections = 0usize;
        let mut mismatched = false;
        while let Some(request) = channel.requests.recv().await {
            let (view, awaiting) = match request {
                InputRequest::Prompt { view, awaiting } => (view, awaiting),
                InputRequest::Rejected { .. } => {
                    rejections += 1;
                    continue;
                }
            };
            let me = awaiting.player();
            let first_other = view
                .alive_others(me)
                .next()
                .map(|player| player.id)
                .unwrap_or(me);
            let answer = match awaiting {
                Awaiting::NightAction { .. } if !mismatched => {
                    mismatched = true;
                    Answer::Vote(first_other)
                }
                Awaiting::NightAction { .. } => Answer::Night(NightAction::Pass),
                Awaiting::Speech { .. } => Answer::Speech(Speech::silent()),
                Awaiting::Vote { .. } => Answer::Vote(first_other),
                Awaiting::LastStand { .. } => Answer::LastStand(first_other),
            };
            if channel.answers.send(answer).await.is_err() {
                break;
            }
        }
        rejections
    });

    let mut runtime = Runtime::builder()
        .config(config(21, RoleChoice::Pick(Role::Seer)))
        .provider(provider)
        .build()
        .unwrap();
    let winner = runtime.run_to_end().await.unwrap();
    assert_eq!(Some(winner), runtime.session().winner());

    drop(runtime);
    assert_eq!(answerer.await.unwrap(), 1);
}

#[tokio::test]
async fn restart_deals_a_fresh_game() {
    let mut runtime = Runtime::builder()
        .config(config(2, RoleChoice::Random))
        .provider(PolicyInputProvider::from_kind(PolicyKind::Heuristic))
        .build()
        .unwrap();
    runtime.run_to_end().await.unwrap();

    runtime.restart();
    assert_eq!(runtime.session().phase(), GamePhase::Setup);
    assert!(runtime.session().log().is_empty());

    runtime.step().await.unwrap();
    assert_eq!(runtime.session().phase(), GamePhase::Night);
    assert_eq!(runtime.session().day(), 1);
    assert!(runtime.session().winner().is_none());
}
