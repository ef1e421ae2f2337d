//! High-level runtime orchestrator.
//!
//! The runtime owns a [`GameSession`] and drives it one collection step at a
//! time: automated participants answer synchronously through a
//! [`DecisionPolicy`], the controlled player answers through an
//! [`InputProvider`] bounded by the step deadline, and every log entry the
//! controlled player may see is published on the [`EventBus`].

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{Instant, timeout};
use tracing::{debug, info, warn};
use werewolf_core::{
    Awaiting, DecisionPolicy, FirstEligiblePolicy, GameConfig, GamePhase, GameSession,
    HeuristicPolicy, LogEntry, PlayerId, PolicyKind, RoleChoice, SessionError, SessionSetup,
    Winner,
};

use crate::api::{Answer, InputProvider, Prompt, Result, RuntimeError};
use crate::events::EventBus;

/// Runtime configuration shared by the orchestrator and the session.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub event_buffer_size: usize,
    /// Session seed. Drawn from the thread RNG when `None`.
    pub seed: Option<u64>,
    pub player_count: usize,
    pub role_choice: RoleChoice,
    /// Display names in lineup order plus the controlled player's index.
    pub names: Option<(Vec<String>, usize)>,
    /// Rejected answers tolerated from the controlled player in one step.
    pub max_invalid_answers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            event_buffer_size: 256,
            seed: None,
            player_count: GameConfig::DEFAULT_PLAYERS,
            role_choice: RoleChoice::Random,
            names: None,
            max_invalid_answers: 16,
        }
    }
}

/// Main runtime that drives a game session to its end.
pub struct Runtime {
    config: RuntimeConfig,
    session: GameSession,
    policy: Box<dyn DecisionPolicy>,
    fallback: Box<dyn DecisionPolicy>,
    provider: Box<dyn InputProvider>,
    bus: EventBus,
    clock: Instant,
    /// Sequence number of the first log entry not yet published.
    published: u64,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Subscribe to the entries visible to the controlled player
    pub fn subscribe_events(&self) -> broadcast::Receiver<LogEntry> {
        self.bus.subscribe()
    }

    /// Deals roles and seats and opens the first night.
    ///
    /// [`Runtime::step`] calls this on its own while the session is in setup.
    pub fn start(&mut self) -> Result<()> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut setup = SessionSetup::new(self.config.player_count, self.config.role_choice, seed);
        if let Some((names, controlled)) = &self.config.names {
            setup = setup.with_names(names.clone(), *controlled);
        }

        info!(
            seed,
            players = self.config.player_count,
            role_choice = ?self.config.role_choice,
            "starting session"
        );
        self.session.start(setup)?;
        self.flush();
        Ok(())
    }

    /// Discards the current game. The next step deals a fresh one.
    pub fn restart(&mut self) {
        info!(phase = %self.session.phase(), day = self.session.day(), "restarting session");
        self.session.restart();
        self.published = 0;
    }

    /// Advance one collection step.
    ///
    /// Automated participants act first; then the controlled player is asked
    /// if the session waits on them, otherwise the next night falls once the
    /// vote is settled.
    pub async fn step(&mut self) -> Result<()> {
        if self.session.phase() == GamePhase::Setup {
            return self.start();
        }
        if self.session.is_over() {
            return Err(SessionError::GameOver.into());
        }

        let before = self.progress_marker();
        self.session.run_automated(self.policy.as_ref())?;
        self.flush();
        if self.session.is_over() {
            return Ok(());
        }

        if let Some(awaiting) = self.session.awaiting() {
            self.collect(awaiting).await?;
        } else if self.session.can_advance_day() {
            self.session.advance_day()?;
            self.flush();
        } else if self.progress_marker() == before {
            return Err(RuntimeError::NoProgress {
                phase: self.session.phase(),
                day: self.session.day(),
            });
        }
        Ok(())
    }

    /// Run steps until a team wins
    pub async fn run_to_end(&mut self) -> Result<Winner> {
        loop {
            if let Some(winner) = self.session.winner() {
                info!(%winner, day = self.session.day(), "game over");
                return Ok(winner);
            }
            self.step().await?;
        }
    }

    /// Asks the controlled player until the session accepts an answer or
    /// the deadline passes.
    async fn collect(&mut self, awaiting: Awaiting) -> Result<()> {
        let player = awaiting.player();
        // A dying hunter is never rushed.
        let deadline = match awaiting {
            Awaiting::LastStand { .. } => None,
            _ => Some(self.session.arm_deadline(self.now_ms())),
        };
        let attempts = self.config.max_invalid_answers.max(1);

        for attempt in 1..=attempts {
            let answer = {
                let prompt = self.prompt(&awaiting);
                let asked = ask(self.provider.as_ref(), &prompt);
                match deadline {
                    None => Some(asked.await),
                    Some(deadline) => {
                        let remaining = deadline.remaining_ms(self.now_ms());
                        timeout(Duration::from_millis(remaining), asked).await.ok()
                    }
                }
            };

            let Some(answer) = answer else {
                let now_ms = self.now_ms();
                warn!(%player, now_ms, "controlled player missed the deadline");
                self.session.poll_deadline(
                    now_ms,
                    self.policy.as_ref(),
                    self.fallback.as_ref(),
                )?;
                self.flush();
                return Ok(());
            };

            let outcome = answer.and_then(|answer| {
                debug!(%player, attempt, ?answer, "controlled answer");
                self.apply(player, answer)
            });
            match outcome {
                Ok(()) => {
                    self.flush();
                    return Ok(());
                }
                Err(err) if err.is_recoverable() => {
                    warn!(%player, attempt, %err, "controlled answer rejected");
                    let reason = err.to_string();
                    let prompt = self.prompt(&awaiting);
                    self.provider.rejected(&prompt, &reason).await;
                }
                Err(err) => return Err(err),
            }
        }

        Err(RuntimeError::TooManyInvalidAnswers { player, attempts })
    }

    fn apply(&mut self, player: PlayerId, answer: Answer) -> Result<()> {
        match answer {
            Answer::Night(action) => self.session.submit_night_action(player, action)?,
            Answer::Speech(speech) => self.session.submit_speech(player, speech)?,
            Answer::Vote(target) => self.session.cast_vote(player, target)?,
            Answer::LastStand(target) => self.session.submit_last_stand(player, target)?,
        };
        Ok(())
    }

    fn prompt(&self, awaiting: &Awaiting) -> Prompt<'_> {
        Prompt {
            view: self.session.view(),
            awaiting: awaiting.clone(),
            context: self.session.decision_context(awaiting.player()),
        }
    }

    /// Publishes new log entries the controlled player may see.
    fn flush(&mut self) {
        let log = self.session.log();
        let controlled = self.session.roster().controlled();
        for entry in log.since(self.published) {
            let visible = match controlled {
                Some(player) => entry.visibility.visible_to(player),
                None => entry.is_public(),
            };
            if visible {
                self.bus.publish(entry.clone());
            }
            self.published = entry.seq + 1;
        }
    }

    fn progress_marker(&self) -> (GamePhase, u32, usize) {
        (
            self.session.phase(),
            self.session.day(),
            self.session.log().len(),
        )
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.clock.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

async fn ask(provider: &dyn InputProvider, prompt: &Prompt<'_>) -> Result<Answer> {
    let answer = match &prompt.awaiting {
        Awaiting::NightAction { .. } => Answer::Night(provider.night_action(prompt).await?),
        Awaiting::Speech { .. } => Answer::Speech(provider.speech(prompt).await?),
        Awaiting::Vote { .. } => Answer::Vote(provider.vote(prompt).await?),
        Awaiting::LastStand { .. } => Answer::LastStand(provider.last_stand(prompt).await?),
    };
    Ok(answer)
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    policy: Option<Box<dyn DecisionPolicy>>,
    fallback: Option<Box<dyn DecisionPolicy>>,
    provider: Option<Box<dyn InputProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            policy: None,
            fallback: None,
            provider: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Policy for automated participants (default: heuristic)
    pub fn policy(mut self, policy: impl DecisionPolicy + 'static) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    pub fn policy_kind(mut self, kind: PolicyKind) -> Self {
        self.policy = Some(kind.build());
        self
    }

    /// Policy used when a deadline expires (default: first eligible)
    pub fn fallback(mut self, policy: impl DecisionPolicy + 'static) -> Self {
        self.fallback = Some(Box::new(policy));
        self
    }

    /// Set the controlled player's input provider (required)
    pub fn provider(mut self, provider: impl InputProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Build the runtime
    pub fn build(self) -> Result<Runtime> {
        let provider = self.provider.ok_or(RuntimeError::ProviderNotSet)?;
        let policy = self
            .policy
            .unwrap_or_else(|| Box::new(HeuristicPolicy::default()));
        let fallback = self
            .fallback
            .unwrap_or_else(|| Box::new(FirstEligiblePolicy));

        debug!(
            policy = policy.name(),
            fallback = fallback.name(),
            step_timeout_ms = self.config.game_config.step_timeout_ms,
            "runtime built"
        );

        Ok(Runtime {
            session: GameSession::new(self.config.game_config.clone()),
            bus: EventBus::with_capacity(self.config.event_buffer_size),
            config: self.config,
            policy,
            fallback,
            provider,
            clock: Instant::now(),
            published: 0,
        })
    }
}
