//! Asynchronous abstraction for sourcing the controlled player's input.
//!
//! Runtime users plug in [`InputProvider`] implementations so the session can
//! run with human input, scripted fixtures, or a decision policy.
use std::collections::VecDeque;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, mpsc};
use werewolf_core::{
    Awaiting, DecisionContext, DecisionKind, DecisionPolicy, NightAction, NightActionKind,
    PlayerId, PolicyKind, Role, SessionView, Speech,
};

use super::errors::{Result, RuntimeError};

/// Everything the controlled player may see when asked for input.
pub struct Prompt<'a> {
    pub view: SessionView,
    pub awaiting: Awaiting,
    /// Hidden knowledge of the asked player, for policy-backed providers.
    pub context: Option<DecisionContext<'a>>,
}

impl Prompt<'_> {
    pub fn player(&self) -> PlayerId {
        self.awaiting.player()
    }

    /// First living player other than the asked one, by seat.
    pub fn first_other(&self) -> Option<PlayerId> {
        self.view
            .alive_others(self.player())
            .next()
            .map(|player| player.id)
    }
}

/// A single answer from the controlled player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Night(NightAction),
    Speech(Speech),
    Vote(PlayerId),
    LastStand(PlayerId),
}

impl Answer {
    pub fn label(&self) -> &'static str {
        match self {
            Answer::Night(_) => "night",
            Answer::Speech(_) => "speech",
            Answer::Vote(_) => "vote",
            Answer::LastStand(_) => "last_stand",
        }
    }
}

/// Trait for providing the controlled player's decisions.
///
/// Different implementations can handle:
/// - Player input (from a terminal or another process)
/// - Autoplay through a [`DecisionPolicy`]
/// - Scripted answers for tests
#[async_trait]
pub trait InputProvider: Send + Sync {
    async fn night_action(&self, prompt: &Prompt<'_>) -> Result<NightAction>;

    async fn speech(&self, prompt: &Prompt<'_>) -> Result<Speech>;

    async fn vote(&self, prompt: &Prompt<'_>) -> Result<PlayerId>;

    /// Shot of a dying hunter. Never bounded by a deadline.
    async fn last_stand(&self, prompt: &Prompt<'_>) -> Result<PlayerId>;

    /// Called when the session refused the previous answer, before asking
    /// again.
    async fn rejected(&self, _prompt: &Prompt<'_>, _reason: &str) {}
}

/// Answers for the controlled player with a decision policy.
pub struct PolicyInputProvider {
    policy: Box<dyn DecisionPolicy>,
}

impl PolicyInputProvider {
    pub fn new(policy: impl DecisionPolicy + 'static) -> Self {
        Self {
            policy: Box::new(policy),
        }
    }

    pub fn from_kind(kind: PolicyKind) -> Self {
        Self {
            policy: kind.build(),
        }
    }

    fn witch_action(
        &self,
        ctx: &DecisionContext<'_>,
        kinds: &[NightActionKind],
        kill_target: Option<PlayerId>,
    ) -> NightAction {
        let decision = self.policy.witch_decision(ctx);
        if decision.heal
            && kinds.contains(&NightActionKind::Heal)
            && let Some(victim) = kill_target
        {
            return NightAction::Heal(victim);
        }
        match decision.poison {
            Some(target) if kinds.contains(&NightActionKind::Poison) => {
                NightAction::Poison(target)
            }
            _ => NightAction::Pass,
        }
    }
}

#[async_trait]
impl InputProvider for PolicyInputProvider {
    async fn night_action(&self, prompt: &Prompt<'_>) -> Result<NightAction> {
        let (
            Awaiting::NightAction {
                role,
                kinds,
                kill_target,
                ..
            },
            Some(ctx),
        ) = (&prompt.awaiting, &prompt.context)
        else {
            return Ok(NightAction::Pass);
        };

        let action = match role {
            Role::Werewolf => self
                .policy
                .kill_target(ctx)
                .map_or(NightAction::Pass, NightAction::Kill),
            Role::Seer => self
                .policy
                .investigate_target(ctx)
                .map_or(NightAction::Pass, NightAction::Investigate),
            Role::Witch => self.witch_action(ctx, kinds, *kill_target),
            Role::Villager | Role::Hunter => NightAction::Pass,
        };
        tracing::debug!(policy = self.policy.name(), ?action, "autoplay night action");
        Ok(action)
    }

    async fn speech(&self, prompt: &Prompt<'_>) -> Result<Speech> {
        Ok(prompt
            .context
            .as_ref()
            .map_or_else(Speech::silent, |ctx| self.policy.speech(ctx)))
    }

    async fn vote(&self, prompt: &Prompt<'_>) -> Result<PlayerId> {
        let pick = prompt
            .context
            .as_ref()
            .and_then(|ctx| self.policy.vote_target(ctx));
        Ok(pick
            .or_else(|| prompt.first_other())
            .unwrap_or(prompt.player()))
    }

    async fn last_stand(&self, prompt: &Prompt<'_>) -> Result<PlayerId> {
        let pick = prompt
            .context
            .as_ref()
            .and_then(|ctx| self.policy.last_stand_target(ctx));
        Ok(pick
            .or_else(|| prompt.first_other())
            .unwrap_or(prompt.player()))
    }
}

/// Replays a fixed queue of answers. Fails once the queue runs dry.
#[derive(Default)]
pub struct ScriptedInputProvider {
    answers: Mutex<VecDeque<Answer>>,
}

impl ScriptedInputProvider {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
        }
    }

    pub async fn push(&self, answer: Answer) {
        self.answers.lock().await.push_back(answer);
    }

    pub async fn remaining(&self) -> usize {
        self.answers.lock().await.len()
    }

    async fn next(&self, decision: DecisionKind) -> Result<Answer> {
        self.answers
            .lock()
            .await
            .pop_front()
            .ok_or(RuntimeError::ScriptExhausted { decision })
    }
}

#[async_trait]
impl InputProvider for ScriptedInputProvider {
    async fn night_action(&self, prompt: &Prompt<'_>) -> Result<NightAction> {
        let decision = decision_kind(&prompt.awaiting);
        match self.next(decision).await? {
            Answer::Night(action) => Ok(action),
            other => Err(RuntimeError::UnexpectedAnswer {
                decision,
                answer: other.label(),
            }),
        }
    }

    async fn speech(&self, _prompt: &Prompt<'_>) -> Result<Speech> {
        match self.next(DecisionKind::Speech).await? {
            Answer::Speech(speech) => Ok(speech),
            other => Err(RuntimeError::UnexpectedAnswer {
                decision: DecisionKind::Speech,
                answer: other.label(),
            }),
        }
    }

    async fn vote(&self, _prompt: &Prompt<'_>) -> Result<PlayerId> {
        match self.next(DecisionKind::Vote).await? {
            Answer::Vote(target) => Ok(target),
            other => Err(RuntimeError::UnexpectedAnswer {
                decision: DecisionKind::Vote,
                answer: other.label(),
            }),
        }
    }

    async fn last_stand(&self, _prompt: &Prompt<'_>) -> Result<PlayerId> {
        match self.next(DecisionKind::LastStand).await? {
            Answer::LastStand(target) => Ok(target),
            other => Err(RuntimeError::UnexpectedAnswer {
                decision: DecisionKind::LastStand,
                answer: other.label(),
            }),
        }
    }
}

/// Message sent to whoever answers for a [`ChannelInputProvider`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputRequest {
    Prompt {
        view: SessionView,
        awaiting: Awaiting,
    },
    Rejected {
        player: PlayerId,
        reason: String,
    },
}

/// The far end of a [`ChannelInputProvider`].
pub struct InputChannel {
    pub requests: mpsc::Receiver<InputRequest>,
    pub answers: mpsc::Sender<Answer>,
}

/// Forwards prompts over one channel and waits for answers on another.
pub struct ChannelInputProvider {
    requests: mpsc::Sender<InputRequest>,
    answers: Mutex<mpsc::Receiver<Answer>>,
}

impl ChannelInputProvider {
    pub fn new(buffer: usize) -> (Self, InputChannel) {
        let (request_tx, request_rx) = mpsc::channel(buffer);
        let (answer_tx, answer_rx) = mpsc::channel(buffer);
        let provider = Self {
            requests: request_tx,
            answers: Mutex::new(answer_rx),
        };
        let channel = InputChannel {
            requests: request_rx,
            answers: answer_tx,
        };
        (provider, channel)
    }

    async fn exchange(&self, prompt: &Prompt<'_>) -> Result<Answer> {
        self.requests
            .send(InputRequest::Prompt {
                view: prompt.view.clone(),
                awaiting: prompt.awaiting.clone(),
            })
            .await
            .map_err(|_| RuntimeError::InputChannelClosed)?;
        self.answers
            .lock()
            .await
            .recv()
            .await
            .ok_or(RuntimeError::InputChannelClosed)
    }
}

#[async_trait]
impl InputProvider for ChannelInputProvider {
    async fn night_action(&self, prompt: &Prompt<'_>) -> Result<NightAction> {
        match self.exchange(prompt).await? {
            Answer::Night(action) => Ok(action),
            other => Err(RuntimeError::UnexpectedAnswer {
                decision: decision_kind(&prompt.awaiting),
                answer: other.label(),
            }),
        }
    }

    async fn speech(&self, prompt: &Prompt<'_>) -> Result<Speech> {
        match self.exchange(prompt).await? {
            Answer::Speech(speech) => Ok(speech),
            other => Err(RuntimeError::UnexpectedAnswer {
                decision: DecisionKind::Speech,
                answer: other.label(),
            }),
        }
    }

    async fn vote(&self, prompt: &Prompt<'_>) -> Result<PlayerId> {
        match self.exchange(prompt).await? {
            Answer::Vote(target) => Ok(target),
            other => Err(RuntimeError::UnexpectedAnswer {
                decision: DecisionKind::Vote,
                answer: other.label(),
            }),
        }
    }

    async fn last_stand(&self, prompt: &Prompt<'_>) -> Result<PlayerId> {
        match self.exchange(prompt).await? {
            Answer::LastStand(target) => Ok(target),
            other => Err(RuntimeError::UnexpectedAnswer {
                decision: DecisionKind::LastStand,
                answer: other.label(),
            }),
        }
    }

    async fn rejected(&self, prompt: &Prompt<'_>, reason: &str) {
        let notice = InputRequest::Rejected {
            player: prompt.player(),
            reason: reason.to_owned(),
        };
        if self.requests.send(notice).await.is_err() {
            tracing::trace!("input channel closed before rejection notice");
        }
    }
}

pub(crate) fn decision_kind(awaiting: &Awaiting) -> DecisionKind {
    match awaiting {
        Awaiting::NightAction { role, .. } => DecisionKind::Night(*role),
        Awaiting::Speech { .. } => DecisionKind::Speech,
        Awaiting::Vote { .. } => DecisionKind::Vote,
        Awaiting::LastStand { .. } => DecisionKind::LastStand,
    }
}
