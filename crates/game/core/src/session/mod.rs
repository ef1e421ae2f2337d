//! Top-level phase state machine.
//!
//! [`GameSession`] composes the roster, the night resolver and the day cycle
//! and is the only mutation surface offered to hosts. Every mutating call
//! returns the log entries it produced; once a winner is decided the session
//! is frozen and every mutating call fails with [`SessionError::GameOver`].
//!
//! The session never reads a clock. Hosts drive time boxes through
//! [`GameSession::arm_deadline`] and [`GameSession::poll_deadline`].
mod deadline;
mod error;
mod events;
mod view;

pub use deadline::Deadline;
pub use error::SessionError;
pub use events::{DecisionKind, EventLog, GameEvent, LogEntry, Visibility};
pub use view::{Awaiting, PendingDecision, PlayerView, SessionView};

use std::collections::VecDeque;

use crate::config::GameConfig;
use crate::day::{Accusation, DayCycle, DayStage, Speech, VoteOutcome};
use crate::night::{
    Death, DeathCause, Investigation, NightAction, NightActionKind, NightResolver, NightStage,
    WitchPotions,
};
use crate::policy::{DecisionContext, DecisionPolicy, FirstEligiblePolicy};
use crate::roles::{Role, RoleChoice, SetupError, Team};
use crate::state::{GamePhase, Lineup, Player, PlayerId, PlayerRoster, Seat, Winner};

/// Parameters for [`GameSession::start`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSetup {
    pub player_count: usize,
    /// Display names in lineup order; `None` numbers the players.
    pub names: Option<Vec<String>>,
    /// Lineup index of the human-driven player.
    pub controlled: usize,
    pub role_choice: RoleChoice,
    pub seed: u64,
}

impl SessionSetup {
    pub fn new(player_count: usize, role_choice: RoleChoice, seed: u64) -> Self {
        Self {
            player_count,
            names: None,
            controlled: 0,
            role_choice,
            seed,
        }
    }

    pub fn with_names(mut self, names: Vec<String>, controlled: usize) -> Self {
        self.names = Some(names);
        self.controlled = controlled;
        self
    }

    fn lineup(&self) -> Result<Lineup, SetupError> {
        match &self.names {
            Some(names) if names.len() != self.player_count => {
                Err(SetupError::NameCountMismatch {
                    expected: self.player_count,
                    provided: names.len(),
                })
            }
            Some(names) => Ok(Lineup::new(names.clone(), self.controlled)),
            None => {
                let mut lineup = Lineup::numbered(self.player_count);
                lineup.controlled = self.controlled;
                Ok(lineup)
            }
        }
    }
}

/// One game of Werewolf from setup to a winner.
#[derive(Clone, Debug)]
pub struct GameSession {
    config: GameConfig,
    phase: GamePhase,
    day: u32,
    seed: u64,
    roster: PlayerRoster,
    potions: WitchPotions,
    night: NightResolver,
    day_cycle: Option<DayCycle>,
    /// Highest seat killed or poisoned during the last night.
    night_anchor: Option<Seat>,
    /// Seat eliminated by the previous day's vote.
    vote_anchor: Option<Seat>,
    last_stands: VecDeque<PlayerId>,
    investigations: Vec<Investigation>,
    accusations: Vec<Accusation>,
    winner: Option<Winner>,
    deadline: Option<Deadline>,
    log: EventLog,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            phase: GamePhase::Setup,
            day: 0,
            seed: 0,
            roster: PlayerRoster::default(),
            potions: WitchPotions::full(),
            night: NightResolver::new(0),
            day_cycle: None,
            night_anchor: None,
            vote_anchor: None,
            last_stands: VecDeque::new(),
            investigations: Vec::new(),
            accusations: Vec::new(),
            winner: None,
            deadline: None,
            log: EventLog::new(),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn roster(&self) -> &PlayerRoster {
        &self.roster
    }

    pub fn potions(&self) -> WitchPotions {
        self.potions
    }

    pub fn night(&self) -> &NightResolver {
        &self.night
    }

    pub fn day_cycle(&self) -> Option<&DayCycle> {
        self.day_cycle.as_ref()
    }

    pub fn investigations(&self) -> &[Investigation] {
        &self.investigations
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::End
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn deadline(&self) -> Option<Deadline> {
        self.deadline
    }

    /// Hunters still owed a shot, front first.
    pub fn last_stands(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.last_stands.iter().copied()
    }

    /// True once the vote is tallied and [`Self::advance_day`] may be called.
    pub fn can_advance_day(&self) -> bool {
        self.phase == GamePhase::DayVoting
            && self.last_stands.is_empty()
            && self
                .day_cycle
                .as_ref()
                .is_some_and(|cycle| cycle.stage() == DayStage::Tallied)
    }

    /// Decisions owed in the current step.
    ///
    /// A pending last stand blocks everything else. At night the witch is only
    /// asked once the pack has chosen.
    pub fn pending_decisions(&self) -> Vec<PendingDecision> {
        if matches!(self.phase, GamePhase::Setup | GamePhase::End) {
            return Vec::new();
        }
        if let Some(hunter) = self.last_stands.front() {
            return vec![PendingDecision {
                player: *hunter,
                kind: DecisionKind::LastStand,
            }];
        }

        match self.phase {
            GamePhase::Night => {
                if self.night.stage() != NightStage::CollectingActions {
                    return Vec::new();
                }
                let pending = self.night.pending_roles(&self.roster, &self.potions);
                pending
                    .iter()
                    .filter(|role| **role != Role::Witch || !pending.contains(&Role::Werewolf))
                    .filter_map(|role| {
                        self.night_actor(*role).map(|player| PendingDecision {
                            player,
                            kind: DecisionKind::Night(*role),
                        })
                    })
                    .collect()
            }
            GamePhase::DaySpeech => self
                .day_cycle
                .as_ref()
                .and_then(DayCycle::current_speaker)
                .map(|player| PendingDecision {
                    player,
                    kind: DecisionKind::Speech,
                })
                .into_iter()
                .collect(),
            GamePhase::DayVoting => self
                .day_cycle
                .as_ref()
                .map(|cycle| cycle.pending_voters(&self.roster))
                .unwrap_or_default()
                .into_iter()
                .map(|player| PendingDecision {
                    player,
                    kind: DecisionKind::Vote,
                })
                .collect(),
            GamePhase::Setup | GamePhase::End => Vec::new(),
        }
    }

    /// Who submits for `role` tonight. The pack waits for a living human wolf.
    fn night_actor(&self, role: Role) -> Option<PlayerId> {
        let holders = self.roster.alive_with_role(role);
        holders
            .iter()
            .find(|player| player.is_controlled())
            .or_else(|| holders.first())
            .map(|player| player.id())
    }

    fn is_controlled(&self, player: PlayerId) -> bool {
        self.roster.player(player).is_some_and(Player::is_controlled)
    }

    /// Controlled input the session is currently blocked on.
    pub fn awaiting(&self) -> Option<Awaiting> {
        let controlled = self.roster.controlled()?;
        let decision = self
            .pending_decisions()
            .into_iter()
            .find(|decision| decision.player == controlled.id())?;

        let player = decision.player;
        Some(match decision.kind {
            DecisionKind::Night(role) => {
                let kinds = match role {
                    Role::Werewolf => vec![NightActionKind::Kill],
                    Role::Seer => vec![NightActionKind::Investigate],
                    Role::Witch => [
                        (self.potions.heal, NightActionKind::Heal),
                        (self.potions.poison, NightActionKind::Poison),
                    ]
                    .into_iter()
                    .filter_map(|(available, kind)| available.then_some(kind))
                    .collect(),
                    Role::Villager | Role::Hunter => Vec::new(),
                };
                Awaiting::NightAction {
                    player,
                    role,
                    kinds,
                    kill_target: (role == Role::Witch)
                        .then(|| self.night.kill_target())
                        .flatten(),
                }
            }
            DecisionKind::Speech => Awaiting::Speech { player },
            DecisionKind::Vote => Awaiting::Vote { player },
            DecisionKind::LastStand => Awaiting::LastStand { player },
        })
    }

    /// Rendering snapshot from the controlled player's point of view.
    pub fn view(&self) -> SessionView {
        let reveal = self.phase == GamePhase::End;
        let mut players: Vec<PlayerView> = self
            .roster
            .players()
            .iter()
            .map(|player| PlayerView::of(player, reveal))
            .collect();
        players.sort_by_key(|player| player.seat);

        let log = match self.roster.controlled() {
            Some(controlled) => self.log.visible_to(controlled).cloned().collect(),
            None => Vec::new(),
        };

        SessionView {
            phase: self.phase,
            day: self.day,
            winner: self.winner,
            awaiting: self.awaiting(),
            players,
            log,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Deals roles, draws seats and opens the first night.
    pub fn start(&mut self, setup: SessionSetup) -> Result<Vec<LogEntry>, SessionError> {
        if self.phase != GamePhase::Setup {
            return Err(SessionError::AlreadyStarted);
        }

        let lineup = setup.lineup()?;
        let catalog = self.config.catalog_for(lineup.len())?;
        let roster =
            PlayerRoster::assign_roles(&lineup, &catalog, setup.role_choice.forced(), setup.seed)?;

        self.seed = setup.seed;
        self.roster = roster;
        self.potions = WitchPotions::full();
        self.day = 1;
        self.night = NightResolver::new(1);
        self.phase = GamePhase::Night;

        let mut out = Vec::new();
        self.record(
            Visibility::Public,
            GameEvent::GameStarted {
                players: lineup.len(),
                seed: setup.seed,
            },
            &mut out,
        );
        let assignments: Vec<(PlayerId, Role)> = self
            .roster
            .players()
            .iter()
            .map(|player| (player.id(), player.role()))
            .collect();
        for (player, role) in assignments {
            self.record(
                Visibility::Private(player),
                GameEvent::RoleAssigned { player, role },
                &mut out,
            );
        }
        let wolves = self.ids_of(Some(Team::Werewolf));
        self.record(
            Visibility::Team(Team::Werewolf),
            GameEvent::PackRevealed { wolves },
            &mut out,
        );
        self.record(Visibility::Public, GameEvent::NightFell { night: 1 }, &mut out);

        tracing::info!(
            players = lineup.len(),
            seed = setup.seed,
            role_choice = ?setup.role_choice,
            "session started"
        );
        Ok(out)
    }

    /// Discards everything and returns to `Setup`. The config is kept.
    pub fn restart(&mut self) {
        tracing::info!(phase = %self.phase, day = self.day, "session restarted");
        *self = Self::new(self.config.clone());
    }

    /// Ends the tallied day and opens the next night.
    pub fn advance_day(&mut self) -> Result<Vec<LogEntry>, SessionError> {
        self.ensure_active()?;
        if let Some(hunter) = self.last_stands.front() {
            return Err(SessionError::AwaitingLastStand(*hunter));
        }
        if self.phase != GamePhase::DayVoting {
            return Err(SessionError::WrongPhase {
                expected: GamePhase::DayVoting,
                actual: self.phase,
            });
        }
        if !self.can_advance_day() {
            return Err(SessionError::DayNotFinished);
        }

        self.day += 1;
        self.roster.reset_round_flags();
        self.night = NightResolver::new(self.day);
        self.day_cycle = None;
        self.accusations.clear();
        self.deadline = None;
        self.phase = GamePhase::Night;

        let mut out = Vec::new();
        self.record(
            Visibility::Public,
            GameEvent::NightFell { night: self.day },
            &mut out,
        );
        tracing::info!(night = self.day, "night fell");
        self.finish_night_if_complete(&mut out)?;
        Ok(out)
    }

    // ========================================================================
    // Submissions
    // ========================================================================

    pub fn submit_night_action(
        &mut self,
        actor: PlayerId,
        action: NightAction,
    ) -> Result<Vec<LogEntry>, SessionError> {
        self.ensure_phase(GamePhase::Night)?;
        let mut out = Vec::new();
        self.night_action(actor, action, &mut out)?;
        Ok(out)
    }

    pub fn submit_speech(
        &mut self,
        speaker: PlayerId,
        speech: Speech,
    ) -> Result<Vec<LogEntry>, SessionError> {
        self.ensure_phase(GamePhase::DaySpeech)?;
        let mut out = Vec::new();
        self.speech(speaker, speech, &mut out)?;
        Ok(out)
    }

    /// Role claim by the current speaker ahead of their speech.
    pub fn submit_declaration(
        &mut self,
        player: PlayerId,
        role: Role,
    ) -> Result<Vec<LogEntry>, SessionError> {
        self.ensure_phase(GamePhase::DaySpeech)?;
        let cycle = self.day_cycle.as_mut().ok_or(SessionError::WrongPhase {
            expected: GamePhase::DaySpeech,
            actual: self.phase,
        })?;
        cycle.declare(&mut self.roster, player, role)?;

        let mut out = Vec::new();
        self.record(
            Visibility::Public,
            GameEvent::RoleDeclared { player, role },
            &mut out,
        );
        Ok(out)
    }

    pub fn cast_vote(
        &mut self,
        voter: PlayerId,
        target: PlayerId,
    ) -> Result<Vec<LogEntry>, SessionError> {
        self.ensure_phase(GamePhase::DayVoting)?;
        let mut out = Vec::new();
        self.vote(voter, target, &mut out)?;
        Ok(out)
    }

    /// The front hunter's shot. Blocks every other submission until taken.
    pub fn submit_last_stand(
        &mut self,
        hunter: PlayerId,
        target: PlayerId,
    ) -> Result<Vec<LogEntry>, SessionError> {
        self.ensure_active()?;
        let mut out = Vec::new();
        self.last_stand(hunter, target, &mut out)?;
        Ok(out)
    }

    // ========================================================================
    // Automation and deadlines
    // ========================================================================

    /// Makes every pending automated decision of the current step.
    ///
    /// Stops when only the controlled player's input is missing or the step
    /// completes (the phase or the day changes).
    pub fn run_automated(
        &mut self,
        policy: &dyn DecisionPolicy,
    ) -> Result<Vec<LogEntry>, SessionError> {
        self.ensure_active()?;
        let mut out = Vec::new();
        self.automate(policy, false, &mut out)?;
        Ok(out)
    }

    /// Starts the time box for the current step.
    pub fn arm_deadline(&mut self, now_ms: u64) -> Deadline {
        let deadline = Deadline::after(now_ms, self.config.step_timeout_ms);
        self.deadline = Some(deadline);
        deadline
    }

    /// Fills missing decisions once the armed deadline has passed.
    ///
    /// Only decisions owed at expiry are overdue: each gets a
    /// `DecisionTimedOut` entry and is made with `fallback`. Automated
    /// players the step reaches afterwards decide with `policy` as usual.
    /// The controlled player is filled only with `auto_fill_controlled`, and
    /// never for a last stand. Does nothing before expiry or when no deadline
    /// is armed.
    pub fn poll_deadline(
        &mut self,
        now_ms: u64,
        policy: &dyn DecisionPolicy,
        fallback: &dyn DecisionPolicy,
    ) -> Result<Vec<LogEntry>, SessionError> {
        self.ensure_active()?;
        let Some(deadline) = self.deadline else {
            return Ok(Vec::new());
        };
        if !deadline.is_expired(now_ms) {
            return Ok(Vec::new());
        }

        self.deadline = None;
        tracing::warn!(
            phase = %self.phase,
            day = self.day,
            expired_at = deadline.expires_at_ms,
            now_ms,
            "step deadline expired"
        );
        let mut out = Vec::new();
        let step = (self.phase, self.day);
        let overdue: Vec<PendingDecision> = self
            .pending_decisions()
            .into_iter()
            .filter(|decision| self.fillable(decision, self.config.auto_fill_controlled))
            .collect();

        for decision in overdue {
            if (self.phase, self.day) != step || !self.pending_decisions().contains(&decision) {
                continue;
            }
            tracing::warn!(
                player = %decision.player,
                decision = ?decision.kind,
                policy = fallback.name(),
                "decision timed out, using fallback"
            );
            // Night timeouts would name the role's holder.
            let visibility = match decision.kind {
                DecisionKind::Night(_) => Visibility::Private(decision.player),
                DecisionKind::Speech | DecisionKind::Vote | DecisionKind::LastStand => {
                    Visibility::Public
                }
            };
            self.record(
                visibility,
                GameEvent::DecisionTimedOut {
                    player: decision.player,
                    decision: decision.kind,
                },
                &mut out,
            );
            self.decide_once(decision, fallback, &mut out)?;
        }

        if (self.phase, self.day) == step {
            self.automate(policy, false, &mut out)?;
        }
        Ok(out)
    }

    fn fillable(&self, decision: &PendingDecision, include_controlled: bool) -> bool {
        if !self.is_controlled(decision.player) {
            return true;
        }
        include_controlled && decision.kind != DecisionKind::LastStand
    }

    fn automate(
        &mut self,
        policy: &dyn DecisionPolicy,
        include_controlled: bool,
        out: &mut Vec<LogEntry>,
    ) -> Result<(), SessionError> {
        let step = (self.phase, self.day);
        while (self.phase, self.day) == step {
            let next = self
                .pending_decisions()
                .into_iter()
                .find(|decision| self.fillable(decision, include_controlled));
            let Some(decision) = next else {
                break;
            };
            self.decide_once(decision, policy, out)?;
        }
        Ok(())
    }

    /// Makes one decision and fails if the step did not move.
    fn decide_once(
        &mut self,
        decision: PendingDecision,
        policy: &dyn DecisionPolicy,
        out: &mut Vec<LogEntry>,
    ) -> Result<(), SessionError> {
        let step = (self.phase, self.day);
        let before = self.pending_decisions();
        self.decide(decision, policy, out)?;
        if (self.phase, self.day) == step && self.pending_decisions() == before {
            return Err(SessionError::Stalled {
                player: decision.player,
            });
        }
        Ok(())
    }

    /// What `actor` may know when deciding. Hosts use it to let a policy
    /// answer for the controlled player.
    pub fn decision_context(&self, actor: PlayerId) -> Option<DecisionContext<'_>> {
        let player = self.roster.player(actor)?;
        let investigations = if player.role() == Role::Seer {
            self.investigations
                .iter()
                .filter(|investigation| investigation.seer == actor)
                .copied()
                .collect()
        } else {
            Vec::new()
        };
        Some(DecisionContext {
            roster: &self.roster,
            actor: player,
            day: self.day,
            seed: self.seed,
            kill_target: (player.role() == Role::Witch)
                .then(|| self.night.kill_target())
                .flatten(),
            potions: self.potions,
            investigations,
            accusations: &self.accusations,
            tally: self.day_cycle.as_ref().map(DayCycle::tally),
        })
    }

    fn decide(
        &mut self,
        decision: PendingDecision,
        policy: &dyn DecisionPolicy,
        out: &mut Vec<LogEntry>,
    ) -> Result<(), SessionError> {
        let actor = decision.player;
        match decision.kind {
            DecisionKind::Night(role) => {
                let plan = self.night_plan(actor, role, policy);
                self.try_night_plan(actor, role, plan, out)?;
                if self.night_role_pending(role) {
                    tracing::warn!(%actor, %role, policy = policy.name(), "night plan rejected, using fallback");
                    let plan = self.night_plan(actor, role, &FirstEligiblePolicy);
                    self.try_night_plan(actor, role, plan, out)?;
                }
                if self.night_role_pending(role) {
                    self.night_action(actor, NightAction::Pass, out)?;
                }
            }
            DecisionKind::Speech => {
                let speech = match self.decision_context(actor) {
                    Some(ctx) => policy.speech(&ctx),
                    None => Speech::silent(),
                };
                tracing::debug!(speaker = %actor, declaration = ?speech.declaration, "automated speech");
                match self.speech(actor, speech, out) {
                    Err(SessionError::Day(err)) => {
                        tracing::warn!(speaker = %actor, %err, "speech rejected, speaking silently");
                        self.speech(actor, Speech::silent(), out)?;
                    }
                    other => other?,
                }
            }
            DecisionKind::Vote => {
                let pick = self
                    .decision_context(actor)
                    .and_then(|ctx| policy.vote_target(&ctx));
                tracing::debug!(voter = %actor, target = ?pick, "automated vote");
                let accepted = match pick {
                    Some(target) => match self.vote(actor, target, out) {
                        Ok(()) => true,
                        Err(SessionError::Day(err)) => {
                            tracing::warn!(voter = %actor, %target, %err, "vote rejected, using fallback");
                            false
                        }
                        Err(err) => return Err(err),
                    },
                    None => false,
                };
                if !accepted {
                    let target = self
                        .decision_context(actor)
                        .and_then(|ctx| FirstEligiblePolicy.vote_target(&ctx))
                        .ok_or(SessionError::Stalled { player: actor })?;
                    self.vote(actor, target, out)?;
                }
            }
            DecisionKind::LastStand => {
                let pick = self
                    .decision_context(actor)
                    .and_then(|ctx| policy.last_stand_target(&ctx));
                tracing::debug!(hunter = %actor, target = ?pick, "automated last stand");
                let accepted = match pick {
                    Some(target) => match self.last_stand(actor, target, out) {
                        Ok(()) => true,
                        Err(SessionError::InvalidShot(_)) => {
                            tracing::warn!(hunter = %actor, %target, "shot rejected, using fallback");
                            false
                        }
                        Err(err) => return Err(err),
                    },
                    None => false,
                };
                if !accepted {
                    match self
                        .decision_context(actor)
                        .and_then(|ctx| FirstEligiblePolicy.last_stand_target(&ctx))
                    {
                        Some(target) => self.last_stand(actor, target, out)?,
                        None => self.lapse_last_stand(actor, out),
                    }
                }
            }
        }
        Ok(())
    }

    /// Submissions that carry out a policy's night choice, in order.
    fn night_plan(
        &self,
        actor: PlayerId,
        role: Role,
        policy: &dyn DecisionPolicy,
    ) -> Vec<NightAction> {
        let Some(ctx) = self.decision_context(actor) else {
            return Vec::new();
        };
        let plan = match role {
            Role::Werewolf => vec![
                policy
                    .kill_target(&ctx)
                    .map_or(NightAction::Pass, NightAction::Kill),
            ],
            Role::Seer => vec![
                policy
                    .investigate_target(&ctx)
                    .map_or(NightAction::Pass, NightAction::Investigate),
            ],
            Role::Witch => {
                let decision = policy.witch_decision(&ctx);
                let mut plan = Vec::new();
                if decision.heal
                    && let Some(victim) = ctx.kill_target
                {
                    plan.push(NightAction::Heal(victim));
                }
                if let Some(target) = decision.poison {
                    plan.push(NightAction::Poison(target));
                }
                plan.push(NightAction::Pass);
                plan
            }
            Role::Villager | Role::Hunter => Vec::new(),
        };
        tracing::debug!(%actor, %role, policy = policy.name(), ?plan, "night plan");
        plan
    }

    /// Applies a plan, skipping rejected steps.
    fn try_night_plan(
        &mut self,
        actor: PlayerId,
        role: Role,
        plan: Vec<NightAction>,
        out: &mut Vec<LogEntry>,
    ) -> Result<(), SessionError> {
        for action in plan {
            if !self.night_role_pending(role) {
                break;
            }
            match self.night_action(actor, action, out) {
                Ok(()) => {}
                Err(SessionError::Night(err)) => {
                    tracing::warn!(%actor, ?action, %err, "automated night action rejected");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn night_role_pending(&self, role: Role) -> bool {
        self.phase == GamePhase::Night
            && self.last_stands.is_empty()
            && self.night.stage() == NightStage::CollectingActions
            && self
                .night
                .pending_roles(&self.roster, &self.potions)
                .contains(&role)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn night_action(
        &mut self,
        actor: PlayerId,
        action: NightAction,
        out: &mut Vec<LogEntry>,
    ) -> Result<(), SessionError> {
        let role = self.roster.player(actor).map(Player::role);
        if role == Some(Role::Witch)
            && self
                .night
                .pending_roles(&self.roster, &self.potions)
                .contains(&Role::Werewolf)
        {
            return Err(SessionError::OutOfOrder {
                role: Role::Werewolf,
            });
        }

        self.night
            .submit(&self.roster, &mut self.potions, actor, action)?;

        match action {
            NightAction::Kill(target) => {
                self.record(
                    Visibility::Team(Team::Werewolf),
                    GameEvent::VictimChosen { target },
                    out,
                );
                let witches: Vec<PlayerId> = self
                    .roster
                    .alive_with_role(Role::Witch)
                    .iter()
                    .map(|player| player.id())
                    .collect();
                for witch in witches {
                    self.record(
                        Visibility::Private(witch),
                        GameEvent::VictimChosen { target },
                        out,
                    );
                }
            }
            NightAction::Heal(target) | NightAction::Poison(target) => {
                if let Some(potion) = action.kind() {
                    self.record(
                        Visibility::Private(actor),
                        GameEvent::PotionUsed {
                            witch: actor,
                            potion,
                            target,
                        },
                        out,
                    );
                }
            }
            NightAction::Investigate(_) | NightAction::Pass => {}
        }

        self.finish_night_if_complete(out)
    }

    fn finish_night_if_complete(&mut self, out: &mut Vec<LogEntry>) -> Result<(), SessionError> {
        if self.night.stage() != NightStage::CollectingActions
            || !self.night.is_complete(&self.roster, &self.potions)
        {
            return Ok(());
        }

        let outcome = self.night.resolve(&mut self.roster)?;

        if let Some(investigation) = outcome.investigation {
            self.investigations.push(investigation);
            self.record(
                Visibility::Private(investigation.seer),
                GameEvent::Investigated {
                    target: investigation.target,
                    is_werewolf: investigation.is_werewolf,
                },
                out,
            );
        }

        if outcome.is_peaceful() {
            self.record(Visibility::Public, GameEvent::PeacefulNight, out);
        }
        for death in &outcome.deaths {
            self.record_death(death, out);
        }
        self.night_anchor = outcome.highest_seat();

        for hunter in outcome.last_stands {
            self.queue_last_stand(hunter, out);
        }
        self.after_eliminations(out);
        Ok(())
    }

    fn speech(
        &mut self,
        speaker: PlayerId,
        speech: Speech,
        out: &mut Vec<LogEntry>,
    ) -> Result<(), SessionError> {
        let cycle = self.day_cycle.as_mut().ok_or(SessionError::WrongPhase {
            expected: GamePhase::DaySpeech,
            actual: self.phase,
        })?;
        cycle.submit_speech(&mut self.roster, speaker, &speech)?;
        let all_spoken = cycle.stage() == DayStage::AllSpoken;

        if let Some(role) = speech.declaration {
            self.record(
                Visibility::Public,
                GameEvent::RoleDeclared {
                    player: speaker,
                    role,
                },
                out,
            );
        }
        if let Some(target) = speech.accuses
            && self.roster.player(target).is_some()
        {
            self.accusations.push(Accusation {
                day: self.day,
                accuser: speaker,
                target,
            });
        }
        self.record(
            Visibility::Public,
            GameEvent::SpeechGiven {
                speaker,
                text: speech.text,
                accuses: speech.accuses,
            },
            out,
        );

        if all_spoken {
            self.open_voting(out)?;
        }
        Ok(())
    }

    fn open_voting(&mut self, out: &mut Vec<LogEntry>) -> Result<(), SessionError> {
        if let Some(cycle) = self.day_cycle.as_mut() {
            cycle.open_voting()?;
        }
        self.phase = GamePhase::DayVoting;
        self.deadline = None;
        self.record(Visibility::Public, GameEvent::VotingOpened, out);
        tracing::info!(day = self.day, "voting opened");
        Ok(())
    }

    fn vote(
        &mut self,
        voter: PlayerId,
        target: PlayerId,
        out: &mut Vec<LogEntry>,
    ) -> Result<(), SessionError> {
        let cycle = self.day_cycle.as_mut().ok_or(SessionError::WrongPhase {
            expected: GamePhase::DayVoting,
            actual: self.phase,
        })?;
        cycle.cast_vote(&mut self.roster, voter, target)?;
        let complete = cycle.pending_voters(&self.roster).is_empty();
        self.record(Visibility::Public, GameEvent::VoteCast { voter, target }, out);

        if !complete {
            return Ok(());
        }

        let outcome = match self.day_cycle.as_mut() {
            Some(cycle) => cycle.tally_votes(&self.roster)?,
            None => VoteOutcome::NoVotes,
        };
        tracing::info!(day = self.day, ?outcome, "vote tallied");
        self.record(
            Visibility::Public,
            GameEvent::VoteTallied {
                outcome: outcome.clone(),
            },
            out,
        );

        if let VoteOutcome::Eliminated { player, .. } = outcome
            && let Some(death) = self.eliminate(player, DeathCause::Voted)
        {
            self.record_death(&death, out);
            self.vote_anchor = Some(death.seat);
            if death.role == Role::Hunter {
                self.queue_last_stand(player, out);
            }
        }
        self.after_eliminations(out);
        Ok(())
    }

    fn last_stand(
        &mut self,
        hunter: PlayerId,
        target: PlayerId,
        out: &mut Vec<LogEntry>,
    ) -> Result<(), SessionError> {
        match self.last_stands.front() {
            None => return Err(SessionError::NoLastStand(hunter)),
            Some(front) if *front != hunter => {
                return Err(SessionError::AwaitingLastStand(*front));
            }
            Some(_) => {}
        }
        if target == hunter || !self.roster.is_alive(target) {
            return Err(SessionError::InvalidShot(target));
        }

        self.last_stands.pop_front();
        self.record(
            Visibility::Public,
            GameEvent::HunterShot { hunter, target },
            out,
        );
        if let Some(death) = self.eliminate(target, DeathCause::Shot { by: hunter }) {
            self.record_death(&death, out);
            if death.role == Role::Hunter {
                self.queue_last_stand(target, out);
            }
        }
        self.after_eliminations(out);
        Ok(())
    }

    fn lapse_last_stand(&mut self, hunter: PlayerId, out: &mut Vec<LogEntry>) {
        if self.last_stands.front() == Some(&hunter) {
            self.last_stands.pop_front();
        }
        self.record(Visibility::Public, GameEvent::LastStandLapsed { hunter }, out);
        self.after_eliminations(out);
    }

    fn queue_last_stand(&mut self, hunter: PlayerId, out: &mut Vec<LogEntry>) {
        if self.roster.alive_players(None).is_empty() {
            self.record(Visibility::Public, GameEvent::LastStandLapsed { hunter }, out);
            return;
        }
        self.last_stands.push_back(hunter);
        self.record(Visibility::Public, GameEvent::LastStandPending { hunter }, out);
    }

    fn eliminate(&mut self, player: PlayerId, cause: DeathCause) -> Option<Death> {
        if !self.roster.eliminate(player) {
            return None;
        }
        self.roster.player(player).map(|dead| Death {
            player,
            seat: dead.seat(),
            role: dead.role(),
            cause,
        })
    }

    /// Win check once every owed last stand has been taken.
    fn after_eliminations(&mut self, out: &mut Vec<LogEntry>) {
        if !self.last_stands.is_empty() {
            return;
        }
        if let Some(winner) = self.roster.check_win_condition() {
            self.end_game(winner, out);
            return;
        }
        if self.phase == GamePhase::Night && self.night.stage() == NightStage::Resolved {
            self.begin_day(out);
        }
    }

    fn begin_day(&mut self, out: &mut Vec<LogEntry>) {
        let anchor = self.night_anchor.take().or(self.vote_anchor.take());
        let cycle = DayCycle::new(self.day, &self.roster, anchor);
        let order = cycle.order().to_vec();
        let all_spoken = cycle.stage() == DayStage::AllSpoken;
        self.day_cycle = Some(cycle);
        self.phase = GamePhase::DaySpeech;
        self.deadline = None;

        tracing::info!(day = self.day, ?anchor, speakers = order.len(), "day began");
        self.record(
            Visibility::Public,
            GameEvent::DayBegan {
                day: self.day,
                order,
            },
            out,
        );
        if all_spoken && let Err(err) = self.open_voting(out) {
            tracing::error!(%err, "could not open voting on an empty day");
        }
    }

    fn end_game(&mut self, winner: Winner, out: &mut Vec<LogEntry>) {
        self.phase = GamePhase::End;
        self.winner = Some(winner);
        self.deadline = None;
        self.last_stands.clear();

        let roles = self
            .roster
            .players()
            .iter()
            .map(|player| (player.id(), player.role()))
            .collect();
        tracing::info!(%winner, day = self.day, "game over");
        self.record(Visibility::Public, GameEvent::GameEnded { winner, roles }, out);
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.phase {
            GamePhase::Setup => Err(SessionError::NotStarted),
            GamePhase::End => Err(SessionError::GameOver),
            _ => Ok(()),
        }
    }

    fn ensure_phase(&self, expected: GamePhase) -> Result<(), SessionError> {
        self.ensure_active()?;
        if let Some(hunter) = self.last_stands.front() {
            return Err(SessionError::AwaitingLastStand(*hunter));
        }
        if self.phase != expected {
            return Err(SessionError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn record_death(&mut self, death: &Death, out: &mut Vec<LogEntry>) {
        tracing::info!(
            player = %death.player,
            seat = %death.seat,
            cause = ?death.cause,
            "player eliminated"
        );
        let cause = match death.cause {
            DeathCause::Killed | DeathCause::Poisoned => DeathCause::Night,
            other => other,
        };
        self.record(
            Visibility::Public,
            GameEvent::PlayerDied {
                player: death.player,
                seat: death.seat,
                cause,
            },
            out,
        );
    }

    fn record(&mut self, visibility: Visibility, event: GameEvent, out: &mut Vec<LogEntry>) {
        out.push(self.log.push(self.day, self.phase, visibility, event));
    }

    fn ids_of(&self, team: Option<Team>) -> Vec<PlayerId> {
        self.roster
            .alive_players(team)
            .iter()
            .map(|player| player.id())
            .collect()
    }
}
