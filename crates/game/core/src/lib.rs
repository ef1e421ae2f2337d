//! Deterministic Werewolf rules shared by every host.
//!
//! `werewolf-core` owns the canonical game: role pools, the roster, night
//! resolution, the day cycle and the phase state machine. It performs no
//! I/O and reads no clock. All state mutation flows through
//! [`session::GameSession`]; automated participants decide through a
//! [`policy::DecisionPolicy`].
pub mod config;
pub mod day;
pub mod error;
pub mod night;
pub mod policy;
pub mod rng;
pub mod roles;
pub mod session;
pub mod state;

pub use config::GameConfig;
pub use day::{Accusation, DayCycle, DayError, DayStage, Speech, VoteOutcome, VoteTally};
pub use error::{ErrorSeverity, GameError};
pub use night::{
    Death, DeathCause, Investigation, NightAction, NightActionKind, NightActionSet, NightOutcome,
    NightResolver, NightStage, SubmissionError, WitchPotions,
};
pub use policy::{
    DecisionContext, DecisionPolicy, FirstEligiblePolicy, HeuristicPolicy, PolicyKind,
    WitchDecision,
};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use roles::{Role, RoleCatalog, RoleChoice, RoleSlot, SetupError, Team};
pub use session::{
    Awaiting, Deadline, DecisionKind, EventLog, GameEvent, GameSession, LogEntry,
    PendingDecision, PlayerView, SessionError, SessionSetup, SessionView, Visibility,
};
pub use state::{GamePhase, Lineup, Player, PlayerId, PlayerRoster, Seat, Winner};
