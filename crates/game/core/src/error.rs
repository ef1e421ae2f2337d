//! Shared error classification for werewolf-core.
//!
//! Each rule module owns its error enum (`SetupError`, `SubmissionError`,
//! `DayError`, `SessionError`). They all implement [`GameError`] so hosts can
//! decide between asking again and giving up without matching every variant.

/// How a host should react to a rejected call.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ErrorSeverity {
    /// Bad input from a participant. Nothing changed; ask the same
    /// participant again.
    ///
    /// Examples: dead target, double vote, out-of-turn speech
    Validation,

    /// A state combination the rules never produce. Indicates a bug.
    Internal,

    /// The session cannot start.
    ///
    /// Examples: role pool does not match the player count
    Fatal,
}

impl ErrorSeverity {
    /// Resubmitting corrected input can succeed.
    pub const fn is_recoverable(self) -> bool {
        matches!(self, Self::Validation)
    }
}

/// Common trait for all werewolf-core errors.
///
/// Implementors derive `thiserror::Error` for `Display`. Codes are stable
/// SCREAMING_SNAKE strings prefixed by module (`NIGHT_`, `DAY_`, `SETUP_`,
/// `SESSION_`) for logs and tests.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn error_code(&self) -> &'static str;
}
