/// Soft time box for one collection step.
///
/// The core never reads a clock; hosts pass their own monotonic
/// milliseconds to [`super::GameSession::arm_deadline`] and
/// [`super::GameSession::poll_deadline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deadline {
    pub expires_at_ms: u64,
}

impl Deadline {
    /// Saturates instead of wrapping.
    pub fn after(now_ms: u64, timeout_ms: u64) -> Self {
        Self {
            expires_at_ms: now_ms.saturating_add(timeout_ms),
        }
    }

    /// Inclusive: a deadline at `t` has expired at `t`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at_ms.saturating_sub(now_ms)
    }
}
