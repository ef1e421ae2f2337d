use crate::roles::{Role, Team};

use super::{PlayerId, Seat};

/// One participant at the table.
///
/// `role` and `controlled` are fixed at construction; `alive` only ever goes
/// from true to false through [`super::PlayerRoster::eliminate`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    id: PlayerId,
    name: String,
    seat: Seat,
    role: Role,
    alive: bool,
    controlled: bool,
    declared_role: Option<Role>,
    declared_on: Option<u32>,
    pub has_voted: bool,
    pub has_spoken: bool,
}

impl Player {
    pub(crate) fn new(id: PlayerId, name: String, seat: Seat, role: Role, controlled: bool) -> Self {
        Self {
            id,
            name,
            seat,
            role,
            alive: true,
            controlled,
            declared_role: None,
            declared_on: None,
            has_voted: false,
            has_spoken: false,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn team(&self) -> Team {
        self.role.team()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// True for the single human-driven participant.
    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    /// Latest public claim, possibly false.
    pub fn declared_role(&self) -> Option<Role> {
        self.declared_role
    }

    pub(crate) fn has_declared_on(&self, day: u32) -> bool {
        self.declared_on == Some(day)
    }

    /// Records a claim. Returns false when a claim was already made on `day`.
    pub(crate) fn declare(&mut self, role: Role, day: u32) -> bool {
        if self.has_declared_on(day) {
            return false;
        }
        self.declared_role = Some(role);
        self.declared_on = Some(day);
        true
    }

    pub(crate) fn kill(&mut self) -> bool {
        let was_alive = self.alive;
        self.alive = false;
        was_alive
    }

    pub(crate) fn reset_round(&mut self) {
        self.has_voted = false;
        self.has_spoken = false;
    }
}
