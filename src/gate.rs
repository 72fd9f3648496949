//! Two-state guard that keeps structural edits from overlapping.
//!
//! Edits run to completion on one thread, but a listener notified halfway
//! through an edit can ask for another one. The gate turns that request
//! into a rejection instead of a nested edit.

use std::cell::Cell;

use crate::error::Rejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Mutating,
}

#[derive(Debug, Default)]
pub struct MutationGate {
    phase: Cell<Phase>,
}

/// Held for the duration of one edit; dropping it returns the gate to `Idle`.
#[derive(Debug)]
pub struct GateTicket<'a> {
    gate: &'a MutationGate,
}

impl MutationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// `Idle -> Mutating`. Entry while `Mutating` changes nothing.
    pub fn enter(&self) -> Result<GateTicket<'_>, Rejection> {
        match self.phase.get() {
            Phase::Idle => {
                self.phase.set(Phase::Mutating);
                Ok(GateTicket { gate: self })
            }
            Phase::Mutating => Err(Rejection::Busy),
        }
    }
}

impl Drop for GateTicket<'_> {
    fn drop(&mut self) {
        self.gate.phase.set(Phase::Idle);
    }
}
