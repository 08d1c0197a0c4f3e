//! Turn sequencing
//!
//! The turn passes down the initiative order, skipping anyone removed from
//! combat, and a new round begins whenever it wraps back to the top.

use tracing::debug;

use super::entry::InitiativeEntry;
use super::error::{CombatError, Result};
use super::log::CombatEventKind;
use super::session::CombatSession;

/// Find who acts after the entry at `current`
///
/// Walks the order circularly, skipping removed entries. If everyone is
/// removed the plain next index is used. The flag reports whether the walk
/// wrapped past the end of the order.
pub fn next_turn_index(entries: &[InitiativeEntry], current: usize) -> (usize, bool) {
    let len = entries.len();
    for step in 1..=len {
        let candidate = current + step;
        if !entries[candidate % len].is_removed_from_combat {
            return (candidate % len, candidate >= len);
        }
    }
    let candidate = current + 1;
    (candidate % len, candidate >= len)
}

impl CombatSession {
    /// Index of the entry holding the turn, defaulting to the top of the order
    pub fn current_index(&self) -> usize {
        self.entries
            .iter()
            .position(|e| e.is_current_turn)
            .unwrap_or(0)
    }

    /// Pass the turn to the next combatant. Returns the new current index.
    pub fn advance_turn(&mut self) -> Result<usize> {
        if self.entries.is_empty() {
            return Err(CombatError::NoParticipants);
        }
        let current = self.current_index();
        Ok(self.advance_from(current))
    }

    /// Hand the turn on from `current`, bumping the round on wraparound
    pub(crate) fn advance_from(&mut self, current: usize) -> usize {
        let (next, wrapped) = next_turn_index(&self.entries, current);
        if wrapped {
            self.current_round += 1;
        }

        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.is_current_turn = i == next;
        }

        let name = self.entries[next].name.clone();
        debug!(
            "Encounter {} round {}: turn passes to {}",
            self.encounter_id, self.current_round, name
        );
        self.log.record(
            self.current_round,
            &name,
            CombatEventKind::TurnStarted,
            format!("{}'s turn", name),
        );
        next
    }
}
