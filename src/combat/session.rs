//! Combat session aggregate
//!
//! A `CombatSession` is the combat state of one encounter: its status, the
//! round counter and the initiative entries of the current run. Turn
//! sequencing, hit points and death saves extend it from their own modules.
//! The session never talks to the roster; callers hand in the participant
//! an operation touches and persist it afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::condition::Conditions;
use super::death_save::hp_transition;
use super::entry::InitiativeEntry;
use super::error::{CombatError, Result};
use super::log::{CombatEventKind, CombatLog};
use super::participant::Participant;
use super::{CampaignId, EncounterId, EntryId};

/// Lifecycle of an encounter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterStatus {
    #[default]
    Pending,
    Active,
    Completed,
}

impl std::fmt::Display for EncounterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EncounterStatus::Pending => "pending",
            EncounterStatus::Active => "active",
            EncounterStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub struct CombatSession {
    pub encounter_id: EncounterId,
    pub campaign_id: CampaignId,
    pub status: EncounterStatus,
    pub current_round: u32,
    /// Fresh for every combat run
    pub combat_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    /// Sorted by turn order
    pub entries: Vec<InitiativeEntry>,
    pub(crate) log: CombatLog,
}

impl CombatSession {
    pub fn new(encounter_id: EncounterId, campaign_id: CampaignId) -> Self {
        Self {
            encounter_id,
            campaign_id,
            status: EncounterStatus::Pending,
            current_round: 1,
            combat_id: None,
            started_at: None,
            entries: Vec::new(),
            log: CombatLog::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EncounterStatus::Active
    }

    /// Start a fresh combat run with entries already in turn order
    pub fn begin(&mut self, entries: Vec<InitiativeEntry>) {
        self.status = EncounterStatus::Active;
        self.current_round = 1;
        self.combat_id = Some(Uuid::new_v4());
        self.started_at = Some(Utc::now());
        self.entries = entries;
        self.log.clear();

        let order = self
            .entries
            .iter()
            .map(|e| format!("{} ({})", e.name, e.initiative))
            .collect::<Vec<_>>()
            .join(", ");
        self.log.record(
            1,
            "",
            CombatEventKind::CombatStarted,
            format!("Combat started: {}", order),
        );
        if let Some(current) = self.entries.iter().find(|e| e.is_current_turn) {
            let name = current.name.clone();
            self.log.record(
                1,
                &name,
                CombatEventKind::TurnStarted,
                format!("{}'s turn", name),
            );
        }
    }

    /// End the combat run, dropping every entry
    pub fn end(&mut self, mark_complete: bool) -> EncounterStatus {
        if !self.entries.is_empty() || self.is_active() {
            self.log.record(
                self.current_round,
                "",
                CombatEventKind::CombatEnded,
                format!("Combat ended after {} round(s)", self.current_round),
            );
        }
        self.entries.clear();
        self.current_round = 1;
        self.status = if mark_complete {
            EncounterStatus::Completed
        } else {
            EncounterStatus::Pending
        };
        self.status
    }

    /// Put an active encounter back to pending because another one started
    pub fn deactivate(&mut self) {
        if self.is_active() {
            debug!("Deactivating encounter {}", self.encounter_id);
            self.end(false);
        }
    }

    pub fn index_of(&self, entry_id: EntryId) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| CombatError::NotFound(format!("initiative entry {}", entry_id)))
    }

    pub fn entry(&self, index: usize) -> &InitiativeEntry {
        &self.entries[index]
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    /// Replace the condition list of an entry
    pub fn set_conditions(&mut self, index: usize, conditions: Conditions) {
        let round = self.current_round;
        let entry = &mut self.entries[index];
        entry.conditions = conditions;
        let description = format!("{} conditions: [{}]", entry.name, entry.conditions.names().join(", "));
        let name = entry.name.clone();
        self.log
            .record(round, &name, CombatEventKind::ConditionsChanged, description);
    }

    /// Take an entry out of combat or bring it back
    ///
    /// Removal clears conditions and hands the turn on if it was theirs.
    /// Returning at 0 HP puts the participant back at 1 HP.
    pub fn set_removed(&mut self, index: usize, participant: &mut Participant, removed: bool) {
        if removed {
            self.entries[index].conditions.clear();
            self.retire(index);
            return;
        }

        let round = self.current_round;
        let entry = &mut self.entries[index];
        entry.is_removed_from_combat = false;
        let name = entry.name.clone();
        self.log.record(
            round,
            &name,
            CombatEventKind::Returned,
            format!("{} returns to combat", name),
        );

        let hp_before = participant.current_hp();
        if hp_before == 0 {
            participant.set_current_hp(1);
            let transition = hp_transition(
                self.entries[index].vitality,
                participant.can_make_death_saves(),
                hp_before,
                1,
            );
            if let Some(transition) = transition {
                self.apply_hp_transition(index, transition);
            }
        }
    }

    /// Flag an entry as removed, handing the turn on if it was theirs
    pub(crate) fn retire(&mut self, index: usize) {
        let round = self.current_round;
        let entry = &mut self.entries[index];
        let was_removed = entry.is_removed_from_combat;
        entry.is_removed_from_combat = true;
        let is_current = entry.is_current_turn;
        if !was_removed {
            let name = entry.name.clone();
            self.log.record(
                round,
                &name,
                CombatEventKind::Removed,
                format!("{} is removed from combat", name),
            );
        }

        if is_current && self.is_active() {
            self.advance_from(index);
        }
    }
}
