//! Initiative entries
//!
//! One entry per combatant for the length of a combat run. Hit points live
//! on the participant; everything that only matters during the fight (turn
//! order, temp HP, conditions, death saves) lives here.

use serde::{Deserialize, Serialize};

use super::condition::Conditions;
use super::death_save::Vitality;
use super::participant::{Participant, ParticipantKey, ParticipantKind};
use super::{EntryId, ParticipantId};

/// Serialized through `EntryRecord`, which adds the flat death save fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "EntryRecord", from = "EntryRecord")]
pub struct InitiativeEntry {
    pub id: EntryId,
    pub participant_type: ParticipantKind,
    pub participant_id: ParticipantId,
    pub name: String,
    pub initiative: i32,
    /// 1-based rank in the turn order
    pub turn_order: u32,
    pub is_current_turn: bool,
    pub conditions: Conditions,
    pub temp_hp: i32,
    pub is_removed_from_combat: bool,
    pub vitality: Vitality,
}

impl InitiativeEntry {
    pub fn new(id: EntryId, participant: &Participant, initiative: i32) -> Self {
        Self {
            id,
            participant_type: participant.kind(),
            participant_id: participant.id(),
            name: participant.name().to_string(),
            initiative,
            turn_order: 0,
            is_current_turn: false,
            conditions: Conditions::new(),
            temp_hp: 0,
            is_removed_from_combat: false,
            vitality: Vitality::Conscious,
        }
    }

    pub fn participant_key(&self) -> ParticipantKey {
        ParticipantKey {
            kind: self.participant_type,
            id: self.participant_id,
        }
    }

    pub fn death_save_successes(&self) -> u8 {
        self.vitality.death_save_successes()
    }

    pub fn death_save_failures(&self) -> u8 {
        self.vitality.death_save_failures()
    }

    pub fn is_stabilized(&self) -> bool {
        self.vitality.is_stabilized()
    }
}

/// Wire form of an entry. The death save counters and stabilized flag are
/// derived from `vitality` and ignored on the way in.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryRecord {
    id: EntryId,
    participant_type: ParticipantKind,
    participant_id: ParticipantId,
    name: String,
    initiative: i32,
    turn_order: u32,
    is_current_turn: bool,
    conditions: Conditions,
    temp_hp: i32,
    is_removed_from_combat: bool,
    vitality: Vitality,
    #[serde(default)]
    death_save_successes: u8,
    #[serde(default)]
    death_save_failures: u8,
    #[serde(default)]
    is_stabilized: bool,
}

impl From<InitiativeEntry> for EntryRecord {
    fn from(entry: InitiativeEntry) -> Self {
        Self {
            death_save_successes: entry.death_save_successes(),
            death_save_failures: entry.death_save_failures(),
            is_stabilized: entry.is_stabilized(),
            id: entry.id,
            participant_type: entry.participant_type,
            participant_id: entry.participant_id,
            name: entry.name,
            initiative: entry.initiative,
            turn_order: entry.turn_order,
            is_current_turn: entry.is_current_turn,
            conditions: entry.conditions,
            temp_hp: entry.temp_hp,
            is_removed_from_combat: entry.is_removed_from_combat,
            vitality: entry.vitality,
        }
    }
}

impl From<EntryRecord> for InitiativeEntry {
    fn from(record: EntryRecord) -> Self {
        Self {
            id: record.id,
            participant_type: record.participant_type,
            participant_id: record.participant_id,
            name: record.name,
            initiative: record.initiative,
            turn_order: record.turn_order,
            is_current_turn: record.is_current_turn,
            conditions: record.conditions,
            temp_hp: record.temp_hp,
            is_removed_from_combat: record.is_removed_from_combat,
            vitality: record.vitality,
        }
    }
}

/// An initiative entry together with the participant's current stats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantView {
    #[serde(flatten)]
    pub entry: InitiativeEntry,
    pub current_hp: i32,
    pub max_hp: i32,
    pub armor_class: i32,
}

impl CombatantView {
    pub fn new(entry: &InitiativeEntry, participant: &Participant) -> Self {
        Self {
            entry: entry.clone(),
            current_hp: participant.current_hp(),
            max_hp: participant.max_hp(),
            armor_class: participant.armor_class(),
        }
    }
}
