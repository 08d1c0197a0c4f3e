//! Combat engine
//!
//! Runs tabletop-RPG encounters:
//! - Initiative rolling and turn order
//! - Turn sequencing with removed combatants skipped and rounds counted
//! - Hit points with temporary HP soaking damage first
//! - Conditions, including automatic `unconscious`
//! - Death saves for players and flagged monsters
//! - A per-encounter combat log

mod condition;
mod death_save;
mod dice;
mod entry;
mod error;
mod hit_points;
mod initiative;
mod log;
mod manager;
mod participant;
mod roster;
mod session;
mod turns;

/// Campaign identifier
pub type CampaignId = u64;
/// Encounter identifier
pub type EncounterId = u64;
/// Initiative entry identifier, unique across a manager
pub type EntryId = u64;
/// Player or monster identifier, unique within its kind
pub type ParticipantId = u64;

pub use condition::{
    parse_conditions, Condition, Conditions, CustomCondition, CustomTag, DEAD, STABILIZED, UNCONSCIOUS,
};
pub use death_save::{hp_transition, DeathSaveOutcome, HpTransition, Vitality, DEATH_SAVE_THRESHOLD};
pub use dice::{roll_d20, Roller, ScriptedRolls, SeededRoller, ThreadRoller, D20_SIDES};
pub use entry::{CombatantView, InitiativeEntry};
pub use error::{CombatError, Result};
pub use hit_points::{resolve_hp, HpResolution};
pub use initiative::{build_initiative, InitiativeMode, StartOptions};
pub use log::{CombatEvent, CombatEventKind, CombatLog};
pub use manager::{CombatManager, InitiativeSnapshot, TurnAdvance};
pub use participant::{Monster, Participant, ParticipantKey, ParticipantKind, PlayerCharacter};
pub use roster::{EncounterRecord, MemoryRoster, Roster, RosterSeed, SeedMonster, SeedPlayer};
pub use session::{CombatSession, EncounterStatus};
pub use turns::next_turn_index;
