//! Initiative building
//!
//! Rolls (or accepts) an initiative for every combatant and lays out the
//! turn order: highest initiative first, ties going to the lower participant
//! id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::condition::{Condition, DEAD, UNCONSCIOUS};
use super::death_save::Vitality;
use super::dice::Roller;
use super::entry::InitiativeEntry;
use super::error::{CombatError, Result};
use super::participant::Participant;
use super::{EntryId, ParticipantId};

/// How player initiative is decided
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitiativeMode {
    /// Everyone rolls d20 + bonus
    #[default]
    Auto,
    /// Players supply their own rolls; monsters still roll
    Manual,
}

/// Options for starting combat
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOptions {
    #[serde(default)]
    pub mode: InitiativeMode,
    /// Player id -> initiative, used in manual mode
    #[serde(default)]
    pub manual: BTreeMap<ParticipantId, i32>,
    /// Restore everyone to max HP first. `None` uses the configured default.
    #[serde(default)]
    pub reset_to_full_health: Option<bool>,
}

impl StartOptions {
    pub fn auto() -> Self {
        Self::default()
    }

    pub fn manual(initiatives: impl IntoIterator<Item = (ParticipantId, i32)>) -> Self {
        Self {
            mode: InitiativeMode::Manual,
            manual: initiatives.into_iter().collect(),
            reset_to_full_health: None,
        }
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset_to_full_health = Some(reset);
        self
    }
}

/// Roll initiative and build the ordered entries for a new combat run
///
/// Validation happens before anything is touched, so on error `players` and
/// `monsters` are unchanged. With `reset` both lists are restored to max HP.
pub fn build_initiative(
    players: &mut [Participant],
    monsters: &mut [Participant],
    options: &StartOptions,
    reset: bool,
    roller: &dyn Roller,
    mut next_id: impl FnMut() -> EntryId,
) -> Result<Vec<InitiativeEntry>> {
    if players.is_empty() || monsters.is_empty() {
        return Err(CombatError::NoParticipants);
    }

    if options.mode == InitiativeMode::Manual {
        if let Some(missing) = players.iter().find(|p| !options.manual.contains_key(&p.id())) {
            return Err(CombatError::MissingInitiative(missing.name().to_string()));
        }
    }

    if reset {
        for participant in players.iter_mut().chain(monsters.iter_mut()) {
            let max_hp = participant.max_hp();
            participant.set_current_hp(max_hp);
        }
    }

    let mut rolled: Vec<(&Participant, i32)> = Vec::with_capacity(players.len() + monsters.len());
    for player in players.iter() {
        let initiative = match options.mode {
            InitiativeMode::Manual => options.manual[&player.id()],
            InitiativeMode::Auto => roller.d20().saturating_add(player.initiative_bonus()),
        };
        rolled.push((player, initiative));
    }
    for monster in monsters.iter() {
        rolled.push((monster, roller.d20().saturating_add(monster.initiative_bonus())));
    }

    rolled.sort_by(|(a, a_init), (b, b_init)| b_init.cmp(a_init).then(a.key().cmp(&b.key())));

    let mut entries: Vec<InitiativeEntry> = rolled
        .into_iter()
        .enumerate()
        .map(|(rank, (participant, initiative))| {
            let mut entry = InitiativeEntry::new(next_id(), participant, initiative);
            entry.turn_order = rank as u32 + 1;
            if participant.current_hp() == 0 {
                if participant.can_make_death_saves() {
                    entry.vitality = Vitality::dying();
                    entry.conditions.insert(Condition::standard(UNCONSCIOUS));
                } else {
                    entry.vitality = Vitality::Dead;
                    entry.is_removed_from_combat = true;
                    entry.conditions.set_only(DEAD);
                }
            }
            entry
        })
        .collect();

    let first = entries
        .iter()
        .position(|e| !e.is_removed_from_combat)
        .unwrap_or(0);
    entries[first].is_current_turn = true;

    Ok(entries)
}
