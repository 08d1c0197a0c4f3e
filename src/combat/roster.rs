//! Roster access
//!
//! The combat engine does not own campaigns, players or monsters. It reads
//! them through the `Roster` trait and writes back nothing but hit points.
//! `MemoryRoster` is the in-process implementation used by the binary and
//! the tests.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::error::{CombatError, Result};
use super::participant::{Monster, Participant, ParticipantKey, ParticipantKind, PlayerCharacter};
use super::{CampaignId, EncounterId, ParticipantId};

/// An encounter as the roster knows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterRecord {
    pub id: EncounterId,
    pub campaign_id: CampaignId,
    pub name: String,
}

/// Repository of combat participants
pub trait Roster: Send + Sync {
    fn encounter(&self, encounter_id: EncounterId) -> Option<EncounterRecord>;

    /// Every player in the campaign, sorted by id
    fn players(&self, campaign_id: CampaignId) -> Vec<Participant>;

    /// Every monster placed in the encounter, sorted by id
    fn monsters(&self, encounter_id: EncounterId) -> Vec<Participant>;

    fn participant(&self, key: ParticipantKey) -> Option<Participant>;

    /// Store a participant's current HP, floored at 0
    fn set_current_hp(&self, key: ParticipantKey, hp: i32) -> Result<()>;
}

/// Serializable roster contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSeed {
    #[serde(default)]
    pub encounters: Vec<EncounterRecord>,
    #[serde(default)]
    pub players: Vec<SeedPlayer>,
    #[serde(default)]
    pub monsters: Vec<SeedMonster>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedPlayer {
    pub campaign_id: CampaignId,
    #[serde(flatten)]
    pub player: PlayerCharacter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedMonster {
    pub encounter_id: EncounterId,
    #[serde(flatten)]
    pub monster: Monster,
}

#[derive(Debug, Default)]
struct RosterData {
    encounters: BTreeMap<EncounterId, EncounterRecord>,
    players: BTreeMap<ParticipantId, (CampaignId, PlayerCharacter)>,
    monsters: BTreeMap<ParticipantId, (EncounterId, Monster)>,
}

/// In-memory roster
#[derive(Debug, Default)]
pub struct MemoryRoster {
    data: RwLock<RosterData>,
}

impl MemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from seed data, checking every monster's encounter
    pub fn from_seed(seed: RosterSeed) -> Result<Self> {
        let roster = Self::new();
        for encounter in seed.encounters {
            roster.add_encounter(encounter);
        }
        for entry in seed.players {
            roster.add_player(entry.campaign_id, entry.player);
        }
        for entry in seed.monsters {
            roster.add_monster(entry.encounter_id, entry.monster)?;
        }
        Ok(roster)
    }

    pub fn add_encounter(&self, encounter: EncounterRecord) {
        self.data.write().encounters.insert(encounter.id, encounter);
    }

    /// Add or replace a player
    pub fn add_player(&self, campaign_id: CampaignId, mut player: PlayerCharacter) {
        player.current_hp = player.current_hp.max(0);
        self.data
            .write()
            .players
            .insert(player.id, (campaign_id, player));
    }

    /// Add or replace a monster. The encounter must exist.
    pub fn add_monster(&self, encounter_id: EncounterId, mut monster: Monster) -> Result<()> {
        let mut data = self.data.write();
        if !data.encounters.contains_key(&encounter_id) {
            return Err(CombatError::NotFound(format!("encounter {}", encounter_id)));
        }
        monster.current_hp = monster.current_hp.max(0);
        data.monsters.insert(monster.id, (encounter_id, monster));
        Ok(())
    }
}

impl Roster for MemoryRoster {
    fn encounter(&self, encounter_id: EncounterId) -> Option<EncounterRecord> {
        self.data.read().encounters.get(&encounter_id).cloned()
    }

    fn players(&self, campaign_id: CampaignId) -> Vec<Participant> {
        self.data
            .read()
            .players
            .values()
            .filter(|(campaign, _)| *campaign == campaign_id)
            .map(|(_, player)| Participant::Player(player.clone()))
            .collect()
    }

    fn monsters(&self, encounter_id: EncounterId) -> Vec<Participant> {
        self.data
            .read()
            .monsters
            .values()
            .filter(|(encounter, _)| *encounter == encounter_id)
            .map(|(_, monster)| Participant::Monster(monster.clone()))
            .collect()
    }

    fn participant(&self, key: ParticipantKey) -> Option<Participant> {
        let data = self.data.read();
        match key.kind {
            ParticipantKind::Player => data.players.get(&key.id).map(|(_, p)| p.clone().into()),
            ParticipantKind::Monster => data.monsters.get(&key.id).map(|(_, m)| m.clone().into()),
        }
    }

    fn set_current_hp(&self, key: ParticipantKey, hp: i32) -> Result<()> {
        let mut data = self.data.write();
        let slot = match key.kind {
            ParticipantKind::Player => data.players.get_mut(&key.id).map(|(_, p)| &mut p.current_hp),
            ParticipantKind::Monster => data.monsters.get_mut(&key.id).map(|(_, m)| &mut m.current_hp),
        };
        match slot {
            Some(current_hp) => {
                *current_hp = hp.max(0);
                Ok(())
            }
            None => Err(CombatError::NotFound(key.to_string())),
        }
    }
}
