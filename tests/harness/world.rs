//! TestWorld - a seeded roster with a combat manager on top
//!
//! Every world has campaign 1 with encounter 1. Players join campaign 1;
//! monsters join encounter 1 unless placed elsewhere.

#![allow(dead_code)]

use std::sync::Arc;

use combatd::combat::{
    CampaignId, CombatManager, CombatantView, EncounterId, EncounterRecord, EntryId, MemoryRoster, Monster,
    ParticipantKey, PlayerCharacter, Roster, ScriptedRolls, StartOptions,
};
use combatd::Config;

pub const CAMPAIGN: CampaignId = 1;
pub const ENCOUNTER: EncounterId = 1;

/// Roster plus manager, ready for combat
pub struct TestWorld {
    pub roster: Arc<MemoryRoster>,
    pub manager: Arc<CombatManager>,
}

impl TestWorld {
    pub fn builder() -> WorldBuilder {
        WorldBuilder::default()
    }

    /// Start auto-initiative combat in the default encounter
    pub async fn start(&self) -> Vec<CombatantView> {
        self.manager
            .start_combat(ENCOUNTER, StartOptions::auto())
            .await
            .expect("Failed to start combat")
    }

    /// Entry id of a participant in the default encounter
    pub async fn entry(&self, key: ParticipantKey) -> EntryId {
        self.manager
            .entry_for(ENCOUNTER, key)
            .await
            .unwrap_or_else(|| panic!("{} is not in combat", key))
    }

    /// HP as stored in the roster
    pub fn hp(&self, key: ParticipantKey) -> i32 {
        self.roster
            .participant(key)
            .unwrap_or_else(|| panic!("{} is not on the roster", key))
            .current_hp()
    }

    /// Current initiative order of the default encounter
    pub async fn order(&self) -> Vec<CombatantView> {
        self.manager
            .initiative(ENCOUNTER)
            .await
            .expect("Failed to read initiative")
            .participants
    }

    /// Combatant holding the turn
    pub async fn current(&self) -> CombatantView {
        let order = self.order().await;
        let holders: Vec<_> = order.into_iter().filter(|v| v.entry.is_current_turn).collect();
        assert_eq!(holders.len(), 1, "exactly one combatant should hold the turn");
        holders.into_iter().next().unwrap()
    }

    pub async fn view(&self, key: ParticipantKey) -> CombatantView {
        self.order()
            .await
            .into_iter()
            .find(|v| v.entry.participant_key() == key)
            .unwrap_or_else(|| panic!("{} is not in combat", key))
    }
}

#[derive(Default)]
pub struct WorldBuilder {
    encounters: Vec<EncounterRecord>,
    players: Vec<PlayerCharacter>,
    monsters: Vec<(EncounterId, Monster)>,
    rolls: Vec<i32>,
    config: Option<Config>,
}

impl WorldBuilder {
    /// Player with full HP in the default campaign
    pub fn player(self, id: u64, name: &str, max_hp: i32, bonus: i32) -> Self {
        self.player_with(PlayerCharacter {
            id,
            name: name.to_string(),
            max_hp,
            current_hp: max_hp,
            armor_class: 14,
            initiative_bonus: bonus,
            is_active: true,
        })
    }

    pub fn player_with(mut self, player: PlayerCharacter) -> Self {
        self.players.push(player);
        self
    }

    /// Monster in the default encounter that dies at 0 HP
    pub fn monster(self, id: u64, name: &str, max_hp: i32, bonus: i32) -> Self {
        self.monster_in(ENCOUNTER, monster(id, name, max_hp, bonus, false))
    }

    /// Monster in the default encounter that rolls death saves
    pub fn saving_monster(self, id: u64, name: &str, max_hp: i32, bonus: i32) -> Self {
        self.monster_in(ENCOUNTER, monster(id, name, max_hp, bonus, true))
    }

    pub fn monster_in(mut self, encounter_id: EncounterId, monster: Monster) -> Self {
        self.monsters.push((encounter_id, monster));
        self
    }

    /// Extra encounter in the given campaign
    pub fn encounter(mut self, id: EncounterId, campaign_id: CampaignId, name: &str) -> Self {
        self.encounters.push(EncounterRecord {
            id,
            campaign_id,
            name: name.to_string(),
        });
        self
    }

    /// Fixed d20 results, cycled
    pub fn rolls(mut self, rolls: &[i32]) -> Self {
        self.rolls = rolls.to_vec();
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> TestWorld {
        let roster = MemoryRoster::new();
        roster.add_encounter(EncounterRecord {
            id: ENCOUNTER,
            campaign_id: CAMPAIGN,
            name: "Test Encounter".to_string(),
        });
        for encounter in self.encounters {
            roster.add_encounter(encounter);
        }
        for player in self.players {
            roster.add_player(CAMPAIGN, player);
        }
        for (encounter_id, monster) in self.monsters {
            roster
                .add_monster(encounter_id, monster)
                .expect("Failed to add monster");
        }

        let roster = Arc::new(roster);
        let config = self.config.unwrap_or_default();
        let rolls = if self.rolls.is_empty() { vec![10] } else { self.rolls };
        let manager = CombatManager::shared(roster.clone(), Arc::new(ScriptedRolls::new(rolls)), config);
        TestWorld { roster, manager }
    }
}

pub fn monster(id: u64, name: &str, max_hp: i32, bonus: i32, allow_death_saves: bool) -> Monster {
    Monster {
        id,
        name: name.to_string(),
        max_hp,
        current_hp: max_hp,
        armor_class: 12,
        initiative_bonus: bonus,
        allow_death_saves,
    }
}
