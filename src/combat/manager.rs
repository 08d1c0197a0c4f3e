//! Combat manager
//!
//! Hosts every combat operation. Sessions are created lazily per encounter
//! and each sits behind its own async mutex, so operations on one encounter
//! run one at a time while different encounters proceed independently.
//!
//! Lock order is session mutex before `entry_index`. Lookups through
//! `entry_index` drop that guard before awaiting a session lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::condition::Conditions;
use super::death_save::DeathSaveOutcome;
use super::dice::{Roller, SeededRoller, ThreadRoller};
use super::entry::CombatantView;
use super::error::{CombatError, Result};
use super::initiative::{build_initiative, StartOptions};
use super::log::CombatEvent;
use super::participant::{Participant, ParticipantKey};
use super::roster::Roster;
use super::session::{CombatSession, EncounterStatus};
use super::{CampaignId, EncounterId, EntryId};
use crate::config::Config;

/// Current state of an encounter's initiative order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeSnapshot {
    pub combat_id: Option<Uuid>,
    pub status: EncounterStatus,
    pub current_round: u32,
    pub participants: Vec<CombatantView>,
}

/// Result of passing the turn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnAdvance {
    pub current_round: u32,
    pub next_participant: CombatantView,
}

#[derive(Clone)]
struct SessionHandle {
    campaign_id: CampaignId,
    session: Arc<Mutex<CombatSession>>,
}

/// Owns all combat sessions
pub struct CombatManager {
    roster: Arc<dyn Roster>,
    roller: Arc<dyn Roller>,
    config: Config,
    sessions: RwLock<HashMap<EncounterId, SessionHandle>>,
    /// Entry id -> encounter holding it
    entry_index: RwLock<HashMap<EntryId, EncounterId>>,
    next_entry_id: AtomicU64,
}

impl CombatManager {
    /// Create a combat manager over a roster
    pub fn new(roster: Arc<dyn Roster>, roller: Arc<dyn Roller>, config: Config) -> Self {
        Self {
            roster,
            roller,
            config,
            sessions: RwLock::new(HashMap::new()),
            entry_index: RwLock::new(HashMap::new()),
            next_entry_id: AtomicU64::new(1),
        }
    }

    /// Create a shared instance
    pub fn shared(roster: Arc<dyn Roster>, roller: Arc<dyn Roller>, config: Config) -> Arc<Self> {
        Arc::new(Self::new(roster, roller, config))
    }

    /// Create a manager whose dice follow the configured seed, if any
    pub fn from_config(roster: Arc<dyn Roster>, config: Config) -> Self {
        let roller: Arc<dyn Roller> = match config.dice_seed {
            Some(seed) => Arc::new(SeededRoller::new(seed)),
            None => Arc::new(ThreadRoller),
        };
        Self::new(roster, roller, config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Session handle for an encounter, created on first use
    async fn handle(&self, encounter_id: EncounterId) -> Result<SessionHandle> {
        if let Some(handle) = self.sessions.read().await.get(&encounter_id) {
            return Ok(handle.clone());
        }

        let record = self
            .roster
            .encounter(encounter_id)
            .ok_or_else(|| CombatError::NotFound(format!("encounter {}", encounter_id)))?;

        let mut sessions = self.sessions.write().await;
        let handle = sessions.entry(encounter_id).or_insert_with(|| SessionHandle {
            campaign_id: record.campaign_id,
            session: Arc::new(Mutex::new(CombatSession::new(encounter_id, record.campaign_id))),
        });
        Ok(handle.clone())
    }

    /// Session holding an initiative entry
    async fn handle_for_entry(&self, entry_id: EntryId) -> Result<SessionHandle> {
        let encounter_id = self
            .entry_index
            .read()
            .await
            .get(&entry_id)
            .copied()
            .ok_or_else(|| CombatError::NotFound(format!("initiative entry {}", entry_id)))?;
        self.handle(encounter_id).await
    }

    fn load_participant(&self, key: ParticipantKey) -> Result<Participant> {
        self.roster
            .participant(key)
            .ok_or_else(|| CombatError::NotFound(key.to_string()))
    }

    async fn unindex(&self, session: &CombatSession) {
        let mut index = self.entry_index.write().await;
        for entry in &session.entries {
            index.remove(&entry.id);
        }
    }

    /// Views for every entry, in turn order
    fn views(&self, session: &CombatSession) -> Vec<CombatantView> {
        session
            .entries
            .iter()
            .filter_map(|entry| match self.roster.participant(entry.participant_key()) {
                Some(participant) => Some(CombatantView::new(entry, &participant)),
                None => {
                    warn!(
                        "Encounter {}: {} is no longer on the roster",
                        session.encounter_id,
                        entry.participant_key()
                    );
                    None
                }
            })
            .collect()
    }

    /// Start combat in an encounter
    ///
    /// Any other active encounter in the same campaign is put back to
    /// pending. Returns the new initiative order.
    pub async fn start_combat(
        &self,
        encounter_id: EncounterId,
        options: StartOptions,
    ) -> Result<Vec<CombatantView>> {
        let target = self.handle(encounter_id).await?;

        // Lock every session of the campaign in ascending encounter order
        let mut siblings: Vec<(EncounterId, SessionHandle)> = self
            .sessions
            .read()
            .await
            .iter()
            .filter(|(_, h)| h.campaign_id == target.campaign_id)
            .map(|(id, h)| (*id, h.clone()))
            .collect();
        siblings.sort_by_key(|(id, _)| *id);

        let mut guards: Vec<(EncounterId, OwnedMutexGuard<CombatSession>)> = Vec::with_capacity(siblings.len());
        for (id, handle) in siblings {
            guards.push((id, handle.session.lock_owned().await));
        }

        let Some(target_pos) = guards.iter().position(|(id, _)| *id == encounter_id) else {
            return Err(CombatError::NotFound(format!("encounter {}", encounter_id)));
        };
        if guards[target_pos].1.is_active() {
            warn!("Encounter {} is already in combat", encounter_id);
            return Err(CombatError::AlreadyActive(encounter_id));
        }

        let mut players: Vec<Participant> = self
            .roster
            .players(target.campaign_id)
            .into_iter()
            .filter(|p| p.is_active())
            .collect();
        let mut monsters = self.roster.monsters(encounter_id);
        let reset = options
            .reset_to_full_health
            .unwrap_or(self.config.reset_to_full_health);

        let previous_hp: Vec<(ParticipantKey, i32)> = players
            .iter()
            .chain(monsters.iter())
            .map(|p| (p.key(), p.current_hp()))
            .collect();

        let entries = build_initiative(
            &mut players,
            &mut monsters,
            &options,
            reset,
            self.roller.as_ref(),
            || self.next_entry_id.fetch_add(1, Ordering::Relaxed),
        )?;

        if reset {
            self.write_reset_hp(&players, &monsters, &previous_hp)?;
        }

        for (id, session) in guards.iter_mut() {
            if *id != encounter_id && session.is_active() {
                info!("Encounter {} deactivated by start of encounter {}", id, encounter_id);
                self.unindex(&**session).await;
                session.deactivate();
            }
        }

        let session = &mut *guards[target_pos].1;
        self.unindex(session).await;
        session.begin(entries);
        {
            let mut index = self.entry_index.write().await;
            for entry in &session.entries {
                index.insert(entry.id, encounter_id);
            }
        }

        info!(
            "Combat started in encounter {} ({} combatants, reset to full health: {})",
            encounter_id,
            session.entries.len(),
            reset
        );

        let by_key: HashMap<ParticipantKey, &Participant> = players
            .iter()
            .chain(monsters.iter())
            .map(|p| (p.key(), p))
            .collect();
        Ok(session
            .entries
            .iter()
            .filter_map(|entry| {
                by_key
                    .get(&entry.participant_key())
                    .map(|p| CombatantView::new(entry, p))
            })
            .collect())
    }

    /// Store reset HP for every combatant. On a failed write the ones
    /// already stored are put back to `previous`.
    fn write_reset_hp(
        &self,
        players: &[Participant],
        monsters: &[Participant],
        previous: &[(ParticipantKey, i32)],
    ) -> Result<()> {
        for (written, participant) in players.iter().chain(monsters.iter()).enumerate() {
            if let Err(err) = self
                .roster
                .set_current_hp(participant.key(), participant.current_hp())
            {
                for (key, hp) in &previous[..written] {
                    if let Err(restore) = self.roster.set_current_hp(*key, *hp) {
                        warn!("Failed to restore HP of {:?}: {}", key, restore);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Current initiative order of an encounter
    pub async fn initiative(&self, encounter_id: EncounterId) -> Result<InitiativeSnapshot> {
        let handle = self.handle(encounter_id).await?;
        let session = handle.session.lock().await;
        Ok(InitiativeSnapshot {
            combat_id: session.combat_id,
            status: session.status,
            current_round: session.current_round,
            participants: self.views(&session),
        })
    }

    /// Pass the turn to the next combatant still in the fight
    pub async fn advance_turn(&self, encounter_id: EncounterId) -> Result<TurnAdvance> {
        let handle = self.handle(encounter_id).await?;
        let mut session = handle.session.lock().await;
        let next = session.advance_turn()?;

        let entry = session.entry(next);
        let participant = self.load_participant(entry.participant_key())?;
        Ok(TurnAdvance {
            current_round: session.current_round,
            next_participant: CombatantView::new(entry, &participant),
        })
    }

    /// Run `op` against an entry and its participant, then persist HP
    async fn with_entry<T>(
        &self,
        entry_id: EntryId,
        op: impl FnOnce(&mut CombatSession, usize, &mut Participant) -> Result<T>,
    ) -> Result<(T, CombatantView)> {
        let handle = self.handle_for_entry(entry_id).await?;
        let mut session = handle.session.lock().await;
        let index = session.index_of(entry_id)?;
        let key = session.entry(index).participant_key();
        let mut participant = self.load_participant(key)?;
        let hp_before = participant.current_hp();

        // Work on a copy; the session only changes once the roster write lands
        let mut working = session.clone();
        let result = op(&mut working, index, &mut participant)?;

        if participant.current_hp() != hp_before {
            self.roster.set_current_hp(key, participant.current_hp())?;
        }
        let view = CombatantView::new(working.entry(index), &participant);
        *session = working;
        Ok((result, view))
    }

    /// Set a combatant's HP. Drops are absorbed by temp HP first.
    pub async fn apply_hp(&self, entry_id: EntryId, new_hp: i32) -> Result<CombatantView> {
        let (transition, view) = self
            .with_entry(entry_id, |session, index, participant| {
                Ok(session.apply_hp(index, participant, new_hp))
            })
            .await?;
        debug!(
            "Entry {} set to {} HP ({} temp), transition {:?}",
            entry_id, view.current_hp, view.entry.temp_hp, transition
        );
        Ok(view)
    }

    /// Deal damage to a combatant
    pub async fn damage(&self, entry_id: EntryId, amount: i32) -> Result<CombatantView> {
        if amount < 0 {
            return Err(CombatError::OutOfRange(format!(
                "damage must not be negative (got {})",
                amount
            )));
        }
        let (_, view) = self
            .with_entry(entry_id, |session, index, participant| {
                let target = participant.current_hp() - amount;
                Ok(session.apply_hp(index, participant, target))
            })
            .await?;
        debug!("Entry {} takes {} damage", entry_id, amount);
        Ok(view)
    }

    /// Heal a combatant, up to max HP
    pub async fn heal(&self, entry_id: EntryId, amount: i32) -> Result<CombatantView> {
        if amount < 0 {
            return Err(CombatError::OutOfRange(format!(
                "healing must not be negative (got {})",
                amount
            )));
        }
        let (_, view) = self
            .with_entry(entry_id, |session, index, participant| {
                let target = participant.current_hp().saturating_add(amount);
                Ok(session.apply_hp(index, participant, target))
            })
            .await?;
        debug!("Entry {} heals {}", entry_id, amount);
        Ok(view)
    }

    /// Grant temporary HP on top of any already held
    pub async fn add_temp_hp(&self, entry_id: EntryId, amount: i32) -> Result<CombatantView> {
        let (_, view) = self
            .with_entry(entry_id, |session, index, _| session.add_temp_hp(index, amount))
            .await?;
        Ok(view)
    }

    /// Replace a combatant's conditions
    pub async fn set_conditions(&self, entry_id: EntryId, conditions: Conditions) -> Result<CombatantView> {
        let (_, view) = self
            .with_entry(entry_id, |session, index, _| {
                session.set_conditions(index, conditions);
                Ok(())
            })
            .await?;
        Ok(view)
    }

    /// Take a combatant out of the turn order or bring it back
    pub async fn set_removed(&self, entry_id: EntryId, removed: bool) -> Result<CombatantView> {
        let (_, view) = self
            .with_entry(entry_id, |session, index, participant| {
                session.set_removed(index, participant, removed);
                Ok(())
            })
            .await?;
        debug!("Entry {} removed from combat: {}", entry_id, removed);
        Ok(view)
    }

    /// Record death save successes and failures for a dying combatant
    pub async fn record_death_save(
        &self,
        entry_id: EntryId,
        successes_delta: i32,
        failures_delta: i32,
    ) -> Result<CombatantView> {
        let (outcome, view) = self
            .with_entry(entry_id, |session, index, participant| {
                session.record_death_save(index, participant, successes_delta, failures_delta)
            })
            .await?;
        match outcome {
            DeathSaveOutcome::Stabilized => info!("{} stabilized", view.entry.name),
            DeathSaveOutcome::Died => info!("{} died from failed death saves", view.entry.name),
            DeathSaveOutcome::Pending { .. } => {}
        }
        Ok(view)
    }

    /// End combat in an encounter, discarding its initiative order
    pub async fn end_combat(&self, encounter_id: EncounterId, mark_complete: bool) -> Result<EncounterStatus> {
        let handle = self.handle(encounter_id).await?;
        let mut session = handle.session.lock().await;
        self.unindex(&session).await;
        let rounds = session.current_round;
        let status = session.end(mark_complete);
        info!(
            "Combat ended in encounter {} after {} round(s), now {}",
            encounter_id, rounds, status
        );
        Ok(status)
    }

    /// Event journal of the current or most recent combat run
    pub async fn combat_log(&self, encounter_id: EncounterId) -> Result<Vec<CombatEvent>> {
        let handle = self.handle(encounter_id).await?;
        let session = handle.session.lock().await;
        Ok(session.log().events().to_vec())
    }

    /// Initiative entry of a participant in an encounter, if it is in combat
    pub async fn entry_for(&self, encounter_id: EncounterId, key: ParticipantKey) -> Option<EntryId> {
        let handle = self.sessions.read().await.get(&encounter_id).cloned()?;
        let session = handle.session.lock().await;
        session
            .entries
            .iter()
            .find(|e| e.participant_key() == key)
            .map(|e| e.id)
    }
}
