//! Death save state machine
//!
//! A combatant is `Conscious` until it drops to 0 HP. Save-eligible
//! combatants then start `Dying` and roll death saves: three successes
//! stabilize them at 1 HP, three failures kill them. Everyone else dies on
//! the spot. Healing above 0 HP returns any of these states to `Conscious`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::condition::{Condition, DEAD, STABILIZED, UNCONSCIOUS};
use super::error::{CombatError, Result};
use super::log::CombatEventKind;
use super::participant::Participant;
use super::session::CombatSession;

/// Successes or failures needed to leave the dying state
pub const DEATH_SAVE_THRESHOLD: u8 = 3;

/// Life state of a combatant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Vitality {
    #[default]
    Conscious,
    Dying {
        successes: u8,
        failures: u8,
    },
    Stabilized,
    Dead,
}

impl Vitality {
    /// Fresh dying state with both counters at zero
    pub fn dying() -> Self {
        Vitality::Dying {
            successes: 0,
            failures: 0,
        }
    }

    pub fn death_save_successes(&self) -> u8 {
        match self {
            Vitality::Dying { successes, .. } => *successes,
            _ => 0,
        }
    }

    pub fn death_save_failures(&self) -> u8 {
        match self {
            Vitality::Dying { failures, .. } => *failures,
            _ => 0,
        }
    }

    pub fn is_dying(&self) -> bool {
        matches!(self, Vitality::Dying { .. })
    }

    pub fn is_stabilized(&self) -> bool {
        matches!(self, Vitality::Stabilized)
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Vitality::Dead)
    }

    /// Apply a death save result to a dying combatant
    ///
    /// Deltas may be negative to correct a mistaken entry. Reaching the
    /// threshold on successes wins over failures when both land at once.
    pub fn record_death_save(&self, successes_delta: i32, failures_delta: i32) -> Result<DeathSaveOutcome> {
        let Vitality::Dying { successes, failures } = *self else {
            return Err(CombatError::NotEligible(
                "death saves are only rolled while dying".to_string(),
            ));
        };

        let successes = i32::from(successes) + successes_delta;
        let failures = i32::from(failures) + failures_delta;
        let range = 0..=i32::from(DEATH_SAVE_THRESHOLD);
        if !range.contains(&successes) || !range.contains(&failures) {
            return Err(CombatError::OutOfRange(format!(
                "death saves must stay within 0-{} (successes {}, failures {})",
                DEATH_SAVE_THRESHOLD, successes, failures
            )));
        }

        // Both values are in 0..=3 here
        let successes = successes as u8;
        let failures = failures as u8;
        Ok(if successes == DEATH_SAVE_THRESHOLD {
            DeathSaveOutcome::Stabilized
        } else if failures == DEATH_SAVE_THRESHOLD {
            DeathSaveOutcome::Died
        } else {
            DeathSaveOutcome::Pending { successes, failures }
        })
    }
}

/// Result of recording a death save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathSaveOutcome {
    Pending { successes: u8, failures: u8 },
    Stabilized,
    Died,
}

/// State change caused by a hit point update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HpTransition {
    /// Dropped to 0 HP and started rolling death saves
    FellUnconscious,
    /// Dropped to 0 HP without death saves
    Died,
    /// Back above 0 HP from dying, stabilized or dead
    Revived,
}

/// Work out what an HP change does to a combatant's life state
pub fn hp_transition(
    vitality: Vitality,
    eligible: bool,
    hp_before: i32,
    hp_after: i32,
) -> Option<HpTransition> {
    if hp_after == 0 {
        return match vitality {
            Vitality::Conscious | Vitality::Stabilized if eligible => Some(HpTransition::FellUnconscious),
            Vitality::Conscious | Vitality::Stabilized => Some(HpTransition::Died),
            Vitality::Dying { .. } | Vitality::Dead => None,
        };
    }

    let healed = hp_before == 0 || hp_after > hp_before;
    match vitality {
        Vitality::Conscious => None,
        _ if healed => Some(HpTransition::Revived),
        _ => None,
    }
}

impl CombatSession {
    /// Apply an HP transition to the entry at `index`
    pub(crate) fn apply_hp_transition(&mut self, index: usize, transition: HpTransition) {
        let round = self.current_round;
        let entry = &mut self.entries[index];
        let name = entry.name.clone();

        match transition {
            HpTransition::FellUnconscious => {
                entry.vitality = Vitality::dying();
                entry.conditions.remove(STABILIZED);
                entry.conditions.insert(Condition::standard(UNCONSCIOUS));
                self.log.record(
                    round,
                    &name,
                    CombatEventKind::FellUnconscious,
                    format!("{} falls unconscious", name),
                );
            }
            HpTransition::Died => {
                entry.conditions.set_only(DEAD);
                self.kill(index);
            }
            HpTransition::Revived => {
                entry.vitality = Vitality::Conscious;
                entry.conditions.remove(UNCONSCIOUS);
                entry.conditions.remove(DEAD);
                entry.conditions.remove(STABILIZED);
                self.log.record(
                    round,
                    &name,
                    CombatEventKind::Healing,
                    format!("{} is back on their feet", name),
                );
            }
        }
    }

    /// Mark the entry dead and take it out of the turn order.
    /// Callers rewrite conditions first.
    pub(crate) fn kill(&mut self, index: usize) {
        let round = self.current_round;
        let entry = &mut self.entries[index];
        entry.vitality = Vitality::Dead;
        let name = entry.name.clone();
        self.log
            .record(round, &name, CombatEventKind::Died, format!("{} dies", name));
        self.retire(index);
    }

    /// Record a death save for the entry at `index`
    ///
    /// `participant` is updated in place when the combatant stabilizes.
    pub fn record_death_save(
        &mut self,
        index: usize,
        participant: &mut Participant,
        successes_delta: i32,
        failures_delta: i32,
    ) -> Result<DeathSaveOutcome> {
        if participant.current_hp() != 0 {
            return Err(CombatError::NotEligible(format!(
                "{} is not at 0 HP",
                participant.name()
            )));
        }
        if !participant.can_make_death_saves() {
            return Err(CombatError::NotEligible(format!(
                "{} does not make death saves",
                participant.name()
            )));
        }

        let outcome = self.entries[index]
            .vitality
            .record_death_save(successes_delta, failures_delta)?;
        let round = self.current_round;
        let name = self.entries[index].name.clone();
        debug!("Death save for {}: {:?}", name, outcome);

        match outcome {
            DeathSaveOutcome::Pending { successes, failures } => {
                self.entries[index].vitality = Vitality::Dying { successes, failures };
                self.log.record(
                    round,
                    &name,
                    CombatEventKind::DeathSave,
                    format!("{} death saves: {} successes, {} failures", name, successes, failures),
                );
            }
            DeathSaveOutcome::Stabilized => {
                participant.set_current_hp(1);
                let entry = &mut self.entries[index];
                entry.vitality = Vitality::Stabilized;
                entry.conditions.replace(UNCONSCIOUS, STABILIZED);
                self.log.record(
                    round,
                    &name,
                    CombatEventKind::Stabilized,
                    format!("{} stabilizes at 1 HP", name),
                );
            }
            DeathSaveOutcome::Died => {
                self.entries[index].conditions.replace(UNCONSCIOUS, DEAD);
                self.kill(index);
            }
        }

        Ok(outcome)
    }
}
