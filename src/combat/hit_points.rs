//! Hit point resolution
//!
//! Callers ask for a new HP value. A drop is damage and is soaked by
//! temporary hit points before it touches real ones; a rise is healing and
//! leaves temporary hit points alone.

use super::death_save::{hp_transition, HpTransition};
use super::error::{CombatError, Result};
use super::log::CombatEventKind;
use super::participant::Participant;
use super::session::CombatSession;

/// Hit points after resolving a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpResolution {
    pub current_hp: i32,
    pub temp_hp: i32,
}

/// Resolve a requested HP value against current and temporary HP
///
/// Works in `i64` so any `i32` request resolves without overflow. The result
/// never drops below 0, and healing never goes past `max_hp`.
pub fn resolve_hp(current_hp: i32, temp_hp: i32, new_hp: i32, max_hp: i32) -> HpResolution {
    let delta = i64::from(new_hp) - i64::from(current_hp);
    if delta >= 0 {
        return HpResolution {
            current_hp: new_hp.min(max_hp.max(current_hp)).max(0),
            temp_hp,
        };
    }

    let damage = -delta;
    let temp = i64::from(temp_hp);
    if damage <= temp {
        return HpResolution {
            current_hp,
            temp_hp: narrow(temp - damage),
        };
    }

    let remaining = damage - temp;
    HpResolution {
        current_hp: narrow((i64::from(current_hp) - remaining).max(0)),
        temp_hp: 0,
    }
}

/// Narrow back to `i32`; callers only pass values between two `i32` inputs
fn narrow(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

impl CombatSession {
    /// Set a combatant's HP, running the unconscious/death-save rules
    ///
    /// `participant` is updated in place; the caller persists it.
    pub fn apply_hp(
        &mut self,
        index: usize,
        participant: &mut Participant,
        new_hp: i32,
    ) -> Option<HpTransition> {
        let hp_before = participant.current_hp();
        let temp_before = self.entries[index].temp_hp;
        let resolved = resolve_hp(hp_before, temp_before, new_hp, participant.max_hp());

        participant.set_current_hp(resolved.current_hp);
        self.entries[index].temp_hp = resolved.temp_hp;

        let name = self.entries[index].name.clone();
        let round = self.current_round;
        if new_hp < hp_before {
            let absorbed = temp_before - resolved.temp_hp;
            self.log.record(
                round,
                &name,
                CombatEventKind::Damage,
                format!(
                    "{} takes {} damage ({} absorbed by temp HP), now at {} HP",
                    name,
                    i64::from(hp_before) - i64::from(new_hp),
                    absorbed,
                    resolved.current_hp
                ),
            );
        } else if resolved.current_hp > hp_before {
            self.log.record(
                round,
                &name,
                CombatEventKind::Healing,
                format!(
                    "{} heals {} HP, now at {} HP",
                    name,
                    resolved.current_hp - hp_before,
                    resolved.current_hp
                ),
            );
        }

        let transition = hp_transition(
            self.entries[index].vitality,
            participant.can_make_death_saves(),
            hp_before,
            resolved.current_hp,
        );
        if let Some(transition) = transition {
            self.apply_hp_transition(index, transition);
        }
        transition
    }

    /// Add temporary hit points. They stack with whatever is left.
    pub fn add_temp_hp(&mut self, index: usize, amount: i32) -> Result<()> {
        if amount < 0 {
            return Err(CombatError::OutOfRange(format!(
                "temporary HP must not be negative (got {})",
                amount
            )));
        }

        let round = self.current_round;
        let entry = &mut self.entries[index];
        entry.temp_hp = entry.temp_hp.checked_add(amount).ok_or_else(|| {
            CombatError::OutOfRange(format!(
                "temporary HP would overflow ({} + {})",
                entry.temp_hp, amount
            ))
        })?;
        let description = format!(
            "{} gains {} temporary HP ({} total)",
            entry.name, amount, entry.temp_hp
        );
        let name = entry.name.clone();
        self.log.record(round, &name, CombatEventKind::TempHp, description);
        Ok(())
    }
}
