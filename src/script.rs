//! Combat scripts
//!
//! A script seeds a roster, optionally fixes the d20 results, and then runs
//! a list of steps against a fresh `CombatManager`. Participants are named
//! by `{kind, id}` and resolved to their initiative entry in the given
//! encounter at the time the step runs.
//!
//! ```json
//! {
//!   "roster": { "encounters": [...], "players": [...], "monsters": [...] },
//!   "rolls": [15, 8],
//!   "steps": [
//!     { "op": "start_combat", "encounter": 1 },
//!     { "op": "damage", "encounter": 1, "participant": { "kind": "monster", "id": 1 }, "amount": 5 }
//!   ]
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::combat::{
    parse_conditions, CombatError, CombatManager, EncounterId, EntryId, MemoryRoster, ParticipantKey, RosterSeed,
    ScriptedRolls, StartOptions,
};
use crate::config::Config;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    #[serde(default)]
    pub roster: RosterSeed,
    /// Fixed d20 results, cycled. Empty means the configured roller.
    #[serde(default)]
    pub rolls: Vec<i32>,
    pub steps: Vec<Step>,
}

/// One engine operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    StartCombat {
        encounter: EncounterId,
        #[serde(default)]
        options: StartOptions,
    },
    Initiative {
        encounter: EncounterId,
    },
    AdvanceTurn {
        encounter: EncounterId,
    },
    ApplyHp {
        encounter: EncounterId,
        participant: ParticipantKey,
        hp: i32,
    },
    Damage {
        encounter: EncounterId,
        participant: ParticipantKey,
        amount: i32,
    },
    Heal {
        encounter: EncounterId,
        participant: ParticipantKey,
        amount: i32,
    },
    AddTempHp {
        encounter: EncounterId,
        participant: ParticipantKey,
        amount: i32,
    },
    SetConditions {
        encounter: EncounterId,
        participant: ParticipantKey,
        conditions: Value,
    },
    SetRemoved {
        encounter: EncounterId,
        participant: ParticipantKey,
        removed: bool,
    },
    DeathSave {
        encounter: EncounterId,
        participant: ParticipantKey,
        #[serde(default)]
        successes: i32,
        #[serde(default)]
        failures: i32,
    },
    EndCombat {
        encounter: EncounterId,
        #[serde(default)]
        complete: bool,
    },
    CombatLog {
        encounter: EncounterId,
    },
}

impl Step {
    pub fn op(&self) -> &'static str {
        match self {
            Step::StartCombat { .. } => "start_combat",
            Step::Initiative { .. } => "initiative",
            Step::AdvanceTurn { .. } => "advance_turn",
            Step::ApplyHp { .. } => "apply_hp",
            Step::Damage { .. } => "damage",
            Step::Heal { .. } => "heal",
            Step::AddTempHp { .. } => "add_temp_hp",
            Step::SetConditions { .. } => "set_conditions",
            Step::SetRemoved { .. } => "set_removed",
            Step::DeathSave { .. } => "death_save",
            Step::EndCombat { .. } => "end_combat",
            Step::CombatLog { .. } => "combat_log",
        }
    }
}

/// Outcome of one step, printed as a JSON line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub step: usize,
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Build the manager a script runs against
pub fn manager_for(script: &Script, config: Config) -> Result<CombatManager, ScriptError> {
    let roster = Arc::new(MemoryRoster::from_seed(script.roster.clone())?);
    if script.rolls.is_empty() {
        Ok(CombatManager::from_config(roster, config))
    } else {
        let rolls = Arc::new(ScriptedRolls::new(script.rolls.clone()));
        Ok(CombatManager::new(roster, rolls, config))
    }
}

/// Run every step. A failing step is reported and the run carries on.
pub async fn run_script(script: &Script, config: Config) -> Result<Vec<StepReport>, ScriptError> {
    let manager = manager_for(script, config)?;
    let mut reports = Vec::with_capacity(script.steps.len());

    for (i, step) in script.steps.iter().enumerate() {
        let number = i + 1;
        debug!("Step {}: {}", number, step.op());
        let report = match execute(&manager, step).await {
            Ok(value) => StepReport {
                step: number,
                op: step.op().to_string(),
                ok: Some(value),
                error: None,
            },
            Err(e) => {
                warn!("Step {} ({}) failed: {}", number, step.op(), e);
                StepReport {
                    step: number,
                    op: step.op().to_string(),
                    ok: None,
                    error: Some(e.to_string()),
                }
            }
        };
        reports.push(report);
    }

    Ok(reports)
}

async fn entry(manager: &CombatManager, encounter: EncounterId, key: ParticipantKey) -> Result<EntryId, CombatError> {
    manager
        .entry_for(encounter, key)
        .await
        .ok_or_else(|| CombatError::NotFound(format!("{} in encounter {}", key, encounter)))
}

async fn execute(manager: &CombatManager, step: &Step) -> Result<Value, ScriptError> {
    let value = match step {
        Step::StartCombat { encounter, options } => {
            serde_json::to_value(manager.start_combat(*encounter, options.clone()).await?)?
        }
        Step::Initiative { encounter } => serde_json::to_value(manager.initiative(*encounter).await?)?,
        Step::AdvanceTurn { encounter } => serde_json::to_value(manager.advance_turn(*encounter).await?)?,
        Step::ApplyHp {
            encounter,
            participant,
            hp,
        } => {
            let id = entry(manager, *encounter, *participant).await?;
            serde_json::to_value(manager.apply_hp(id, *hp).await?)?
        }
        Step::Damage {
            encounter,
            participant,
            amount,
        } => {
            let id = entry(manager, *encounter, *participant).await?;
            serde_json::to_value(manager.damage(id, *amount).await?)?
        }
        Step::Heal {
            encounter,
            participant,
            amount,
        } => {
            let id = entry(manager, *encounter, *participant).await?;
            serde_json::to_value(manager.heal(id, *amount).await?)?
        }
        Step::AddTempHp {
            encounter,
            participant,
            amount,
        } => {
            let id = entry(manager, *encounter, *participant).await?;
            serde_json::to_value(manager.add_temp_hp(id, *amount).await?)?
        }
        Step::SetConditions {
            encounter,
            participant,
            conditions,
        } => {
            let conditions = parse_conditions(conditions)?;
            let id = entry(manager, *encounter, *participant).await?;
            serde_json::to_value(manager.set_conditions(id, conditions).await?)?
        }
        Step::SetRemoved {
            encounter,
            participant,
            removed,
        } => {
            let id = entry(manager, *encounter, *participant).await?;
            serde_json::to_value(manager.set_removed(id, *removed).await?)?
        }
        Step::DeathSave {
            encounter,
            participant,
            successes,
            failures,
        } => {
            let id = entry(manager, *encounter, *participant).await?;
            serde_json::to_value(manager.record_death_save(id, *successes, *failures).await?)?
        }
        Step::EndCombat { encounter, complete } => {
            let status = manager.end_combat(*encounter, *complete).await?;
            serde_json::json!({ "status": status })
        }
        Step::CombatLog { encounter } => serde_json::to_value(manager.combat_log(*encounter).await?)?,
    };
    Ok(value)
}
