//! Combat event journal
//!
//! Each combat run keeps a running log of what happened and in which round,
//! so the table can review a fight after the fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatEventKind {
    CombatStarted,
    TurnStarted,
    Damage,
    Healing,
    TempHp,
    ConditionsChanged,
    FellUnconscious,
    DeathSave,
    Stabilized,
    Died,
    Removed,
    Returned,
    CombatEnded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatEvent {
    pub round: u32,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub kind: CombatEventKind,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct CombatLog {
    events: Vec<CombatEvent>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event stamped with the current time
    pub fn record(
        &mut self,
        round: u32,
        actor: impl Into<String>,
        kind: CombatEventKind,
        description: impl Into<String>,
    ) {
        self.events.push(CombatEvent {
            round,
            timestamp: Utc::now(),
            actor: actor.into(),
            kind,
            description: description.into(),
        });
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Events of a given kind, oldest first
    pub fn of_kind(&self, kind: CombatEventKind) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
