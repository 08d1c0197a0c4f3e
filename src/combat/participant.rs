//! Combat participants
//!
//! Players and monsters share hit points, armor class and an initiative
//! bonus, but differ in who may roll death saves: every player does, a
//! monster only when it has been flagged for it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ParticipantId;

/// Which side of the roster a participant comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Player,
    Monster,
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantKind::Player => write!(f, "player"),
            ParticipantKind::Monster => write!(f, "monster"),
        }
    }
}

/// Identity of a participant across the roster
///
/// Ordering is by id first so that it doubles as the initiative tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantKey {
    pub kind: ParticipantKind,
    pub id: ParticipantId,
}

impl ParticipantKey {
    pub fn player(id: ParticipantId) -> Self {
        Self {
            kind: ParticipantKind::Player,
            id,
        }
    }

    pub fn monster(id: ParticipantId) -> Self {
        Self {
            kind: ParticipantKind::Monster,
            id,
        }
    }
}

impl PartialOrd for ParticipantKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParticipantKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id).then(self.kind.cmp(&other.kind))
    }
}

impl fmt::Display for ParticipantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// A player character in a campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCharacter {
    pub id: ParticipantId,
    pub name: String,
    pub max_hp: i32,
    pub current_hp: i32,
    pub armor_class: i32,
    #[serde(default)]
    pub initiative_bonus: i32,
    /// Inactive players sit out of combat entirely
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A monster placed in an encounter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    pub id: ParticipantId,
    pub name: String,
    pub max_hp: i32,
    pub current_hp: i32,
    pub armor_class: i32,
    #[serde(default)]
    pub initiative_bonus: i32,
    /// Whether this monster rolls death saves instead of dying at 0 HP
    #[serde(default)]
    pub allow_death_saves: bool,
}

fn default_true() -> bool {
    true
}

/// A combat entrant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Participant {
    Player(PlayerCharacter),
    Monster(Monster),
}

impl Participant {
    pub fn kind(&self) -> ParticipantKind {
        match self {
            Participant::Player(_) => ParticipantKind::Player,
            Participant::Monster(_) => ParticipantKind::Monster,
        }
    }

    pub fn id(&self) -> ParticipantId {
        match self {
            Participant::Player(p) => p.id,
            Participant::Monster(m) => m.id,
        }
    }

    pub fn key(&self) -> ParticipantKey {
        ParticipantKey {
            kind: self.kind(),
            id: self.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Participant::Player(p) => &p.name,
            Participant::Monster(m) => &m.name,
        }
    }

    pub fn max_hp(&self) -> i32 {
        match self {
            Participant::Player(p) => p.max_hp,
            Participant::Monster(m) => m.max_hp,
        }
    }

    pub fn current_hp(&self) -> i32 {
        match self {
            Participant::Player(p) => p.current_hp,
            Participant::Monster(m) => m.current_hp,
        }
    }

    pub fn armor_class(&self) -> i32 {
        match self {
            Participant::Player(p) => p.armor_class,
            Participant::Monster(m) => m.armor_class,
        }
    }

    pub fn initiative_bonus(&self) -> i32 {
        match self {
            Participant::Player(p) => p.initiative_bonus,
            Participant::Monster(m) => m.initiative_bonus,
        }
    }

    /// Inactive players are left out when combat starts
    pub fn is_active(&self) -> bool {
        match self {
            Participant::Player(p) => p.is_active,
            Participant::Monster(_) => true,
        }
    }

    /// Whether dropping to 0 HP starts death saves rather than killing outright
    pub fn can_make_death_saves(&self) -> bool {
        match self {
            Participant::Player(_) => true,
            Participant::Monster(m) => m.allow_death_saves,
        }
    }

    /// Set current HP, flooring at 0
    pub fn set_current_hp(&mut self, hp: i32) {
        let hp = hp.max(0);
        match self {
            Participant::Player(p) => p.current_hp = hp,
            Participant::Monster(m) => m.current_hp = hp,
        }
    }
}

impl From<PlayerCharacter> for Participant {
    fn from(player: PlayerCharacter) -> Self {
        Participant::Player(player)
    }
}

impl From<Monster> for Participant {
    fn from(monster: Monster) -> Self {
        Participant::Monster(monster)
    }
}
