//! Status conditions
//!
//! A combatant's condition list mixes standard conditions (bare names such
//! as "prone") with custom conditions that carry a description. Both are
//! matched by name, ignoring ASCII case.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{CombatError, Result};

/// Condition added automatically at 0 HP
pub const UNCONSCIOUS: &str = "unconscious";
/// Condition marking a participant that has died
pub const DEAD: &str = "Dead";
/// Condition marking a participant stabilized by death saves
pub const STABILIZED: &str = "Stabilized";

/// Marker serialized as `"type": "custom"` on custom conditions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomTag {
    #[default]
    Custom,
}

/// A freeform condition defined at the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCondition {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub tag: CustomTag,
}

/// A single condition entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Standard(String),
    Custom(CustomCondition),
}

impl Condition {
    pub fn standard(name: impl Into<String>) -> Self {
        Condition::Standard(name.into())
    }

    pub fn custom(name: impl Into<String>, description: impl Into<String>) -> Self {
        Condition::Custom(CustomCondition {
            name: name.into(),
            description: description.into(),
            tag: CustomTag::Custom,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Condition::Standard(name) => name,
            Condition::Custom(c) => &c.name,
        }
    }

    /// Whether this condition goes by `name`
    pub fn is_named(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
    }

    /// Validate one JSON element of a condition list
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) if !name.trim().is_empty() => Ok(Condition::Standard(name.clone())),
            Value::String(_) => Err(CombatError::OutOfRange(
                "condition name must not be empty".to_string(),
            )),
            Value::Object(map) => {
                let name = map.get("name").and_then(Value::as_str);
                let description = map.get("description").and_then(Value::as_str);
                let tag = map.get("type").and_then(Value::as_str);
                match (name, description, tag) {
                    (Some(name), Some(description), Some("custom")) if !name.trim().is_empty() => {
                        Ok(Condition::custom(name, description))
                    }
                    _ => Err(CombatError::OutOfRange(format!(
                        "malformed custom condition: {}",
                        value
                    ))),
                }
            }
            other => Err(CombatError::OutOfRange(format!(
                "condition must be a string or custom object, got {}",
                other
            ))),
        }
    }
}

/// Parse and validate a JSON condition list
pub fn parse_conditions(value: &Value) -> Result<Conditions> {
    let items = value.as_array().ok_or_else(|| {
        CombatError::OutOfRange("conditions must be an array".to_string())
    })?;
    let parsed = items
        .iter()
        .map(Condition::from_value)
        .collect::<Result<Vec<_>>>()?;
    Ok(Conditions::from_list(parsed))
}

/// Ordered, name-unique list of conditions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, keeping the first occurrence of each name
    pub fn from_list(list: impl IntoIterator<Item = Condition>) -> Self {
        let mut conditions = Self::new();
        for condition in list {
            conditions.insert(condition);
        }
        conditions
    }

    /// Check whether a condition with this name is present
    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|c| c.is_named(name))
    }

    /// Add a condition unless one with the same name exists.
    /// Returns true if it was added.
    pub fn insert(&mut self, condition: Condition) -> bool {
        if self.has(condition.name()) {
            return false;
        }
        self.0.push(condition);
        true
    }

    /// Remove every condition with this name. Returns true if any was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| !c.is_named(name));
        self.0.len() != before
    }

    /// Swap `old` for a standard condition `new`, keeping its position.
    /// Appends `new` if `old` is absent.
    pub fn replace(&mut self, old: &str, new: &str) {
        self.remove(new);
        match self.0.iter().position(|c| c.is_named(old)) {
            Some(pos) => self.0[pos] = Condition::standard(new),
            None => self.0.push(Condition::standard(new)),
        }
    }

    /// Replace the whole list with a single standard condition
    pub fn set_only(&mut self, name: &str) {
        self.0.clear();
        self.0.push(Condition::standard(name));
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(Condition::name).collect()
    }
}
