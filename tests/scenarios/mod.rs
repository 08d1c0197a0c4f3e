//! Scenario tests for the combat engine
//!
//! Grouped by behavior area:
//! - Initiative: rolling, manual values, ordering and tie-breaks
//! - Turns: advancing, skipping removed combatants, round counting
//! - Hit points: temp HP absorption, healing, unconscious toggling
//! - Death saves: stabilizing, dying, eligibility
//! - Lifecycle: start/end, sibling encounters, logs, concurrency
//! - Script: the JSON script runner

pub mod hit_points;
pub mod lifecycle;
