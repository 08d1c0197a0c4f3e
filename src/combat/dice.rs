//! Dice rolling for initiative
//!
//! The engine only ever needs a d20, but where that d20 comes from matters:
//! live tables want real randomness, replays want a seed, and tests want a
//! fixed sequence. All three sit behind the `Roller` trait.

use std::collections::VecDeque;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of sides on the initiative die
pub const D20_SIDES: i32 = 20;

/// Source of d20 results
pub trait Roller: Send + Sync {
    /// Roll a single d20 (1-20 inclusive)
    fn d20(&self) -> i32;
}

/// Roll a single d20 from the thread-local RNG
pub fn roll_d20() -> i32 {
    rand::rng().random_range(1..=D20_SIDES)
}

/// Roller backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRoller;

impl Roller for ThreadRoller {
    fn d20(&self) -> i32 {
        roll_d20()
    }
}

/// Deterministic roller seeded from a `u64`
#[derive(Debug)]
pub struct SeededRoller {
    rng: Mutex<StdRng>,
}

impl SeededRoller {
    /// Create a roller that replays the same sequence for the same seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Roller for SeededRoller {
    fn d20(&self) -> i32 {
        self.rng.lock().random_range(1..=D20_SIDES)
    }
}

/// Roller that hands out a fixed sequence of results, cycling when exhausted
///
/// Values are taken as-is, so a sequence may contain results a real d20
/// could not produce.
#[derive(Debug)]
pub struct ScriptedRolls {
    queue: Mutex<VecDeque<i32>>,
}

impl ScriptedRolls {
    /// Create a scripted roller. An empty sequence always rolls 10.
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            queue: Mutex::new(rolls.into_iter().collect()),
        }
    }
}

impl Roller for ScriptedRolls {
    fn d20(&self) -> i32 {
        let mut queue = self.queue.lock();
        match queue.pop_front() {
            Some(roll) => {
                queue.push_back(roll);
                roll
            }
            None => 10,
        }
    }
}
