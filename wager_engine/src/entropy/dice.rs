use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DIE_FACES: u8 = 6;

/// Two dice in draw order. The first die always settles before the second
/// is rolled, and callers bind them positionally.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DiceRoll(pub u8, pub u8);

impl DiceRoll {
    #[must_use]
    pub const fn first(&self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn second(&self) -> u8 {
        self.1
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.0 as u32 + self.1 as u32
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}]", self.0, self.1)
    }
}

/// Local die roller. Rolling never fails.
pub trait DiceSource: Send {
    /// One uniform value in `1..=6`.
    fn roll_die(&mut self) -> u8;

    fn roll_dice(&mut self) -> DiceRoll {
        let first = self.roll_die();
        let second = self.roll_die();
        DiceRoll(first, second)
    }
}

/// OS-seeded dice.
#[derive(Debug)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible dice for simulations.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceSource for RandomDice {
    fn roll_die(&mut self) -> u8 {
        self.rng.random_range(1..=DIE_FACES)
    }
}
